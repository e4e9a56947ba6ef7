use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

/// One shared pool for the whole process; the connection-per-call pattern of
/// the legacy data layer is gone.
pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .expect("Failed to connect to database")
}
