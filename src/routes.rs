use crate::{
    api::{absence, business_trip, holiday, project, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/users")
                    // /users
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    // /users/rollover
                    .service(
                        web::resource("/rollover").route(web::post().to(user::rollover_balances)),
                    )
                    // /users/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/absences")
                    // /absences
                    .service(
                        web::resource("")
                            .route(web::get().to(absence::my_absences))
                            .route(web::post().to(absence::create_absence)),
                    )
                    // /absences/all
                    .service(web::resource("/all").route(web::get().to(absence::all_absences)))
                    // /absences/export
                    .service(web::resource("/export").route(web::get().to(absence::export_absences)))
                    // /absences/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(absence::get_absence))
                            .route(web::delete().to(absence::cancel_absence)),
                    )
                    // /absences/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(absence::approve_absence)),
                    )
                    // /absences/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(absence::reject_absence)),
                    ),
            )
            .service(
                web::scope("/trips")
                    // /trips
                    .service(
                        web::resource("")
                            .route(web::get().to(business_trip::my_trips))
                            .route(web::post().to(business_trip::create_trip)),
                    )
                    // /trips/all
                    .service(web::resource("/all").route(web::get().to(business_trip::all_trips)))
                    // /trips/export
                    .service(
                        web::resource("/export").route(web::get().to(business_trip::export_trips)),
                    )
                    // /trips/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(business_trip::get_trip))
                            .route(web::delete().to(business_trip::delete_trip)),
                    )
                    // /trips/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(business_trip::approve_trip)),
                    )
                    // /trips/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(business_trip::reject_trip)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    // /holidays
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    // /holidays/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::scope("/projects")
                    // /projects
                    .service(
                        web::resource("")
                            .route(web::get().to(project::list_projects))
                            .route(web::post().to(project::create_project)),
                    )
                    // /projects/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(project::update_project))
                            .route(web::delete().to(project::delete_project)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
