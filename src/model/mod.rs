pub mod absence;
pub mod business_trip;
pub mod holiday_day;
pub mod project;
pub mod role;
pub mod user;
