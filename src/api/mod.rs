pub mod absence;
pub mod business_trip;
pub mod holiday;
pub mod project;
pub mod user;
