pub mod admin;
pub mod reservation;
