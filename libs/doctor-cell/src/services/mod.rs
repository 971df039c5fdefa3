pub mod availability;
pub mod department;
pub mod doctor;
