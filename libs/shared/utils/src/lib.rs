pub mod week;

pub use week::week_start;
