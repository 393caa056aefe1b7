pub mod days;
pub mod trips;
