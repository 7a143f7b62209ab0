pub mod grid;
pub mod message;
pub mod params;
