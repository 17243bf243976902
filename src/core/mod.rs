pub mod currency;
pub mod geometry;
pub mod model;
