pub mod background;
pub mod constants;
pub mod geometry;
pub mod initial;
pub mod thermo;
