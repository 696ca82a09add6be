pub mod diagnostics;
pub mod group;
pub mod halo;
pub mod integrator;
pub mod partition;
pub mod tendency;
