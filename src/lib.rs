//! Stratoflow advances a two-dimensional, compressible, stratified
//! atmosphere governed by the Euler equations with gravity. The state is
//! stored as a perturbation on a hydrostatic background and updated with a
//! fourth-order finite-volume scheme, stabilized by hyperviscosity, inside a
//! dimensionally split three-stage Runge-Kutta integrator. The domain is
//! decomposed into share-nothing column blocks that exchange their boundary
//! columns by message passing: periodic in x, solid walls in z.

pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod hydro;
pub mod index_space;
pub mod mesh;
pub mod output;
pub mod simulation;
pub mod solvers;
pub mod state;
