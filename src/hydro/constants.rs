//! Physical constants for dry air, and the fixed numerical parameters of
//! the scheme.

pub use std::f64::consts::PI;

/// Gravitational acceleration (m / s^2)
pub const GRAV: f64 = 9.8;

/// Specific heat of dry air at constant pressure
pub const CP: f64 = 1004.0;

/// Specific heat of dry air at constant volume
pub const CV: f64 = 717.0;

/// Dry air gas constant (P = rho * RD * T)
pub const RD: f64 = 287.0;

/// Reference surface pressure (Pa)
pub const P0: f64 = 1.0e5;

/// Translates rho * theta into pressure: P = C0 * (rho * theta)^GAMMA
pub const C0: f64 = 27.562_941_092_972_592_131_057_297_448_2;

/// Ratio cp / cv
pub const GAMMA: f64 = 1.400_278_940_027_894_002_789_400_278_94;

/// Length of the domain in x (m)
pub const XLEN: f64 = 2.0e4;

/// Length of the domain in z (m)
pub const ZLEN: f64 = 1.0e4;

/// Strength of the artificial hyperviscosity, in [0, 1]
pub const HV_BETA: f64 = 0.05;

/// Courant number used to derive the time step
pub const CFL: f64 = 1.5;

/// Assumed maximum wave speed, sound plus wind (m / s)
pub const MAX_SPEED: f64 = 450.0;

/// Multiplier on the prescribed vertical-velocity source. The source is
/// accumulated once for each of density, x-momentum, and z-momentum before
/// the z-momentum blend reads it, so its effective weight is three.
pub const FORCING_GAIN: f64 = 3.0;

/// Background potential temperature (K)
pub const THETA0: f64 = 300.0;

/// Surface-level Exner pressure
pub const EXNER0: f64 = 1.0;
