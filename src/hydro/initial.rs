use super::background::HydrostaticProfile;
use super::constants::{PI, XLEN, ZLEN};
use crate::error::Error;
use crate::mesh::{Grid, Subdomain};
use crate::state::{State, Variable, NUM_VARS};
use std::fmt;
use std::str::FromStr;

/// Three-point Gauss-Legendre abscissae on the unit interval.
pub const QPOINTS: [f64; 3] = [
    0.112_701_665_379_258_311_482_073_460_022,
    0.500_000_000_000_000_000_000_000_000_000,
    0.887_298_334_620_741_688_517_926_539_980,
];

/// Three-point Gauss-Legendre weights on the unit interval.
pub const QWEIGHTS: [f64; 3] = [
    0.277_777_777_777_777_777_777_777_777_779,
    0.444_444_444_444_444_444_444_444_444_444,
    0.277_777_777_777_777_777_777_777_777_779,
];

/// Sample a cosine-squared bubble of amplitude `amp` centered at `(x0, z0)`
/// with radii `(xrad, zrad)`. Zero outside the ellipse.
///
pub fn sample_ellipse_cosine(x: f64, z: f64, amp: f64, x0: f64, z0: f64, xrad: f64, zrad: f64) -> f64 {
    let dist = (((x - x0) / xrad).powi(2) + ((z - z0) / zrad).powi(2)).sqrt() * PI / 2.0;

    if dist <= PI / 2.0 {
        amp * dist.cos().powi(2)
    } else {
        0.0
    }
}

/// Local perturbation and background at one sample point: perturbation
/// density, u-wind, w-wind and potential temperature, plus the background
/// density `hr` and potential temperature `ht`.
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    pub r: f64,
    pub u: f64,
    pub w: f64,
    pub t: f64,
    pub hr: f64,
    pub ht: f64,
}

/**
 * The selectable initial conditions. Each one fixes a background profile
 * and a perturbation; two of them also couple forcing into the dynamics
 * (the gravity-wave source term and the cold-air inflow at the left
 * boundary).
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialCondition {
    Collision,
    Thermal,
    GravityWaves,
    DensityCurrent,
    Injection,
}

impl InitialCondition {
    pub fn name(self) -> &'static str {
        match self {
            InitialCondition::Collision => "collision",
            InitialCondition::Thermal => "thermal",
            InitialCondition::GravityWaves => "gravity_waves",
            InitialCondition::DensityCurrent => "density_current",
            InitialCondition::Injection => "injection",
        }
    }

    pub fn profile(self) -> HydrostaticProfile {
        match self {
            InitialCondition::GravityWaves => HydrostaticProfile::ConstantBruntVaisala(0.02),
            _ => HydrostaticProfile::ConstantTheta,
        }
    }

    /// Sample the perturbation and background at a physical location.
    ///
    pub fn sample(self, x: f64, z: f64) -> Sample {
        let (hr, ht) = self.profile().sample(z);
        let rest = Sample {
            hr,
            ht,
            ..Sample::default()
        };
        match self {
            InitialCondition::Collision => Sample {
                t: sample_ellipse_cosine(x, z, 20.0, XLEN / 2.0, 2000.0, 2000.0, 2000.0)
                    + sample_ellipse_cosine(x, z, -20.0, XLEN / 2.0, 8000.0, 2000.0, 2000.0),
                ..rest
            },
            InitialCondition::Thermal => Sample {
                t: sample_ellipse_cosine(x, z, 3.0, XLEN / 2.0, 2000.0, 2000.0, 2000.0),
                ..rest
            },
            InitialCondition::GravityWaves => Sample { u: 15.0, ..rest },
            InitialCondition::DensityCurrent => Sample {
                t: sample_ellipse_cosine(x, z, -20.0, XLEN / 2.0, 5000.0, 4000.0, 2000.0),
                ..rest
            },
            InitialCondition::Injection => rest,
        }
    }

    /// Cell average of the perturbation state at the global `(i, k)` index,
    /// integrated over a 3 x 3 Gauss-Legendre stencil inside the cell.
    ///
    pub fn cell_average(self, grid: &Grid, index: (i64, i64)) -> [f64; NUM_VARS] {
        let (dx, dz) = grid.cell_spacing();
        let (xc, zc) = grid.cell_center(index);
        let mut q = [0.0; NUM_VARS];

        for (qz, wz) in QPOINTS.iter().zip(&QWEIGHTS) {
            for (qx, wx) in QPOINTS.iter().zip(&QWEIGHTS) {
                let x = xc + (qx - 0.5) * dx;
                let z = zc + (qz - 0.5) * dz;
                let Sample { r, u, w, t, hr, ht } = self.sample(x, z);
                let weight = wx * wz;
                q[Variable::Density.index()] += r * weight;
                q[Variable::XMomentum.index()] += (r + hr) * u * weight;
                q[Variable::ZMomentum.index()] += (r + hr) * w * weight;
                q[Variable::DensityTheta.index()] += ((r + hr) * (t + ht) - hr * ht) * weight;
            }
        }
        q
    }

    /// Build the initial perturbation state of one partition. Ghost cells
    /// are integrated the same way as interior cells.
    ///
    pub fn initial_state(self, grid: &Grid, subdomain: &Subdomain) -> State {
        State::from_function(subdomain.nz, subdomain.nx, |(k, i)| {
            self.cell_average(grid, (subdomain.i_beg + i, subdomain.k_beg + k))
        })
    }

    pub fn has_vertical_forcing(self) -> bool {
        matches!(self, InitialCondition::GravityWaves)
    }

    /// Synthetic vertical-velocity source for the gravity-wave case, at a
    /// physical location. `None` for every other case.
    ///
    pub fn vertical_forcing(self, x: f64, z: f64) -> Option<f64> {
        match self {
            InitialCondition::GravityWaves => {
                Some(sample_ellipse_cosine(x, z, 0.01, XLEN / 8.0, 1000.0, 500.0, 500.0))
            }
            _ => None,
        }
    }

    /// Inflow `(u-wind, potential temperature)` imposed on the left domain
    /// boundary at height `z` for the injection case, if `z` lies in the
    /// injection band.
    ///
    pub fn inflow(self, z: f64) -> Option<(f64, f64)> {
        match self {
            InitialCondition::Injection if (z - 3.0 * ZLEN / 4.0).abs() <= ZLEN / 16.0 => {
                Some((50.0, 298.0))
            }
            _ => None,
        }
    }
}

impl fmt::Display for InitialCondition {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

impl FromStr for InitialCondition {
    type Err = Error;

    /// Accepts either the case name or the legacy numeric selector.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "collision" | "1" => Ok(InitialCondition::Collision),
            "thermal" | "2" => Ok(InitialCondition::Thermal),
            "gravity_waves" | "3" => Ok(InitialCondition::GravityWaves),
            "density_current" | "5" => Ok(InitialCondition::DensityCurrent),
            "injection" | "6" => Ok(InitialCondition::Injection),
            _ => Err(Error::InvalidInitialCondition(s.to_string())),
        }
    }
}
