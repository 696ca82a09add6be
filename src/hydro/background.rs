use super::constants::{C0, CP, EXNER0, GAMMA, GRAV, P0, RD, THETA0};
use super::initial::{QPOINTS, QWEIGHTS};
use super::thermo;
use crate::mesh::Grid;
use crate::state::NUM_GHOST;

/// A closed-form hydrostatic reference atmosphere.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HydrostaticProfile {
    /// Constant potential temperature (thermally neutral).
    ConstantTheta,
    /// Constant Brunt-Vaisala frequency, in 1 / s.
    ConstantBruntVaisala(f64),
}

impl HydrostaticProfile {
    /// Return the background `(density, potential temperature)` at height
    /// `z`. Balance is established through the Exner pressure.
    ///
    pub fn sample(self, z: f64) -> (f64, f64) {
        let (t, exner) = match self {
            HydrostaticProfile::ConstantTheta => {
                (THETA0, EXNER0 - GRAV * z / (CP * THETA0))
            }
            HydrostaticProfile::ConstantBruntVaisala(n) => {
                let t = THETA0 * (n * n / GRAV * z).exp();
                (t, EXNER0 - GRAV * GRAV / (CP * n * n) * (t - THETA0) / (t * THETA0))
            }
        };
        let p = P0 * exner.powf(CP / RD);
        let rt = (p / C0).powf(1.0 / GAMMA);
        (rt / t, t)
    }
}

/**
 * Time-invariant vertical reference profiles. Cell values are vertical
 * averages over each row (ghost rows included) computed with three-point
 * Gauss-Legendre quadrature; interface values are exact samples at the
 * `nz + 1` horizontal cell faces.
 */
#[derive(Clone, Debug)]
pub struct Background {
    dens_cell: Vec<f64>,
    dens_theta_cell: Vec<f64>,
    dens_int: Vec<f64>,
    dens_theta_int: Vec<f64>,
    pressure_int: Vec<f64>,
}

impl Background {
    pub fn new(grid: &Grid, profile: HydrostaticProfile) -> Self {
        let nz = grid.nz();
        let dz = grid.cell_spacing().1;

        let mut dens_cell = Vec::with_capacity((nz + 2 * NUM_GHOST) as usize);
        let mut dens_theta_cell = Vec::with_capacity((nz + 2 * NUM_GHOST) as usize);

        for k in -NUM_GHOST..nz + NUM_GHOST {
            let zc = grid.cell_center((0, k)).1;
            let mut r_avg = 0.0;
            let mut rt_avg = 0.0;

            for (q, w) in QPOINTS.iter().zip(&QWEIGHTS) {
                let (hr, ht) = profile.sample(zc + (q - 0.5) * dz);
                r_avg += hr * w;
                rt_avg += hr * ht * w;
            }
            dens_cell.push(r_avg);
            dens_theta_cell.push(rt_avg);
        }

        let interfaces: Vec<_> = (0..=nz)
            .map(|k| profile.sample(grid.interface_height(k)))
            .collect();

        Self {
            dens_cell,
            dens_theta_cell,
            dens_int: interfaces.iter().map(|(hr, _)| *hr).collect(),
            dens_theta_int: interfaces.iter().map(|(hr, ht)| hr * ht).collect(),
            pressure_int: interfaces.iter().map(|(hr, ht)| thermo::pressure(hr * ht)).collect(),
        }
    }

    /// Background density averaged over row `k`, for `k` in
    /// `-NUM_GHOST..nz + NUM_GHOST`.
    ///
    pub fn dens_cell(&self, k: i64) -> f64 {
        self.dens_cell[(k + NUM_GHOST) as usize]
    }

    pub fn dens_theta_cell(&self, k: i64) -> f64 {
        self.dens_theta_cell[(k + NUM_GHOST) as usize]
    }

    /// Background density at the interface below row `k`, for `k` in
    /// `0..=nz`.
    ///
    pub fn dens_int(&self, k: i64) -> f64 {
        self.dens_int[k as usize]
    }

    pub fn dens_theta_int(&self, k: i64) -> f64 {
        self.dens_theta_int[k as usize]
    }

    pub fn pressure_int(&self, k: i64) -> f64 {
        self.pressure_int[k as usize]
    }
}
