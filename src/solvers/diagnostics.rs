use crate::context::Context;
use crate::hydro::thermo::Primitive;
use crate::state::State;
use std::ops::Add;

/// Globally conserved quantities of the flow: total mass and total energy
/// (kinetic plus internal), integrated over the interior.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Totals {
    pub mass: f64,
    pub total_energy: f64,
}

/// Relative change of each conserved quantity against a baseline.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Drift {
    pub mass: f64,
    pub total_energy: f64,
}

impl Totals {
    /// Integrate over the interior cells of one partition's state. Reads
    /// only; the state is never modified.
    ///
    pub fn of_state(state: &State, context: &Context) -> Self {
        let (nz, nx) = state.dim();
        let area = context.grid.cell_area();
        let background = &context.background;
        let mut totals = Totals::default();

        for k in 0..nz {
            for i in 0..nx {
                let prim = Primitive::reconstruct(
                    &state.cell((k, i)),
                    background.dens_cell(k),
                    background.dens_theta_cell(k),
                );
                totals.mass += prim.mass_density() * area;
                totals.total_energy += (prim.kinetic_energy_density() + prim.internal_energy_density()) * area;
            }
        }
        totals
    }

    /// Sum the partial totals of every partition, in the order given.
    ///
    pub fn reduce<I: IntoIterator<Item = Totals>>(parts: I) -> Self {
        parts.into_iter().fold(Totals::default(), |a, b| a + b)
    }

    pub fn relative_drift(&self, baseline: &Totals) -> Drift {
        Drift {
            mass: (self.mass - baseline.mass) / baseline.mass,
            total_energy: (self.total_energy - baseline.total_energy) / baseline.total_energy,
        }
    }

    /// False if either total has become NaN or infinite. Never consulted
    /// by the solver itself.
    ///
    pub fn is_finite(&self) -> bool {
        self.mass.is_finite() && self.total_energy.is_finite()
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            mass: self.mass + other.mass,
            total_energy: self.total_energy + other.total_energy,
        }
    }
}
