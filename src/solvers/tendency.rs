use crate::context::Context;
use crate::hydro::constants::{FORCING_GAIN, GRAV, HV_BETA};
use crate::hydro::geometry::Direction;
use crate::hydro::thermo::Primitive;
use crate::mesh::Subdomain;
use crate::state::{State, Variable, NUM_VARS};
use rayon::prelude::*;

/// Fourth-order interpolation of the interface value from four cell
/// averages.
///
fn interpolate(s: [f64; 4]) -> f64 {
    -s[0] / 12.0 + 7.0 * s[1] / 12.0 + 7.0 * s[2] / 12.0 - s[3] / 12.0
}

/// First-order estimate of the third derivative across the interface,
/// scaled by the cube of the cell width.
///
fn third_derivative(s: [f64; 4]) -> f64 {
    -s[0] + 3.0 * s[1] - 3.0 * s[2] + s[3]
}

/**
 * Transient work buffers for one partition's flux and tendency evaluation.
 * Fluxes live on a `(nz + 1) x (nx + 1)` array of interfaces, of which an x
 * sweep uses the first `nz` rows and a z sweep the first `nx` columns.
 * Tendencies live on the `nz x nx` interior. Nothing is carried between
 * stages.
 */
#[derive(Clone, Debug)]
pub struct Tendency {
    nz: i64,
    nx: i64,
    flux: Vec<[f64; NUM_VARS]>,
    tend: Vec<[f64; NUM_VARS]>,
}

impl Tendency {
    pub fn new(nz: i64, nx: i64) -> Self {
        Self {
            nz,
            nx,
            flux: vec![[0.0; NUM_VARS]; ((nz + 1) * (nx + 1)) as usize],
            tend: vec![[0.0; NUM_VARS]; (nz * nx) as usize],
        }
    }

    /// The most recently computed tendencies, row-major over the interior.
    ///
    pub fn values(&self) -> &[[f64; NUM_VARS]] {
        &self.tend
    }

    /// Tendency of all variables at interior cell `(k, i)`.
    ///
    pub fn at(&self, index: (i64, i64)) -> [f64; NUM_VARS] {
        self.tend[(index.0 * self.nx + index.1) as usize]
    }

    /// Flux through the interface at `(k, i)`: the left face of cell
    /// `(k, i)` for x, the bottom face for z.
    ///
    pub fn flux(&self, index: (i64, i64)) -> [f64; NUM_VARS] {
        self.flux[(index.0 * (self.nx + 1) + index.1) as usize]
    }

    /// Evaluate the tendency of a fully haloed `state` along `direction`.
    /// `dt` is the step size of the current stage and sets the strength of
    /// the hyperviscosity.
    ///
    pub fn compute(
        &mut self,
        state: &State,
        context: &Context,
        subdomain: &Subdomain,
        direction: Direction,
        dt: f64,
    ) {
        assert_eq!(state.dim(), (self.nz, self.nx), "state does not match the tendency buffers");
        self.compute_flux(state, context, direction, dt);
        self.compute_divergence(state, context, direction);

        let ic = context.initial_condition;

        if ic.has_vertical_forcing() {
            self.add_vertical_forcing(context, subdomain, |x, z| ic.vertical_forcing(x, z).unwrap_or(0.0));
        }
    }

    fn compute_flux(&mut self, state: &State, context: &Context, direction: Direction, dt: f64) {
        let (nz, nx) = (self.nz, self.nx);
        let (dx, dz) = context.grid.cell_spacing();
        let background = &context.background;
        let (dk, di) = direction.unit();

        let (num_rows, num_cols, hv_coef) = match direction {
            Direction::X => (nz, nx + 1, -HV_BETA * dx / (16.0 * dt)),
            Direction::Z => (nz + 1, nx, -HV_BETA * dz / (16.0 * dt)),
        };

        self.flux
            .par_chunks_mut((nx + 1) as usize)
            .take(num_rows as usize)
            .enumerate()
            .for_each(|(k, row)| {
                let k = k as i64;

                let (hy_dens, hy_dens_theta, hy_pressure) = match direction {
                    Direction::X => (background.dens_cell(k), background.dens_theta_cell(k), 0.0),
                    Direction::Z => (
                        background.dens_int(k),
                        background.dens_theta_int(k),
                        background.pressure_int(k),
                    ),
                };
                let at_wall = direction == Direction::Z && (k == 0 || k == nz);

                for (i, f) in row.iter_mut().take(num_cols as usize).enumerate() {
                    let i = i as i64;
                    let mut vals = [0.0; NUM_VARS];
                    let mut d3 = [0.0; NUM_VARS];

                    for v in Variable::ALL {
                        let mut s = [0.0; 4];
                        for (n, x) in s.iter_mut().enumerate() {
                            let offset = n as i64 - 2;
                            *x = state.get(v, (k + dk * offset, i + di * offset));
                        }
                        vals[v.index()] = interpolate(s);
                        d3[v.index()] = third_derivative(s);
                    }

                    let mut prim = Primitive::reconstruct(&vals, hy_dens, hy_dens_theta);

                    if at_wall {
                        prim = prim.without_normal_flow(direction);
                        d3[Variable::Density.index()] = 0.0;
                    }

                    let flux = prim.flux_vector(direction, hy_pressure);

                    for v in 0..NUM_VARS {
                        f[v] = flux[v] - hv_coef * d3[v];
                    }
                }
            });
    }

    fn compute_divergence(&mut self, state: &State, context: &Context, direction: Direction) {
        let (nx, stride) = (self.nx, (self.nx + 1) as usize);
        let (dx, dz) = context.grid.cell_spacing();
        let flux = &self.flux;

        let (width, next) = match direction {
            Direction::X => (dx, 1),
            Direction::Z => (dz, stride),
        };

        self.tend
            .par_chunks_mut(nx as usize)
            .enumerate()
            .for_each(|(k, row)| {
                for (i, t) in row.iter_mut().enumerate() {
                    let lo = flux[k * stride + i];
                    let hi = flux[k * stride + i + next];

                    for v in 0..NUM_VARS {
                        t[v] = -(hi[v] - lo[v]) / width;
                    }
                    if direction.has_gravity() {
                        let rho = state.get(Variable::Density, (k as i64, i as i64));
                        t[Variable::ZMomentum.index()] -= rho * GRAV;
                    }
                }
            });
    }

    /// Add a prescribed vertical-velocity source `w(x, z)`, weighted by the
    /// background density and `FORCING_GAIN`, to the z-momentum tendency of
    /// every cell.
    ///
    fn add_vertical_forcing<F>(&mut self, context: &Context, subdomain: &Subdomain, w: F)
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        let nx = self.nx;
        let background = &context.background;
        let grid = &context.grid;

        self.tend
            .par_chunks_mut(nx as usize)
            .enumerate()
            .for_each(|(k, row)| {
                let k = k as i64;
                for (i, t) in row.iter_mut().enumerate() {
                    let (x, z) = grid.cell_center((subdomain.i_beg + i as i64, subdomain.k_beg + k));
                    t[Variable::ZMomentum.index()] += FORCING_GAIN * w(x, z) * background.dens_cell(k);
                }
            });
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::Tendency;
    use crate::context::Context;
    use crate::hydro::geometry::Direction;
    use crate::hydro::initial::InitialCondition;
    use crate::mesh::{Grid, Topology};
    use crate::solvers::halo;
    use crate::state::{State, Variable};

    fn setup(nx: i64, nz: i64, ic: InitialCondition) -> (Context, Topology) {
        let grid = Grid::new(nx, nz).unwrap();
        let topology = Topology::new(&grid, 1).unwrap();
        (Context::new(grid, ic), topology)
    }

    #[test]
    fn uniform_state_has_no_x_tendency() {
        let (context, topology) = setup(12, 8, InitialCondition::Thermal);
        let state = State::from_function(8, 12, |_| [0.013, 4.5, -1.25, 2.0]);
        let mut tendency = Tendency::new(8, 12);

        for dt in [0.1, 1.0, 6.0] {
            tendency.compute(&state, &context, topology.subdomain(0), Direction::X, dt);
            assert!(tendency.values().iter().all(|t| *t == [0.0; 4]));
        }
    }

    #[test]
    fn resting_atmosphere_has_no_tendency_in_either_direction() {
        for ic in [InitialCondition::Thermal, InitialCondition::Collision] {
            let (context, topology) = setup(10, 20, ic);
            let mut state = State::zeros(20, 10);
            halo::exchange_x_local(&mut state, &context, topology.subdomain(0));
            halo::exchange_z(&mut state, &context);
            let mut tendency = Tendency::new(20, 10);

            for direction in [Direction::X, Direction::Z] {
                tendency.compute(&state, &context, topology.subdomain(0), direction, 2.0);
                assert!(tendency.values().iter().all(|t| *t == [0.0; 4]));
            }
        }
    }

    #[test]
    fn wall_interfaces_carry_no_mass_flux() {
        let (context, topology) = setup(6, 10, InitialCondition::Collision);
        let mut state = State::from_function(10, 6, |(k, i)| {
            let x = 1e-3 * (k * 6 + i) as f64;
            [x, 0.3 * x, 2.0 + x, -x]
        });
        halo::exchange_z(&mut state, &context);
        let mut tendency = Tendency::new(10, 6);
        tendency.compute(&state, &context, topology.subdomain(0), Direction::Z, 1.0);

        for i in 0..6 {
            assert_eq!(tendency.flux((0, i))[Variable::Density.index()], 0.0);
            assert_eq!(tendency.flux((10, i))[Variable::Density.index()], 0.0);
        }
    }

    #[test]
    fn density_tendency_sums_to_zero_over_a_periodic_row() {
        let (context, topology) = setup(16, 4, InitialCondition::Thermal);
        let mut state = State::from_function(4, 16, |(k, i)| {
            let x = (i as f64 * 0.7).sin() + 0.1 * k as f64;
            [1e-3 * x, 2.0 * x, 0.5 * x, 0.1 * x]
        });
        halo::exchange_x_local(&mut state, &context, topology.subdomain(0));
        let mut tendency = Tendency::new(4, 16);
        tendency.compute(&state, &context, topology.subdomain(0), Direction::X, 1.0);

        for k in 0..4 {
            let total: f64 = (0..16).map(|i| tendency.at((k, i))[0]).sum();
            let scale: f64 = (0..16).map(|i| tendency.at((k, i))[0].abs()).sum();
            assert!(total.abs() <= 1e-12 * scale.max(1e-300));
        }
    }

    #[test]
    fn heavier_cells_sink() {
        let (context, topology) = setup(8, 8, InitialCondition::Thermal);
        let mut state = State::zeros(8, 8);
        state.set(Variable::Density, (4, 4), 1e-3);
        halo::exchange_z(&mut state, &context);
        let mut tendency = Tendency::new(8, 8);
        tendency.compute(&state, &context, topology.subdomain(0), Direction::Z, 1.0);
        assert!(tendency.at((4, 4))[Variable::ZMomentum.index()] < 0.0);
    }

    #[test]
    fn gravity_wave_forcing_pushes_up_near_its_source() {
        let (context, topology) = setup(80, 40, InitialCondition::GravityWaves);
        let mut state = State::zeros(40, 80);
        halo::exchange_x_local(&mut state, &context, topology.subdomain(0));
        let mut tendency = Tendency::new(40, 80);
        tendency.compute(&state, &context, topology.subdomain(0), Direction::X, 1.0);

        // Cell (k = 3, i = 9) is centered at (2375 m, 875 m), inside the source.
        let bg = context.background.dens_cell(3);
        let w = InitialCondition::GravityWaves.vertical_forcing(2375.0, 875.0).unwrap();
        let expected = 3.0 * w * bg;
        assert!(expected > 0.0);
        assert!((tendency.at((3, 9))[Variable::ZMomentum.index()] - expected).abs() < 1e-14);
        assert_eq!(tendency.at((30, 60))[Variable::ZMomentum.index()], 0.0);
    }
}
