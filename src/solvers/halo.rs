use crate::context::Context;
use crate::mesh::Subdomain;
use crate::state::{State, Variable, NUM_GHOST};

/// Which ghost margin along x a block of boundary data is destined for.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Boundary columns in transit between two neighboring partitions. The
/// buffer is owned and moves to the recipient; `side` names the recipient's
/// ghost margin that it fills.
///
#[derive(Clone, Debug)]
pub struct HaloMessage {
    pub side: Side,
    pub data: Vec<f64>,
}

/// Copy `NUM_GHOST` interior columns starting at column `i0` into a flat
/// buffer, ordered by variable, then row, then column.
///
fn pack_columns(state: &State, i0: i64) -> Vec<f64> {
    let (nz, _) = state.dim();
    let mut data = Vec::with_capacity(Variable::ALL.len() * (nz * NUM_GHOST) as usize);

    for v in Variable::ALL {
        for k in 0..nz {
            for g in 0..NUM_GHOST {
                data.push(state.get(v, (k, i0 + g)));
            }
        }
    }
    data
}

/// Return the messages a partition sends along x: its leftmost interior
/// columns fill the right ghosts of its left neighbor, and its rightmost
/// interior columns fill the left ghosts of its right neighbor.
///
pub fn outgoing_x(state: &State, subdomain: &Subdomain) -> [(usize, HaloMessage); 2] {
    let (_, nx) = state.dim();
    [
        (
            subdomain.left,
            HaloMessage {
                side: Side::Right,
                data: pack_columns(state, 0),
            },
        ),
        (
            subdomain.right,
            HaloMessage {
                side: Side::Left,
                data: pack_columns(state, nx - NUM_GHOST),
            },
        ),
    ]
}

/// Write a received block of boundary columns into a ghost margin.
///
pub fn unpack_x(state: &mut State, message: &HaloMessage) {
    let (nz, nx) = state.dim();
    let i0 = match message.side {
        Side::Left => -NUM_GHOST,
        Side::Right => nx,
    };
    assert_eq!(
        message.data.len(),
        Variable::ALL.len() * (nz * NUM_GHOST) as usize,
        "halo message does not match the partition shape"
    );
    let mut values = message.data.iter();

    for v in Variable::ALL {
        for k in 0..nz {
            for g in 0..NUM_GHOST {
                if let Some(&x) = values.next() {
                    state.set(v, (k, i0 + g), x);
                }
            }
        }
    }
}

/// Cold-air inflow at the left domain edge. Within the injection band, the
/// left ghost columns of the leftmost partition are overwritten with the
/// prescribed wind and potential temperature, overriding the periodic
/// copy. Does nothing for other initial conditions or other partitions.
///
pub fn apply_inflow(state: &mut State, context: &Context, subdomain: &Subdomain) {
    if !subdomain.is_leftmost() {
        return;
    }
    let (nz, _) = state.dim();
    let background = &context.background;

    for k in 0..nz {
        let z = context.grid.cell_center((0, subdomain.k_beg + k)).1;

        if let Some((u, theta)) = context.initial_condition.inflow(z) {
            for i in -NUM_GHOST..0 {
                let r = state.get(Variable::Density, (k, i)) + background.dens_cell(k);
                state.set(Variable::XMomentum, (k, i), r * u);
                state.set(Variable::DensityTheta, (k, i), r * theta - background.dens_theta_cell(k));
            }
        }
    }
}

/// Periodic exchange along x for a partition that is its own neighbor on
/// both sides, followed by the inflow override.
///
pub fn exchange_x_local(state: &mut State, context: &Context, subdomain: &Subdomain) {
    for (_, message) in outgoing_x(state, subdomain) {
        unpack_x(state, &message);
    }
    apply_inflow(state, context, subdomain);
}

/// Reflective walls at the bottom and top of the domain. Vertical momentum
/// vanishes in the ghost rows; horizontal momentum keeps the velocity of
/// the adjacent interior row; everything else is copied from it. Every
/// column is filled, x-ghosts included.
///
pub fn exchange_z(state: &mut State, context: &Context) {
    let (nz, nx) = state.dim();
    let background = &context.background;

    for v in Variable::ALL {
        for i in -NUM_GHOST..nx + NUM_GHOST {
            for (edge, ghosts) in [(0, [-2, -1]), (nz - 1, [nz, nz + 1])] {
                let interior = state.get(v, (edge, i));

                for k in ghosts {
                    let value = match v {
                        Variable::ZMomentum => 0.0,
                        Variable::XMomentum => {
                            interior / background.dens_cell(edge) * background.dens_cell(k)
                        }
                        _ => interior,
                    };
                    state.set(v, (k, i), value);
                }
            }
        }
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::{apply_inflow, exchange_x_local, exchange_z, outgoing_x, unpack_x, Side};
    use crate::context::Context;
    use crate::hydro::initial::InitialCondition;
    use crate::mesh::{Grid, Topology};
    use crate::state::{State, Variable};

    fn scrambled(nz: i64, nx: i64) -> State {
        State::from_function(nz, nx, |(k, i)| {
            let x = ((k * 7919 + i * 104729) % 1000) as f64 * 1e-3;
            [x, 2.0 * x - 0.3, 0.5 - x, x * x]
        })
    }

    #[test]
    fn periodic_ghosts_equal_the_opposite_interior_columns() {
        let grid = Grid::new(12, 6).unwrap();
        let topology = Topology::new(&grid, 1).unwrap();
        let context = Context::new(grid, InitialCondition::Thermal);
        let mut state = scrambled(6, 12);
        exchange_x_local(&mut state, &context, topology.subdomain(0));

        for v in Variable::ALL {
            for k in 0..6 {
                assert_eq!(state.get(v, (k, -2)).to_bits(), state.get(v, (k, 10)).to_bits());
                assert_eq!(state.get(v, (k, -1)).to_bits(), state.get(v, (k, 11)).to_bits());
                assert_eq!(state.get(v, (k, 12)).to_bits(), state.get(v, (k, 0)).to_bits());
                assert_eq!(state.get(v, (k, 13)).to_bits(), state.get(v, (k, 1)).to_bits());
            }
        }
    }

    #[test]
    fn messages_carry_boundary_columns_to_the_right_neighbors() {
        let grid = Grid::new(8, 3).unwrap();
        let topology = Topology::new(&grid, 2).unwrap();
        let a = scrambled(3, 4);
        let mut b = State::zeros(3, 4);

        let [(to_left, m_left), (to_right, m_right)] = outgoing_x(&a, topology.subdomain(0));
        assert_eq!((to_left, to_right), (1, 1));
        assert_eq!((m_left.side, m_right.side), (Side::Right, Side::Left));

        unpack_x(&mut b, &m_left);
        unpack_x(&mut b, &m_right);

        for v in Variable::ALL {
            for k in 0..3 {
                assert_eq!(b.get(v, (k, 4)), a.get(v, (k, 0)));
                assert_eq!(b.get(v, (k, 5)), a.get(v, (k, 1)));
                assert_eq!(b.get(v, (k, -2)), a.get(v, (k, 2)));
                assert_eq!(b.get(v, (k, -1)), a.get(v, (k, 3)));
                assert_eq!(b.get(v, (k, 0)), 0.0);
            }
        }
    }

    #[test]
    fn exchange_is_idempotent() {
        let grid = Grid::new(10, 16).unwrap();
        let topology = Topology::new(&grid, 1).unwrap();
        let context = Context::new(grid, InitialCondition::Injection);
        let mut once = scrambled(16, 10);

        exchange_x_local(&mut once, &context, topology.subdomain(0));
        exchange_z(&mut once, &context);

        let mut twice = once.clone();
        exchange_x_local(&mut twice, &context, topology.subdomain(0));
        exchange_z(&mut twice, &context);

        assert_eq!(once.as_slice(), twice.as_slice());
    }

    #[test]
    fn vertical_momentum_vanishes_in_every_z_ghost_row() {
        let grid = Grid::new(6, 5).unwrap();
        let context = Context::new(grid, InitialCondition::Collision);
        let mut state = scrambled(5, 6);
        exchange_z(&mut state, &context);

        for i in -2..8 {
            for k in [-2, -1, 5, 6] {
                assert_eq!(state.get(Variable::ZMomentum, (k, i)), 0.0);
            }
        }
    }

    #[test]
    fn z_ghosts_preserve_horizontal_velocity_and_copy_the_rest() {
        let grid = Grid::new(6, 5).unwrap();
        let context = Context::new(grid, InitialCondition::Thermal);
        let bg = &context.background;
        let mut state = scrambled(5, 6);
        exchange_z(&mut state, &context);

        for i in 0..6 {
            let u0 = state.get(Variable::XMomentum, (0, i)) / bg.dens_cell(0);
            let ug = state.get(Variable::XMomentum, (-2, i)) / bg.dens_cell(-2);
            assert!((u0 - ug).abs() <= 1e-14 * u0.abs().max(1.0));
            assert_eq!(state.get(Variable::Density, (6, i)), state.get(Variable::Density, (4, i)));
            assert_eq!(
                state.get(Variable::DensityTheta, (-1, i)),
                state.get(Variable::DensityTheta, (0, i))
            );
        }
    }

    #[test]
    fn inflow_overrides_only_the_injection_band_of_the_leftmost_partition() {
        let grid = Grid::new(16, 32).unwrap();
        let topology = Topology::new(&grid, 2).unwrap();
        let context = Context::new(grid, InitialCondition::Injection);
        let bg = &context.background;

        let mut left = State::zeros(32, 8);
        let mut right = State::zeros(32, 8);
        apply_inflow(&mut left, &context, topology.subdomain(0));
        apply_inflow(&mut right, &context, topology.subdomain(1));

        // Row centers at (k + 0.5) * 312.5 m; the band is 6875 m to 8125 m.
        for k in 0..32 {
            let z = (k as f64 + 0.5) * 312.5;
            let in_band = (z - 7500.0).abs() <= 625.0;
            let u = left.get(Variable::XMomentum, (k, -1));

            if in_band {
                assert!((u - bg.dens_cell(k) * 50.0).abs() < 1e-12);
                let t = left.get(Variable::DensityTheta, (k, -2));
                assert!((t - (bg.dens_cell(k) * 298.0 - bg.dens_theta_cell(k))).abs() < 1e-9);
            } else {
                assert_eq!(u, 0.0);
            }
            assert_eq!(left.get(Variable::XMomentum, (k, 0)), 0.0);
            assert_eq!(right.get(Variable::XMomentum, (k, -1)), 0.0);
        }
    }

    #[test]
    fn other_initial_conditions_have_no_inflow() {
        let grid = Grid::new(16, 32).unwrap();
        let topology = Topology::new(&grid, 1).unwrap();
        let context = Context::new(grid, InitialCondition::DensityCurrent);
        let mut state = State::zeros(32, 16);
        apply_inflow(&mut state, &context, topology.subdomain(0));
        assert!(state.as_slice().iter().all(|x| *x == 0.0));
    }
}
