use super::diagnostics::Totals;
use super::halo::{self, HaloMessage};
use super::integrator::{Buffer, Stage};
use super::tendency::Tendency;
use crate::context::Context;
use crate::hydro::geometry::Direction;
use crate::mesh::Subdomain;
use crate::output::Snapshot;
use crate::state::{State, Variable, NUM_GHOST};
use rayon::prelude::*;
use std::sync::Arc;

/**
 * One share-nothing piece of the decomposed domain. A partition exclusively
 * owns its authoritative state, the scratch buffer for intermediate
 * Runge-Kutta stages, and its transient flux and tendency buffers. The
 * only data it ever receives from peers is boundary columns, by value.
 */
#[derive(Clone, Debug)]
pub struct Partition {
    context: Arc<Context>,
    subdomain: Subdomain,
    state: State,
    scratch: State,
    tendency: Tendency,
}

impl Partition {
    /// Build a partition holding the initial condition integrated over its
    /// cells. The scratch buffer starts as a copy of the state.
    ///
    pub fn new(context: Arc<Context>, subdomain: Subdomain) -> Self {
        let state = context
            .initial_condition
            .initial_state(&context.grid, &subdomain);
        Self {
            scratch: state.clone(),
            tendency: Tendency::new(subdomain.nz, subdomain.nx),
            context,
            subdomain,
            state,
        }
    }

    pub fn rank(&self) -> usize {
        self.subdomain.rank
    }

    pub fn subdomain(&self) -> &Subdomain {
        &self.subdomain
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn buffer(&self, buffer: Buffer) -> &State {
        match buffer {
            Buffer::State => &self.state,
            Buffer::Scratch => &self.scratch,
        }
    }

    fn buffer_mut(&mut self, buffer: Buffer) -> &mut State {
        match buffer {
            Buffer::State => &mut self.state,
            Buffer::Scratch => &mut self.scratch,
        }
    }

    /// Boundary columns of `buffer` addressed to the x-neighbors.
    ///
    pub fn outgoing_x(&self, buffer: Buffer) -> [(usize, HaloMessage); 2] {
        halo::outgoing_x(self.buffer(buffer), &self.subdomain)
    }

    /// Fill one x ghost margin of `buffer` with columns from a neighbor.
    ///
    pub fn receive_x(&mut self, buffer: Buffer, message: &HaloMessage) {
        halo::unpack_x(self.buffer_mut(buffer), message)
    }

    /// Apply the inflow override to `buffer`, once both x ghost margins are
    /// up to date.
    ///
    pub fn apply_inflow(&mut self, buffer: Buffer) {
        let context = self.context.clone();
        let subdomain = self.subdomain.clone();
        halo::apply_inflow(self.buffer_mut(buffer), &context, &subdomain)
    }

    /// The x exchange when this partition is alone, and so its own
    /// neighbor on both sides.
    ///
    pub fn exchange_x_local(&mut self, buffer: Buffer) {
        let context = self.context.clone();
        let subdomain = self.subdomain.clone();
        halo::exchange_x_local(self.buffer_mut(buffer), &context, &subdomain)
    }

    pub fn exchange_z(&mut self, buffer: Buffer) {
        let context = self.context.clone();
        halo::exchange_z(self.buffer_mut(buffer), &context)
    }

    /// Evaluate the tendency on the stage's forcing buffer, whose ghost
    /// cells must already be exchanged along `direction`, and blend it into
    /// the output buffer.
    ///
    pub fn advance_stage(&mut self, direction: Direction, stage: &Stage, dt: f64) {
        let Self {
            context,
            subdomain,
            state,
            scratch,
            tendency,
        } = self;

        let forcing = match stage.forcing {
            Buffer::State => &*state,
            Buffer::Scratch => &*scratch,
        };
        tendency.compute(forcing, &**context, &*subdomain, direction, dt);

        let (nz, nx) = state.dim();
        let tend = tendency.values();
        let h = NUM_GHOST as usize;

        match stage.output {
            Buffer::State => state.rows_mut().par_bridge().for_each(|(v, k, row)| {
                if (0..nz).contains(&k) {
                    let t = &tend[(k * nx) as usize..((k + 1) * nx) as usize];
                    for (q, t) in row[h..h + nx as usize].iter_mut().zip(t) {
                        *q += dt * t[v.index()];
                    }
                }
            }),
            Buffer::Scratch => {
                let init = &*state;
                scratch.rows_mut().par_bridge().for_each(|(v, k, row)| {
                    if (0..nz).contains(&k) {
                        let t = &tend[(k * nx) as usize..((k + 1) * nx) as usize];
                        for (i, (q, t)) in row[h..h + nx as usize].iter_mut().zip(t).enumerate() {
                            *q = init.get(v, (k, i as i64)) + dt * t[v.index()];
                        }
                    }
                })
            }
        }
    }

    pub fn totals(&self) -> Totals {
        Totals::of_state(&self.state, &self.context)
    }

    /// Write this partition's interior, reconstructed for output, into the
    /// matching block of a global snapshot.
    ///
    pub fn fill_snapshot(&self, snapshot: &mut Snapshot) {
        let (nz, nx) = self.state.dim();
        let background = &self.context.background;

        for k in 0..nz {
            let hr = background.dens_cell(k);
            let ht = background.dens_theta_cell(k);

            for i in 0..nx {
                let n = ((self.subdomain.k_beg + k) * snapshot.nx + self.subdomain.i_beg + i) as usize;
                let r = self.state.get(Variable::Density, (k, i));
                let ru = self.state.get(Variable::XMomentum, (k, i));
                let rw = self.state.get(Variable::ZMomentum, (k, i));
                let rt = self.state.get(Variable::DensityTheta, (k, i));
                snapshot.dens[n] = r;
                snapshot.uwnd[n] = ru / (hr + r);
                snapshot.wwnd[n] = rw / (hr + r);
                snapshot.theta[n] = (rt + ht) / (hr + r) - ht / hr;
            }
        }
    }
}
