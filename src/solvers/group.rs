use super::diagnostics::Totals;
use super::halo::HaloMessage;
use super::integrator::{SemiDiscrete, Stage};
use super::partition::Partition;
use crate::context::Context;
use crate::exchange::{self, Automaton, Status};
use crate::hydro::geometry::{BoundaryPolicy, Direction};
use crate::mesh::Topology;
use crate::output::Snapshot;
use rayon::prelude::*;
use std::sync::Arc;

/// One partition's x stage as a member of an exchange group. It sends its
/// boundary columns of the forcing buffer to both neighbors, waits for
/// theirs, and then computes the stage.
///
struct XStage {
    partition: Partition,
    stage: Stage,
    dt: f64,
    received: Vec<HaloMessage>,
}

impl Automaton for XStage {
    type Message = HaloMessage;
    type Value = Partition;

    fn rank(&self) -> usize {
        self.partition.rank()
    }

    fn messages(&self) -> Vec<(usize, Self::Message)> {
        self.partition.outgoing_x(self.stage.forcing).into_iter().collect()
    }

    fn receive(&mut self, message: Self::Message) -> Status {
        self.received.push(message);
        Status::eligible_if(self.received.len() == 2)
    }

    fn value(self) -> Self::Value {
        let Self {
            mut partition,
            stage,
            dt,
            received,
        } = self;

        for message in &received {
            partition.receive_x(stage.forcing, message);
        }
        partition.apply_inflow(stage.forcing);
        partition.advance_stage(Direction::X, &stage, dt);
        partition
    }
}

/**
 * All partitions of a run. Drives the semi-discrete stages across the
 * decomposition: x stages exchange boundary columns between neighbors
 * through the message-passing executor, z stages need no communication and
 * run independently per partition.
 */
pub struct PartitionGroup {
    context: Arc<Context>,
    partitions: Vec<Partition>,
}

impl PartitionGroup {
    pub fn new(context: Arc<Context>, topology: &Topology) -> Self {
        let partitions = topology
            .iter()
            .map(|subdomain| Partition::new(context.clone(), subdomain.clone()))
            .collect();
        Self {
            context,
            partitions,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Global mass and energy, reduced over partitions in rank order.
    ///
    pub fn totals(&self) -> Totals {
        let parts: Vec<_> = self.partitions.par_iter().map(Partition::totals).collect();
        Totals::reduce(parts)
    }

    /// Assemble the global output snapshot from every partition.
    ///
    pub fn snapshot(&self, iteration: u64, time: f64) -> Snapshot {
        let grid = &self.context.grid;
        let mut snapshot = Snapshot::new(iteration, time, grid.nx(), grid.nz());

        for partition in &self.partitions {
            partition.fill_snapshot(&mut snapshot);
        }
        snapshot
    }

    fn x_stage(&mut self, stage: &Stage, dt: f64) {
        if let [partition] = self.partitions.as_mut_slice() {
            partition.exchange_x_local(stage.forcing);
            partition.advance_stage(Direction::X, stage, dt);
            return;
        }

        let group: Vec<_> = std::mem::take(&mut self.partitions)
            .into_iter()
            .map(|partition| XStage {
                partition,
                stage: *stage,
                dt,
                received: Vec::with_capacity(2),
            })
            .collect();

        let mut partitions = exchange::execute_auto(group);
        partitions.sort_by_key(Partition::rank);
        self.partitions = partitions;
    }

    fn z_stage(&mut self, stage: &Stage, dt: f64) {
        self.partitions.par_iter_mut().for_each(|partition| {
            partition.exchange_z(stage.forcing);
            partition.advance_stage(Direction::Z, stage, dt);
        });
    }
}

impl SemiDiscrete for PartitionGroup {
    fn semi_discrete_step(&mut self, direction: Direction, stage: &Stage, dt: f64) {
        match direction.boundary_policy() {
            BoundaryPolicy::Periodic => self.x_stage(stage, dt),
            BoundaryPolicy::Reflective => self.z_stage(stage, dt),
        }
    }
}
