use crate::hydro::geometry::Direction;

/// One of the two state buffers owned by a partition.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Buffer {
    /// The authoritative state, holding `q[n]` at the start of every outer
    /// step and `q[n + 1]` at the end.
    State,
    /// The scratch buffer for the intermediate stages.
    Scratch,
}

/// Describes one Runge-Kutta stage: which buffer the right-hand side is
/// evaluated on, which buffer receives `q[n] + dt / divisor * rhs`, and the
/// divisor itself. The initial buffer of every stage is `Buffer::State`.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    pub forcing: Buffer,
    pub output: Buffer,
    pub divisor: f64,
}

/**
 * The low-storage three-stage Runge-Kutta sequence,
 *
 * ```text
 * q*     = q[n] + dt / 3 * rhs(q[n])
 * q**    = q[n] + dt / 2 * rhs(q*)
 * q[n+1] = q[n] + dt / 1 * rhs(q**)
 * ```
 *
 * The rotation never writes the buffer it reads its forcing from, except in
 * the second stage where the forcing is fully consumed into the tendency
 * before the blend. The sequence ends in `Buffer::State`.
 */
pub const STAGES: [Stage; 3] = [
    Stage {
        forcing: Buffer::State,
        output: Buffer::Scratch,
        divisor: 3.0,
    },
    Stage {
        forcing: Buffer::Scratch,
        output: Buffer::Scratch,
        divisor: 2.0,
    },
    Stage {
        forcing: Buffer::Scratch,
        output: Buffer::State,
        divisor: 1.0,
    },
];

/// A system that can be advanced by one semi-discrete stage in a single
/// direction. Implementations exchange the ghost cells of the stage's
/// forcing buffer along `direction`, evaluate the tendency there, and write
/// `output = state + dt * tendency` over the interior.
///
pub trait SemiDiscrete {
    fn semi_discrete_step(&mut self, direction: Direction, stage: &Stage, dt: f64);
}

/// Drives the dimensionally split update. Each outer step applies the full
/// three-stage sequence in one direction and then the other, alternating
/// which direction leads on successive steps.
///
#[derive(Clone, Debug)]
pub struct TimeIntegrator {
    x_first: bool,
}

impl Default for TimeIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeIntegrator {
    pub fn new() -> Self {
        Self { x_first: true }
    }

    /// The direction order the next outer step will use.
    ///
    pub fn direction_order(&self) -> [Direction; 2] {
        let lead = if self.x_first { Direction::X } else { Direction::Z };
        [lead, lead.other()]
    }

    pub fn perform_timestep<S: SemiDiscrete>(&mut self, system: &mut S, dt: f64) {
        for direction in self.direction_order() {
            for stage in &STAGES {
                system.semi_discrete_step(direction, stage, dt / stage.divisor);
            }
        }
        self.x_first = !self.x_first;
    }
}
