/**
 * One of the two spatial directions of the split scheme. Direction-specific
 * behavior (which axis the stencil walks along, whether gravity acts, and
 * which boundary policy fills the ghost cells) is dispatched from here.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    X,
    Z,
}

/// How ghost cells are populated along a direction.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Ghosts mirror the interior of the wrap-around neighbor.
    Periodic,
    /// Solid walls: no normal flow, velocity-preserving extrapolation.
    Reflective,
}

impl Direction {
    pub fn other(self) -> Self {
        match self {
            Direction::X => Direction::Z,
            Direction::Z => Direction::X,
        }
    }

    /// Offset in `(row, column)` index space to step one cell along this
    /// direction.
    ///
    pub fn unit(self) -> (i64, i64) {
        match self {
            Direction::X => (0, 1),
            Direction::Z => (1, 0),
        }
    }

    pub fn boundary_policy(self) -> BoundaryPolicy {
        match self {
            Direction::X => BoundaryPolicy::Periodic,
            Direction::Z => BoundaryPolicy::Reflective,
        }
    }

    /// Whether the gravity source term acts on the tendency in this
    /// direction.
    ///
    pub fn has_gravity(self) -> bool {
        matches!(self, Direction::Z)
    }

    /// Return 1.0 if `other` is this direction, 0.0 otherwise.
    ///
    pub fn along(self, other: Direction) -> f64 {
        if self == other {
            1.0
        } else {
            0.0
        }
    }
}
