use std::error;
use std::fmt;

/// Errors detected at startup (configuration) or raised by the output
/// collaborator. The numerical core has no recoverable error path.
///
#[derive(Debug)]
pub enum Error {
    NonPositiveGridSize { nx: i64, nz: i64 },
    InvalidInitialCondition(String),
    InvalidPartitionCount { num_partitions: usize, nx_glob: i64 },
    InconsistentTopology { rank: usize, reason: String },
    InvalidSimulationTime(f64),
    Output { location: String, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            NonPositiveGridSize { nx, nz } => {
                write!(fmt, "grid dimensions must be positive: {} x {}", nx, nz)
            }
            InvalidInitialCondition(name) => write!(
                fmt,
                "invalid initial condition '{}' (expected collision, thermal, gravity_waves, density_current, or injection)",
                name
            ),
            InvalidPartitionCount { num_partitions, nx_glob } => write!(
                fmt,
                "cannot split {} columns into {} partitions",
                nx_glob, num_partitions
            ),
            InconsistentTopology { rank, reason } => {
                write!(fmt, "inconsistent partition topology at rank {}: {}", rank, reason)
            }
            InvalidSimulationTime(t) => write!(fmt, "invalid simulation time: {}", t),
            Output { location, message } => write!(fmt, "output error at {}: {}", location, message),
        }
    }
}

impl error::Error for Error {}
