use crate::error::Error;
use crate::hydro::initial::InitialCondition;
use crate::mesh::{Grid, Topology};

/**
 * Run parameters, fixed for the lifetime of a simulation and validated once
 * at startup. A negative `output_freq` disables output entirely.
 */
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub nx_glob: i64,
    pub nz_glob: i64,
    pub sim_time: f64,
    pub output_freq: f64,
    pub initial_condition: InitialCondition,
    pub num_partitions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nx_glob: 100,
            nz_glob: 50,
            sim_time: 1000.0,
            output_freq: 10.0,
            initial_condition: InitialCondition::Thermal,
            num_partitions: 1,
        }
    }
}

impl Config {
    /// Check every parameter and build the grid and decomposition they
    /// describe.
    ///
    pub fn validate(&self) -> Result<(Grid, Topology), Error> {
        if !self.sim_time.is_finite() || self.sim_time < 0.0 {
            return Err(Error::InvalidSimulationTime(self.sim_time));
        }
        let grid = Grid::new(self.nx_glob, self.nz_glob)?;
        let topology = Topology::new(&grid, self.num_partitions)?;
        Ok((grid, topology))
    }

    pub fn output_enabled(&self) -> bool {
        self.output_freq >= 0.0
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::Config;
    use crate::error::Error;

    #[test]
    fn default_config_is_valid() {
        let (grid, topology) = Config::default().validate().unwrap();
        assert_eq!(grid.size, (100, 50));
        assert_eq!(topology.len(), 1);
    }

    #[test]
    fn bad_parameters_are_rejected_at_startup() {
        let config = Config {
            sim_time: f64::NAN,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidSimulationTime(_))));

        let config = Config {
            nz_glob: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::NonPositiveGridSize { .. })));

        let config = Config {
            num_partitions: 51,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidPartitionCount { .. })));
    }

    #[test]
    fn negative_output_frequency_disables_output() {
        let config = Config {
            output_freq: -1.0,
            ..Config::default()
        };
        assert!(!config.output_enabled());
        assert!(Config::default().output_enabled());
    }
}
