use crate::hydro::background::Background;
use crate::hydro::initial::InitialCondition;
use crate::mesh::Grid;

/**
 * Everything about a run that is fixed once initialization completes: the
 * global grid, the selected initial condition (which also selects the
 * forcing terms), and the hydrostatic background. Shared read-only by every
 * partition; there is no ambient global state.
 */
#[derive(Clone, Debug)]
pub struct Context {
    pub grid: Grid,
    pub initial_condition: InitialCondition,
    pub background: Background,
}

impl Context {
    pub fn new(grid: Grid, initial_condition: InitialCondition) -> Self {
        let background = Background::new(&grid, initial_condition.profile());
        Self {
            grid,
            initial_condition,
            background,
        }
    }
}
