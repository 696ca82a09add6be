use crate::index_space::IndexSpace;

/// Width of the ghost margin on every side of a partition. Equal to the
/// half-width of the four-point reconstruction stencil.
pub const NUM_GHOST: i64 = 2;

/// Number of prognostic fields carried per cell.
pub const NUM_VARS: usize = 4;

/// Identifier for one of the prognostic fields. Every field is stored as a
/// perturbation from the hydrostatic background.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variable {
    Density,
    XMomentum,
    ZMomentum,
    DensityTheta,
}

impl Variable {
    pub const ALL: [Variable; NUM_VARS] = [
        Variable::Density,
        Variable::XMomentum,
        Variable::ZMomentum,
        Variable::DensityTheta,
    ];

    pub fn index(self) -> usize {
        match self {
            Variable::Density => 0,
            Variable::XMomentum => 1,
            Variable::ZMomentum => 2,
            Variable::DensityTheta => 3,
        }
    }
}

/**
 * The fluid state of one partition: a dense array logically indexed by
 * (variable, row, column). Each variable occupies a contiguous plane laid
 * out row-major over the interior index space extended by `NUM_GHOST` cells
 * on every side. All offset arithmetic goes through `State::offset`.
 */
#[derive(Clone, Debug)]
pub struct State {
    interior: IndexSpace,
    extended: IndexSpace,
    data: Vec<f64>,
}

impl State {
    /// Allocate a zero-filled state for `nz` rows and `nx` columns of
    /// interior cells.
    ///
    pub fn zeros(nz: i64, nx: i64) -> Self {
        let interior = IndexSpace::new(0..nz, 0..nx);
        let extended = interior.extend_all(NUM_GHOST);
        let data = vec![0.0; extended.len() * NUM_VARS];
        Self {
            interior,
            extended,
            data,
        }
    }

    /// Generate a state whose every cell (ghosts included) is assigned from
    /// a closure of the `(row, column)` index.
    ///
    pub fn from_function<F>(nz: i64, nx: i64, f: F) -> Self
    where
        F: Fn((i64, i64)) -> [f64; NUM_VARS],
    {
        let mut state = Self::zeros(nz, nx);
        for index in state.extended.clone().iter() {
            let values = f(index);
            for v in Variable::ALL {
                state.set(v, index, values[v.index()]);
            }
        }
        state
    }

    /// Return the interior extent as `(nz, nx)`.
    ///
    pub fn dim(&self) -> (i64, i64) {
        let (nz, nx) = self.interior.dim();
        (nz as i64, nx as i64)
    }

    /// Number of values in one extended row, the stride between
    /// vertically adjacent cells.
    ///
    pub fn row_stride(&self) -> usize {
        self.extended.dim().1
    }

    /// Number of values in one variable plane.
    ///
    pub fn plane_len(&self) -> usize {
        self.extended.len()
    }

    /// The single place where (variable, row, column) maps to a linear
    /// offset. Rows and columns are interior-relative, so ghost cells have
    /// indexes in `-NUM_GHOST..0` and `n..n + NUM_GHOST`.
    ///
    pub fn offset(&self, variable: Variable, index: (i64, i64)) -> usize {
        variable.index() * self.plane_len() + self.extended.row_major_offset(index)
    }

    pub fn get(&self, variable: Variable, index: (i64, i64)) -> f64 {
        self.data[self.offset(variable, index)]
    }

    pub fn set(&mut self, variable: Variable, index: (i64, i64), value: f64) {
        let n = self.offset(variable, index);
        self.data[n] = value
    }

    /// Return all four variables at one cell.
    ///
    pub fn cell(&self, index: (i64, i64)) -> [f64; NUM_VARS] {
        let n = self.extended.row_major_offset(index);
        let p = self.plane_len();
        [
            self.data[n],
            self.data[p + n],
            self.data[2 * p + n],
            self.data[3 * p + n],
        ]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterate mutably over the extended rows of every variable plane,
    /// yielding `(variable, row, row_data)`. Rows are disjoint, so this is
    /// the unit of work for parallel cell loops.
    ///
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (Variable, i64, &mut [f64])> {
        let stride = self.row_stride();
        let rows_per_plane = self.extended.dim().0;
        let k0 = self.extended.start().0;
        self.data
            .chunks_exact_mut(stride)
            .enumerate()
            .map(move |(n, row)| {
                let v = Variable::ALL[n / rows_per_plane];
                let k = (n % rows_per_plane) as i64 + k0;
                (v, k, row)
            })
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::{State, Variable, NUM_GHOST, NUM_VARS};

    #[test]
    fn state_is_sized_with_ghost_margin_and_four_variables() {
        let state = State::zeros(50, 100);
        let h = NUM_GHOST as usize;
        assert_eq!(state.as_slice().len(), (50 + 2 * h) * (100 + 2 * h) * NUM_VARS);
        assert_eq!(state.row_stride(), 104);
        assert_eq!(state.dim(), (50, 100));
    }

    #[test]
    fn offsets_are_variable_major_then_row_major() {
        let state = State::zeros(3, 5);
        let p = state.plane_len();
        assert_eq!(state.offset(Variable::Density, (-2, -2)), 0);
        assert_eq!(state.offset(Variable::Density, (0, 0)), 2 * 9 + 2);
        assert_eq!(state.offset(Variable::XMomentum, (-2, -2)), p);
        assert_eq!(state.offset(Variable::DensityTheta, (4, 6)), 4 * p - 1);
        assert_eq!(state.offset(Variable::ZMomentum, (1, 0)) - state.offset(Variable::ZMomentum, (0, 0)), 9);
    }

    #[test]
    fn cell_reads_all_variables_at_an_index() {
        let state = State::from_function(4, 4, |(k, i)| {
            let x = (10 * k + i) as f64;
            [x, x + 0.1, x + 0.2, x + 0.3]
        });
        assert_eq!(state.cell((2, 3)), [23.0, 23.1, 23.2, 23.3]);
        assert_eq!(state.get(Variable::ZMomentum, (-1, 5)), -10.0 + 5.0 + 0.2);
    }

    #[test]
    fn rows_mut_labels_every_row_with_its_variable_and_index() {
        let mut state = State::zeros(2, 3);
        for (v, k, row) in state.rows_mut() {
            for x in row.iter_mut() {
                *x = (v.index() * 100) as f64 + k as f64;
            }
        }
        assert_eq!(state.get(Variable::Density, (-2, 0)), -2.0);
        assert_eq!(state.get(Variable::XMomentum, (3, 4)), 103.0);
        assert_eq!(state.get(Variable::DensityTheta, (0, -1)), 300.0);
    }
}
