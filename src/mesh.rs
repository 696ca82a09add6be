use crate::error::Error;
use crate::hydro::constants::{CFL, MAX_SPEED, XLEN, ZLEN};
use crate::state::NUM_GHOST;
use std::ops::Range;

/// A uniform rectilinear mesh over the global domain. Immutable for the
/// lifetime of a run.
///
#[derive(Clone, Debug)]
pub struct Grid {
    pub area: (Range<f64>, Range<f64>),
    pub size: (i64, i64),
}

impl Grid {
    /// Create a grid with `nx` by `nz` cells over the fixed physical domain.
    ///
    pub fn new(nx: i64, nz: i64) -> Result<Self, Error> {
        if nx <= 0 || nz <= 0 {
            return Err(Error::NonPositiveGridSize { nx, nz });
        }
        Ok(Self {
            area: (0.0..XLEN, 0.0..ZLEN),
            size: (nx, nz),
        })
    }

    pub fn nx(&self) -> i64 {
        self.size.0
    }

    pub fn nz(&self) -> i64 {
        self.size.1
    }

    pub fn xlen(&self) -> f64 {
        self.area.0.end - self.area.0.start
    }

    pub fn zlen(&self) -> f64 {
        self.area.1.end - self.area.1.start
    }

    pub fn cell_spacing(&self) -> (f64, f64) {
        let dx = self.xlen() / self.size.0 as f64;
        let dz = self.zlen() / self.size.1 as f64;
        (dx, dz)
    }

    /// Physical coordinate of a cell center, given its global `(i, k)`
    /// index. Indexes outside the domain (ghost cells) are allowed.
    ///
    pub fn cell_center(&self, index: (i64, i64)) -> (f64, f64) {
        let (dx, dz) = self.cell_spacing();
        let x = self.area.0.start + dx * (index.0 as f64 + 0.5);
        let z = self.area.1.start + dz * (index.1 as f64 + 0.5);
        (x, z)
    }

    /// Height of the horizontal interface below row `k`.
    ///
    pub fn interface_height(&self, k: i64) -> f64 {
        self.area.1.start + self.cell_spacing().1 * k as f64
    }

    pub fn cell_area(&self) -> f64 {
        let (dx, dz) = self.cell_spacing();
        dx * dz
    }

    /// Largest stable time step for the assumed maximum wave speed.
    ///
    pub fn time_step(&self) -> f64 {
        let (dx, dz) = self.cell_spacing();
        dx.min(dz) / MAX_SPEED * CFL
    }

    pub fn total_zones(&self) -> i64 {
        self.size.0 * self.size.1
    }
}

/// The slice of the global grid owned by one partition, together with the
/// ranks of its neighbors in the periodic x-direction.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subdomain {
    pub rank: usize,
    pub left: usize,
    pub right: usize,
    pub i_beg: i64,
    pub k_beg: i64,
    pub nx: i64,
    pub nz: i64,
}

impl Subdomain {
    pub fn is_leftmost(&self) -> bool {
        self.i_beg == 0
    }
}

/// A fixed 1-D decomposition of the grid along x. The vertical axis is
/// never decomposed.
///
#[derive(Clone, Debug)]
pub struct Topology {
    subdomains: Vec<Subdomain>,
}

impl Topology {
    /// Split the grid into `num_partitions` contiguous column blocks with
    /// periodic neighbor wiring.
    ///
    pub fn new(grid: &Grid, num_partitions: usize) -> Result<Self, Error> {
        let n = num_partitions as i64;
        if num_partitions == 0 || grid.nx() < n * NUM_GHOST {
            return Err(Error::InvalidPartitionCount {
                num_partitions,
                nx_glob: grid.nx(),
            });
        }
        let subdomains = (0..num_partitions)
            .map(|rank| {
                let r = rank as i64;
                let i_beg = grid.nx() * r / n;
                let i_end = grid.nx() * (r + 1) / n;
                Subdomain {
                    rank,
                    left: (rank + num_partitions - 1) % num_partitions,
                    right: (rank + 1) % num_partitions,
                    i_beg,
                    k_beg: 0,
                    nx: i_end - i_beg,
                    nz: grid.nz(),
                }
            })
            .collect();
        Self::from_subdomains(grid, subdomains)
    }

    /// Accept an externally supplied decomposition, checking that it tiles
    /// the grid and that neighbor assignments are mutual.
    ///
    pub fn from_subdomains(grid: &Grid, subdomains: Vec<Subdomain>) -> Result<Self, Error> {
        let p = subdomains.len();

        if p == 0 {
            return Err(Error::InvalidPartitionCount {
                num_partitions: 0,
                nx_glob: grid.nx(),
            });
        }

        let inconsistent = |rank, reason: &str| {
            Err(Error::InconsistentTopology {
                rank,
                reason: reason.to_string(),
            })
        };

        for (n, s) in subdomains.iter().enumerate() {
            if s.rank != n {
                return inconsistent(n, "ranks must be listed in order");
            }
            if s.left >= p || s.right >= p {
                return inconsistent(n, "neighbor rank is outside the group");
            }
            if subdomains[s.right].left != n || subdomains[s.left].right != n {
                return inconsistent(n, "neighbor assignment is not mutual");
            }
            if s.nx < NUM_GHOST || s.nz != grid.nz() || s.k_beg != 0 {
                return inconsistent(n, "partition extent is too small or decomposes the vertical");
            }
            if (s.i_beg + s.nx) % grid.nx() != subdomains[s.right].i_beg {
                return inconsistent(n, "right neighbor does not start where this partition ends");
            }
        }

        let total: i64 = subdomains.iter().map(|s| s.nx).sum();

        if total != grid.nx() {
            return inconsistent(0, "partition widths do not sum to the global cell count");
        }
        if subdomains.iter().filter(|s| s.is_leftmost()).count() != 1 {
            return inconsistent(0, "exactly one partition must start at the left domain edge");
        }
        Ok(Self { subdomains })
    }

    pub fn len(&self) -> usize {
        self.subdomains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty()
    }

    pub fn subdomain(&self, rank: usize) -> &Subdomain {
        &self.subdomains[rank]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subdomain> {
        self.subdomains.iter()
    }
}
