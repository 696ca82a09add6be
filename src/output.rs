use crate::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/**
 * A read-only picture of the global interior at one instant, reconstructed
 * from perturbation plus background. Arrays are row-major with `z` as the
 * slow index: cell `(k, i)` is element `k * nx + i`.
 */
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub iteration: u64,
    pub time: f64,
    pub nx: i64,
    pub nz: i64,
    /// Density perturbation
    pub dens: Vec<f64>,
    /// Horizontal wind
    pub uwnd: Vec<f64>,
    /// Vertical wind
    pub wwnd: Vec<f64>,
    /// Potential-temperature perturbation
    pub theta: Vec<f64>,
}

impl Snapshot {
    pub fn new(iteration: u64, time: f64, nx: i64, nz: i64) -> Self {
        let n = (nx * nz) as usize;
        Self {
            iteration,
            time,
            nx,
            nz,
            dens: vec![0.0; n],
            uwnd: vec![0.0; n],
            wwnd: vec![0.0; n],
            theta: vec![0.0; n],
        }
    }
}

/// The persisted-output collaborator. The driver decides when to call it.
///
pub trait Output {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), Error>;
}

impl Output for Vec<Snapshot> {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        self.push(snapshot.clone());
        Ok(())
    }
}

/// Appends each snapshot as one CBOR record to a single file, forming a
/// time series that can be read back with [`read_cbor`].
///
pub struct CborOutput {
    path: PathBuf,
    writer: BufWriter<File>,
    count: usize,
}

impl CborOutput {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| Error::Output {
            location: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            count: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of snapshots written so far.
    ///
    pub fn count(&self) -> usize {
        self.count
    }

    fn location(&self) -> String {
        format!("{} (snapshot {})", self.path.display(), self.count)
    }
}

impl Output for CborOutput {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        ciborium::ser::into_writer(snapshot, &mut self.writer).map_err(|e| Error::Output {
            location: self.location(),
            message: format!("{:?}", e),
        })?;
        self.writer.flush().map_err(|e| Error::Output {
            location: self.location(),
            message: e.to_string(),
        })?;
        self.count += 1;
        Ok(())
    }
}

/// Read back every snapshot from a file written by [`CborOutput`].
///
pub fn read_cbor<P: AsRef<Path>>(path: P) -> Result<Vec<Snapshot>, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::Output {
        location: path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut remaining = &bytes[..];
    let mut snapshots = Vec::new();

    while !remaining.is_empty() {
        let snapshot = ciborium::de::from_reader(&mut remaining).map_err(|e| Error::Output {
            location: format!("{} (snapshot {})", path.display(), snapshots.len()),
            message: format!("{:?}", e),
        })?;
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}
