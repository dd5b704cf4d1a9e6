//! Job serialization.
//!
//! The compiler stops at `LaserJob`; anything that turns a job into bytes for
//! a particular controller implements [`JobEncoder`].

mod ruida;

pub use ruida::{
    RuidaEncoder, encode_color, encode_int, encode_mm, encode_percent, encode_relcoord, scramble,
    unscramble,
};

use crate::error::Result;
use crate::types::LaserJob;
use std::path::Path;
use tracing::info;

/// Serializes a finished job into a device command stream
pub trait JobEncoder {
    fn encode(&self, job: &LaserJob) -> Result<Vec<u8>>;

    /// Encode and write to `path`. An empty job produces an empty file.
    fn write_file(&self, job: &LaserJob, path: &Path) -> Result<()> {
        let bytes = self.encode(job)?;
        std::fs::write(path, &bytes)?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
