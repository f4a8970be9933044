//! Image recompression for the media directory of an unpacked document.
//!
//! - [`MediaExecutor`]: Walks the candidates and emits progress per image.
//! - [`formats`]: Maps each image format to its re-encoding policy.

mod executor;
pub mod formats;

pub use executor::{ImageEntry, MediaExecutor, RecompressSummary, scan_candidates};
pub use formats::{EncodePolicy, recompress};
