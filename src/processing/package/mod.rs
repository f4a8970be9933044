//! Container handling: unpack into a scratch tree, repack into a new container.

mod repack;
mod unpack;

pub use repack::repack;
pub use unpack::{ContainerManifest, create_scratch_dir, unpack};
