//! Environment Synchronizer (spec §4.4): drives Synchronize/Unsynchronize/
//! Destroy, composing Engine Adapter calls.

mod command;
mod error;
mod image;
mod mounts;
mod sync;

pub use command::synthesize_command;
pub use error::SynchronizeError;
pub use image::{resolve_image, ResolvedImage};
pub use sync::Synchronizer;
