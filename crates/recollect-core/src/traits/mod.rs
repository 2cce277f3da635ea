//! Traits at the engine's collaborator seams.

mod clock;
mod memory_store;
mod surface;

pub use clock::*;
pub use memory_store::*;
pub use surface::*;
