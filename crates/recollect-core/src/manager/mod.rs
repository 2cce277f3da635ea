//! Memory manager: the engine's public entry point.

mod memory_manager;
mod stats;

pub use memory_manager::MemoryManager;
pub use stats::MemoryStats;
