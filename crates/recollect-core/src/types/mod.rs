//! Core types for recollect.

mod category;
mod fact;
mod memory;
mod search;

pub use category::Category;
pub use fact::Fact;
pub use memory::*;
pub use search::*;
