//! Reference store implementation and shared scoring.

mod lexical;
mod memory;

pub use lexical::{lexical_score, query_terms, rank_lexically};
pub use memory::InMemoryStore;
