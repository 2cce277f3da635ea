//! Context injection formatting.

mod formatter;

pub use formatter::{
    format_memories, FormatOptions, DEFAULT_MAX_LENGTH, ELLIPSIS, POSTAMBLE, PREAMBLE,
};
