//! Renders ranked memories as prompt-appendable text.

use serde::{Deserialize, Serialize};

use crate::config::InjectionConfig;
use crate::types::{Category, Memory};

/// Opening line of every injected block.
pub const PREAMBLE: &str = "Context from your previous conversations:";

/// Closing line of every injected block.
pub const POSTAMBLE: &str =
    "Please use this context to give a more personalized and relevant response.";

/// Marker appended to a truncated body.
pub const ELLIPSIS: &str = "...";

/// Default cap on the rendered length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    /// Append `(type)` to each line in flat mode.
    pub include_metadata: bool,
    /// Group lines under uppercase category headers.
    pub group_by_category: bool,
    /// Hard cap on the output length, in characters.
    pub max_length: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_metadata: false,
            group_by_category: false,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl From<&InjectionConfig> for FormatOptions {
    fn from(config: &InjectionConfig) -> Self {
        Self {
            include_metadata: config.include_metadata,
            group_by_category: config.group_by_category,
            max_length: config.max_length,
        }
    }
}

/// Render memories into a context block.
///
/// Returns an empty string for no memories. The result never exceeds
/// `options.max_length` characters; an over-long body is cut and marked with
/// [`ELLIPSIS`] while the postamble is kept. If the cap cannot even hold the
/// preamble and postamble, the whole block is cut at the cap.
pub fn format_memories(memories: &[Memory], options: &FormatOptions) -> String {
    if memories.is_empty() {
        return String::new();
    }

    let body = if options.group_by_category {
        grouped_body(memories)
    } else {
        flat_body(memories, options.include_metadata)
    };

    let head = format!("{}\n", PREAMBLE);
    let tail = format!("\n\n{}", POSTAMBLE);
    let frame_len = head.chars().count() + tail.chars().count();
    let body_len = body.chars().count();

    if frame_len + body_len <= options.max_length {
        return format!("{}{}{}", head, body, tail);
    }

    let ellipsis_len = ELLIPSIS.chars().count();
    match options.max_length.checked_sub(frame_len + ellipsis_len) {
        Some(budget) => {
            let cut: String = body.chars().take(budget).collect();
            format!("{}{}{}{}", head, cut.trim_end(), ELLIPSIS, tail)
        }
        None => format!("{}{}{}", head, body, tail)
            .chars()
            .take(options.max_length)
            .collect(),
    }
}

fn flat_body(memories: &[Memory], include_metadata: bool) -> String {
    memories
        .iter()
        .map(|m| {
            let memory_type = m.metadata.memory_type;
            if include_metadata && !memory_type.is_general() {
                format!("- {} ({})", m.content, memory_type)
            } else {
                format!("- {}", m.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn grouped_body(memories: &[Memory]) -> String {
    let mut groups: Vec<(Category, Vec<&str>)> = Vec::new();
    for memory in memories {
        let category = memory.category();
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, lines)) => lines.push(&memory.content),
            None => groups.push((category, vec![&memory.content])),
        }
    }

    groups
        .into_iter()
        .map(|(category, lines)| {
            let mut section = format!("{}:", category.as_str().to_uppercase());
            for line in lines {
                section.push_str("\n- ");
                section.push_str(line);
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n")
}
