//! Platform adapter capability.

use async_trait::async_trait;

use crate::error::RecollectResult;

/// A chat surface the engine can read prompts from and write them back to.
///
/// Each platform is a separate implementation of this trait.
#[async_trait]
pub trait PromptSurface: Send + Sync {
    /// Platform label stored on memories and used for filtering.
    fn platform(&self) -> &str;

    /// Current prompt text.
    async fn get_input(&self) -> RecollectResult<String>;

    /// Replace the prompt text.
    async fn set_input(&self, text: &str) -> RecollectResult<()>;

    /// Attach the "enhance" trigger to the surface, if it supports one.
    async fn inject_button(&self) -> RecollectResult<bool> {
        Ok(false)
    }
}
