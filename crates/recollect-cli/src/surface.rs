//! Terminal prompt surface.

use std::sync::Mutex;

use async_trait::async_trait;
use recollect_core::{PromptSurface, RecollectError, RecollectResult};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Prompt held in memory for the terminal: read once from stdin or an
/// argument, rewritten by the engine, then printed.
pub struct StdioSurface {
    platform: String,
    input: Mutex<String>,
}

impl StdioSurface {
    /// Surface over a prompt that is already known.
    pub fn new(platform: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            input: Mutex::new(input.into()),
        }
    }

    /// Surface over everything readable from `reader`.
    pub async fn from_reader<R>(platform: impl Into<String>, mut reader: R) -> RecollectResult<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut input = String::new();
        reader.read_to_string(&mut input).await?;
        Ok(Self::new(platform, input.trim_end()))
    }

    /// Current prompt text.
    pub fn current(&self) -> RecollectResult<String> {
        self.input
            .lock()
            .map(|input| input.clone())
            .map_err(|_| RecollectError::Internal("prompt lock poisoned".to_string()))
    }
}

#[async_trait]
impl PromptSurface for StdioSurface {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn get_input(&self) -> RecollectResult<String> {
        self.current()
    }

    async fn set_input(&self, text: &str) -> RecollectResult<()> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| RecollectError::Internal("prompt lock poisoned".to_string()))?;
        *input = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_from_reader_trims_trailing_newline() {
        let surface = StdioSurface::from_reader("cli", Cursor::new("tell me a joke\n"))
            .await
            .unwrap();
        assert_eq!(surface.get_input().await.unwrap(), "tell me a joke");
        assert_eq!(surface.platform(), "cli");
    }

    #[tokio::test]
    async fn test_set_input_replaces_prompt() {
        let surface = StdioSurface::new("cli", "before");
        surface.set_input("after").await.unwrap();
        assert_eq!(surface.current().unwrap(), "after");
        assert!(!surface.inject_button().await.unwrap());
    }
}
