use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no text generator configured")]
    Unavailable,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected generator response: {0}")]
    InvalidResponse(String),
}

/// Remote text source behind the content advisor.
///
/// Implementations only produce raw text; shape checks and fallbacks happen in
/// [`super::ContentAdvisor`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`GenerationError`] for any transport or service failure.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator used when no remote service is configured. Every request fails,
/// so the advisor always serves fallback content.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGenerator;

#[async_trait]
impl TextGenerator for UnavailableGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable)
    }
}

#[async_trait]
impl<T> TextGenerator for Box<T>
where
    T: TextGenerator + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}
