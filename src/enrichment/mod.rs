//! Optional plain-language enrichment through a text-generation service.
//!
//! The engine only sees the [`TextGenerator`] trait. [`GeminiClient`] is the
//! production implementation; without an API key it answers from canned
//! mock responses so callers never need a credential to exercise the flow.

mod gemini;
mod mock;
pub mod prompts;

use crate::error::EnrichmentError;

pub use gemini::{GeminiClient, GEMINI_API_BASE};
pub use mock::MockResponder;
pub use prompts::{build_prompt_with_context, explanation_prompt, PromptContext};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

pub type TokenCallback<'a> = Box<dyn FnMut(&str) + Send + 'a>;
pub type CompleteCallback<'a> = Box<dyn FnOnce(&str) + Send + 'a>;
pub type ErrorCallback<'a> = Box<dyn FnOnce(&EnrichmentError) + Send + 'a>;

/// Per-call options. Callbacks are consumed by the call.
#[derive(Default)]
pub struct GenerateOptions<'a> {
    /// Stream tokens as they arrive
    pub stream: bool,
    pub context: Option<&'a PromptContext>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub on_token: Option<TokenCallback<'a>>,
    pub on_complete: Option<CompleteCallback<'a>>,
    pub on_error: Option<ErrorCallback<'a>>,
}

impl<'a> GenerateOptions<'a> {
    /// Settings used for per-recommendation explanations.
    pub fn explanation() -> Self {
        Self {
            temperature: Some(prompts::EXPLANATION_TEMPERATURE),
            max_tokens: Some(prompts::EXPLANATION_MAX_TOKENS),
            ..Default::default()
        }
    }

    pub fn streaming(mut self, on_token: impl FnMut(&str) + Send + 'a) -> Self {
        self.stream = true;
        self.on_token = Some(Box::new(on_token));
        self
    }

    pub fn with_context(mut self, context: &'a PromptContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(&str) + Send + 'a) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&EnrichmentError) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// Text returned by a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    pub finish_reason: Option<String>,
    /// True when the text is a canned demo response, not a model output
    pub mock: bool,
}

/// A text-generation collaborator.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// Whether calls will reach a real (or explicitly requested mock) backend.
    ///
    /// The engine skips enrichment entirely when this is false.
    fn is_configured(&self) -> bool;

    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions<'_>,
    ) -> Result<GeneratedText, EnrichmentError>;
}
