//! Canned responses used when no API key is available.

use std::time::Duration;

use tracing::info;

use super::{CompleteCallback, GeneratedText, TokenCallback};

const DEFAULT_RESPONSE: &str = "I'm operating in mock mode. To use real AI features, please add your Gemini API key in Settings. This is a simulated response for demonstration purposes.";
const RECOMMENDATION_RESPONSE: &str = "Based on your genetic profile, I recommend consulting with a healthcare provider about these findings. Remember, genetic information is just one factor in your overall health picture.";
const EXPLAIN_RESPONSE: &str = "This genetic marker indicates how your body metabolizes certain medications. The specific variant you carry may affect drug efficacy or side effects. Always consult with your doctor before making medication changes.";
const LIFESTYLE_RESPONSE: &str = "Consider incorporating these evidence-based lifestyle modifications: 1) Regular cardiovascular exercise 3-5x per week, 2) Mediterranean diet pattern, 3) Stress management through mindfulness, 4) Quality sleep 7-9 hours nightly.";

/// Offline stand-in for the generation API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockResponder {
    /// Pause between streamed words
    pub token_delay: Duration,
    /// Simulated latency for a single-shot response
    pub latency: Duration,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self {
            token_delay: Duration::from_millis(50),
            latency: Duration::from_millis(500),
        }
    }
}

impl MockResponder {
    /// No artificial delays.
    pub fn instant() -> Self {
        Self {
            token_delay: Duration::ZERO,
            latency: Duration::ZERO,
        }
    }

    /// Pick a canned response by keyword. The first matching keyword wins.
    pub fn select_response(prompt: &str) -> &'static str {
        let lower = prompt.to_lowercase();
        if lower.contains("recommend") {
            RECOMMENDATION_RESPONSE
        } else if lower.contains("explain") || lower.contains("what") {
            EXPLAIN_RESPONSE
        } else if lower.contains("lifestyle") || lower.contains("plan") {
            LIFESTYLE_RESPONSE
        } else {
            DEFAULT_RESPONSE
        }
    }

    /// Answer `prompt`, streaming word by word when a token callback is given.
    pub async fn respond(
        &self,
        prompt: &str,
        on_token: Option<TokenCallback<'_>>,
        on_complete: Option<CompleteCallback<'_>>,
    ) -> GeneratedText {
        info!("Using mock mode for text generation");
        let text = Self::select_response(prompt);

        match on_token {
            Some(mut on_token) => {
                for (i, word) in text.split(' ').enumerate() {
                    if !self.token_delay.is_zero() {
                        tokio::time::sleep(self.token_delay).await;
                    }
                    if i == 0 {
                        on_token(word);
                    } else {
                        on_token(&format!(" {}", word));
                    }
                }
            }
            None => {
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }
            }
        }

        if let Some(on_complete) = on_complete {
            on_complete(text);
        }

        GeneratedText {
            text: text.to_string(),
            finish_reason: None,
            mock: true,
        }
    }
}
