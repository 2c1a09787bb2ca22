pub mod commands;
pub mod config;
pub mod engine;
pub mod enrichment;
mod error;
pub mod parser;
pub mod rules;
pub mod store;

pub use engine::{Recommendation, RecommendationEngine, RecommendationStatus, UserProfile};
pub use error::{EnrichmentError, FormatError, SeraError};
pub use parser::{parse_genetic_data, GeneticMarker, ParseResult};
pub use rules::{default_rules, GeneticRule, RuleTable};

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = commands::dispatch(&args) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
