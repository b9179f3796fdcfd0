use std::time::Duration;

use clap::Parser;
use highlight_remote::backend::{AuthMethod, DEFAULT_ENDPOINT, RestBackendConfig};
use highlight_remote::{HighlightConfig, RetryPolicy};
use highlight_spans::RecognitionOptions;

#[derive(Debug, Parser)]
#[command(name = "highlight")]
#[command(bin_name = "highlight")]
#[command(about = "Live entity highlighting for lines typed on stdin", long_about = None)]
pub struct HighlightCli {
    /// Recognition endpoint URL
    #[arg(long, env = "HIGHLIGHT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token sent with every request
    #[arg(long, env = "HIGHLIGHT_TOKEN")]
    pub token: Option<String>,

    /// Quiet period after the last input before recognition runs
    #[arg(long, default_value_t = 500)]
    pub debounce_ms: u64,

    /// Ask the service for fuzzy matches
    #[arg(long)]
    pub fuzzy: bool,

    #[arg(long, default_value_t = 0.8)]
    pub confidence_threshold: f64,

    /// Total attempts per request, including the first
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Never contact the service
    #[arg(long)]
    pub disabled: bool,
}

impl HighlightCli {
    pub fn highlight_config(&self) -> HighlightConfig {
        HighlightConfig::default()
            .with_enabled(!self.disabled)
            .with_debounce(Duration::from_millis(self.debounce_ms))
            .with_options(
                RecognitionOptions::default()
                    .with_fuzzy_matching(self.fuzzy)
                    .with_confidence_threshold(self.confidence_threshold),
            )
            .with_retry(RetryPolicy::default().with_max_attempts(self.max_retries))
    }

    pub fn backend_config(&self) -> RestBackendConfig {
        let auth = match &self.token {
            Some(token) => AuthMethod::Bearer(token.clone()),
            None => AuthMethod::None,
        };

        RestBackendConfig::new(&self.endpoint)
            .with_auth(auth)
            .with_timeout(self.timeout_secs)
    }
}
