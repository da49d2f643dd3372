//! Available subcommands.

use clap::Subcommand;

use prompt_gateway_core::credentials::DEFAULT_KEY_LENGTH;

#[derive(Subcommand)]
pub enum Commands {
    /// Wait for Ollama, pull the allowed models, then serve HTTP
    Serve {
        /// Port to listen on
        #[arg(short = 'P', long, default_value_t = 5000)]
        port: u16,
        /// Interface to bind
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Do not pull missing models at startup
        #[arg(long)]
        skip_model_pull: bool,
    },

    /// Check that Ollama is reachable; exits non-zero if it never becomes ready
    Check {
        /// Number of probes before giving up
        #[arg(long, default_value_t = 10)]
        retries: u32,
        /// Seconds to wait between probes
        #[arg(long, default_value_t = 2)]
        delay: u64,
    },

    /// Generate API keys and print the API_KEYS setting
    Keygen {
        /// Length of each key
        #[arg(short = 'n', long, default_value_t = DEFAULT_KEY_LENGTH)]
        length: usize,
        /// Application names, comma-separated
        #[arg(long, value_delimiter = ',', default_value = "APP1,WEBAPP,MOBILE")]
        apps: Vec<String>,
    },
}
