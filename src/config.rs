//! Env-driven configuration for the client and CLI.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binary. Defaults are provided for convenience during development.
use std::env;
use std::time::Duration;

use dotenv;

pub struct Config {
    pub api_base_url: String,
    pub output_dir: String,
    pub credentials_path: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, env::VarError> {
        Ok(Config {
            api_base_url: env::var("VEO_API_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            output_dir: env::var("VEO_OUTPUT_DIR").unwrap_or_else(|_| "./output".to_string()),
            credentials_path: env::var("VEO_CREDENTIALS_PATH")
                .unwrap_or_else(|_| "./Comflyapi.json".to_string()),
            poll_interval: Duration::from_secs(parse_secs("VEO_POLL_INTERVAL_SECS", 20)),
            timeout: Duration::from_secs(parse_secs("VEO_TIMEOUT_SECS", 600)),
        })
    }

    pub fn print_env_vars() {
        for key in [
            "VEO_API_BASE_URL",
            "VEO_OUTPUT_DIR",
            "VEO_CREDENTIALS_PATH",
            "VEO_POLL_INTERVAL_SECS",
            "VEO_TIMEOUT_SECS",
        ] {
            println!("{}: {}", key, env::var(key).unwrap_or_else(|_| "<unset>".to_string()));
        }
    }
}

fn parse_secs(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} '{}', falling back to {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
