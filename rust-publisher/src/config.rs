//! Configuration module for environment variable parsing.
//!
//! Region and endpoint are configured per backend family so the SQS and
//! SNS clients can point at different regions or a local emulator.

use std::env;

/// Region and optional endpoint override for one backend family.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// AWS region the client signs requests for.
    pub region: String,

    /// Endpoint override (e.g. a LocalStack address). `None` means the
    /// SDK resolves the regional endpoint itself.
    pub endpoint: Option<String>,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQS region/endpoint pair.
    pub sqs: BackendConfig,

    /// SNS region/endpoint pair.
    pub sns: BackendConfig,

    /// Explicit base address joined with short queue names to form queue
    /// URLs. Falls back to the SQS endpoint override, then to the regional
    /// SQS address.
    pub queue_base_url_override: Option<String>,

    /// Port for the web server to listen on.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let default_region =
            env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        Config {
            sqs: BackendConfig {
                region: env::var("SQS_REGION").unwrap_or_else(|_| default_region.clone()),
                endpoint: env::var("SQS_ENDPOINT").ok(),
            },

            sns: BackendConfig {
                region: env::var("SNS_REGION").unwrap_or_else(|_| default_region.clone()),
                endpoint: env::var("SNS_ENDPOINT").ok(),
            },

            queue_base_url_override: env::var("SQS_QUEUE_BASE_URL").ok(),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Resolved base address for building queue URLs.
    pub fn queue_base_url(&self) -> String {
        self.queue_base_url_override
            .clone()
            .or_else(|| self.sqs.endpoint.clone())
            .unwrap_or_else(|| format!("https://sqs.{}.amazonaws.com", self.sqs.region))
    }
}
