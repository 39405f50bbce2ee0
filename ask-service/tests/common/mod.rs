#![allow(dead_code)]

use ask_service::config::{AskConfig, CorsConfig, GoogleConfig, ModelConfig};
use secrecy::Secret;
use service_core::config::Config;

pub const FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-test";

/// Config bound to a random local port, pointing at `api_base`.
pub fn test_config(api_base: &str) -> AskConfig {
    AskConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
        environment: "test".to_string(),
        google: GoogleConfig {
            api_key: Secret::new(TEST_API_KEY.to_string()),
        },
        model: ModelConfig {
            name: TEST_MODEL.to_string(),
            api_base: api_base.to_string(),
            timeout_secs: Some(5),
            verify_on_startup: false,
        },
        cors: CorsConfig {
            allowed_origins: vec![FRONTEND_ORIGIN.to_string()],
        },
        max_body_bytes: 100 * 1024,
    }
}
