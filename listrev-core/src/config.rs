//! Configuration helpers shared by the DAQ modules

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::queue::DEFAULT_QUEUE_TIMEOUT_MS;

/// Deserialize a module's JSON configuration into its typed form
pub fn parse_module_config<T: DeserializeOwned>(module: &str, config: &Value) -> Result<T> {
    T::deserialize(config).map_err(|e| Error::Config(format!("{}: {}", module, e)))
}

/// Serde default for `queueTimeoutMsec`
pub fn default_queue_timeout_ms() -> u64 {
    DEFAULT_QUEUE_TIMEOUT_MS
}

/// Convert a millisecond count into a queue timeout
pub fn queue_timeout(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        input: String,
        #[serde(default = "default_queue_timeout_ms", rename = "queueTimeoutMsec")]
        queue_timeout_ms: u64,
    }

    #[test]
    fn test_parse_with_defaults() {
        let sample: Sample = parse_module_config("lr", &json!({"input": "q"})).unwrap();
        assert_eq!(sample.input, "q");
        assert_eq!(sample.queue_timeout_ms, 100);
        assert_eq!(queue_timeout(sample.queue_timeout_ms), Duration::from_millis(100));
    }

    #[test]
    fn test_parse_reports_module() {
        let err = parse_module_config::<Sample>("lr", &json!({})).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.starts_with("lr: "), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
