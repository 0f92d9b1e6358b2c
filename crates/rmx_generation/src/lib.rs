use std::sync::Arc;

use rmx_core::{Error, GenerationBackend, Result};

pub mod http;
pub mod mock;
pub mod payments;
pub mod uploads;

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Backend selection, from flags or environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub backend: String,
    pub backend_url: Option<String>,
}

/// Map a configuration to a backend. An empty name means the mock.
pub fn create_backend(config: &Config) -> Result<Arc<dyn GenerationBackend>> {
    match config.backend.as_str() {
        "" | "mock" => Ok(Arc::new(MockBackend::new())),
        "http" => {
            let base_url = config
                .backend_url
                .clone()
                .ok_or_else(|| Error::Generation("http backend requires a base URL".to_string()))?;
            Ok(Arc::new(HttpBackend::new(base_url)))
        }
        other => Err(Error::Generation(format!("Unknown backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::{create_backend, Config};
    pub use rmx_core::{Error, GenerationBackend, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_backend_defaults_to_mock() {
        let backend = create_backend(&Config::default()).unwrap();
        assert_eq!(backend.name(), "mock");
    }

    #[test]
    fn test_http_backend_requires_base_url() {
        let config = Config {
            backend: "http".to_string(),
            backend_url: None,
        };
        assert!(create_backend(&config).is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let config = Config {
            backend: "carrier-pigeon".to_string(),
            backend_url: None,
        };
        assert!(create_backend(&config).is_err());
    }
}
