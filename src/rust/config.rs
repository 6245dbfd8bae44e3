use std::path::PathBuf;

use crate::model_manager::ModelManager;

/// Settings for the prediction server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Artifact to load at startup
    pub model_path: PathBuf,
    /// SHA-256 the artifact must match, if set
    pub expected_sha256: Option<String>,
    /// Refuse to start without a valid model instead of serving 503s
    pub require_model: bool,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: ModelManager::get_default_model_path(),
            expected_sha256: None,
            require_model: false,
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL clients should use; wildcard hosts map to localhost.
    pub fn public_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }

    pub fn model_manager(&self) -> ModelManager {
        ModelManager::new(&self.model_path)
    }
}
