//! Authentication module for the Gemini API.

use crate::config::GeminiConfig;
use secrecy::{ExposeSecret, SecretString};

/// Header carrying the API key on every upstream request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Authentication manager for the Gemini API.
pub trait AuthManager: Send + Sync {
    /// Get the authentication header name and value.
    fn get_auth_header(&self) -> Option<(String, String)>;

    /// Clone the auth manager into a boxed trait object.
    fn clone_box(&self) -> Box<dyn AuthManager>;
}

/// API key authentication manager.
pub struct ApiKeyAuthManager {
    api_key: SecretString,
}

impl ApiKeyAuthManager {
    /// Create a new API key auth manager.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }

    /// Create from config.
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(config.api_key.clone())
    }
}

impl AuthManager for ApiKeyAuthManager {
    fn get_auth_header(&self) -> Option<(String, String)> {
        Some((
            API_KEY_HEADER.to_string(),
            self.api_key.expose_secret().to_string(),
        ))
    }

    fn clone_box(&self) -> Box<dyn AuthManager> {
        Box::new(Self {
            api_key: self.api_key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_auth() {
        let manager = ApiKeyAuthManager::new(SecretString::new("test-key".into()));

        let (name, value) = manager.get_auth_header().unwrap();
        assert_eq!(name, "x-goog-api-key");
        assert_eq!(value, "test-key");

        let cloned = manager.clone_box();
        assert_eq!(cloned.get_auth_header(), manager.get_auth_header());
    }
}
