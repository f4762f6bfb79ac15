//! Connection settings for an OCS endpoint.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

/// Credentials and base URL of the remote instance.
///
/// Built once by the embedding application and never mutated. The client
/// reads it by reference on every call.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    username: String,
    password: String,
    #[serde(deserialize_with = "normalized_base_url")]
    base_url: String,
}

impl ClientConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: normalize(base_url.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value for the `Authorization` header.
    pub fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn normalized_base_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("admin", "pw", "https://cloud.example.com/");
        assert_eq!(config.base_url(), "https://cloud.example.com");
    }

    #[test]
    fn basic_auth_encodes_username_and_password() {
        let config = ClientConfig::new("Aladdin", "open sesame", "http://localhost");
        assert_eq!(config.basic_auth(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn debug_output_hides_password() {
        let config = ClientConfig::new("admin", "hunter2", "http://localhost");
        let debug = format!("{config:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn deserialized_base_url_is_normalized() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"username":"admin","password":"pw","base_url":"http://localhost:8080//"}"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.username(), "admin");
        assert_eq!(config.password(), "pw");
    }
}
