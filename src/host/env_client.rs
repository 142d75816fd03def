//! Env endpoint client
//!
//! Fetches the runtime environment from a running host over HTTP.

use reqwest::Client;

use super::{EnvVars, HostError};

/// Configuration for the env client
#[derive(Debug, Clone)]
pub struct EnvClientConfig {
    /// Host URL, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Path prefix the host is mounted under
    pub base_path: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for EnvClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            base_path: "/".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

/// HTTP client for the host's env endpoint
pub struct EnvClient {
    client: Client,
    config: EnvClientConfig,
}

impl EnvClient {
    pub fn new(config: EnvClientConfig) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EnvClientConfig {
        &self.config
    }

    /// Full URL of the env endpoint
    pub fn env_url(&self) -> String {
        format!(
            "{}{}env",
            self.config.base_url.trim_end_matches('/'),
            normalize_base_path(&self.config.base_path)
        )
    }

    /// Fetch the environment variables
    pub async fn fetch(&self) -> Result<EnvVars, HostError> {
        let url = self.env_url();

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                HostError::Timeout
            } else if e.is_connect() {
                HostError::Unavailable(url.clone())
            } else {
                HostError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(HostError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| HostError::InvalidResponse(e.to_string()))
    }
}

/// `base` with exactly one leading and one trailing slash
pub(crate) fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    async fn spawn_host(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("mirror"), "/mirror/");
        assert_eq!(normalize_base_path("/mirror/"), "/mirror/");
    }

    #[test]
    fn test_env_url() {
        let client = EnvClient::new(EnvClientConfig {
            base_url: "http://localhost:8080/".to_string(),
            base_path: "/mirror".to_string(),
            request_timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(client.env_url(), "http://localhost:8080/mirror/env");
    }

    #[tokio::test]
    async fn test_fetch_env() {
        let router = Router::new().route(
            "/env",
            get(|| async { Json(json!({"modulesDir": "user_modules", "customCss": "css/x.css"})) }),
        );
        let base_url = spawn_host(router).await;

        let client = EnvClient::new(EnvClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();
        let env = client.fetch().await.unwrap();

        assert_eq!(env.modules_dir, "user_modules");
        assert_eq!(env.custom_css, "css/x.css");
    }

    #[tokio::test]
    async fn test_fetch_env_bad_status() {
        let base_url = spawn_host(Router::new()).await;
        let client = EnvClient::new(EnvClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(client.fetch().await, Err(HostError::Status(404))));
    }

    #[tokio::test]
    async fn test_fetch_env_invalid_body() {
        let router = Router::new().route("/env", get(|| async { "not json" }));
        let base_url = spawn_host(router).await;
        let client = EnvClient::new(EnvClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            client.fetch().await,
            Err(HostError::InvalidResponse(_))
        ));
    }
}
