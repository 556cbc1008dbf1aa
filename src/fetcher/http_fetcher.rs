use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::app::{GraytailError, Result};
use crate::config::ServerConfig;
use crate::fetcher::{AcceptType, Transport};

pub struct HttpTransport {
    client: Client,
    base_uri: String,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        url::Url::parse(&server.uri).map_err(|e| {
            GraytailError::Config(format!("Invalid server uri {:?}: {}", server.uri, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(server.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("graytail/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(server.ignore_cert)
            .build()?;

        let credentials = match (server.username.as_deref(), server.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.to_string(), pass.to_string()))
            }
            _ => None,
        };

        Ok(Self {
            client,
            base_uri: server.uri.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn endpoint(&self, api: &str) -> String {
        format!("{}/{}", self.base_uri, api.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, api: &str, accept: AcceptType) -> Result<Vec<u8>> {
        let url = self.endpoint(api);
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(&url).header(ACCEPT, accept.mime());
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraytailError::Transport(format!(
                "{} returned {}",
                url, status
            )));
        }

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(uri: &str) -> ServerConfig {
        ServerConfig {
            uri: uri.to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_endpoint_joins_with_single_slash() {
        let transport = HttpTransport::new(&server("https://graylog.example.com/api/")).unwrap();
        assert_eq!(
            transport.endpoint("streams"),
            "https://graylog.example.com/api/streams"
        );
        assert_eq!(
            transport.endpoint("/streams"),
            "https://graylog.example.com/api/streams"
        );
    }

    #[test]
    fn test_invalid_uri_is_config_error() {
        let err = HttpTransport::new(&server("graylog.example.com/api")).err().unwrap();
        assert!(matches!(err, GraytailError::Config(_)));
    }

    #[test]
    fn test_credentials_need_both_parts() {
        let mut config = server("https://graylog.example.com/api");
        config.username = Some("reader".into());
        let transport = HttpTransport::new(&config).unwrap();
        assert!(transport.credentials.is_none());

        config.password = Some("secret".into());
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.credentials,
            Some(("reader".to_string(), "secret".to_string()))
        );
    }
}
