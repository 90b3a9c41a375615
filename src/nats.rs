// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS client abstraction for collaborator messaging

use async_nats::{Client, ConnectOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{StackError, StackResult};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "stack-composer".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl NatsConfig {
    /// Default configuration pointed at `url` (comma-separated for several servers)
    pub fn with_url(url: &str) -> Self {
        Self {
            servers: url.split(',').map(|s| s.trim().to_string()).collect(),
            ..Self::default()
        }
    }
}

/// NATS client wrapper providing JSON request/reply
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: NatsConfig) -> StackResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| StackError::Nats(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Request-reply pattern
    pub async fn request<T, R>(&self, subject: &str, request: &T) -> StackResult<R>
    where
        T: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let payload = serde_json::to_vec(request)?;

        let response = self
            .client
            .request(subject.to_string(), payload.into())
            .await
            .map_err(|e| StackError::Nats(e.to_string()))?;

        debug!("Received reply on subject: {}", subject);

        let result: R = serde_json::from_slice(&response.payload)?;
        Ok(result)
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Reply envelope used by every collaborator service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply<T> {
    /// Request succeeded
    Ok { value: T },
    /// Named entity does not exist
    NotFound,
    /// Service-side failure, message carried verbatim
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_with_url() {
        let config = NatsConfig::with_url("nats://a:4222, nats://b:4222");
        assert_eq!(config.servers, vec!["nats://a:4222", "nats://b:4222"]);
        assert_eq!(config.name, "stack-composer");
    }

    #[test]
    fn test_reply_wire_format() {
        let ok: Reply<String> = serde_json::from_str(r#"{"status":"ok","value":"x"}"#).unwrap();
        assert_eq!(ok, Reply::Ok { value: "x".into() });

        let missing: Reply<String> = serde_json::from_str(r#"{"status":"not_found"}"#).unwrap();
        assert_eq!(missing, Reply::NotFound);

        let json = serde_json::to_string(&Reply::<String>::Error {
            message: "quota exceeded".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"error","message":"quota exceeded"}"#);
    }
}
