use std::str::FromStr;

use aws_sdk_dynamodb::Client as RawClient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Invalid DynamoDB endpoint {0:?}.")]
    InvalidEndpoint(String),
}

/// Thin wrapper over the SDK client. Operations are exposed through the traits in the sibling
/// modules so that callers can depend on exactly the calls they make.
#[derive(Debug, Clone)]
pub struct Adapter {
    pub(crate) raw: RawClient,
}

impl Adapter {
    /// Builds an adapter from the shared AWS environment configuration. When `endpoint` is set,
    /// all calls are sent there instead of the regional endpoint (e.g. DynamoDB Local).
    pub async fn from_env(endpoint: Option<&str>) -> Result<Self, AdapterError> {
        let shared_config = aws_config::load_from_env().await;

        let config = match endpoint {
            Some(endpoint) => {
                let uri = http::Uri::from_str(endpoint).map_err(|_| AdapterError::InvalidEndpoint(endpoint.to_owned()))?;
                tracing::info!(%endpoint, "Using DynamoDB with custom endpoint.");
                aws_sdk_dynamodb::config::Builder::from(&shared_config)
                    .endpoint_resolver(aws_sdk_dynamodb::Endpoint::immutable(uri))
                    .build()
            }
            None => aws_sdk_dynamodb::config::Config::new(&shared_config),
        };

        Ok(RawClient::from_conf(config).into())
    }
}

impl From<RawClient> for Adapter {
    fn from(raw: RawClient) -> Self {
        Adapter { raw }
    }
}
