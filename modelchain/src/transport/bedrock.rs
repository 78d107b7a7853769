//! AWS Bedrock transport.

use super::Transport;
use crate::errors::TransportError;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// A foundation model entry from the Bedrock catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundationModel {
    /// Identifier passed to `InvokeModel`.
    pub model_id: String,
    /// Display name.
    pub model_name: Option<String>,
    /// Vendor name.
    pub provider_name: Option<String>,
}

/// Blocking Bedrock client.
///
/// Owns a single-threaded tokio runtime; each call blocks on it, so the
/// pipeline stays a plain sequential loop.
pub struct BedrockTransport {
    runtime: Runtime,
    runtime_client: aws_sdk_bedrockruntime::Client,
    catalog_client: aws_sdk_bedrock::Client,
    region: String,
}

impl std::fmt::Debug for BedrockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockTransport")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl BedrockTransport {
    /// Resolves credentials through the AWS default chain and connects to `region`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the runtime cannot be started.
    pub fn connect(region: impl Into<String>) -> Result<Self, TransportError> {
        let region = region.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::new("Failed to start async runtime").with_source(e))?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .load(),
        );
        info!(region = %region, "Bedrock client configured");

        Ok(Self {
            runtime_client: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            catalog_client: aws_sdk_bedrock::Client::new(&sdk_config),
            runtime,
            region,
        })
    }

    /// Returns the configured region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Lists the foundation models available in the region.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the catalog call fails.
    pub fn list_foundation_models(&self) -> Result<Vec<FoundationModel>, TransportError> {
        let output = self
            .runtime
            .block_on(self.catalog_client.list_foundation_models().send())
            .map_err(|e| TransportError::new(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .model_summaries()
            .iter()
            .map(|summary| FoundationModel {
                model_id: summary.model_id().to_string(),
                model_name: summary.model_name().map(ToString::to_string),
                provider_name: summary.provider_name().map(ToString::to_string),
            })
            .collect())
    }
}

impl Transport for BedrockTransport {
    fn invoke(
        &self,
        model_id: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        debug!(model_id, bytes = body.len(), "InvokeModel");
        let output = self
            .runtime
            .block_on(
                self.runtime_client
                    .invoke_model()
                    .model_id(model_id)
                    .content_type(content_type)
                    .accept(content_type)
                    .body(Blob::new(body))
                    .send(),
            )
            .map_err(|e| TransportError::new(DisplayErrorContext(&e).to_string()))?;

        Ok(output.body.into_inner())
    }
}
