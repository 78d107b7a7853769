//! The seam between the adapter and the model service.

#[cfg(feature = "bedrock")]
mod bedrock;

#[cfg(feature = "bedrock")]
pub use bedrock::{BedrockTransport, FoundationModel};

use crate::errors::TransportError;

/// Content type of every request body the adapter sends.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Sends a serialized request to a model and returns the raw reply.
///
/// Implementations block until the reply arrives. There is no timeout or
/// cancellation at this level.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Invokes `model_id` with `body`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for network, auth or service failures.
    fn invoke(&self, model_id: &str, content_type: &str, body: &[u8])
        -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn invoke(
        &self,
        model_id: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).invoke(model_id, content_type, body)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn invoke(
        &self,
        model_id: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).invoke(model_id, content_type, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn invoke(
        &self,
        model_id: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).invoke(model_id, content_type, body)
    }
}
