//! BoxAgentProvider -- object-safe dynamic dispatch wrapper for AgentProvider.
//!
//! 1. Define an object-safe `AgentProviderDyn` trait with boxed futures
//! 2. Blanket-impl `AgentProviderDyn` for all `T: AgentProvider`
//! 3. `BoxAgentProvider` wraps `Box<dyn AgentProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use travela_types::agent::{AgentReply, AgentRequest};
use travela_types::error::AgentError;

use super::provider::AgentProvider;

/// Object-safe version of [`AgentProvider`] with boxed futures.
pub trait AgentProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a AgentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AgentReply, AgentError>> + Send + 'a>>;
}

impl<T: AgentProvider> AgentProviderDyn for T {
    fn name(&self) -> &str {
        AgentProvider::name(self)
    }

    fn model(&self) -> &str {
        AgentProvider::model(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a AgentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AgentReply, AgentError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased agent provider, so the API layer can be wired with the real
/// provider in production and a stub in tests.
pub struct BoxAgentProvider {
    inner: Box<dyn AgentProviderDyn + Send + Sync>,
}

impl BoxAgentProvider {
    /// Wrap a concrete `AgentProvider` in a type-erased box.
    pub fn new<T: AgentProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub async fn complete(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
        self.inner.complete_boxed(request).await
    }
}
