// FlowC Engine: Completion Provider Registry
// AnyProvider wraps Box<dyn CompletionProvider> so callers hold one concrete
// type regardless of which backend is configured.

pub mod openai;

pub use openai::OpenAiProvider;

use crate::atoms::error::ProviderError;
use crate::atoms::traits::CompletionProvider;
use crate::atoms::types::CompletionRequest;

/// Type-erased completion provider.
pub struct AnyProvider(Box<dyn CompletionProvider>);

impl AnyProvider {
    pub fn new(provider: impl CompletionProvider + 'static) -> Self {
        AnyProvider(Box::new(provider))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.0.complete(request).await
    }
}
