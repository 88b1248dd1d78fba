use super::gemini::GeminiClient;
use super::openai::OpenAiClient;
use super::types::{GenerationRequest, TextGenerator};
use super::{truncate_chars, FailedAttempt, GenerationError, MAX_FAILURE_DETAIL};
use crate::config::GatewayConfig;
use crate::models::enums::ProviderKind;

/// Text produced by one gateway call.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub provider: ProviderKind,
    /// Backends that failed before `provider` succeeded.
    pub failed_attempts: Vec<FailedAttempt>,
}

/// Ordered set of interchangeable generation backends with sticky failover.
///
/// Each call tries the active backend first, then the remaining ones in
/// configured order. A backend that succeeds after an earlier one failed
/// becomes the active backend for subsequent calls. `generate` takes
/// `&mut self` because of that selection state, so passes run one at a time.
pub struct GeneratorGateway {
    backends: Vec<Box<dyn TextGenerator>>,
    active: usize,
}

impl GeneratorGateway {
    pub fn new(backends: Vec<Box<dyn TextGenerator>>) -> Self {
        Self {
            backends,
            active: 0,
        }
    }

    /// Build HTTP backends for every configured provider.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GenerationError> {
        let mut backends: Vec<Box<dyn TextGenerator>> = Vec::with_capacity(config.backends.len());
        for backend in &config.backends {
            let client: Box<dyn TextGenerator> = match backend.provider {
                ProviderKind::OpenAi => Box::new(OpenAiClient::new(backend, config.timeout_secs)?),
                ProviderKind::Gemini => Box::new(GeminiClient::new(backend, config.timeout_secs)?),
            };
            backends.push(client);
        }
        tracing::debug!(backends = backends.len(), "Generator gateway configured");
        Ok(Self::new(backends))
    }

    /// Gateway with no backends; every call fails fast with `Unavailable`.
    pub fn unavailable() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_available(&self) -> bool {
        !self.backends.is_empty()
    }

    pub fn active_provider(&self) -> Option<ProviderKind> {
        self.backends.get(self.active).map(|b| b.provider())
    }

    /// Submit a request, failing over across backends until one succeeds.
    pub fn generate(&mut self, request: &GenerationRequest<'_>) -> Result<Generated, GenerationError> {
        let count = self.backends.len();
        if count == 0 {
            return Err(GenerationError::Unavailable);
        }

        let mut failed_attempts = Vec::new();
        for offset in 0..count {
            let index = (self.active + offset) % count;
            let backend = &self.backends[index];
            let provider = backend.provider();

            match backend.generate(request) {
                Ok(text) => {
                    if index != self.active {
                        tracing::info!(
                            from = %self.backends[self.active].provider(),
                            to = %provider,
                            "Switching active generation backend"
                        );
                        self.active = index;
                    }
                    tracing::debug!(provider = %provider, chars = text.len(), "Generation succeeded");
                    return Ok(Generated {
                        text,
                        provider,
                        failed_attempts,
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        provider = %provider,
                        kind = failure.kind.as_str(),
                        "Generation backend failed"
                    );
                    failed_attempts.push(FailedAttempt {
                        provider,
                        kind: failure.kind,
                        detail: truncate_chars(&failure.message, MAX_FAILURE_DETAIL),
                    });
                }
            }
        }

        Err(GenerationError::Exhausted {
            attempts: failed_attempts,
        })
    }
}
