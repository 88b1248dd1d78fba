use super::BackendFailure;
use crate::models::enums::ProviderKind;

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SamplingParams {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Narrative hypothesis drafting.
pub const HYPOTHESIS_SAMPLING: SamplingParams = SamplingParams::new(0.7, 2000);
/// Persona title extraction from a hypothesis.
pub const PERSONA_SAMPLING: SamplingParams = SamplingParams::new(0.0, 200);
/// Outreach sequence drafting.
pub const SEQUENCE_SAMPLING: SamplingParams = SamplingParams::new(0.7, 3000);

/// A prompt plus the parameters it should be sampled with.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub params: SamplingParams,
}

/// Text generation backend abstraction (allows mocking).
///
/// Implementations are responsible for classifying their own failures into
/// a `FailureKind`.
pub trait TextGenerator {
    fn provider(&self) -> ProviderKind;

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendFailure>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for std::rc::Rc<T> {
    fn provider(&self) -> ProviderKind {
        (**self).provider()
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, BackendFailure> {
        (**self).generate(request)
    }
}
