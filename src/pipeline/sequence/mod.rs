pub mod canned;
pub mod prompt;

pub use canned::*;
pub use prompt::*;

use crate::models::{Cadence, PersonaLane, ProspectInfo};
use crate::pipeline::generation::{
    Generated, GenerationError, GenerationRequest, GeneratorGateway, SEQUENCE_SAMPLING,
};

/// Everything needed to draft one lane's sequence.
#[derive(Debug, Clone, Copy)]
pub struct DraftRequest<'a> {
    pub lane: &'a PersonaLane,
    pub prospect: &'a ProspectInfo,
    pub hypothesis: &'a str,
    pub cadence: Cadence,
    pub product: &'a str,
}

impl DraftRequest<'_> {
    pub fn prompt(&self) -> String {
        build_sequence_prompt(
            self.lane,
            self.prospect,
            self.hypothesis,
            self.cadence,
            self.product,
        )
    }

    pub fn canned(&self) -> String {
        canned_sequence(self.lane, self.prospect, self.cadence, self.product)
    }
}

/// Ask the gateway to draft one sequence.
pub fn request_sequence(
    gateway: &mut GeneratorGateway,
    draft: &DraftRequest<'_>,
) -> Result<Generated, GenerationError> {
    let prompt = draft.prompt();
    let request = GenerationRequest {
        system: SEQUENCE_SYSTEM_PROMPT,
        prompt: &prompt,
        params: SEQUENCE_SAMPLING,
    };
    gateway.generate(&request)
}
