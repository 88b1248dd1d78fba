pub mod canned;
pub mod personas;
pub mod prompt;

pub use canned::*;
pub use personas::*;
pub use prompt::*;

use crate::models::ResearchRecord;
use crate::pipeline::generation::{
    Generated, GenerationError, GenerationRequest, GeneratorGateway, HYPOTHESIS_SAMPLING,
};

/// Ask the gateway for a hypothesis. Fallback to canned content is the
/// caller's decision.
pub fn request_hypothesis(
    gateway: &mut GeneratorGateway,
    research: &ResearchRecord,
    product: &str,
) -> Result<Generated, GenerationError> {
    let prompt = build_hypothesis_prompt(research, product);
    let request = GenerationRequest {
        system: HYPOTHESIS_SYSTEM_PROMPT,
        prompt: &prompt,
        params: HYPOTHESIS_SAMPLING,
    };
    gateway.generate(&request)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::models::ProviderKind;
    use crate::pipeline::generation::MockGenerator;

    #[test]
    fn sends_research_prompt_to_gateway() {
        let mock = Rc::new(MockGenerator::new(ProviderKind::OpenAi, "## Why This Account"));
        let mut gateway = GeneratorGateway::new(vec![Box::new(mock.clone())]);
        let research = ResearchRecord {
            company_info: "Acme Corp".into(),
            ..Default::default()
        };

        let generated = request_hypothesis(&mut gateway, &research, "Cursor").unwrap();
        assert_eq!(generated.text, "## Why This Account");
        assert!(mock.prompts()[0].contains("Acme Corp"));
    }

    #[test]
    fn unavailable_gateway_is_an_error() {
        let mut gateway = GeneratorGateway::unavailable();
        let err = request_hypothesis(&mut gateway, &ResearchRecord::default(), "Cursor").unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable));
    }
}
