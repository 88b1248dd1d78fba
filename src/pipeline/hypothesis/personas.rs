// Persona derivation: which catalog lanes a hypothesis recommends.
//
// Order of preference:
//   1. ask a generator for a list of titles and resolve each against the catalog
//   2. match lane terms directly in the hypothesis text
//   3. the first three catalog lanes

use serde::Serialize;

use crate::models::{PersonaCatalog, PersonaLane, ProviderKind};
use crate::pipeline::conversion::strip_code_fence;
use crate::pipeline::generation::{GenerationRequest, GeneratorGateway, PERSONA_SAMPLING};

pub const PERSONA_SYSTEM_PROMPT: &str = "Extract the recommended target personas from this sales hypothesis. \
Return ONLY a JSON array of job titles, nothing else. \
Example: [\"VP Engineering\", \"DevEx Lead\", \"CTO\"]";

/// Number of lanes returned when nothing else matches.
const DEFAULT_LANE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "method", content = "provider")]
pub enum DerivationMethod {
    Generated(ProviderKind),
    PatternMatch,
    Default,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaDerivation {
    pub lanes: Vec<PersonaLane>,
    pub method: DerivationMethod,
}

/// Parse a generator's persona answer into titles.
///
/// Accepts a JSON array of strings, optionally fenced or surrounded by prose.
/// Single-quoted list literals are accepted too. Returns `None` when no
/// non-empty list can be read.
pub fn parse_persona_titles(response: &str) -> Option<Vec<String>> {
    let body = strip_code_fence(response);
    let start = body.find('[')?;
    let end = body.rfind(']')?;
    if end <= start {
        return None;
    }
    let list = &body[start..=end];

    let titles: Vec<String> = serde_json::from_str(list)
        .or_else(|_| serde_json::from_str(&list.replace('\'', "\"")))
        .ok()?;

    let titles: Vec<String> = titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    (!titles.is_empty()).then_some(titles)
}

/// Resolve titles to catalog lanes in the order given, dropping repeats
/// and titles that match no lane.
pub fn resolve_titles(catalog: &PersonaCatalog, titles: &[String]) -> Vec<PersonaLane> {
    let mut lanes: Vec<PersonaLane> = Vec::new();
    for title in titles {
        match catalog.resolve_label(title) {
            Some(lane) if !lanes.iter().any(|l| l.id == lane.id) => lanes.push(lane.clone()),
            Some(_) => {}
            None => tracing::debug!(title_len = title.len(), "Persona title matched no lane"),
        }
    }
    lanes
}

/// Lanes mentioned anywhere in `text`, in catalog order.
pub fn match_lanes_in_text(catalog: &PersonaCatalog, text: &str) -> Vec<PersonaLane> {
    catalog
        .lanes()
        .iter()
        .filter(|lane| lane.is_mentioned_in(text))
        .cloned()
        .collect()
}

pub fn default_lanes(catalog: &PersonaCatalog) -> Vec<PersonaLane> {
    catalog
        .lanes()
        .iter()
        .take(DEFAULT_LANE_COUNT)
        .cloned()
        .collect()
}

/// Derive the persona lanes a hypothesis recommends. Never fails: generator
/// errors and unusable answers fall through to text matching, then defaults.
pub fn derive_personas(
    gateway: &mut GeneratorGateway,
    catalog: &PersonaCatalog,
    hypothesis: &str,
) -> PersonaDerivation {
    let request = GenerationRequest {
        system: PERSONA_SYSTEM_PROMPT,
        prompt: hypothesis,
        params: PERSONA_SAMPLING,
    };

    match gateway.generate(&request) {
        Ok(generated) => {
            let lanes = parse_persona_titles(&generated.text)
                .map(|titles| resolve_titles(catalog, &titles))
                .unwrap_or_default();
            if !lanes.is_empty() {
                return PersonaDerivation {
                    lanes,
                    method: DerivationMethod::Generated(generated.provider),
                };
            }
            tracing::info!(
                provider = %generated.provider,
                "Persona answer unusable, matching hypothesis text"
            );
        }
        Err(e) => {
            tracing::info!(error = %e, "Persona extraction unavailable, matching hypothesis text");
        }
    }

    let matched = match_lanes_in_text(catalog, hypothesis);
    if !matched.is_empty() {
        return PersonaDerivation {
            lanes: matched,
            method: DerivationMethod::PatternMatch,
        };
    }

    PersonaDerivation {
        lanes: default_lanes(catalog),
        method: DerivationMethod::Default,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::pipeline::generation::{BackendFailure, FailureKind, MockGenerator};

    fn ids(lanes: &[PersonaLane]) -> Vec<&str> {
        lanes.iter().map(|l| l.id.as_str()).collect()
    }

    fn gateway_answering(answer: &str) -> GeneratorGateway {
        GeneratorGateway::new(vec![Box::new(MockGenerator::new(ProviderKind::OpenAi, answer))])
    }

    #[test]
    fn parses_plain_json_array() {
        assert_eq!(
            parse_persona_titles(r#"["VP Engineering", "CTO"]"#),
            Some(vec!["VP Engineering".to_string(), "CTO".to_string()])
        );
    }

    #[test]
    fn parses_fenced_and_single_quoted_lists() {
        assert_eq!(
            parse_persona_titles("```json\n[\"DevEx Lead\"]\n```").unwrap(),
            vec!["DevEx Lead"]
        );
        assert_eq!(
            parse_persona_titles("Here you go: ['CTO', 'VP Engineering']").unwrap(),
            vec!["CTO", "VP Engineering"]
        );
    }

    #[test]
    fn rejects_unusable_answers() {
        assert!(parse_persona_titles("The CTO and the VP.").is_none());
        assert!(parse_persona_titles("[]").is_none());
        assert!(parse_persona_titles(r#"["  "]"#).is_none());
        assert!(parse_persona_titles("] backwards [").is_none());
    }

    #[test]
    fn generated_titles_keep_response_order() {
        let mut gateway = gateway_answering(r#"["CTO", "Platform Engineering Lead", "CTO"]"#);
        let derivation = derive_personas(&mut gateway, &PersonaCatalog::default(), "hypothesis");
        assert_eq!(ids(&derivation.lanes), vec!["cto", "platform_devex"]);
        assert_eq!(derivation.method, DerivationMethod::Generated(ProviderKind::OpenAi));
    }

    #[test]
    fn unresolvable_titles_fall_back_to_text_matching() {
        let mut gateway = gateway_answering(r#"["Head of Sales"]"#);
        let derivation = derive_personas(
            &mut gateway,
            &PersonaCatalog::default(),
            "Start with the DevEx lead, then loop in the CTO.",
        );
        assert_eq!(ids(&derivation.lanes), vec!["platform_devex", "cto"]);
        assert_eq!(derivation.method, DerivationMethod::PatternMatch);
    }

    #[test]
    fn generator_failure_falls_back_to_text_matching() {
        let mock = Rc::new(MockGenerator::failing(
            ProviderKind::Gemini,
            BackendFailure::new(FailureKind::QuotaExceeded, "quota"),
        ));
        let mut gateway = GeneratorGateway::new(vec![Box::new(mock.clone())]);
        let derivation = derive_personas(
            &mut gateway,
            &PersonaCatalog::default(),
            "The VP of Engineering owns this budget.",
        );
        assert_eq!(ids(&derivation.lanes), vec!["eng_leadership"]);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn nothing_matched_returns_first_three_lanes() {
        let mut gateway = GeneratorGateway::unavailable();
        let derivation = derive_personas(
            &mut gateway,
            &PersonaCatalog::default(),
            "A generic note with no titles.",
        );
        assert_eq!(
            ids(&derivation.lanes),
            vec!["eng_leadership", "platform_devex", "cto"]
        );
        assert_eq!(derivation.method, DerivationMethod::Default);
    }

    #[test]
    fn prompt_is_the_hypothesis_itself() {
        let mock = Rc::new(MockGenerator::new(ProviderKind::OpenAi, r#"["CTO"]"#));
        let mut gateway = GeneratorGateway::new(vec![Box::new(mock.clone())]);
        derive_personas(&mut gateway, &PersonaCatalog::default(), "## Who to Target\nCTO");
        assert_eq!(mock.prompts(), vec!["## Who to Target\nCTO".to_string()]);
    }
}
