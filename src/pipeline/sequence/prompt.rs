use crate::models::{Cadence, PersonaLane, ProspectInfo};
use crate::pipeline::product_brief;

pub const SEQUENCE_SYSTEM_PROMPT: &str = "You are an expert B2B sales copywriter. \
Generate compelling, personalized outbound sequences for developer tools.";

fn prospect_context(prospect: &ProspectInfo, lane: &PersonaLane) -> String {
    let name = [prospect.first_name.as_deref(), prospect.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let title = prospect
        .with_default_title(&lane.name)
        .title
        .unwrap_or_else(|| lane.name.clone());

    format!(
        "- Name: {}\n- Title: {}\n- Company: {}\n- Email: {}",
        if name.is_empty() { "Unknown" } else { name.as_str() },
        title,
        prospect.company_name().unwrap_or("Unknown Company"),
        prospect
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or("Not provided"),
    )
}

fn persona_context(lane: &PersonaLane) -> String {
    let mut out = format!("Persona: {}\n", lane.name);
    if !lane.titles.is_empty() {
        out.push_str(&format!("Typical titles: {}\n", lane.titles.join(", ")));
    }
    out.push_str(&format!("Hook: {}\nProduct angle: {}", lane.hook, lane.product_angle));
    if let Some(peer) = &lane.peer_reference {
        out.push_str(&format!("\nPeer reference: {peer}"));
    }
    out
}

/// Build the drafting prompt for one persona lane.
pub fn build_sequence_prompt(
    lane: &PersonaLane,
    prospect: &ProspectInfo,
    hypothesis: &str,
    cadence: Cadence,
    product: &str,
) -> String {
    format!(
        r#"Write a {steps}-step outbound sequence for the persona and prospect below.

<product>
{brief}
</product>

<persona>
{persona}
</persona>

<prospect>
{prospect}
</prospect>

<hypothesis>
{hypothesis}
</hypothesis>

Follow this structure exactly. Keep every `## Step N: <label> (Day D)` heading and write all {steps} steps:

{structure}
Rules:
- Personalize with specific signals from the hypothesis; no generic filler
- Emails under 120 words, LinkedIn messages under 300 characters
- One clear, low-friction ask per touch
- Sign emails as [Your Name]"#,
        steps = cadence.step_count(),
        brief = product_brief(product),
        persona = persona_context(lane),
        prospect = prospect_context(prospect, lane),
        hypothesis = hypothesis.trim(),
        structure = cadence.structure_markdown(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonaCatalog;

    fn lane() -> PersonaLane {
        PersonaCatalog::default().get("platform_devex").unwrap().clone()
    }

    #[test]
    fn prompt_embeds_cadence_structure() {
        let prompt = build_sequence_prompt(
            &lane(),
            &ProspectInfo::default(),
            "Why now: new DevEx team",
            Cadence::Extended,
            "Cursor",
        );
        assert!(prompt.starts_with("Write a 12-step outbound sequence"));
        assert!(prompt.contains("## Step 12: Breakup Email (Day 30)"));
        assert!(prompt.contains("Why now: new DevEx team"));
    }

    #[test]
    fn heading_instruction_and_rules_survive_the_template() {
        let prompt = build_sequence_prompt(
            &lane(),
            &ProspectInfo::default(),
            "h",
            Cadence::Standard,
            "Cursor",
        );
        assert!(prompt.contains(
            "Keep every `## Step N: <label> (Day D)` heading and write all 8 steps:"
        ));
        assert!(prompt.ends_with("- Sign emails as [Your Name]"));
    }

    #[test]
    fn missing_prospect_fields_get_placeholders() {
        let prompt = build_sequence_prompt(
            &lane(),
            &ProspectInfo::default(),
            "h",
            Cadence::Standard,
            "Cursor",
        );
        assert!(prompt.contains("- Name: Unknown"));
        assert!(prompt.contains("- Title: Platform/DevEx Engineering Lead"));
        assert!(prompt.contains("- Company: Unknown Company"));
        assert!(prompt.contains("- Email: Not provided"));
    }

    #[test]
    fn prospect_details_are_used() {
        let prospect = ProspectInfo {
            email: Some("dana@acme.io".into()),
            first_name: Some("Dana".into()),
            last_name: Some("Reyes".into()),
            title: Some("Head of Platform".into()),
            company: Some("Acme".into()),
        };
        let prompt = build_sequence_prompt(&lane(), &prospect, "h", Cadence::Standard, "Cursor");
        assert!(prompt.contains("- Name: Dana Reyes"));
        assert!(prompt.contains("- Title: Head of Platform"));
        assert!(prompt.contains("- Company: Acme"));
        assert!(prompt.contains("Peer reference: DevEx teams"));
    }
}
