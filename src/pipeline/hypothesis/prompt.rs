use crate::models::ResearchRecord;
use crate::pipeline::product_brief;

pub const HYPOTHESIS_SYSTEM_PROMPT: &str = "You are an expert B2B sales strategist. \
Generate actionable, specific outbound hypotheses based on account research.";

const NOT_PROVIDED: &str = "Not provided";

fn or_not_provided(field: &str) -> &str {
    if field.trim().is_empty() {
        NOT_PROVIDED
    } else {
        field.trim()
    }
}

/// Build the hypothesis prompt from account research.
/// Blank research fields are rendered as "Not provided".
pub fn build_hypothesis_prompt(research: &ResearchRecord, product: &str) -> String {
    let references = research
        .reference_customers
        .as_deref()
        .map(or_not_provided)
        .unwrap_or(NOT_PROVIDED);

    format!(
        r#"Build an outbound qualification hypothesis for the account described below.

<product>
{brief}
</product>

<research>
## Company Information
{company}

## Job Postings
{jobs}

## LinkedIn Profiles
{profiles}

## News & Signals
{news}

## Reference Customers
{references}
</research>

Write the hypothesis in Markdown with exactly these sections:

## Why This Account
Company scale, engineering focus, tech stack and budget indicators that make this a fit for {product}. Cite specific research.

## Why Now
Timely triggers (hiring, funding, team formation, launches) and the pain points they imply.

## Who to Target
Two to four personas by job title. For each: why they care, likely pain points, anticipated objections with responses.

## Multi-Threading Strategy
Which persona to engage first, how to sequence the others week by week, and the key success factors.

Only use facts present in the research. Where the research is silent, say so instead of inventing details."#,
        brief = product_brief(product),
        company = or_not_provided(&research.company_info),
        jobs = or_not_provided(&research.job_postings),
        profiles = or_not_provided(&research.linkedin_profiles),
        news = or_not_provided(&research.news_signals),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_render_as_not_provided() {
        let research = ResearchRecord {
            company_info: "Acme Corp, 800 engineers".into(),
            job_postings: "   ".into(),
            ..Default::default()
        };
        let prompt = build_hypothesis_prompt(&research, "Cursor");
        assert!(prompt.contains("Acme Corp, 800 engineers"));
        assert!(prompt.contains("## Job Postings\nNot provided"));
        assert!(prompt.contains("## Reference Customers\nNot provided"));
    }

    #[test]
    fn prompt_names_product_and_sections() {
        let research = ResearchRecord {
            news_signals: "Raised Series C".into(),
            reference_customers: Some("Stripe, Ramp".into()),
            ..Default::default()
        };
        let prompt = build_hypothesis_prompt(&research, "Acme IDE");
        assert!(prompt.contains("a fit for Acme IDE"));
        assert!(prompt.contains("Stripe, Ramp"));
        for section in ["## Why This Account", "## Why Now", "## Who to Target", "## Multi-Threading Strategy"] {
            assert!(prompt.contains(section), "missing {section}");
        }
    }
}
