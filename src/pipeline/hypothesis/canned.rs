// Canned hypothesis used when no generator can answer. Built from the
// research signals and the persona catalog so downstream stages still have
// a realistic document to work with.

use crate::models::{PersonaCatalog, ResearchRecord};

const COMPANY_MARKERS: [&str; 4] = ["company", "inc", "corp", "ltd"];
const FUNDING_MARKERS: [&str; 3] = ["funding", "raised", "series"];
const HIRING_MARKERS: [&str; 3] = ["hiring", "engineer", "developer"];
const DEVEX_MARKERS: [&str; 3] = ["devex", "developer experience", "platform"];

/// Signals detected in free-text research.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchSignals {
    pub company_name: Option<String>,
    pub funding: bool,
    pub hiring: bool,
    pub devex: bool,
}

fn mentions_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

impl ResearchSignals {
    pub fn detect(research: &ResearchRecord) -> Self {
        // The company name is the first word of an early line that reads
        // like a company description.
        let company_name = research
            .company_info
            .lines()
            .take(3)
            .find(|line| mentions_any(line, &COMPANY_MARKERS))
            .and_then(|line| line.split_whitespace().next())
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|word| !word.is_empty());

        Self {
            company_name,
            funding: mentions_any(&research.news_signals, &FUNDING_MARKERS),
            hiring: mentions_any(&research.job_postings, &HIRING_MARKERS),
            devex: mentions_any(&research.job_postings, &DEVEX_MARKERS),
        }
    }
}

pub fn canned_hypothesis(research: &ResearchRecord, catalog: &PersonaCatalog, product: &str) -> String {
    let signals = ResearchSignals::detect(research);
    let company = signals
        .company_name
        .clone()
        .unwrap_or_else(|| "This company".to_string());

    let budget = if signals.funding {
        "- Recent funding suggests budget is available for developer tooling"
    } else {
        "- Growth indicators suggest room in the budget for productivity tooling"
    };
    let hiring = if signals.hiring {
        "- Active engineering hiring: the right moment to raise productivity before the team scales"
    } else {
        "- Engineering growth creates an opening for productivity improvements"
    };
    let devex = if signals.devex {
        "- A platform or DevEx team is forming, so developer experience is already a priority"
    } else {
        "- Ongoing engineering investment suggests openness to new tooling"
    };

    let mut out = format!(
        "## Why This Account\n\n\
{company} looks like a strong fit for {product}:\n\n\
**Engineering focus**\n\
- The research points to meaningful, ongoing engineering investment\n\
- Open technical roles indicate a growing engineering organization\n\n\
**Budget**\n\
{budget}\n\n\
---\n\n\
## Why Now\n\n\
**Triggers**\n\
{hiring}\n\
{devex}\n\n\
**Likely pain points**\n\
- Keeping delivery velocity while headcount grows\n\
- Onboarding new engineers into a large codebase\n\
- Justifying engineering spend to leadership\n\n\
---\n\n\
## Who to Target\n\n"
    );

    for (i, lane) in catalog.lanes().iter().enumerate() {
        out.push_str(&format!(
            "### {}. {}\n**Hook:** {}\n**Angle:** {}\n",
            i + 1,
            lane.name,
            lane.hook,
            lane.product_angle
        ));
        if let Some(peer) = &lane.peer_reference {
            out.push_str(&format!("**Peer proof:** {peer}\n"));
        }
        out.push('\n');
    }

    out.push_str("---\n\n## Multi-Threading Strategy\n\n");
    for (week, lane) in catalog.lanes().iter().take(3).enumerate() {
        out.push_str(&format!(
            "- **Week {}:** engage {} ({})\n",
            week + 1,
            lane.name,
            if week == 0 { "email + LinkedIn" } else { "email + phone" }
        ));
    }
    out.push_str("- **Ongoing:** a touch every 2-3 days within each week\n");
    out
}
