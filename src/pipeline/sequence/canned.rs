// Canned sequence used when no generator can draft one. Follows the cadence
// table so the result carries the same "## Step N:" headings a generated
// draft would.

use crate::models::{Cadence, PersonaLane, ProspectInfo, StepType};
use crate::pipeline::cadence::CadenceStep;

struct Touch<'a> {
    first_name: &'a str,
    company: &'a str,
    product: &'a str,
    lane: &'a PersonaLane,
}

impl Touch<'_> {
    fn peer(&self) -> &str {
        self.lane
            .peer_reference
            .as_deref()
            .unwrap_or("Teams at a similar stage")
    }

    fn email(&self, label: &str) -> (String, String) {
        let Self {
            first_name,
            company,
            product,
            lane,
        } = self;
        match label {
            "Initial Email" => (
                format!("Quick question for {company}"),
                format!(
                    "Hi {first_name},\n\n\
One pattern I keep running into with teams like {company}: {}\n\n\
{product} is an AI code editor that understands the whole codebase. {}\n\n\
What is your biggest developer productivity challenge right now?",
                    lane.hook, lane.product_angle
                ),
            ),
            "Follow-up Email" => (
                format!("Re: Quick question for {company}"),
                format!(
                    "Hi {first_name},\n\n\
Following up on my note. {product} is built on VS Code, so developers keep their \
extensions, settings and workflows from day one.\n\n\
Worth a 15-minute conversation?"
                ),
            ),
            "Value Email" => (
                format!("Engineering velocity at {company}"),
                format!(
                    "Hi {first_name},\n\n\
Teams using {product} report shipping noticeably faster. Not just autocomplete: \
real codebase understanding for refactors, debugging and onboarding.\n\n\
Happy to show it on your own code in 15 minutes. Does next week work?"
                ),
            ),
            "Peer Proof Email" => (
                format!("What similar teams did at {company}'s stage"),
                format!(
                    "Hi {first_name},\n\n\
{} saw the same pressure you are likely feeling. They started with a small pilot, \
measured adoption for 30 days, then expanded.\n\n\
Would a pilot like that be useful for {company}?",
                    self.peer()
                ),
            ),
            "Multi-thread Email" => (
                format!("Who else should be part of this at {company}?"),
                format!(
                    "Hi {first_name},\n\n\
If developer tooling is not on your plate right now, who at {company} owns it? \
I am glad to share our evaluation framework with them directly."
                ),
            ),
            "Final Email" => (
                format!("Last try: {product} at {company}"),
                format!(
                    "Hi {first_name},\n\n\
I will keep this short. {company} is clearly investing in engineering. {}\n\n\
If the timing is wrong, no worries. If you are curious, I can show you what it looks like.",
                    lane.product_angle
                ),
            ),
            "Breakup Email" => (
                "Closing the loop".to_string(),
                format!(
                    "Hi {first_name},\n\n\
I have not heard back, so I will assume this is not a priority right now. Timing matters.\n\n\
If that changes, just reply here. Best of luck with the engineering growth at {company}."
                ),
            ),
            _ => (
                format!("Following up: {product} for {company}"),
                format!(
                    "Hi {first_name},\n\n\
Circling back in case my earlier notes got buried. {}",
                    lane.product_angle
                ),
            ),
        }
    }

    fn linkedin(&self, label: &str) -> String {
        let Self {
            first_name,
            company,
            product,
            ..
        } = self;
        match label {
            "LinkedIn Connection" => format!(
                "Hi {first_name}, I work with engineering leaders on developer productivity \
and saw your role at {company}. Would be glad to connect."
            ),
            "LinkedIn Content Share" => format!(
                "{first_name}, thought this breakdown of how teams measure AI coding tool \
adoption might be useful for {company}."
            ),
            _ => format!(
                "{first_name}, curious whether {company} is evaluating AI coding tools. \
Seeing a lot of interest in {product} from teams like yours."
            ),
        }
    }

    fn phone(&self, label: &str) -> (String, String) {
        let Self {
            first_name,
            company,
            product,
            ..
        } = self;
        let opener = match label {
            "Intro Call" => format!(
                "Hi {first_name}, this is [Your Name] from {product}. I just sent you a note \
about developer productivity at {company}. Do you have two minutes?"
            ),
            _ => format!(
                "Hi {first_name}, this is [Your Name] from {product}. I have been emailing \
about developer productivity tools. Do you have two minutes?"
            ),
        };
        let voicemail = format!(
            "Hi {first_name}, [Your Name] from {product}. I noticed {company} is investing \
heavily in engineering and wanted to share what similar teams are seeing. \
My number is [phone]. Talk soon."
        );
        (opener, voicemail)
    }

    fn render(&self, step: &CadenceStep) -> String {
        match step.channel {
            StepType::Email => {
                let (subject, body) = self.email(step.label);
                format!("**Subject:** {subject}\n\n**Body:**\n\n{body}\n\nBest,\n[Your Name]\n")
            }
            StepType::LinkedIn => format!("**Message:**\n\n{}\n", self.linkedin(step.label)),
            StepType::Phone => {
                let (opener, voicemail) = self.phone(step.label);
                format!("**Opener:**\n\n{opener}\n\n**If voicemail:**\n{voicemail}\n")
            }
        }
    }
}

/// Build a complete sequence for `lane` without a generator.
pub fn canned_sequence(
    lane: &PersonaLane,
    prospect: &ProspectInfo,
    cadence: Cadence,
    product: &str,
) -> String {
    let touch = Touch {
        first_name: prospect.first_name().unwrap_or("there"),
        company: prospect.company_name().unwrap_or("your company"),
        product,
        lane,
    };

    let mut out = format!(
        "# Outbound Sequence for {} - {}\n\n\
## Sequence Overview\n\
**Target Persona:** {}\n\
**Total Steps:** {}\n\
**Duration:** {} days\n\
**Channels:** Email, LinkedIn, Phone\n\n---\n\n",
        touch.first_name,
        touch.company,
        lane.name,
        cadence.step_count(),
        cadence.span_days()
    );

    for (i, step) in cadence.steps().iter().enumerate() {
        out.push_str(&format!(
            "## Step {}: {} (Day {})\n**Type:** {}\n",
            i + 1,
            step.label,
            step.day,
            step.channel
        ));
        out.push_str(&touch.render(step));
        out.push_str("\n---\n\n");
    }
    out
}
