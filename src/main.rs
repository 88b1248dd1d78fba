use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use outbound_engine::config::{self, GatewayConfig};
use outbound_engine::models::{Cadence, PersonaCatalog, ProspectInfo, SequenceDraft};
use outbound_engine::pipeline::export::company_token;
use outbound_engine::pipeline::generation::GeneratorGateway;
use outbound_engine::workflow::{ExportOutcome, OutboundWorkflow, WorkflowSession, MAX_LANES};

/// Top-level CLI parser for the `outbound` binary.
#[derive(Debug, Parser)]
#[command(
    name = "outbound",
    version,
    about = "Turn account research into outreach sequences and sequencer-ready CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Skip generation backends and use canned content
    #[arg(long, global = true)]
    demo: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Persona catalog JSON file (defaults to the built-in lanes)
    #[arg(long, global = true, value_name = "FILE")]
    personas: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a qualification hypothesis and derive target personas
    Hypothesis {
        /// Research record JSON file
        #[arg(long)]
        research: PathBuf,
        /// Write the hypothesis here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Draft one outreach sequence per persona lane
    Sequence {
        /// Hypothesis markdown file
        #[arg(long)]
        hypothesis: PathBuf,
        /// Prospect JSON file
        #[arg(long)]
        prospect: PathBuf,
        /// Persona lane ids, drafted in the given order
        #[arg(long = "persona", value_name = "ID", required = true, num_args = 1..)]
        lanes: Vec<String>,
        #[arg(long, default_value = "standard")]
        cadence: Cadence,
        /// Defaults to ~/OutboundEngine/drafts
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Convert a drafted sequence into a sequencer CSV
    Export {
        /// Sequence markdown file
        #[arg(long)]
        sequence: PathBuf,
        /// Prospect JSON file
        #[arg(long)]
        prospect: PathBuf,
        /// Persona lane id the sequence was written for
        #[arg(long = "persona", value_name = "ID")]
        lane: Option<String>,
        #[arg(long, default_value = "standard")]
        cadence: Cadence,
        /// Defaults to ~/OutboundEngine/exports
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Research to CSV in one pass; exports the first drafted lane
    Run {
        #[arg(long)]
        research: PathBuf,
        #[arg(long)]
        prospect: PathBuf,
        /// Persona lane ids (defaults to the derived personas)
        #[arg(long = "persona", value_name = "ID")]
        lanes: Vec<String>,
        #[arg(long, default_value = "standard")]
        cadence: Cadence,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// List the persona catalog
    Personas,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("outbound error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    outbound_engine::init_tracing(cli.verbose, cli.quiet);

    let mut workflow = build_workflow(&cli)?;

    match cli.command {
        Commands::Hypothesis { research, out } => {
            let mut session = WorkflowSession::new(Cadence::Standard);
            workflow.submit_research(&mut session, read_json(&research)?)?;
            report_notices(&session);

            let hypothesis = session
                .hypothesis
                .as_ref()
                .context("hypothesis stage produced nothing")?;
            match out {
                Some(path) => {
                    write_file(&path, &hypothesis.text)?;
                    println!("Hypothesis written to {}", path.display());
                }
                None => println!("{}\n", hypothesis.text),
            }
            print_personas(&session);
        }
        Commands::Sequence {
            hypothesis,
            prospect,
            lanes,
            cadence,
            out_dir,
        } => {
            let text = fs::read_to_string(&hypothesis)
                .with_context(|| format!("failed to read hypothesis {}", hypothesis.display()))?;
            let mut session = WorkflowSession::new(cadence);
            session.import_hypothesis(&text);
            workflow.draft_sequences(&mut session, &lanes, read_json(&prospect)?)?;
            report_notices(&session);

            let out_dir = out_dir.unwrap_or_else(config::drafts_dir);
            for draft in &session.drafts {
                let path = out_dir.join(draft_file_name(draft, &session.prospect));
                write_file(&path, &draft.text)?;
                println!("{} ({}) -> {}", draft.persona_name, draft.lane_id, path.display());
            }
        }
        Commands::Export {
            sequence,
            prospect,
            lane,
            cadence,
            out_dir,
        } => {
            let text = fs::read_to_string(&sequence)
                .with_context(|| format!("failed to read sequence {}", sequence.display()))?;
            let prospect: ProspectInfo = read_json(&prospect)?;
            let (lane_id, persona_name) = match lane.as_deref() {
                Some(id) => {
                    let lane = workflow
                        .catalog()
                        .get(id)
                        .with_context(|| format!("unknown persona lane '{id}'"))?;
                    (lane.id.clone(), lane.name.clone())
                }
                None => ("imported".to_string(), String::new()),
            };
            let draft = SequenceDraft::from_text(&lane_id, &persona_name, cadence, &text);

            let out_dir = out_dir.unwrap_or_else(config::exports_dir);
            let outcome = workflow.export_draft(&draft, &prospect, &out_dir)?;
            print_export(&outcome);
        }
        Commands::Run {
            research,
            prospect,
            lanes,
            cadence,
            out_dir,
        } => {
            let mut session = WorkflowSession::new(cadence);
            workflow.submit_research(&mut session, read_json(&research)?)?;
            print_personas(&session);

            let lanes: Vec<String> = if lanes.is_empty() {
                session
                    .personas
                    .as_ref()
                    .map(|p| p.lanes.iter().take(MAX_LANES).map(|l| l.id.clone()).collect())
                    .unwrap_or_default()
            } else {
                lanes
            };
            workflow.draft_sequences(&mut session, &lanes, read_json(&prospect)?)?;
            report_notices(&session);

            let first = session
                .drafts
                .first()
                .context("no sequence was drafted")?
                .lane_id
                .clone();
            let out_dir = out_dir.unwrap_or_else(config::exports_dir);
            let outcome = workflow.export_lane(&session, &first, &out_dir)?;
            print_export(&outcome);
        }
        Commands::Personas => {
            for lane in workflow.catalog().lanes() {
                println!("{:<16} {}", lane.id, lane.name);
                println!("{:<16} hook: {}", "", lane.hook);
            }
        }
    }

    Ok(())
}

fn build_workflow(cli: &Cli) -> anyhow::Result<OutboundWorkflow> {
    let catalog = match &cli.personas {
        Some(path) => PersonaCatalog::load(path)
            .with_context(|| format!("failed to load persona catalog {}", path.display()))?,
        None => PersonaCatalog::default(),
    };

    let gateway_config = if cli.demo {
        GatewayConfig::demo()
    } else {
        GatewayConfig::from_env()
    };
    let gateway = GeneratorGateway::from_config(&gateway_config)
        .context("failed to initialize generation backends")?;
    if !gateway.is_available() && !cli.demo {
        tracing::warn!("No generation backend configured, drafting stages will use canned content");
    }

    Ok(OutboundWorkflow::new(gateway, catalog, gateway_config.product_name))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn draft_file_name(draft: &SequenceDraft, prospect: &ProspectInfo) -> String {
    format!(
        "sequence_{}_{}.md",
        draft.lane_id,
        company_token(prospect.company_name())
    )
}

fn report_notices(session: &WorkflowSession) {
    for notice in &session.notices {
        eprintln!("warning: {notice}");
        if notice.quota_or_rate_limited {
            eprintln!("         backends are rate limited or out of quota; retry later for generated content");
        }
    }
}

fn print_personas(session: &WorkflowSession) {
    let Some(personas) = &session.personas else {
        return;
    };
    println!("Target personas ({:?}):", personas.method);
    for lane in &personas.lanes {
        println!("  {:<16} {}", lane.id, lane.name);
    }
}

fn print_export(outcome: &ExportOutcome) {
    for warning in &outcome.conversion.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "Exported {} rows ({} parse) to {}",
        outcome.rows,
        outcome.conversion.strategy,
        outcome.path.display()
    );
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "outbound",
            "sequence",
            "--hypothesis",
            "h.md",
            "--prospect",
            "p.json",
            "--persona",
            "cto",
            "platform_devex",
            "--cadence",
            "extended",
            "--demo",
        ])
        .unwrap();

        assert!(cli.demo);
        match cli.command {
            Commands::Sequence { lanes, cadence, .. } => {
                assert_eq!(lanes, vec!["cto", "platform_devex"]);
                assert_eq!(cadence, Cadence::Extended);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sequence_requires_a_persona() {
        assert!(Cli::try_parse_from([
            "outbound",
            "sequence",
            "--hypothesis",
            "h.md",
            "--prospect",
            "p.json",
        ])
        .is_err());
    }

    #[test]
    fn unknown_cadence_is_rejected() {
        assert!(Cli::try_parse_from([
            "outbound",
            "export",
            "--sequence",
            "s.md",
            "--prospect",
            "p.json",
            "--cadence",
            "weekly",
        ])
        .is_err());
    }

    #[test]
    fn draft_files_are_named_by_lane_and_company() {
        let draft = SequenceDraft::from_text("cto", "CTO", Cadence::Standard, "## Step 1");
        let prospect = ProspectInfo {
            company: Some("Acme Corp".into()),
            ..Default::default()
        };
        assert_eq!(draft_file_name(&draft, &prospect), "sequence_cto_acme_corp.md");
    }
}
