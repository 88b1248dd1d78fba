//! Workflow session and stage driver.
//!
//! `WorkflowSession` holds every entity produced for one account: research,
//! hypothesis, derived personas, drafts, prospect and fallback notices. It is
//! passed by reference into each stage of `OutboundWorkflow`, which owns the
//! generator gateway and the persona catalog and runs stages strictly one
//! after another. Lanes are drafted in selection order because a failover in
//! one pass changes which backend the next pass starts with.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Cadence, Hypothesis, PersonaCatalog, PersonaLane, ProspectInfo, ResearchRecord,
    SequenceDraft, TextSource,
};
use crate::pipeline::conversion::{Conversion, ConversionError, SequenceNormalizer};
use crate::pipeline::export::{assemble_export, write_export, ExportError};
use crate::pipeline::generation::{GenerationError, GeneratorGateway};
use crate::pipeline::hypothesis::{canned_hypothesis, derive_personas, request_hypothesis, PersonaDerivation};
use crate::pipeline::sequence::{request_sequence, DraftRequest};

/// Most persona lanes drafted in one pass.
pub const MAX_LANES: usize = 3;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Research is empty: provide at least one research field")]
    EmptyResearch,

    #[error("No hypothesis available: submit research or import a hypothesis first")]
    MissingHypothesis,

    #[error("Select between 1 and {MAX_LANES} persona lanes (got {count})")]
    InvalidLaneSelection { count: usize },

    #[error("Unknown persona lane: {0}")]
    UnknownPersona(String),

    #[error("No sequence drafted for persona lane: {0}")]
    MissingDraft(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Hypothesis,
    Sequence,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hypothesis => f.write_str("hypothesis"),
            Self::Sequence => f.write_str("sequence"),
        }
    }
}

/// Record of a stage that degraded to canned content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackNotice {
    pub stage: WorkflowStage,
    pub lane_id: Option<String>,
    pub reason: String,
    /// Every backend failed on rate limit or quota, so retrying later may help.
    pub quota_or_rate_limited: bool,
}

impl FallbackNotice {
    fn new(stage: WorkflowStage, lane_id: Option<&str>, error: &GenerationError) -> Self {
        let reason = match error {
            GenerationError::Exhausted { attempts } => format!(
                "{error}: {}",
                attempts
                    .iter()
                    .map(|a| format!("{} {}", a.provider, a.kind.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            other => other.to_string(),
        };
        Self {
            stage,
            lane_id: lane_id.map(str::to_string),
            reason,
            quota_or_rate_limited: error.is_quota_or_rate_limited(),
        }
    }
}

impl fmt::Display for FallbackNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lane_id {
            Some(lane) => write!(f, "{} ({lane}) used canned content: {}", self.stage, self.reason),
            None => write!(f, "{} used canned content: {}", self.stage, self.reason),
        }
    }
}

/// Everything produced for one account, owned by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub cadence: Cadence,
    pub research: Option<ResearchRecord>,
    pub hypothesis: Option<Hypothesis>,
    pub personas: Option<PersonaDerivation>,
    pub prospect: ProspectInfo,
    /// One draft per lane, in the order lanes were first drafted.
    pub drafts: Vec<SequenceDraft>,
    pub notices: Vec<FallbackNotice>,
}

impl WorkflowSession {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            cadence,
            research: None,
            hypothesis: None,
            personas: None,
            prospect: ProspectInfo::default(),
            drafts: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Use a hypothesis written elsewhere. Drafts from an earlier
    /// hypothesis are discarded.
    pub fn import_hypothesis(&mut self, text: &str) {
        self.hypothesis = Some(Hypothesis {
            text: text.to_string(),
            source: TextSource::Imported,
            generated_at: Utc::now(),
        });
        self.personas = None;
        self.drafts.clear();
    }

    pub fn draft_for(&self, lane_id: &str) -> Option<&SequenceDraft> {
        self.drafts.iter().find(|d| d.lane_id == lane_id)
    }

    /// Store a draft, replacing any earlier draft for the same lane.
    pub fn store_draft(&mut self, draft: SequenceDraft) {
        match self.drafts.iter_mut().find(|d| d.lane_id == draft.lane_id) {
            Some(existing) => *existing = draft,
            None => self.drafts.push(draft),
        }
    }
}

/// Result of exporting one lane.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
    pub conversion: Conversion,
}

// ═══════════════════════════════════════════════════════════
// Stage driver
// ═══════════════════════════════════════════════════════════

pub struct OutboundWorkflow {
    gateway: GeneratorGateway,
    catalog: PersonaCatalog,
    product: String,
}

impl OutboundWorkflow {
    pub fn new(gateway: GeneratorGateway, catalog: PersonaCatalog, product: impl Into<String>) -> Self {
        Self {
            gateway,
            catalog,
            product: product.into(),
        }
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &GeneratorGateway {
        &self.gateway
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// Accept research, generate the hypothesis and derive personas.
    /// Earlier hypothesis, personas and drafts are discarded.
    pub fn submit_research(
        &mut self,
        session: &mut WorkflowSession,
        research: ResearchRecord,
    ) -> Result<(), WorkflowError> {
        if research.is_blank() {
            return Err(WorkflowError::EmptyResearch);
        }
        session.research = Some(research);
        session.hypothesis = None;
        session.personas = None;
        session.drafts.clear();

        self.generate_hypothesis(session)?;
        self.derive_personas(session)?;
        Ok(())
    }

    /// (Re)generate the hypothesis from the session's research, degrading
    /// to canned content on any generator failure.
    pub fn generate_hypothesis(&mut self, session: &mut WorkflowSession) -> Result<(), WorkflowError> {
        let research = session.research.as_ref().ok_or(WorkflowError::EmptyResearch)?;
        let _span = tracing::info_span!("generate_hypothesis", session = %session.id).entered();

        let hypothesis = match request_hypothesis(&mut self.gateway, research, &self.product) {
            Ok(generated) => {
                tracing::info!(
                    provider = %generated.provider,
                    chars = generated.text.len(),
                    "Hypothesis generated"
                );
                Hypothesis {
                    text: generated.text,
                    source: TextSource::Generated(generated.provider),
                    generated_at: Utc::now(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Hypothesis generation failed, using canned hypothesis");
                session
                    .notices
                    .push(FallbackNotice::new(WorkflowStage::Hypothesis, None, &e));
                Hypothesis {
                    text: canned_hypothesis(research, &self.catalog, &self.product),
                    source: TextSource::Canned,
                    generated_at: Utc::now(),
                }
            }
        };

        session.hypothesis = Some(hypothesis);
        session.personas = None;
        session.drafts.clear();
        Ok(())
    }

    pub fn derive_personas(&mut self, session: &mut WorkflowSession) -> Result<(), WorkflowError> {
        let hypothesis = session
            .hypothesis
            .as_ref()
            .ok_or(WorkflowError::MissingHypothesis)?;
        let derivation = derive_personas(&mut self.gateway, &self.catalog, &hypothesis.text);
        tracing::info!(
            lanes = derivation.lanes.len(),
            method = ?derivation.method,
            "Personas derived"
        );
        session.personas = Some(derivation);
        Ok(())
    }

    /// Draft one sequence per selected lane, in selection order. Repeated
    /// ids are drafted once; re-drafting a lane replaces its earlier draft.
    pub fn draft_sequences<S: AsRef<str>>(
        &mut self,
        session: &mut WorkflowSession,
        lane_ids: &[S],
        prospect: ProspectInfo,
    ) -> Result<(), WorkflowError> {
        let lanes = self.select_lanes(lane_ids)?;
        let hypothesis = session
            .hypothesis
            .as_ref()
            .map(|h| h.text.clone())
            .ok_or(WorkflowError::MissingHypothesis)?;
        session.prospect = prospect;

        for lane in &lanes {
            let _span = tracing::info_span!("draft_sequence", lane = %lane.id).entered();
            let request = DraftRequest {
                lane,
                prospect: &session.prospect,
                hypothesis: &hypothesis,
                cadence: session.cadence,
                product: &self.product,
            };

            let (text, source) = match request_sequence(&mut self.gateway, &request) {
                Ok(generated) => {
                    tracing::info!(
                        provider = %generated.provider,
                        chars = generated.text.len(),
                        "Sequence drafted"
                    );
                    (generated.text, TextSource::Generated(generated.provider))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Sequence drafting failed, using canned sequence");
                    let notice = FallbackNotice::new(WorkflowStage::Sequence, Some(lane.id.as_str()), &e);
                    session.notices.push(notice);
                    (request.canned(), TextSource::Canned)
                }
            };

            session.store_draft(SequenceDraft {
                lane_id: lane.id.clone(),
                persona_name: lane.name.clone(),
                cadence: session.cadence,
                text,
                source,
                generated_at: Utc::now(),
            });
        }
        Ok(())
    }

    fn select_lanes<S: AsRef<str>>(&self, lane_ids: &[S]) -> Result<Vec<PersonaLane>, WorkflowError> {
        let mut lanes: Vec<PersonaLane> = Vec::new();
        for id in lane_ids {
            let id = id.as_ref().trim();
            let lane = self
                .catalog
                .get(id)
                .ok_or_else(|| WorkflowError::UnknownPersona(id.to_string()))?;
            if !lanes.iter().any(|l| l.id == lane.id) {
                lanes.push(lane.clone());
            }
        }
        if lanes.is_empty() || lanes.len() > MAX_LANES {
            return Err(WorkflowError::InvalidLaneSelection { count: lanes.len() });
        }
        Ok(lanes)
    }

    /// Convert the session's draft for `lane_id` and write the export file.
    pub fn export_lane(
        &mut self,
        session: &WorkflowSession,
        lane_id: &str,
        out_dir: &Path,
    ) -> Result<ExportOutcome, WorkflowError> {
        let draft = session
            .draft_for(lane_id)
            .ok_or_else(|| WorkflowError::MissingDraft(lane_id.to_string()))?;
        self.export_draft(draft, &session.prospect, out_dir)
    }

    /// Convert any draft and write the export file. There is no canned
    /// fallback here: a generator or parse failure writes nothing.
    pub fn export_draft(
        &mut self,
        draft: &SequenceDraft,
        prospect: &ProspectInfo,
        out_dir: &Path,
    ) -> Result<ExportOutcome, WorkflowError> {
        let conversion = SequenceNormalizer::new(&mut self.gateway).convert(draft)?;

        let records = assemble_export(
            &conversion.steps,
            prospect,
            Some(draft.persona_name.as_str()).filter(|name| !name.trim().is_empty()),
            &self.product,
        );
        let path = write_export(out_dir, prospect.company_name(), &records)?;

        Ok(ExportOutcome {
            path,
            rows: records.len(),
            conversion,
        })
    }
}
