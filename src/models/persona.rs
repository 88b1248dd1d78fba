use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// A named audience segment that one outreach sequence is written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaLane {
    pub id: String,
    pub name: String,
    /// Example job titles that belong to this lane.
    #[serde(default)]
    pub titles: Vec<String>,
    /// Opening angle for the first touch.
    pub hook: String,
    /// How the product maps onto this persona's priorities.
    pub product_angle: String,
    #[serde(default)]
    pub peer_reference: Option<String>,
    /// Case-insensitive terms that identify this lane inside free text.
    #[serde(default)]
    pub match_terms: Vec<String>,
}

impl PersonaLane {
    /// Whether `text` mentions this lane by name, title or match term.
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.search_terms()
            .any(|term| contains_word(&haystack, &term.to_lowercase()))
    }

    /// Whether a free-form persona label refers to this lane.
    pub fn matches_label(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return false;
        }
        self.search_terms().any(|term| {
            let term = term.to_lowercase();
            contains_word(&label, &term) || contains_word(&term, &label)
        })
    }

    fn search_terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.titles.iter().map(String::as_str))
            .chain(self.match_terms.iter().map(String::as_str))
            .filter(|t| !t.trim().is_empty())
    }
}

/// Substring search that only accepts matches on word boundaries,
/// so "cto" does not match inside "director".
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// The set of persona lanes available for sequence generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaCatalog {
    lanes: Vec<PersonaLane>,
}

impl PersonaCatalog {
    pub fn new(lanes: Vec<PersonaLane>) -> Result<Self, ModelError> {
        if lanes.is_empty() {
            return Err(ModelError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for lane in &lanes {
            if !seen.insert(lane.id.as_str()) {
                return Err(ModelError::DuplicateLane(lane.id.clone()));
            }
        }
        Ok(Self { lanes })
    }

    /// Load lanes from a JSON array on disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let lanes: Vec<PersonaLane> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), lanes = lanes.len(), "Loaded persona catalog");
        Self::new(lanes)
    }

    pub fn lanes(&self) -> &[PersonaLane] {
        &self.lanes
    }

    pub fn get(&self, id: &str) -> Option<&PersonaLane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PersonaLane> {
        self.lanes
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve a model-produced persona label to a lane.
    /// Exact name matches win over fuzzy term matches.
    pub fn resolve_label(&self, label: &str) -> Option<&PersonaLane> {
        self.find_by_name(label)
            .or_else(|| self.lanes.iter().find(|l| l.matches_label(label)))
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
        }
    }
}

fn default_lanes() -> Vec<PersonaLane> {
    vec![
        PersonaLane {
            id: "eng_leadership".into(),
            name: "VP/Director of Engineering".into(),
            titles: vec![
                "VP of Engineering".into(),
                "Director of Engineering".into(),
                "Head of Engineering".into(),
            ],
            hook: "Shipping velocity is lagging behind headcount growth.".into(),
            product_angle: "Codebase-aware AI editing lifts output without adding headcount."
                .into(),
            peer_reference: Some("Engineering leaders at similar-stage companies".into()),
            match_terms: vec!["VP".into(), "Director".into()],
        },
        PersonaLane {
            id: "platform_devex".into(),
            name: "Platform/DevEx Engineering Lead".into(),
            titles: vec![
                "Platform Engineering Lead".into(),
                "Developer Experience Lead".into(),
                "Staff Engineer, Developer Productivity".into(),
            ],
            hook: "A new DevEx or platform team is being built out.".into(),
            product_angle: "Drop-in editor with zero learning curve and measurable adoption."
                .into(),
            peer_reference: Some("DevEx teams that rolled out to 90% of developers".into()),
            match_terms: vec!["Platform".into(), "DevEx".into(), "Developer Experience".into()],
        },
        PersonaLane {
            id: "cto".into(),
            name: "CTO".into(),
            titles: vec!["CTO".into(), "Chief Technology Officer".into()],
            hook: "Engineering cost is growing faster than engineering output.".into(),
            product_angle: "Strategic AI investment with enterprise security posture.".into(),
            peer_reference: None,
            match_terms: vec!["Chief Technology".into()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_three_lanes() {
        let catalog = PersonaCatalog::default();
        let ids: Vec<&str> = catalog.lanes().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["eng_leadership", "platform_devex", "cto"]);
    }

    #[test]
    fn lookup_by_id_and_name() {
        let catalog = PersonaCatalog::default();
        assert_eq!(catalog.get("cto").unwrap().name, "CTO");
        assert!(catalog.get("CTO").is_none());
        assert_eq!(
            catalog.find_by_name("platform/devex engineering lead").unwrap().id,
            "platform_devex"
        );
    }

    #[test]
    fn resolves_loose_labels() {
        let catalog = PersonaCatalog::default();
        assert_eq!(catalog.resolve_label("VP Engineering").unwrap().id, "eng_leadership");
        assert_eq!(catalog.resolve_label("DevEx Lead").unwrap().id, "platform_devex");
        assert_eq!(
            catalog.resolve_label("Chief Technology Officer").unwrap().id,
            "cto"
        );
        assert!(catalog.resolve_label("Head of Sales").is_none());
        assert!(catalog.resolve_label("   ").is_none());
    }

    #[test]
    fn mention_detection_is_case_insensitive() {
        let catalog = PersonaCatalog::default();
        let lane = catalog.get("platform_devex").unwrap();
        assert!(lane.is_mentioned_in("They are hiring a devex manager."));
        assert!(!lane.is_mentioned_in("Nothing relevant here."));
    }

    #[test]
    fn short_terms_only_match_whole_words() {
        let catalog = PersonaCatalog::default();
        let cto = catalog.get("cto").unwrap();
        assert!(!cto.is_mentioned_in("Reach the Director of Engineering first."));
        assert!(cto.is_mentioned_in("Loop in the CTO during week three."));
        assert_eq!(
            catalog.resolve_label("Director of Engineering").unwrap().id,
            "eng_leadership"
        );
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(
            PersonaCatalog::new(vec![]),
            Err(ModelError::EmptyCatalog)
        ));
        let lane = PersonaCatalog::default().lanes()[0].clone();
        assert!(matches!(
            PersonaCatalog::new(vec![lane.clone(), lane]),
            Err(ModelError::DuplicateLane(id)) if id == "eng_leadership"
        ));
    }

    #[test]
    fn loads_catalog_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lanes.json");
        std::fs::write(
            &path,
            r#"[{"id": "sec", "name": "CISO", "hook": "Audit season", "product_angle": "Privacy mode"}]"#,
        )
        .unwrap();

        let catalog = PersonaCatalog::load(&path).unwrap();
        let lane = catalog.get("sec").unwrap();
        assert_eq!(lane.name, "CISO");
        assert!(lane.titles.is_empty());
        assert!(lane.peer_reference.is_none());
    }

    #[test]
    fn malformed_catalog_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lanes.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PersonaCatalog::load(&path),
            Err(ModelError::CatalogFormat(_))
        ));
    }
}
