use serde::{Deserialize, Serialize};

/// Free-text account research submitted for one hypothesis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchRecord {
    pub company_info: String,
    pub job_postings: String,
    pub linkedin_profiles: String,
    pub news_signals: String,
    pub reference_customers: Option<String>,
}

impl ResearchRecord {
    /// True when no field carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        [
            self.company_info.as_str(),
            self.job_postings.as_str(),
            self.linkedin_profiles.as_str(),
            self.news_signals.as_str(),
            self.reference_customers.as_deref().unwrap_or(""),
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_blank() {
        assert!(ResearchRecord::default().is_blank());
    }

    #[test]
    fn whitespace_only_is_blank() {
        let record = ResearchRecord {
            company_info: "   \n".into(),
            reference_customers: Some("\t".into()),
            ..Default::default()
        };
        assert!(record.is_blank());
    }

    #[test]
    fn any_field_makes_it_non_blank() {
        let record = ResearchRecord {
            news_signals: "Raised a Series C".into(),
            ..Default::default()
        };
        assert!(!record.is_blank());
    }

    #[test]
    fn missing_json_fields_default_to_empty() {
        let record: ResearchRecord =
            serde_json::from_str(r#"{"company_info": "Acme builds rockets"}"#).unwrap();
        assert_eq!(record.company_info, "Acme builds rockets");
        assert!(record.job_postings.is_empty());
        assert!(record.reference_customers.is_none());
    }
}
