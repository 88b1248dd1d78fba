use serde::{Deserialize, Serialize};

/// Static attributes of the person a sequence is addressed to.
/// Every attribute is optional; the export renders absent ones as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectInfo {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
}

impl ProspectInfo {
    /// Company name, if one was supplied and is not blank.
    pub fn company_name(&self) -> Option<&str> {
        non_blank(self.company.as_deref())
    }

    pub fn first_name(&self) -> Option<&str> {
        non_blank(self.first_name.as_deref())
    }

    /// Copy with `title` filled from `fallback` when the prospect has none.
    pub fn with_default_title(&self, fallback: &str) -> Self {
        let mut filled = self.clone();
        if non_blank(filled.title.as_deref()).is_none() {
            filled.title = Some(fallback.to_string());
        }
        filled
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_company_reads_as_absent() {
        let prospect = ProspectInfo {
            company: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(prospect.company_name(), None);
    }

    #[test]
    fn default_title_only_fills_gaps() {
        let without = ProspectInfo::default().with_default_title("CTO");
        assert_eq!(without.title.as_deref(), Some("CTO"));

        let with = ProspectInfo {
            title: Some("Head of Platform".into()),
            ..Default::default()
        };
        assert_eq!(
            with.with_default_title("CTO").title.as_deref(),
            Some("Head of Platform")
        );
    }
}
