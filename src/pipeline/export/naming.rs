/// Fallback token when the company name yields nothing usable.
const DEFAULT_TOKEN: &str = "export";

/// Filesystem-safe lowercase token for a company name.
///
/// Spaces become underscores, placeholder brackets are dropped, and any
/// other character that is not alphanumeric, `_` or `-` is removed.
pub fn company_token(company: Option<&str>) -> String {
    let token: String = company
        .unwrap_or("")
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '[' | ']' | '{' | '}' | '<' | '>' => None,
            c if c.is_alphanumeric() || c == '_' || c == '-' => Some(c),
            _ => None,
        })
        .collect();

    if token.trim_matches('_').is_empty() {
        DEFAULT_TOKEN.to_string()
    } else {
        token
    }
}

pub fn export_file_name(company: Option<&str>) -> String {
    format!("outreach_sequence_{}.csv", company_token(company))
}
