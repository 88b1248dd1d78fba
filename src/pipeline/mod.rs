pub mod cadence;
pub mod conversion;
pub mod export;
pub mod generation;
pub mod hypothesis;
pub mod sequence;

/// Product context shared by the hypothesis and drafting prompts.
pub fn product_brief(product: &str) -> String {
    format!(
        "{product} is an AI-first code editor built on VS Code. It understands the whole \
codebase, so developers can ask questions, refactor and debug across many files. \
Teams adopt it without retraining because existing extensions and settings carry over. \
Enterprise buyers get SOC 2 compliance and a privacy mode that keeps code off remote storage."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_names_the_product() {
        assert!(product_brief("Acme IDE").starts_with("Acme IDE is an AI-first code editor"));
    }
}
