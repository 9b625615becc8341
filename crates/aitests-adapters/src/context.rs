//! Path-derived context lookup

use aitests_core::paths::display_name;
use aitests_engine::{CapabilityResult, ContextLookup, TestContext};

const RELATED: [&str; 2] = ["ADR-001-test-strategy", "ADR-002-quality-gates"];
const EXAMPLES: [&str; 2] = [
    "Example: ensure function handles null inputs.",
    "Example: snapshot critical errors.",
];

/// Context lookup that derives everything from the path
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicContextLookup;

#[async_trait::async_trait]
impl ContextLookup for HeuristicContextLookup {
    async fn fetch_context(&self, path: &str) -> CapabilityResult<TestContext> {
        Ok(TestContext {
            summary: format!("Auto-generated summary for {}", display_name(path)),
            related_ids: RELATED.iter().map(ToString::to_string).collect(),
            examples: EXAMPLES.iter().map(ToString::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summary_names_last_two_segments() {
        let context = HeuristicContextLookup
            .fetch_context("src\\core\\deep\\a.ts")
            .await
            .unwrap();
        assert_eq!(context.summary, "Auto-generated summary for deep/a.ts");
        assert_eq!(context.related_ids.len(), 2);
    }
}
