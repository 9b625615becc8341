//! Deterministic vitest template generator

use aitests_core::{GenerationRequest, GenerationResult, TestBlock, TestKind};
use aitests_engine::{
    CapabilityResult, GenerateRequest, RepairRequest, TestContext, TestGenerator,
};

/// Warning attached to every repair suggestion
pub const REPAIR_WARNING: &str = "Verify fix manually before committing.";

const TEMPLATE_DURATION_MS: u64 = 50;
const SCRIPT_EXTENSIONS: [&str; 4] = [".tsx", ".ts", ".jsx", ".js"];

fn import_path(file_path: &str) -> &str {
    SCRIPT_EXTENSIONS
        .iter()
        .find_map(|ext| file_path.strip_suffix(ext))
        .unwrap_or(file_path)
}

fn render_block(request: &GenerationRequest, context: &TestContext, title: &str) -> TestBlock {
    let code = format!(
        "import {{ describe, it, expect }} from 'vitest';\n\
         import {{ target }} from '{import}';\n\
         \n\
         describe('{file}', () => {{\n  \
           it('{title}', () => {{\n    \
             // Context: {summary}\n    \
             expect(target()).toBeDefined();\n  \
           }});\n\
         }});",
        import = import_path(&request.file_path),
        file = request.file_path,
        summary = context.summary,
    );
    TestBlock {
        title: title.to_string(),
        code,
        reason: Some(context.summary.clone()),
    }
}

/// Generator emitting one vitest block per request
///
/// Repairs are always flagged for review.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

#[async_trait::async_trait]
impl TestGenerator for TemplateGenerator {
    async fn generate(&self, request: GenerateRequest) -> CapabilityResult<GenerationResult> {
        let title = match request.request.kind {
            TestKind::Integration => "should exercise integration scenario",
            TestKind::Unit => "should cover core logic",
        };
        let block = render_block(&request.request, &request.context, title);
        Ok(
            GenerationResult::new(request.request, request.output_path, vec![block])?
                .with_duration_ms(TEMPLATE_DURATION_MS),
        )
    }

    async fn repair(&self, request: RepairRequest) -> CapabilityResult<GenerationResult> {
        tracing::debug!(file = %request.file_path, error = %request.error, "templating repair");
        let generation = GenerationRequest::repair(&request.file_path);
        let block = render_block(&generation, &request.context, "should address failing assertion");
        Ok(
            GenerationResult::new(generation, request.output_path, vec![block])?
                .with_needs_review(true)
                .with_warning(REPAIR_WARNING)
                .with_duration_ms(TEMPLATE_DURATION_MS),
        )
    }
}
