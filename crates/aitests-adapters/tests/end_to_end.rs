//! Full lifecycle against a temporary directory with the mock runner

use aitests_adapters::{services_for, ARTIFACTS_DIR};
use aitests_core::{IterationStatus, RunStatus};
use aitests_engine::{
    AuditInput, GenerateInput, InitInput, PlanInput, RepairInput, RunInput, TestsEngine,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn touch(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn lifecycle_with_mock_runner() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(root, "kb.config.json", r#"{ "aiTests": { "runner": "mock" } }"#);
    touch(root, "src/core/a.ts", "export const target = () => 1;");
    touch(root, "src/util/b.ts", "export const target = () => 2;");
    touch(root, "src/util/b.test.ts", "");

    let engine = TestsEngine::new(services_for(root));

    let init = engine.init(InitInput::default()).await.unwrap();
    assert_eq!(init.created, vec!["tests", "tests/README.md"]);
    assert!(root.join(format!("{ARTIFACTS_DIR}/metadata.json")).exists());

    let plan = engine.plan(PlanInput::default()).await.unwrap();
    assert_eq!(plan.total_targets, 2);
    assert_eq!(plan.not_covered, 1);

    let generated = engine.generate(GenerateInput::default()).await.unwrap();
    assert_eq!(generated.generated.len(), 1);
    let written = fs::read_to_string(root.join("tests/core/a.test.ts")).unwrap();
    assert!(written.contains("from 'vitest'"));
    assert!(written.contains("import { target } from 'src/core/a';"));

    // the plan still lists the target, so the second pass collides
    let again = engine.generate(GenerateInput::default()).await.unwrap();
    assert!(again.generated[0].needs_review());
    assert_eq!(
        again.artifacts.last().map(String::as_str),
        Some(".kb/artifacts/ai-tests/suggestions/0-tests_core_a.test.ts.json")
    );

    let run = engine.run(RunInput::default()).await.unwrap();
    assert_eq!(run.result.status, RunStatus::Success);
    let log = fs::read_to_string(root.join(&run.log_path)).unwrap();
    assert!(log.contains("status=success"));

    let repair = engine.repair(RepairInput::default()).await.unwrap();
    assert_eq!(repair.iteration.status(), IterationStatus::Fixed);
    assert_eq!(repair.iteration.attempt_index(), 2);

    let audit = engine.audit(AuditInput::default()).await.unwrap();
    assert_eq!(audit.score, 100);
    let report = fs::read_to_string(root.join(&audit.report_path)).unwrap();
    assert!(report.starts_with("# AI Tests Audit Report"));
}
