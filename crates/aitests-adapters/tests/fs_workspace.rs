use aitests_adapters::{FsWorkspace, ARTIFACTS_DIR};
use aitests_core::{
    CoreError, CoveragePlan, CoverageStatus, CoverageTarget, GenerationRequest, GenerationResult,
    IterationHistory, IterationRecordBuilder, IterationStatus, Priority, TestBlock, TestKind,
};
use aitests_engine::{CapabilityError, Workspace};
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn workspace() -> (TempDir, FsWorkspace) {
    let dir = tempfile::tempdir().unwrap();
    let ws = FsWorkspace::new(dir.path());
    (dir, ws)
}

fn generated(output_path: &str) -> GenerationResult {
    GenerationResult::new(
        GenerationRequest::repair("src/core/a.ts"),
        output_path,
        vec![TestBlock {
            title: "works".into(),
            code: "it('works', () => {});".into(),
            reason: None,
        }],
    )
    .unwrap()
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn glob_sources_skips_tests_and_vendored_dirs() {
    let (dir, ws) = workspace();
    touch(dir.path(), "src/core/a.ts", "");
    touch(dir.path(), "src/core/a.test.ts", "");
    touch(dir.path(), "src/b.ts", "");
    touch(dir.path(), "src/b.spec.ts", "");
    touch(dir.path(), "src/node_modules/dep/index.ts", "");
    touch(dir.path(), "lib/c.ts", "");
    touch(dir.path(), "src/readme.md", "");

    let sources = ws
        .glob_sources(&["src/**/*.ts".to_string()])
        .await
        .unwrap();

    assert_eq!(sources, vec!["src/b.ts", "src/core/a.ts"]);
}

#[tokio::test]
async fn glob_sources_deduplicates_overlapping_globs() {
    let (dir, ws) = workspace();
    touch(dir.path(), "src/a.ts", "");

    let sources = ws
        .glob_sources(&["src/**/*.ts".to_string(), "src/*.ts".to_string()])
        .await
        .unwrap();

    assert_eq!(sources, vec!["src/a.ts"]);
}

#[tokio::test]
async fn single_star_does_not_cross_directories() {
    let (dir, ws) = workspace();
    touch(dir.path(), "src/top.ts", "");
    touch(dir.path(), "src/core/nested.ts", "");

    let shallow = ws.glob_sources(&["src/*.ts".to_string()]).await.unwrap();
    assert_eq!(shallow, vec!["src/top.ts"]);

    let deep = ws.glob_sources(&["src/**/*.ts".to_string()]).await.unwrap();
    assert_eq!(deep, vec!["src/core/nested.ts", "src/top.ts"]);
}

#[tokio::test]
async fn invalid_glob_is_reported() {
    let (_dir, ws) = workspace();
    let err = ws.glob_sources(&["src/[".to_string()]).await.unwrap_err();
    assert!(matches!(err, CapabilityError::InvalidPattern { .. }));
}

#[tokio::test]
async fn detects_sibling_and_dedicated_tests() {
    let (dir, ws) = workspace();
    touch(dir.path(), "src/core/a.ts", "");
    touch(dir.path(), "src/core/a.spec.ts", "");
    touch(dir.path(), "src/util/b.ts", "");
    touch(dir.path(), "tests/util/b.test.ts", "");
    touch(dir.path(), "src/util/bc.ts", "");

    let sources = vec![
        "src/core/a.ts".to_string(),
        "src/util/b.ts".to_string(),
        "src/util/bc.ts".to_string(),
    ];
    let detections = ws.detect_tests(&sources, "tests").await.unwrap();

    let a = detections["src/core/a.ts"];
    assert!(a.has_sibling_test);
    assert!(!a.has_dedicated_test);

    let b = detections["src/util/b.ts"];
    assert!(!b.has_sibling_test);
    assert!(b.has_dedicated_test);

    assert!(!detections["src/util/bc.ts"].covered());
}

#[tokio::test]
async fn write_tests_never_overwrites() {
    let (dir, ws) = workspace();
    touch(dir.path(), "tests/core/old.test.ts", "// keep me");

    let outcome = ws
        .write_tests(
            &[generated("tests/core/a.test.ts"), generated("tests/core/old.test.ts")],
            false,
        )
        .await
        .unwrap();

    assert_eq!(outcome.created, vec!["tests/core/a.test.ts"]);
    assert_eq!(outcome.skipped, vec!["tests/core/old.test.ts"]);
    assert_eq!(
        fs::read_to_string(dir.path().join("tests/core/old.test.ts")).unwrap(),
        "// keep me"
    );
    assert!(fs::read_to_string(dir.path().join("tests/core/a.test.ts"))
        .unwrap()
        .contains("it('works'"));
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let (dir, ws) = workspace();

    let outcome = ws
        .write_tests(&[generated("tests/a.test.ts")], true)
        .await
        .unwrap();

    assert_eq!(outcome.dry_run, vec!["tests/a.test.ts"]);
    assert!(!dir.path().join("tests/a.test.ts").exists());
}

#[tokio::test]
async fn existing_paths_reports_only_present_files() {
    let (dir, ws) = workspace();
    touch(dir.path(), "tests/a.test.ts", "");

    let existing = ws
        .existing_paths(&["tests/a.test.ts".to_string(), "tests/b.test.ts".to_string()])
        .await
        .unwrap();

    assert_eq!(existing.len(), 1);
    assert!(existing.contains("tests/a.test.ts"));
}

#[tokio::test]
async fn suggestions_keep_counting_across_calls() {
    let (dir, ws) = workspace();

    let first = ws
        .persist_suggestions(&[generated("tests/core/a.test.ts")])
        .await
        .unwrap();
    let second = ws
        .persist_suggestions(&[generated("tests/core/a.test.ts")])
        .await
        .unwrap();

    assert_eq!(
        first,
        vec![format!("{ARTIFACTS_DIR}/suggestions/0-tests_core_a.test.ts.json")]
    );
    assert_eq!(
        second,
        vec![format!("{ARTIFACTS_DIR}/suggestions/1-tests_core_a.test.ts.json")]
    );

    let text = fs::read_to_string(dir.path().join(&second[0])).unwrap();
    let restored: GenerationResult = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, generated("tests/core/a.test.ts"));
}

#[tokio::test]
async fn plan_round_trips_through_disk() {
    let (_dir, ws) = workspace();
    assert!(ws.read_plan().await.unwrap().is_none());

    let plan = CoveragePlan::empty(vec!["src/**/*.ts".into()], now()).update_targets(
        [CoverageTarget::new(
            "src/core/a.ts",
            TestKind::Unit,
            Priority::Critical,
            CoverageStatus::NotCovered,
        )],
        now(),
    );
    let path = ws.write_plan(&plan).await.unwrap();

    assert_eq!(path, format!("{ARTIFACTS_DIR}/ai-tests.plan.json"));
    assert_eq!(ws.read_plan().await.unwrap(), Some(plan));
}

#[tokio::test]
async fn corrupt_plan_is_invalid_artifact() {
    let (dir, ws) = workspace();
    touch(dir.path(), &format!("{ARTIFACTS_DIR}/ai-tests.plan.json"), "{ nope");

    let err = ws.read_plan().await.unwrap_err();

    assert!(matches!(
        err,
        CapabilityError::InvalidArtifact(CoreError::InvalidArtifact { artifact: "plan", .. })
    ));
}

#[tokio::test]
async fn missing_history_is_empty() {
    let (_dir, ws) = workspace();
    assert!(ws.read_iterations().await.unwrap().is_empty());
}

#[tokio::test]
async fn history_round_trips_through_disk() {
    let (_dir, ws) = workspace();
    let history = IterationHistory::new().append(
        IterationRecordBuilder::new(0, now()).complete(
            IterationStatus::Pending,
            Vec::new(),
            now(),
        ),
    );

    ws.write_iterations(&history).await.unwrap();

    assert_eq!(ws.read_iterations().await.unwrap(), history);
}

#[tokio::test]
async fn tests_dir_and_readme_created_once() {
    let (dir, ws) = workspace();

    assert!(ws.ensure_tests_dir("tests").await.unwrap());
    assert!(!ws.ensure_tests_dir("tests").await.unwrap());
    assert!(ws.ensure_tests_readme("tests", "# Tests\n").await.unwrap());
    assert!(!ws.ensure_tests_readme("tests", "# Other\n").await.unwrap());

    assert_eq!(
        fs::read_to_string(dir.path().join("tests/README.md")).unwrap(),
        "# Tests\n"
    );
}

#[tokio::test]
async fn run_log_and_audit_land_in_artifact_dir() {
    let (dir, ws) = workspace();

    let audit = ws.write_audit("# report").await.unwrap();

    assert_eq!(audit, format!("{ARTIFACTS_DIR}/ai-tests.audit.md"));
    assert_eq!(fs::read_to_string(dir.path().join(audit)).unwrap(), "# report");
    assert!(ws.read_run().await.unwrap().is_none());
}
