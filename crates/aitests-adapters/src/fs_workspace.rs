//! File-system [`Workspace`]
//!
//! Artifacts live under [`ARTIFACTS_DIR`] relative to the workspace root:
//!
//! ```text
//! .kb/artifacts/ai-tests/
//! ├── ai-tests.plan.json
//! ├── ai-tests.iterations.json
//! ├── ai-tests.run.json
//! ├── ai-tests.audit.md
//! ├── metadata.json
//! ├── logs/run-latest.log
//! └── suggestions/<index>-<sanitized-output-path>.json
//! ```
//!
//! Generated tests are written relative to the root. Existing files are
//! never overwritten. Every returned path is root-relative with `/`
//! separators.

use aitests_core::paths::{derive_test_path, is_sibling_test, is_test_file, suggestion_file_name};
use aitests_core::{CoreError, CoveragePlan, GenerationResult, IterationHistory, Metadata, RunResult};
use aitests_engine::{
    CapabilityError, CapabilityResult, RunArtifactPaths, TestDetection, Workspace, WriteOutcome,
};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

/// Artifact directory, relative to the workspace root
pub const ARTIFACTS_DIR: &str = ".kb/artifacts/ai-tests";

const PLAN_FILE: &str = "ai-tests.plan.json";
const ITERATIONS_FILE: &str = "ai-tests.iterations.json";
const RUN_FILE: &str = "ai-tests.run.json";
const LOG_FILE: &str = "logs/run-latest.log";
const METADATA_FILE: &str = "metadata.json";
const AUDIT_FILE: &str = "ai-tests.audit.md";
const SUGGESTIONS_DIR: &str = "suggestions";

/// Directory names never descended into during discovery
const IGNORED_DIRS: [&str; 8] = [
    "node_modules",
    "target",
    "dist",
    "build",
    "coverage",
    ".git",
    ".kb",
    ".turbo",
];

fn artifact(name: &str) -> String {
    format!("{ARTIFACTS_DIR}/{name}")
}

/// Workspace rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    /// Workspace rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    async fn exists(&self, relative: &str) -> CapabilityResult<bool> {
        let path = self.resolve(relative);
        fs::try_exists(&path)
            .await
            .map_err(|e| CapabilityError::io(path, e))
    }

    async fn create_parent(path: &Path) -> CapabilityResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CapabilityError::io(parent, e))?;
        }
        Ok(())
    }

    async fn write_file(&self, relative: &str, contents: &[u8]) -> CapabilityResult<()> {
        let path = self.resolve(relative);
        Self::create_parent(&path).await?;
        fs::write(&path, contents)
            .await
            .map_err(|e| CapabilityError::io(path, e))
    }

    /// Write only if absent; `false` when the file already existed
    async fn create_file(&self, relative: &str, contents: &[u8]) -> CapabilityResult<bool> {
        let path = self.resolve(relative);
        Self::create_parent(&path).await?;
        let opened = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let mut file = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(CapabilityError::io(path, e)),
        };
        file.write_all(contents)
            .await
            .map_err(|e| CapabilityError::io(&path, e))?;
        file.flush().await.map_err(|e| CapabilityError::io(&path, e))?;
        Ok(true)
    }

    async fn read_optional(&self, relative: &str) -> CapabilityResult<Option<String>> {
        let path = self.resolve(relative);
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CapabilityError::io(path, e)),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> CapabilityResult<String> {
        let relative = artifact(name);
        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');
        self.write_file(&relative, &bytes).await?;
        tracing::debug!(path = %relative, "artifact written");
        Ok(relative)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        name: &str,
        kind: &'static str,
    ) -> CapabilityResult<Option<T>> {
        let Some(text) = self.read_optional(&artifact(name)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CoreError::invalid_artifact(kind, e).into())
    }

    async fn dir_entries(&self, dir: &Path) -> CapabilityResult<Vec<String>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CapabilityError::io(dir, e)),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CapabilityError::io(dir, e))?
        {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

fn build_globset(patterns: &[String]) -> CapabilityResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // `*` stays within one path segment, `**` crosses them
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| CapabilityError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| CapabilityError::InvalidPattern {
        pattern: patterns.join(","),
        message: e.to_string(),
    })
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

fn discover(root: &Path, globs: &GlobSet) -> BTreeSet<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .is_some_and(|name| IGNORED_DIRS.contains(&name))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_str().is_some_and(is_test_file))
        .filter_map(|e| relative_slash_path(root, e.path()))
        .filter(|relative| globs.is_match(relative))
        .collect()
}

#[async_trait::async_trait]
impl Workspace for FsWorkspace {
    async fn ensure_tests_dir(&self, tests_dir: &str) -> CapabilityResult<bool> {
        if self.exists(tests_dir).await? {
            return Ok(false);
        }
        let path = self.resolve(tests_dir);
        fs::create_dir_all(&path)
            .await
            .map_err(|e| CapabilityError::io(path, e))?;
        Ok(true)
    }

    async fn ensure_tests_readme(&self, tests_dir: &str, content: &str) -> CapabilityResult<bool> {
        let relative = format!("{}/README.md", tests_dir.trim_end_matches('/'));
        self.create_file(&relative, content.as_bytes()).await
    }

    async fn glob_sources(&self, globs: &[String]) -> CapabilityResult<Vec<String>> {
        let set = build_globset(globs)?;
        let root = self.root.clone();
        let found = tokio::task::spawn_blocking(move || discover(&root, &set))
            .await
            .map_err(|e| CapabilityError::Unavailable(format!("source discovery aborted: {e}")))?;
        tracing::debug!(root = %self.root.display(), count = found.len(), "sources discovered");
        Ok(found.into_iter().collect())
    }

    async fn detect_tests(
        &self,
        sources: &[String],
        tests_dir: &str,
    ) -> CapabilityResult<HashMap<String, TestDetection>> {
        let mut listings: HashMap<PathBuf, Vec<String>> = HashMap::new();
        let mut detections = HashMap::with_capacity(sources.len());

        for source in sources {
            let path = self.resolve(source);
            let (dir, name) = match (path.parent(), path.file_name().and_then(|n| n.to_str())) {
                (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_string()),
                _ => {
                    detections.insert(source.clone(), TestDetection::default());
                    continue;
                }
            };
            if !listings.contains_key(&dir) {
                let entries = self.dir_entries(&dir).await?;
                listings.insert(dir.clone(), entries);
            }
            let has_sibling_test = listings
                .get(&dir)
                .is_some_and(|entries| entries.iter().any(|e| is_sibling_test(&name, e)));
            let has_dedicated_test = self.exists(&derive_test_path(source, tests_dir)).await?;

            detections.insert(
                source.clone(),
                TestDetection {
                    has_sibling_test,
                    has_dedicated_test,
                },
            );
        }
        Ok(detections)
    }

    async fn existing_paths(&self, paths: &[String]) -> CapabilityResult<HashSet<String>> {
        let mut existing = HashSet::new();
        for path in paths {
            if self.exists(path).await? {
                existing.insert(path.clone());
            }
        }
        Ok(existing)
    }

    async fn write_tests(
        &self,
        results: &[GenerationResult],
        dry_run: bool,
    ) -> CapabilityResult<WriteOutcome> {
        let mut outcome = WriteOutcome::default();
        for result in results {
            let path = result.output_path().to_string();
            if dry_run {
                outcome.dry_run.push(path);
            } else if self.create_file(&path, result.render().as_bytes()).await? {
                tracing::info!(path = %path, "test file written");
                outcome.created.push(path);
            } else {
                tracing::warn!(path = %path, "test file exists, skipped");
                outcome.skipped.push(path);
            }
        }
        Ok(outcome)
    }

    async fn persist_suggestions(
        &self,
        results: &[GenerationResult],
    ) -> CapabilityResult<Vec<String>> {
        let dir = self.resolve(&artifact(SUGGESTIONS_DIR));
        let offset = self.dir_entries(&dir).await?.len();

        let mut paths = Vec::with_capacity(results.len());
        for (i, result) in results.iter().enumerate() {
            let name = format!(
                "{SUGGESTIONS_DIR}/{}",
                suggestion_file_name(offset + i, result.output_path())
            );
            paths.push(self.write_json(&name, result).await?);
        }
        Ok(paths)
    }

    async fn write_plan(&self, plan: &CoveragePlan) -> CapabilityResult<String> {
        self.write_json(PLAN_FILE, plan).await
    }

    async fn read_plan(&self) -> CapabilityResult<Option<CoveragePlan>> {
        self.read_json(PLAN_FILE, "plan").await
    }

    async fn write_iterations(&self, history: &IterationHistory) -> CapabilityResult<String> {
        self.write_json(ITERATIONS_FILE, history).await
    }

    async fn read_iterations(&self) -> CapabilityResult<IterationHistory> {
        Ok(self
            .read_json(ITERATIONS_FILE, "iterations")
            .await?
            .unwrap_or_default())
    }

    async fn write_run(&self, run: &RunResult, log: &str) -> CapabilityResult<RunArtifactPaths> {
        let run_path = self.write_json(RUN_FILE, run).await?;
        let log_path = artifact(LOG_FILE);
        self.write_file(&log_path, log.as_bytes()).await?;
        Ok(RunArtifactPaths { run_path, log_path })
    }

    async fn read_run(&self) -> CapabilityResult<Option<RunResult>> {
        self.read_json(RUN_FILE, "run").await
    }

    async fn write_metadata(&self, metadata: &Metadata) -> CapabilityResult<String> {
        self.write_json(METADATA_FILE, metadata).await
    }

    async fn write_audit(&self, markdown: &str) -> CapabilityResult<String> {
        let relative = artifact(AUDIT_FILE);
        self.write_file(&relative, markdown.as_bytes()).await?;
        Ok(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globset_rejects_bad_pattern() {
        let err = build_globset(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidPattern { .. }));
    }

    #[test]
    fn double_star_matches_top_level() {
        let set = build_globset(&["src/**/*.ts".to_string()]).unwrap();
        assert!(set.is_match("src/a.ts"));
        assert!(set.is_match("src/core/deep/a.ts"));
        assert!(!set.is_match("lib/a.ts"));
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/work");
        let path = root.join("src").join("core").join("a.ts");
        assert_eq!(relative_slash_path(root, &path).as_deref(), Some("src/core/a.ts"));
    }
}
