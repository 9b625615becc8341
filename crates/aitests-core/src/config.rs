//! Configuration normalization
//!
//! Turns a partial, loosely-typed configuration into canonical [`Settings`]:
//! - Runner coercion (string shorthand or object form)
//! - Field-level threshold merge
//! - Built-in defaults for every missing field
//!
//! Normalization never fails. Malformed fields are dropped and defaulted.

use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Command used by the shell runner when none is configured
pub const DEFAULT_TEST_RUN_COMMAND: &str = "pnpm test";

/// Default tests directory
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// Default source glob
pub const DEFAULT_SOURCE_GLOB: &str = "src/**/*.ts";

/// Default repair budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Runner mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerMode {
    /// Spawn the configured command
    #[default]
    Shell,
    /// Deterministic stand-in, no process
    Mock,
}

impl RunnerMode {
    /// Wire spelling
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunnerMode::Shell => "shell",
            RunnerMode::Mock => "mock",
        }
    }
}

impl fmt::Display for RunnerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Never write test files, only suggestions
    SuggestOnly,
    /// Write generated tests then run them
    WriteAndRun,
    /// Write, run and repair
    RepairLoop,
    /// Generator-driven default
    #[default]
    LlmGenerate,
}

impl Strategy {
    /// Wire spelling
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::SuggestOnly => "suggest-only",
            Strategy::WriteAndRun => "write-and-run",
            Strategy::RepairLoop => "repair-loop",
            Strategy::LlmGenerate => "llm-generate",
        }
    }

    /// Whether generated tests may be written to disk
    #[inline]
    #[must_use]
    pub fn writes_files(self) -> bool {
        !matches!(self, Strategy::SuggestOnly)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "suggest-only" => Ok(Strategy::SuggestOnly),
            "write-and-run" => Ok(Strategy::WriteAndRun),
            "repair-loop" => Ok(Strategy::RepairLoop),
            "llm-generate" => Ok(Strategy::LlmGenerate),
            other => Err(CoreError::unknown_variant("strategy", other)),
        }
    }
}

/// Qualitative repair aggressiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairLevel {
    /// Conservative
    Low,
    /// Balanced
    #[default]
    Medium,
    /// Aggressive
    High,
}

/// Canonical runner configuration
///
/// `Shell` always carries a command; `Mock` never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Runner mode
    pub mode: RunnerMode,
    /// Shell command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Environment overrides layered on the ambient environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    /// Working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl RunnerConfig {
    /// Shell runner with the given command
    #[inline]
    #[must_use]
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            mode: RunnerMode::Shell,
            command: Some(command.into()),
            env: None,
            cwd: None,
        }
    }

    /// Mock runner
    #[inline]
    #[must_use]
    pub fn mock() -> Self {
        Self {
            mode: RunnerMode::Mock,
            command: None,
            env: None,
            cwd: None,
        }
    }

    /// Command to execute in shell mode
    #[inline]
    #[must_use]
    pub fn command_or_default(&self) -> &str {
        self.command.as_deref().unwrap_or(DEFAULT_TEST_RUN_COMMAND)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::shell(DEFAULT_TEST_RUN_COMMAND)
    }
}

/// Runner object form as written by users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRunnerConfig {
    /// Mode, defaults to shell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RunnerMode>,
    /// Command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Environment overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    /// Working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// Runner setting: `"mock"`, `"shell"`, a literal command, or an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunnerSetting {
    /// String shorthand
    Named(String),
    /// Object form
    Detailed(RawRunnerConfig),
}

/// Failure thresholds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Repair aggressiveness
    pub repair: RepairLevel,
    /// Tolerated failure fraction in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_failure_percentage: Option<f64>,
}

impl Thresholds {
    /// True when a positive failure fraction is tolerated
    #[inline]
    #[must_use]
    pub fn tolerates_failures(&self) -> bool {
        self.allowed_failure_percentage.is_some_and(|p| p > 0.0)
    }
}

/// Partial thresholds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawThresholds {
    /// Repair aggressiveness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair: Option<RepairLevel>,
    /// Tolerated failure fraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_failure_percentage: Option<f64>,
}

/// Partial configuration as read from a config source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawConfig {
    /// Source globs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    /// Tests directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests_dir: Option<String>,
    /// Runner setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner: Option<RunnerSetting>,
    /// Generation strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Repair budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Failure thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<RawThresholds>,
}

impl RawConfig {
    /// Extract a raw config from loosely-typed JSON
    ///
    /// Every field is parsed on its own; a malformed field is skipped
    /// rather than rejecting the whole object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("ignoring non-object configuration");
            }
            return Self::default();
        };

        let thresholds = map.get("thresholds").and_then(Value::as_object).map(|t| RawThresholds {
            repair: lenient_field(t, "repair"),
            allowed_failure_percentage: lenient_field(t, "allowedFailurePercentage"),
        });

        Self {
            sources: lenient_field(map, "sources"),
            tests_dir: lenient_field(map, "testsDir"),
            runner: lenient_field(map, "runner"),
            strategy: lenient_field(map, "strategy"),
            max_attempts: lenient_field(map, "maxAttempts"),
            thresholds,
        }
    }

    /// With tests directory
    #[inline]
    #[must_use]
    pub fn with_tests_dir(mut self, dir: impl Into<String>) -> Self {
        self.tests_dir = Some(dir.into());
        self
    }

    /// With runner setting
    #[inline]
    #[must_use]
    pub fn with_runner(mut self, runner: RunnerSetting) -> Self {
        self.runner = Some(runner);
        self
    }

    /// With strategy
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// With max attempts
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// With thresholds
    #[inline]
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: RawThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
}

fn lenient_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(field = key, error = %err, "ignoring malformed configuration field");
            None
        }
    }
}

/// Canonical settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Ordered source globs
    pub sources: Vec<String>,
    /// Tests directory
    pub tests_dir: String,
    /// Runner configuration
    pub runner: RunnerConfig,
    /// Generation strategy
    pub strategy: Strategy,
    /// Repair budget (positive)
    pub max_attempts: u32,
    /// Failure thresholds
    pub thresholds: Thresholds,
}

impl Settings {
    /// Normalize a partial configuration
    #[must_use]
    pub fn normalize(input: Option<RawConfig>) -> Self {
        let input = input.unwrap_or_default();
        let defaults = RawThresholds::default();
        let thresholds = input.thresholds.unwrap_or(defaults);

        Self {
            sources: input
                .sources
                .unwrap_or_else(|| vec![DEFAULT_SOURCE_GLOB.to_string()]),
            tests_dir: input
                .tests_dir
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TESTS_DIR.to_string()),
            runner: coerce_runner(input.runner),
            strategy: input.strategy.unwrap_or_default(),
            max_attempts: input
                .max_attempts
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            thresholds: Thresholds {
                repair: thresholds.repair.unwrap_or_default(),
                allowed_failure_percentage: thresholds
                    .allowed_failure_percentage
                    .filter(|p| p.is_finite())
                    .map(|p| p.clamp(0.0, 1.0)),
            },
        }
    }

    /// Merge a partial override onto the current configuration
    ///
    /// Top-level fields from `next` replace those of `current`. Thresholds
    /// merge per field: default, then current, then override.
    #[must_use]
    pub fn merge(current: Option<RawConfig>, next: RawConfig) -> Self {
        let current = current.unwrap_or_default();
        let current_thresholds = current.thresholds.unwrap_or_default();
        let next_thresholds = next.thresholds.unwrap_or_default();

        let thresholds = RawThresholds {
            repair: next_thresholds.repair.or(current_thresholds.repair),
            allowed_failure_percentage: next_thresholds
                .allowed_failure_percentage
                .or(current_thresholds.allowed_failure_percentage),
        };

        Self::normalize(Some(RawConfig {
            sources: next.sources.or(current.sources),
            tests_dir: next.tests_dir.or(current.tests_dir),
            runner: next.runner.or(current.runner),
            strategy: next.strategy.or(current.strategy),
            max_attempts: next.max_attempts.or(current.max_attempts),
            thresholds: Some(thresholds),
        }))
    }

    /// Raw form of these settings, suitable as `current` for [`Settings::merge`]
    #[must_use]
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            sources: Some(self.sources.clone()),
            tests_dir: Some(self.tests_dir.clone()),
            runner: Some(RunnerSetting::Detailed(RawRunnerConfig {
                mode: Some(self.runner.mode),
                command: self.runner.command.clone(),
                env: self.runner.env.clone(),
                cwd: self.runner.cwd.clone(),
            })),
            strategy: Some(self.strategy),
            max_attempts: Some(self.max_attempts),
            thresholds: Some(RawThresholds {
                repair: Some(self.thresholds.repair),
                allowed_failure_percentage: self.thresholds.allowed_failure_percentage,
            }),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::normalize(None)
    }
}

fn coerce_runner(input: Option<RunnerSetting>) -> RunnerConfig {
    match input {
        None => RunnerConfig::default(),
        Some(RunnerSetting::Named(name)) => match name.trim() {
            "" | "shell" => RunnerConfig::default(),
            "mock" => RunnerConfig::mock(),
            _ => RunnerConfig::shell(name),
        },
        Some(RunnerSetting::Detailed(raw)) => {
            let mode = raw.mode.unwrap_or_default();
            let command = match mode {
                RunnerMode::Shell => Some(
                    raw.command
                        .unwrap_or_else(|| DEFAULT_TEST_RUN_COMMAND.to_string()),
                ),
                RunnerMode::Mock => None,
            };
            RunnerConfig {
                mode,
                command,
                env: raw.env,
                cwd: raw.cwd,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_config_uses_defaults() {
        let settings = Settings::normalize(None);
        assert_eq!(settings.sources, vec!["src/**/*.ts".to_string()]);
        assert_eq!(settings.tests_dir, "tests");
        assert_eq!(settings.runner, RunnerConfig::shell("pnpm test"));
        assert_eq!(settings.strategy, Strategy::LlmGenerate);
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.thresholds.repair, RepairLevel::Medium);
        assert_eq!(settings.thresholds.allowed_failure_percentage, None);
    }

    #[test]
    fn explicit_empty_sources_are_kept() {
        let raw = RawConfig::from_value(&json!({ "sources": [] }));
        assert!(Settings::normalize(Some(raw)).sources.is_empty());

        let merged = Settings::merge(None, RawConfig::from_value(&json!({ "sources": [] })));
        assert!(merged.sources.is_empty());
    }

    #[test]
    fn literal_runner_string_becomes_shell_command() {
        let raw = RawConfig::from_value(&json!({ "testsDir": "custom", "runner": "pnpm vitest" }));
        let settings = Settings::normalize(Some(raw));

        assert_eq!(settings.tests_dir, "custom");
        assert_eq!(settings.runner, RunnerConfig::shell("pnpm vitest"));
        assert_eq!(settings.sources, Settings::default().sources);
        assert_eq!(settings.strategy, Strategy::LlmGenerate);
        assert_eq!(settings.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(settings.thresholds, Thresholds::default());
    }

    #[test]
    fn runner_shorthands() {
        let mock = Settings::normalize(Some(RawConfig::default().with_runner(RunnerSetting::Named("mock".into()))));
        assert_eq!(mock.runner, RunnerConfig::mock());

        let shell = Settings::normalize(Some(RawConfig::default().with_runner(RunnerSetting::Named("shell".into()))));
        assert_eq!(shell.runner, RunnerConfig::shell(DEFAULT_TEST_RUN_COMMAND));
    }

    #[test]
    fn runner_object_defaults_mode_and_command() {
        let raw = RawConfig::from_value(&json!({
            "runner": { "env": { "CI": "1" }, "cwd": "packages/app" }
        }));
        let runner = Settings::normalize(Some(raw)).runner;

        assert_eq!(runner.mode, RunnerMode::Shell);
        assert_eq!(runner.command.as_deref(), Some(DEFAULT_TEST_RUN_COMMAND));
        assert_eq!(runner.env.unwrap().get("CI").map(String::as_str), Some("1"));
        assert_eq!(runner.cwd, Some(PathBuf::from("packages/app")));
    }

    #[test]
    fn mock_runner_object_never_carries_command() {
        let raw = RawConfig::from_value(&json!({
            "runner": { "mode": "mock", "command": "ignored" }
        }));
        let runner = Settings::normalize(Some(raw)).runner;
        assert_eq!(runner.mode, RunnerMode::Mock);
        assert_eq!(runner.command, None);
    }

    #[test]
    fn explicit_repair_level_wins_and_other_threshold_fields_default() {
        let raw = RawConfig::from_value(&json!({ "thresholds": { "repair": "high" } }));
        let settings = Settings::normalize(Some(raw));
        assert_eq!(settings.thresholds.repair, RepairLevel::High);
        assert_eq!(settings.thresholds.allowed_failure_percentage, None);

        let raw = RawConfig::from_value(&json!({ "thresholds": { "allowedFailurePercentage": 0.2 } }));
        let settings = Settings::normalize(Some(raw));
        assert_eq!(settings.thresholds.repair, RepairLevel::Medium);
        assert_eq!(settings.thresholds.allowed_failure_percentage, Some(0.2));
    }

    #[test]
    fn malformed_fields_are_defaulted() {
        let raw = RawConfig::from_value(&json!({
            "sources": "not-a-list",
            "maxAttempts": -4,
            "strategy": "yolo",
            "testsDir": "spec"
        }));
        let settings = Settings::normalize(Some(raw));
        assert_eq!(settings.sources, vec![DEFAULT_SOURCE_GLOB.to_string()]);
        assert_eq!(settings.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(settings.strategy, Strategy::LlmGenerate);
        assert_eq!(settings.tests_dir, "spec");
    }

    #[test]
    fn non_object_config_is_default() {
        assert_eq!(RawConfig::from_value(&json!(42)), RawConfig::default());
        assert_eq!(RawConfig::from_value(&Value::Null), RawConfig::default());
    }

    #[test]
    fn zero_attempts_and_out_of_range_fraction_are_normalized() {
        let raw = RawConfig::default()
            .with_max_attempts(0)
            .with_thresholds(RawThresholds {
                repair: None,
                allowed_failure_percentage: Some(1.7),
            });
        let settings = Settings::normalize(Some(raw));
        assert_eq!(settings.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(settings.thresholds.allowed_failure_percentage, Some(1.0));
    }

    #[test]
    fn merge_is_three_way_for_thresholds() {
        let current = RawConfig::default()
            .with_max_attempts(5)
            .with_thresholds(RawThresholds {
                repair: Some(RepairLevel::Low),
                allowed_failure_percentage: Some(0.3),
            });
        let next = RawConfig::default()
            .with_tests_dir("spec")
            .with_thresholds(RawThresholds {
                repair: Some(RepairLevel::High),
                allowed_failure_percentage: None,
            });

        let merged = Settings::merge(Some(current), next);
        assert_eq!(merged.tests_dir, "spec");
        assert_eq!(merged.max_attempts, 5);
        assert_eq!(merged.thresholds.repair, RepairLevel::High);
        assert_eq!(merged.thresholds.allowed_failure_percentage, Some(0.3));
    }

    #[test]
    fn merge_keeps_current_repair_when_override_omits_it() {
        let current = RawConfig::default().with_thresholds(RawThresholds {
            repair: Some(RepairLevel::Low),
            allowed_failure_percentage: None,
        });
        let merged = Settings::merge(Some(current), RawConfig::default().with_tests_dir("t"));
        assert_eq!(merged.thresholds.repair, RepairLevel::Low);
    }

    #[test]
    fn merge_accepts_canonical_settings() {
        let canonical = Settings::normalize(Some(
            RawConfig::default().with_runner(RunnerSetting::Named("mock".into())),
        ));
        let merged = Settings::merge(Some(canonical.to_raw()), RawConfig::default().with_tests_dir("qa"));
        assert_eq!(merged.runner, RunnerConfig::mock());
        assert_eq!(merged.tests_dir, "qa");
        assert_eq!(Settings::merge(Some(canonical.to_raw()), RawConfig::default()), canonical);
    }

    #[test]
    fn settings_roundtrip_wire_names() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(value["testsDir"], "tests");
        assert_eq!(value["maxAttempts"], 3);
        assert_eq!(value["strategy"], "llm-generate");
        assert_eq!(value["runner"]["mode"], "shell");
        assert_eq!(value["thresholds"]["repair"], "medium");
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("suggest-only".parse::<Strategy>().unwrap(), Strategy::SuggestOnly);
        assert!(!Strategy::SuggestOnly.writes_files());
        assert!(Strategy::RepairLoop.writes_files());
        assert!("bogus".parse::<Strategy>().is_err());
    }
}
