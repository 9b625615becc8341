//! Deterministic path derivation
//!
//! All paths are workspace-relative strings with `/` separators.

/// Extension used when the source file has none
pub const DEFAULT_TEST_EXTENSION: &str = "ts";

fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .enumerate()
        .filter(|(i, s)| !s.is_empty() && *s != "." && *s != ".." && !(*i == 0 && s.ends_with(':')))
        .map(|(_, s)| s)
        .collect()
}

fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

/// Test file location for a source file
///
/// Mirrors the source's location under `tests_dir` with a leading `src`
/// component stripped, inserting `.test` before the extension:
/// `src/core/a.ts` under `tests` becomes `tests/core/a.test.ts`.
#[must_use]
pub fn derive_test_path(source: &str, tests_dir: &str) -> String {
    let mut parts = segments(source);
    if parts.len() > 1 && parts[0] == "src" {
        parts.remove(0);
    }
    let file_name = parts.pop().unwrap_or("index");
    let (stem, ext) = split_extension(file_name);

    let mut out: Vec<String> = segments(tests_dir).into_iter().map(str::to_string).collect();
    out.extend(parts.into_iter().map(str::to_string));
    out.push(format!(
        "{stem}.test.{}",
        ext.unwrap_or(DEFAULT_TEST_EXTENSION)
    ));
    out.join("/")
}

/// Last two path segments, e.g. `core/a.ts`
#[must_use]
pub fn display_name(path: &str) -> String {
    let parts = segments(path);
    let start = parts.len().saturating_sub(2);
    parts[start..].join("/")
}

/// Path with the file extension removed
#[must_use]
pub fn module_name(path: &str) -> String {
    let file_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let (stem, ext) = split_extension(&path[file_start..]);
    match ext {
        Some(_) => format!("{}{}", &path[..file_start], stem),
        None => path.to_string(),
    }
}

/// Whether `file_name` looks like a sibling test (`*.test.*` or `*.spec.*`)
#[must_use]
pub fn is_test_file(file_name: &str) -> bool {
    let (stem, _) = split_extension(file_name);
    stem.ends_with(".test") || stem.ends_with(".spec")
}

/// Whether `candidate` is a sibling test for the source file named `source_name`
///
/// `a.ts` is covered by `a.test.ts`, `a.spec.tsx` and so on.
#[must_use]
pub fn is_sibling_test(source_name: &str, candidate: &str) -> bool {
    let (stem, _) = split_extension(source_name);
    candidate.strip_prefix(stem).is_some_and(|rest| {
        [".test.", ".spec."]
            .iter()
            .any(|marker| rest.len() > marker.len() && rest.starts_with(marker))
    })
}

/// Filesystem-safe file name for a suggestion artifact
#[must_use]
pub fn suggestion_file_name(index: usize, output_path: &str) -> String {
    let sanitized: String = output_path
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{index}-{}.json", sanitized.trim_matches('_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_src_and_mirrors_dirs() {
        assert_eq!(derive_test_path("src/core/a.ts", "tests"), "tests/core/a.test.ts");
        assert_eq!(derive_test_path("lib/x/b.tsx", "tests"), "tests/lib/x/b.test.tsx");
        assert_eq!(derive_test_path("src/a.js", "custom/"), "custom/a.test.js");
    }

    #[test]
    fn defaults_extension_and_normalizes_separators() {
        assert_eq!(derive_test_path("src\\util\\Makefile", "tests"), "tests/util/Makefile.test.ts");
        assert_eq!(derive_test_path("./src/../a.ts", "tests"), "tests/a.test.ts");
        assert_eq!(derive_test_path("/abs/src/a.ts", "tests"), "tests/abs/src/a.test.ts");
    }

    #[test]
    fn lone_src_file_is_kept() {
        assert_eq!(derive_test_path("src", "tests"), "tests/src.test.ts");
    }

    #[test]
    fn names() {
        assert_eq!(display_name("src/core/a.ts"), "core/a.ts");
        assert_eq!(display_name("a.ts"), "a.ts");
        assert_eq!(module_name("src/core/a.ts"), "src/core/a");
        assert_eq!(module_name("src/v1.2/README"), "src/v1.2/README");
    }

    #[test]
    fn test_file_detection() {
        assert!(is_test_file("a.test.ts"));
        assert!(is_test_file("a.spec.js"));
        assert!(!is_test_file("a.ts"));
        assert!(!is_test_file("test.ts"));
    }

    #[test]
    fn sibling_detection() {
        assert!(is_sibling_test("a.ts", "a.test.ts"));
        assert!(is_sibling_test("a.ts", "a.spec.tsx"));
        assert!(!is_sibling_test("a.ts", "ab.test.ts"));
        assert!(!is_sibling_test("a.ts", "a.test."));
        assert!(!is_sibling_test("a.ts", "a.ts"));
    }

    #[test]
    fn suggestion_names_are_flat() {
        assert_eq!(suggestion_file_name(0, "tests/core/a.test.ts"), "0-tests_core_a.test.ts.json");
    }
}
