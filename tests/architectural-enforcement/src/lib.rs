//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`. They keep
//! the layering rules of the workspace honest:
//! - The renderer stays a pure function: no network, no runtime, no sleeping
//! - Production code only sleeps for retry backoff; loops wait on intervals
//!
//! Scanning is line based. Everything from the first `#[cfg(test)]` on is
//! treated as test code and skipped, which matches how every module in the
//! workspace keeps its unit tests at the bottom.

use std::fs;
use std::path::{Path, PathBuf};

/// One offending line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the line is in
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The trimmed line
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Absolute path of a directory given relative to the workspace root
pub fn workspace_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

/// Every `.rs` file under `dir`, sorted for stable output
pub fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Production lines of `content` with comments removed, numbered from 1
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Lines under `dir` whose code contains any of `needles`
pub fn find_forbidden(dir: &Path, needles: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, code) in production_lines(&content) {
            if needles.iter().any(|n| code.contains(n)) {
                violations.push(Violation {
                    path: path.clone(),
                    line,
                    text: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Sleep calls under `dir` that are not retry backoff
pub fn find_sleep_violations(dir: &Path) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines = production_lines(&content);
        for (pos, (line, code)) in lines.iter().enumerate() {
            if !(code.contains("::sleep(") || code.contains(".sleep(")) {
                continue;
            }
            if is_backoff_context(&lines, pos) {
                continue;
            }
            violations.push(Violation {
                path: path.clone(),
                line: *line,
                text: code.trim().to_string(),
            });
        }
    }
    violations
}

/// Whether the sleep at `pos` sits in retry/backoff code
pub fn is_backoff_context(lines: &[(usize, &str)], pos: usize) -> bool {
    let from = pos.saturating_sub(15);
    let to = (pos + 5).min(lines.len());
    lines[from..to].iter().any(|(_, code)| {
        let code = code.to_lowercase();
        code.contains("backoff") || code.contains("retry")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let src = "fn a() {}\n// note\nlet x = 1; // trailing\n#[cfg(test)]\nmod tests { sleep(1) }\n";
        let lines = production_lines(src);
        assert_eq!(lines, vec![(1, "fn a() {}"), (3, "let x = 1; ")]);
    }

    #[test]
    fn test_backoff_context_detection() {
        let lines = vec![
            (1, "let backoff = policy.backoff_for_attempt(n);"),
            (2, "tokio::time::sleep(backoff).await;"),
        ];
        assert!(is_backoff_context(&lines, 1));

        let lines = vec![(1, "loop {"), (2, "tokio::time::sleep(ms(10)).await;")];
        assert!(!is_backoff_context(&lines, 1));
    }
}
