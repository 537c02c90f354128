//! Architectural Enforcement
//!
//! Source scanners backing the integration tests in `tests/`:
//! - Generated scripts are displayed, never executed
//! - No blocking calls inside the async runtime
//! - The core stays free of UI frameworks
//!
//! Scanning is line-based. Comments are ignored, and so is everything from a
//! `#[cfg(test)]` marker to the end of the file (test modules live at the
//! bottom of each source file).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: [&str; 2] = ["conductor/core/src", "tui/src"];

/// Core source directory, relative to the workspace root
pub const CORE_DIR: &str = "conductor/core/src";

/// A forbidden construct
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Short label shown in reports
    pub name: &'static str,
    /// Substrings that trigger the rule
    pub patterns: &'static [&'static str],
}

/// A line that broke a rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File the line came from
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Name of the broken rule
    pub rule: &'static str,
    /// The offending line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Workspace root as seen from this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Code part of a line, or `None` for a comment line
fn code_part(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
        return None;
    }
    Some(line.split("//").next().unwrap_or(line))
}

/// Scan one file's text
pub fn scan_source(path: &Path, content: &str, rules: &[Rule]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }
        let Some(code) = code_part(line) else {
            continue;
        };

        for rule in rules {
            if rule.patterns.iter().any(|p| code.contains(p)) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    rule: rule.name,
                    text: line.trim().to_string(),
                });
            }
        }
    }

    violations
}

/// Scan every `.rs` file under the given workspace-relative directories
///
/// Missing directories are skipped.
pub fn scan_dirs(root: &Path, dirs: &[&str], rules: &[Rule]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for dir in dirs {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }

        for entry in walkdir::WalkDir::new(&path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            violations.extend(scan_source(entry.path(), &content, rules));
        }
    }

    violations
}

/// Print violations and panic if there are any
pub fn report(title: &str, hint: &[&str], violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    if !hint.is_empty() {
        eprintln!();
        for line in hint {
            eprintln!("  {line}");
        }
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLEEP: Rule = Rule {
        name: "Blocking sleep",
        patterns: &["thread::sleep"],
    };

    #[test]
    fn test_flags_code_lines() {
        let src = "fn tick() {\n    std::thread::sleep(d);\n}\n";
        let found = scan_source(Path::new("a.rs"), src, &[SLEEP]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].text, "std::thread::sleep(d);");
    }

    #[test]
    fn test_ignores_comments() {
        let src = "/// never call thread::sleep here\n// thread::sleep\nlet x = 1; // thread::sleep\n";
        assert!(scan_source(Path::new("a.rs"), src, &[SLEEP]).is_empty());
    }

    #[test]
    fn test_ignores_test_module() {
        let src = "fn ok() {}\n#[cfg(test)]\nmod tests {\n    fn t() { std::thread::sleep(d); }\n}\n";
        assert!(scan_source(Path::new("a.rs"), src, &[SLEEP]).is_empty());
    }

    #[test]
    fn test_display_format() {
        let v = Violation {
            path: PathBuf::from("tui/src/app.rs"),
            line: 7,
            rule: "Blocking sleep",
            text: "thread::sleep(d);".to_string(),
        };
        assert_eq!(v.to_string(), "tui/src/app.rs:7 - Blocking sleep: thread::sleep(d);");
    }
}
