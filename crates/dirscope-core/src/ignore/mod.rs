/// Ignore rules: exclude entries from the displayed tree by name.
///
/// Rules come from plain-text files, one pattern per line (see
/// [`pattern::pattern_to_regex`] for the syntax). Ignored entries still count
/// toward their ancestors' sizes; they are only hidden from the child lists.
pub mod pattern;

pub use pattern::IgnoreRule;

use crate::error::IgnoreError;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rule file picked up from the working directory when present.
pub const DEFAULT_IGNORE_FILE: &str = ".dirscopeignore";

/// The compiled rule set, in file read order.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// A rule set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the optional `default_file` followed by every `explicit` file.
    ///
    /// A missing default file is skipped silently. A missing or unreadable
    /// explicit file, or any line that does not compile, is an error.
    /// Each path is read once even if listed twice.
    pub fn load(explicit: &[PathBuf], default_file: Option<&Path>) -> Result<Self, IgnoreError> {
        let mut sources: Vec<(&Path, bool)> = Vec::with_capacity(explicit.len() + 1);
        for path in explicit {
            if !sources.iter().any(|(p, _)| *p == path.as_path()) {
                sources.push((path.as_path(), true));
            }
        }
        if let Some(default) = default_file {
            if !sources.iter().any(|(p, _)| *p == default) {
                sources.insert(0, (default, false));
            }
        }

        let mut rules = Self::empty();
        for (path, required) in sources {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) if !required && err.kind() == ErrorKind::NotFound => {
                    debug!("Default ignore file {} not present", path.display());
                    continue;
                }
                Err(source) => {
                    return Err(IgnoreError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };
            let before = rules.len();
            rules.extend_from_text(path, &text)?;
            debug!(
                "Loaded {} ignore rules from {}",
                rules.len() - before,
                path.display()
            );
        }
        Ok(rules)
    }

    /// Compile rules from in-memory text, as if read from `origin`.
    pub fn from_text(origin: &Path, text: &str) -> Result<Self, IgnoreError> {
        let mut rules = Self::empty();
        rules.extend_from_text(origin, text)?;
        Ok(rules)
    }

    fn extend_from_text(&mut self, origin: &Path, text: &str) -> Result<(), IgnoreError> {
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rule = IgnoreRule::compile(line).map_err(|source| IgnoreError::Pattern {
                path: origin.to_path_buf(),
                line: number + 1,
                pattern: line.to_string(),
                source,
            })?;
            self.rules.push(rule);
        }
        Ok(())
    }

    /// `true` iff some rule scoped to this entry kind matches `name`.
    pub fn should_ignore(&self, name: &str, is_dir: bool) -> bool {
        self.rules.iter().any(|rule| rule.is_match(name, is_dir))
    }

    /// The compiled rules, in read order.
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Human-readable listing, one rule per line, for diagnostics.
impl fmt::Display for IgnoreRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            let scope = if rule.is_dir_rule() { "directories" } else { "files" };
            writeln!(f, "rule #{i}: '{}' ({scope})", rule.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let rules = IgnoreRules::from_text(Path::new("inline"), "*.log\n\n   \nbuild/\r\n").unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.should_ignore("b.log", false));
        assert!(rules.should_ignore("build", true));
        assert!(!rules.should_ignore("build", false));
    }

    #[test]
    fn test_missing_default_file_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent");
        let rules = IgnoreRules::load(&[], Some(missing.as_path())).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent");
        let err = IgnoreRules::load(&[missing.clone()], None).unwrap_err();
        assert!(matches!(err, IgnoreError::Read { path, .. } if path == missing));
    }

    #[test]
    fn test_invalid_regex_reports_location() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "rules", "*.tmp\nre:([\n");
        let err = IgnoreRules::load(&[path], None).unwrap_err();
        assert!(matches!(err, IgnoreError::Pattern { line: 2, .. }));
    }

    #[test]
    fn test_default_then_explicit_order_and_dedup() {
        let tmp = TempDir::new().unwrap();
        let default = write(&tmp, "default", "*.bak\n");
        let extra = write(&tmp, "extra", "re:dir:^target$\n");

        let rules =
            IgnoreRules::load(&[extra.clone(), extra.clone()], Some(default.as_path())).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(!rules.rules()[0].is_dir_rule());
        assert!(rules.rules()[1].is_dir_rule());
        assert!(rules.should_ignore("target", true));
        assert!(!rules.should_ignore("my-target", true));
    }

    #[test]
    fn test_dump_lists_every_rule() {
        let rules = IgnoreRules::from_text(Path::new("inline"), "*.log\nbuild/\n").unwrap();
        let dump = rules.to_string();
        assert_eq!(dump, "rule #0: '.*\\.log$' (files)\nrule #1: 'build$' (directories)\n");
    }
}
