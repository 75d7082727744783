/// Compilation of a single ignore-file line into a matcher.
use regex::Regex;

/// Prefix marking a raw regular expression that applies to files.
pub const REGEX_PREFIX: &str = "re:";
/// Prefix marking a raw regular expression that applies to directories.
pub const DIR_REGEX_PREFIX: &str = "re:dir:";

/// A compiled exclusion pattern scoped to either directories or files.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    regex: Regex,
    dir_only: bool,
}

impl IgnoreRule {
    /// Compile one ignore-file line.
    pub fn compile(line: &str) -> Result<Self, regex::Error> {
        let (source, dir_only) = pattern_to_regex(line);
        Ok(Self {
            regex: Regex::new(&source)?,
            dir_only,
        })
    }

    /// `true` if the rule only applies to directories; otherwise only to files.
    pub fn is_dir_rule(&self) -> bool {
        self.dir_only
    }

    /// The compiled regular expression source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether this rule excludes an entry called `name` of the given kind.
    pub fn is_match(&self, name: &str, is_dir: bool) -> bool {
        self.dir_only == is_dir && self.regex.is_match(name)
    }
}

/// Translate an ignore-file line into `(regex source, is directory rule)`.
///
/// `re:dir:` and `re:` lines are taken verbatim. Anything else is a glob where
/// `*` matches any sequence and every other character is literal; a trailing
/// `/` scopes the rule to directories. Globs are anchored at the end only.
///
/// Glob lines escape every regex metacharacter except `*`, so `?`, `[0-9]` or
/// `{a,b}` match only those exact characters. Write a `re:` line to use them
/// as patterns.
pub fn pattern_to_regex(line: &str) -> (String, bool) {
    if let Some(raw) = line.strip_prefix(DIR_REGEX_PREFIX) {
        return (raw.to_string(), true);
    }
    if let Some(raw) = line.strip_prefix(REGEX_PREFIX) {
        return (raw.to_string(), false);
    }

    let (glob, dir_only) = match line.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (line, false),
    };
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    (format!("{body}$"), dir_only)
}
