use crate::ValidationError;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// A compiled rule that excludes URLs from warmup
///
/// Two pattern syntaxes are supported:
/// 1. Glob: `*` matches any run of characters (including `/`), `?` matches
///    one character and `[...]` is a character class. The glob must match
///    the whole URL.
/// 2. Regular expression: a pattern wrapped in `#` delimiters, optionally
///    followed by flag letters (`i`, `m`, `s`, `x`). The expression is
///    searched anywhere in the URL; anchor it with `^`/`$` if needed.
///
/// # Examples
///
/// ```
/// use cache_warmer::ExcludePattern;
///
/// let glob = ExcludePattern::new("*foo*").unwrap();
/// assert!(glob.matches("https://example.com/foo"));
/// assert!(!glob.matches("https://example.com/bar"));
///
/// let regex = ExcludePattern::new("#/blog/\\d+#").unwrap();
/// assert!(regex.matches("https://example.com/blog/2024/hello"));
///
/// assert!(ExcludePattern::new("#(unclosed#").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ExcludePattern {
    source: String,
    kind: PatternKind,
    regex: Regex,
}

/// Syntax a pattern was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Glob,
    Regex,
}

impl ExcludePattern {
    /// Compiles a glob or `#regex#` pattern
    ///
    /// # Returns
    ///
    /// * `Ok(ExcludePattern)` - Compiled pattern
    /// * `Err(ValidationError::InvalidPattern)` - Empty pattern or invalid regex
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(invalid(pattern, "pattern must not be empty"));
        }

        let (kind, regex) = match split_delimited(trimmed) {
            Some((expression, flags)) => (PatternKind::Regex, compile_regex(trimmed, expression, flags)?),
            None => (PatternKind::Glob, compile_glob(trimmed)?),
        };

        Ok(Self {
            source: trimmed.to_string(),
            kind,
            regex,
        })
    }

    /// Compiles a list of patterns, failing on the first invalid one
    pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Self>, ValidationError> {
        patterns.iter().map(|p| Self::new(p.as_ref())).collect()
    }

    /// Tests the pattern against a URL string
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }
}

impl fmt::Display for ExcludePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for ExcludePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for ExcludePattern {}

/// Returns the first pattern matching `url`, if any
pub fn find_match<'a>(patterns: &'a [ExcludePattern], url: &str) -> Option<&'a ExcludePattern> {
    patterns.iter().find(|pattern| pattern.matches(url))
}

fn invalid(pattern: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

/// Splits `#expr#flags` into expression and flags
fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('#')?;
    let end = rest.rfind('#')?;
    let (expression, flags) = (&rest[..end], &rest[end + 1..]);

    if flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x')) {
        Some((expression, flags))
    } else {
        None
    }
}

fn compile_regex(pattern: &str, expression: &str, flags: &str) -> Result<Regex, ValidationError> {
    if expression.is_empty() {
        return Err(invalid(pattern, "regular expression must not be empty"));
    }

    RegexBuilder::new(expression)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|e| invalid(pattern, e.to_string()))
}

fn compile_glob(pattern: &str) -> Result<Regex, ValidationError> {
    let mut expression = String::with_capacity(pattern.len() * 2 + 2);
    expression.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' && !class.is_empty() {
                        closed = true;
                        break;
                    }
                    class.push(next);
                }
                if !closed {
                    return Err(invalid(pattern, "unclosed character class"));
                }

                expression.push('[');
                if let Some(negated) = class.strip_prefix('!') {
                    expression.push('^');
                    push_class(&mut expression, negated);
                } else {
                    push_class(&mut expression, &class);
                }
                expression.push(']');
            }
            '\\' => match chars.next() {
                Some(escaped) => expression.push_str(&regex::escape(&escaped.to_string())),
                None => expression.push_str(r"\\"),
            },
            other => expression.push_str(&regex::escape(&other.to_string())),
        }
    }

    expression.push('$');

    Regex::new(&expression).map_err(|e| invalid(pattern, e.to_string()))
}

/// Copies a glob character class body, escaping regex class metacharacters
fn push_class(expression: &mut String, class: &str) {
    for c in class.chars() {
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                expression.push('\\');
                expression.push(c);
            }
            _ => expression.push(c),
        }
    }
}
