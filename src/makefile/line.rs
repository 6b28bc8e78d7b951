use std::sync::LazyLock;

use regex::Regex;

/// A target name at column 0, made of anything but the punctuation below,
/// immediately followed by a colon.
static TARGET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([^()<>~:;,!?"'*|/]+):"#).expect("Invalid target pattern")
});

const INCLUDE_KEYWORD: &str = "include";

/// What a single line of a makefile declares, as far as we care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line<'a> {
    /// A target declaration, special targets included.
    Target(&'a str),
    /// An include directive with its (unresolved) file reference.
    Include(&'a str),
    Other,
}

/// Classifies a line.
///
/// Target recognition wins: a line that declares a target is never looked
/// at as an include directive.
pub fn classify(line: &str) -> Line<'_> {
    if let Some(target) = extract_target(line) {
        Line::Target(target)
    } else if let Some(reference) = extract_include(line) {
        Line::Include(reference)
    } else {
        Line::Other
    }
}

pub fn extract_target(line: &str) -> Option<&str> {
    TARGET_PATTERN
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Extracts the file reference of an `include` line.
///
/// The keyword is matched case-insensitively and must be followed by
/// whitespace or a quote. The reference keeps its original case.
pub fn extract_include(line: &str) -> Option<&str> {
    let (keyword, rest) = line.split_at_checked(INCLUDE_KEYWORD.len())?;
    if !keyword.eq_ignore_ascii_case(INCLUDE_KEYWORD) {
        return None;
    }

    if !rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
        return None;
    }

    let reference = unquote(rest.trim());
    (!reference.is_empty()).then_some(reference)
}

/// Special targets (`.PHONY`, `.SUFFIXES`, ...) are reserved by make itself.
pub fn is_special_target(name: &str) -> bool {
    name.starts_with('.')
}

fn unquote(s: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| s.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(s)
}
