//! Ref name validation following git-style conventions.
//!
//! A valid name is non-empty, has no whitespace or `~ ^ : ? * [ \`, no `..`
//! or `@{`, does not start or end with `.` or `/`, does not end with
//! `.lock`, and every `/`-separated component is non-empty and does not
//! start with `.`.

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Substrings that are forbidden anywhere in a ref name.
const FORBIDDEN_SEQUENCES: &[&str] = &["..", "@{", "//"];

/// Validate a short ref name (the part after `refs/heads/` or `refs/tags/`).
///
/// # Examples
///
/// ```
/// use strata_refs::names::validate_ref_name;
///
/// assert!(validate_ref_name("main").is_ok());
/// assert!(validate_ref_name("feature/auth").is_ok());
/// assert!(validate_ref_name("").is_err());
/// assert!(validate_ref_name("bad..name").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    let reject = |reason: String| {
        Err(RefError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("must not be empty".into());
    }
    if let Some(ch) = FORBIDDEN_CHARS.iter().find(|ch| name.contains(**ch)) {
        return reject(format!("contains forbidden character: {ch:?}"));
    }
    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|seq| name.contains(**seq)) {
        return reject(format!("must not contain {seq:?}"));
    }
    if name.starts_with(['.', '/']) || name.ends_with(['.', '/']) {
        return reject("must not start or end with '.' or '/'".into());
    }
    if name.ends_with(".lock") {
        return reject("must not end with '.lock'".into());
    }
    if name.split('/').any(|c| c.starts_with('.')) {
        return reject("components must not start with '.'".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_nested_names() {
        for name in ["main", "my-branch", "v1.0", "feature/deep/nested"] {
            assert!(validate_ref_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "",
            "has space",
            "a~b",
            "a:b",
            "a*b",
            "bad..name",
            "ref@{0}",
            "a//b",
            ".hidden",
            "trailing/",
            "main.lock",
            "feature/.hidden",
        ] {
            assert!(validate_ref_name(name).is_err(), "{name}");
        }
    }
}
