//! Path presentation: relative to the caller, C-quoted when unsafe.

use std::borrow::Cow;
use std::fmt::Write;

/// Render `path` (relative to the work tree root) for a caller sitting in
/// `cwd_prefix` (empty, or ending in `/`), quoting it when `quote` is set
/// and the path needs it.
pub fn format_path(path: &str, cwd_prefix: &str, quote: bool) -> String {
    let rel = relative_to(path, cwd_prefix);
    if quote && needs_quoting(&rel) {
        c_quote(&rel)
    } else {
        rel.into_owned()
    }
}

fn relative_to<'a>(path: &'a str, cwd_prefix: &str) -> Cow<'a, str> {
    if cwd_prefix.is_empty() {
        return Cow::Borrowed(path);
    }
    let common = cwd_prefix
        .match_indices('/')
        .map(|(i, _)| i + 1)
        .take_while(|&end| path.starts_with(&cwd_prefix[..end]))
        .last()
        .unwrap_or(0);
    let ups = cwd_prefix[common..].matches('/').count();
    let rest = &path[common..];
    if ups == 0 && rest.is_empty() {
        return Cow::Borrowed("./");
    }
    if ups == 0 {
        return Cow::Borrowed(rest);
    }
    Cow::Owned(format!("{}{rest}", "../".repeat(ups)))
}

fn needs_quoting(path: &str) -> bool {
    path.bytes()
        .any(|b| b == b'"' || b == b'\\' || b < 0x20 || b >= 0x7f)
}

fn c_quote(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    out.push('"');
    for b in path.bytes() {
        match b {
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b if b < 0x20 || b >= 0x7f => {
                let _ = write!(out, "\\{b:03o}");
            }
            b => out.push(char::from(b)),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_caller_sees_paths_unchanged() {
        assert_eq!(format_path("src/lib.rs", "", true), "src/lib.rs");
    }

    #[test]
    fn paths_are_relative_to_the_caller() {
        assert_eq!(format_path("sub/a.txt", "sub/", true), "a.txt");
        assert_eq!(format_path("top.txt", "sub/", true), "../top.txt");
        assert_eq!(format_path("sub2/x", "sub/", true), "../sub2/x");
        assert_eq!(format_path("a/c/d", "a/b/", true), "../c/d");
        assert_eq!(format_path("x", "a/b/", true), "../../x");
        assert_eq!(format_path("sub/", "sub/", true), "./");
        assert_eq!(format_path("sub/deep/", "sub/", true), "deep/");
    }

    #[test]
    fn unsafe_paths_are_c_quoted() {
        assert_eq!(format_path("tab\there", "", true), "\"tab\\there\"");
        assert_eq!(format_path("say \"hi\"", "", true), "\"say \\\"hi\\\"\"");
        assert_eq!(format_path("back\\slash", "", true), "\"back\\\\slash\"");
        assert_eq!(format_path("caf\u{e9}", "", true), "\"caf\\303\\251\"");
        assert_eq!(format_path("bell\u{7}", "", true), "\"bell\\a\"");
    }

    #[test]
    fn quoting_can_be_disabled() {
        assert_eq!(format_path("tab\there", "", false), "tab\there");
        assert_eq!(format_path("caf\u{e9}", "", false), "caf\u{e9}");
    }

    #[test]
    fn plain_paths_are_never_quoted() {
        assert_eq!(format_path("plain-name_1.txt", "", true), "plain-name_1.txt");
    }

    proptest! {
        #[test]
        fn paths_below_the_caller_lose_the_prefix(
            prefix in "([a-z]{1,3}/){1,3}",
            rest in "[a-z]{1,3}(/[a-z]{1,3}){0,2}",
        ) {
            let full = format!("{prefix}{rest}");
            prop_assert_eq!(format_path(&full, &prefix, true), rest);
        }

        #[test]
        fn quoted_output_is_printable_ascii(path in "\\PC{0,12}") {
            let shown = format_path(&path, "", true);
            prop_assert!(shown.bytes().all(|b| (0x20..0x7f).contains(&b)));
        }
    }
}
