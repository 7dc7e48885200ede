//! Normalized filter sets and their shared directory prefix.

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::error::{PathspecError, Result};

const WILDCARD_CHARS: &[char] = &['*', '?', '[', '\\'];

fn first_wildcard(s: &str) -> Option<usize> {
    s.find(WILDCARD_CHARS)
}

/// One user-supplied filter, normalized to a path relative to the work tree
/// root.
#[derive(Debug, Clone)]
pub struct PathspecItem {
    original: String,
    text: String,
    glob: Option<GlobMatcher>,
}

impl PathspecItem {
    fn new(original: &str, text: String) -> Result<Self> {
        let glob = match first_wildcard(&text) {
            None => None,
            Some(_) => {
                let glob = GlobBuilder::new(&text)
                    .literal_separator(false)
                    .backslash_escape(true)
                    .build()
                    .map_err(|e| PathspecError::InvalidPattern {
                        pattern: original.to_string(),
                        reason: e.to_string(),
                    })?;
                Some(glob.compile_matcher())
            }
        };
        Ok(Self {
            original: original.to_string(),
            text,
            glob,
        })
    }

    /// The argument exactly as the user typed it.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The normalized, root-relative text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the filter contains wildcard characters.
    pub fn is_wildcard(&self) -> bool {
        self.glob.is_some()
    }

    /// The part of the text before the first wildcard character.
    pub fn literal_prefix(&self) -> &str {
        let end = first_wildcard(&self.text).unwrap_or(self.text.len());
        &self.text[..end]
    }

    /// Whether this filter selects `path`.
    pub fn matches(&self, path: &str) -> bool {
        if self.text.is_empty() || matches_as_prefix(&self.text, path) {
            return true;
        }
        self.glob.as_ref().is_some_and(|g| g.is_match(path))
    }

    /// Whether some path beneath directory `dir` could be selected by this
    /// filter.
    fn could_match_under(&self, dir: &str) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let dir_slash = format!("{dir}/");
        let literal = self.literal_prefix();
        if literal.starts_with(&dir_slash) {
            return true;
        }
        if !dir_slash.starts_with(literal) {
            return false;
        }
        self.is_wildcard() || matches_as_prefix(&self.text, dir)
    }
}

/// Equality, or `filter` names a directory that contains `path`.
fn matches_as_prefix(filter: &str, path: &str) -> bool {
    if filter == path {
        return true;
    }
    if !path.starts_with(filter) {
        return false;
    }
    filter.ends_with('/') || path.as_bytes().get(filter.len()) == Some(&b'/')
}

/// Resolve `arg` against the caller's sub-directory `prefix`.
///
/// `.` and empty segments are dropped and `..` pops a segment. A result that
/// names a directory (trailing `/`, or ending in `.`/`..`) keeps a trailing
/// slash so the common prefix can include it.
fn normalize(prefix: &str, arg: &str) -> Result<String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut names_dir = false;
    for segment in prefix.split('/').chain(arg.split('/')) {
        names_dir = false;
        match segment {
            "" => names_dir = true,
            "." => names_dir = true,
            ".." => {
                names_dir = true;
                if parts.pop().is_none() {
                    return Err(PathspecError::OutsideRepository {
                        path: arg.to_string(),
                    });
                }
            }
            s => parts.push(s),
        }
    }
    let mut text = parts.join("/");
    if names_dir && !text.is_empty() {
        text.push('/');
    }
    Ok(text)
}

fn compute_common_prefix(items: &[PathspecItem]) -> String {
    let Some(first) = items.first() else {
        return String::new();
    };
    let mut len = first.text.len();
    for item in &items[1..] {
        len = first
            .text
            .bytes()
            .zip(item.text.bytes())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    while !first.text.is_char_boundary(len) {
        len -= 1;
    }
    let mut common = &first.text[..len];
    if let Some(w) = first_wildcard(common) {
        common = &common[..w];
    }
    match common.rfind('/') {
        Some(slash) => common[..=slash].to_string(),
        None => String::new(),
    }
}

/// A normalized set of path filters.
#[derive(Debug, Clone, Default)]
pub struct Pathspec {
    items: Vec<PathspecItem>,
    common_prefix: String,
}

impl Pathspec {
    /// Build a filter set from command-line arguments given in the caller's
    /// sub-directory `prefix` (empty at the work tree root, otherwise ending
    /// in `/`).
    pub fn new<S: AsRef<str>>(prefix: &str, args: &[S]) -> Result<Self> {
        let items = args
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                PathspecItem::new(arg, normalize(prefix, arg)?)
            })
            .collect::<Result<Vec<_>>>()?;
        let common_prefix = compute_common_prefix(&items);
        debug!(filters = items.len(), prefix = %common_prefix, "built pathspec");
        Ok(Self {
            items,
            common_prefix,
        })
    }

    /// A filter set that selects everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The filters in argument order.
    pub fn items(&self) -> &[PathspecItem] {
        &self.items
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when there are no filters.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Directory prefix (ending in `/`, or empty) shared by every filter.
    pub fn common_prefix(&self) -> &str {
        &self.common_prefix
    }

    /// Byte length of [`Self::common_prefix`].
    pub fn prefix_len(&self) -> usize {
        self.common_prefix.len()
    }

    /// Whether any filter could select a path beneath directory `dir`
    /// (given without a trailing slash).
    pub fn could_match_dir(&self, dir: &str) -> bool {
        let dir = dir.trim_end_matches('/');
        self.items.is_empty() || self.items.iter().any(|item| item.could_match_under(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(prefix: &str, args: &[&str]) -> Pathspec {
        Pathspec::new(prefix, args).unwrap()
    }

    #[test]
    fn normalizes_against_subdirectory() {
        let p = spec("sub/", &["a.txt", "./b//c", "../top", "."]);
        let texts: Vec<&str> = p.items().iter().map(|i| i.text()).collect();
        assert_eq!(texts, vec!["sub/a.txt", "sub/b/c", "top", "sub/"]);
        assert_eq!(spec("", &["."]).items()[0].text(), "");
    }

    #[test]
    fn escaping_the_root_is_rejected() {
        assert!(matches!(
            Pathspec::new("", &["../x"]),
            Err(PathspecError::OutsideRepository { .. })
        ));
        assert!(Pathspec::new("a/", &["../../x"]).is_err());
    }

    #[test]
    fn common_prefix_cuts_at_directory() {
        assert_eq!(spec("", &["src/a.rs", "src/b.rs"]).common_prefix(), "src/");
        assert_eq!(spec("", &["src/lib/a", "src/lib/b"]).common_prefix(), "src/lib/");
        assert_eq!(spec("", &["src/a", "docs/b"]).common_prefix(), "");
        assert_eq!(spec("", &["file"]).common_prefix(), "");
        assert_eq!(spec("", &["dir/*.c"]).common_prefix(), "dir/");
        assert_eq!(spec("", &["di*/x"]).common_prefix(), "");
        assert_eq!(Pathspec::empty().prefix_len(), 0);
    }

    #[test]
    fn literal_filters_match_exact_or_directory() {
        let p = spec("", &["dir"]);
        let item = &p.items()[0];
        assert!(!item.is_wildcard());
        assert!(item.matches("dir"));
        assert!(item.matches("dir/x"));
        assert!(!item.matches("dirt"));
        assert!(spec("", &["dir/"]).items()[0].matches("dir/x"));
    }

    #[test]
    fn wildcard_star_crosses_directories() {
        let p = spec("", &["*.c"]);
        let item = &p.items()[0];
        assert!(item.is_wildcard());
        assert!(item.matches("a.c"));
        assert!(item.matches("deep/nested/b.c"));
        assert!(!item.matches("a.h"));
    }

    #[test]
    fn directory_pruning() {
        let p = spec("", &["src/lib/a.rs"]);
        assert!(p.could_match_dir("src"));
        assert!(p.could_match_dir("src/lib"));
        assert!(!p.could_match_dir("docs"));
        assert!(!p.could_match_dir("src/lib/a.rs.d"));

        let w = spec("", &["src/*.rs"]);
        assert!(w.could_match_dir("src/deep"));
        assert!(!w.could_match_dir("tests"));
        assert!(Pathspec::empty().could_match_dir("anything"));
    }

    #[test]
    fn invalid_glob_is_reported() {
        assert!(matches!(
            Pathspec::new("", &["[unclosed"]),
            Err(PathspecError::InvalidPattern { .. })
        ));
    }

    proptest! {
        #[test]
        fn common_prefix_is_shared_directory(
            paths in prop::collection::vec("[a-c]{1,2}(/[a-c]{1,2}\\*?){0,3}", 1..5)
        ) {
            let p = Pathspec::new("", &paths).unwrap();
            let prefix = p.common_prefix();
            prop_assert!(prefix.is_empty() || prefix.ends_with('/'));
            prop_assert!(!prefix.contains('*'));
            for item in p.items() {
                prop_assert!(item.text().starts_with(prefix));
            }
        }

        #[test]
        fn literal_filter_matches_itself_and_children(
            path in "[a-z]{1,4}(/[a-z]{1,4}){0,3}",
            child in "[a-z]{1,4}",
        ) {
            let p = Pathspec::new("", &[path.as_str()]).unwrap();
            let item = &p.items()[0];
            prop_assert!(item.matches(&path));
            let nested = format!("{path}/{child}");
            prop_assert!(item.matches(&nested));
        }
    }
}
