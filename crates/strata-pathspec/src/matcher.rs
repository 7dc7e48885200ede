//! Applying a [`Pathspec`] to candidate paths.

use crate::error::{PathspecError, Result};
use crate::pathspec::Pathspec;

/// Matches paths against a filter set, optionally recording which filters
/// selected at least one path.
#[derive(Debug)]
pub struct PathMatcher<'a> {
    pathspec: &'a Pathspec,
    seen: Option<Vec<bool>>,
}

impl<'a> PathMatcher<'a> {
    /// Create a matcher. With `track_matches`, every filter that selects a
    /// path is remembered for [`Self::unmatched`].
    pub fn new(pathspec: &'a Pathspec, track_matches: bool) -> Self {
        let seen = track_matches.then(|| vec![false; pathspec.len()]);
        Self { pathspec, seen }
    }

    /// The filter set being applied.
    pub fn pathspec(&self) -> &'a Pathspec {
        self.pathspec
    }

    /// Whether `path` is selected.
    ///
    /// `prefix_len` is the length of the common prefix the caller already
    /// restricted its candidates to; it must be shorter than `path`. When
    /// tracking, every matching filter is marked, not only the first.
    pub fn matches(&mut self, path: &str, prefix_len: usize) -> Result<bool> {
        if prefix_len >= path.len() {
            return Err(PathspecError::PrefixNotSuperset {
                path: path.to_string(),
                prefix_len,
            });
        }
        let items = self.pathspec.items();
        if items.is_empty() {
            return Ok(true);
        }
        match self.seen.as_mut() {
            None => Ok(items.iter().any(|item| item.matches(path))),
            Some(seen) => {
                let mut any = false;
                for (item, seen) in items.iter().zip(seen.iter_mut()) {
                    if item.matches(path) {
                        *seen = true;
                        any = true;
                    }
                }
                Ok(any)
            }
        }
    }

    /// The distinct filters (as typed) that never matched, in argument order.
    ///
    /// Filters that normalize to the same text count once. Empty when
    /// tracking is off.
    pub fn unmatched(&self) -> Vec<&'a str> {
        let Some(seen) = &self.seen else {
            return Vec::new();
        };
        let items = self.pathspec.items();
        let mut out = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let first_with_text = items[..i].iter().all(|prev| prev.text() != item.text());
            let matched = items
                .iter()
                .zip(seen)
                .any(|(other, &hit)| hit && other.text() == item.text());
            if first_with_text && !matched {
                out.push(item.original());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_set_matches_everything() {
        let spec = Pathspec::empty();
        let mut m = PathMatcher::new(&spec, true);
        assert!(m.matches("any/path", 0).unwrap());
        assert!(m.unmatched().is_empty());
    }

    #[test]
    fn prefix_not_shorter_than_path_is_an_error() {
        let spec = Pathspec::new("", &["dir/a"]).unwrap();
        let mut m = PathMatcher::new(&spec, false);
        assert!(matches!(
            m.matches("dir/", 4),
            Err(PathspecError::PrefixNotSuperset { prefix_len: 4, .. })
        ));
        assert!(m.matches("dir/a", 4).unwrap());
    }

    #[test]
    fn every_matching_filter_is_marked() {
        let spec = Pathspec::new("", &["src", "src/a.rs", "*.rs", "docs"]).unwrap();
        let mut m = PathMatcher::new(&spec, true);
        assert!(m.matches("src/a.rs", 0).unwrap());
        assert_eq!(m.unmatched(), vec!["docs"]);
    }

    #[test]
    fn duplicate_filters_are_one_obligation() {
        let spec = Pathspec::new("", &["missing", "./missing", "found"]).unwrap();
        let mut m = PathMatcher::new(&spec, true);
        assert!(m.matches("found", 0).unwrap());
        assert!(!m.matches("other", 0).unwrap());
        assert_eq!(m.unmatched(), vec!["missing"]);
    }

    #[test]
    fn untracked_matcher_reports_nothing() {
        let spec = Pathspec::new("", &["nothing"]).unwrap();
        let m = PathMatcher::new(&spec, false);
        assert!(m.unmatched().is_empty());
    }

    proptest! {
        #[test]
        fn short_prefix_never_errors(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
            let spec = Pathspec::empty();
            let mut m = PathMatcher::new(&spec, false);
            for len in 0..path.len() {
                prop_assert!(m.matches(&path, len).is_ok());
            }
            prop_assert!(m.matches(&path, path.len()).is_err());
        }
    }
}
