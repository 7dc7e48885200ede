//! Path filters for strata.
//!
//! A [`Pathspec`] is the normalized set of user-supplied path patterns plus
//! the common directory prefix they share. A [`PathMatcher`] answers whether
//! a path is selected by the set and, when asked to, remembers which filters
//! matched so callers can report the ones that never did.

pub mod error;
pub mod matcher;
pub mod pathspec;

pub use error::{PathspecError, Result};
pub use matcher::PathMatcher;
pub use pathspec::{Pathspec, PathspecItem};
