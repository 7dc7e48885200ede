//! Status tags printed in front of records.

/// Why a path was reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Cached,
    Unmerged,
    Removed,
    Modified,
    Other,
    Killed,
    SkipWorktree,
    ResolveUndo,
}

impl Tag {
    /// The two-character label.
    pub fn label(self) -> &'static str {
        match self {
            Tag::Cached => "H ",
            Tag::Unmerged => "M ",
            Tag::Removed => "R ",
            Tag::Modified => "C ",
            Tag::Other => "? ",
            Tag::Killed => "K ",
            Tag::SkipWorktree => "S ",
            Tag::ResolveUndo => "U ",
        }
    }

    /// The label used for entries flagged `assume_valid`.
    pub fn valid_bit_label(self) -> &'static str {
        match self {
            Tag::Cached => "h ",
            Tag::Unmerged => "m ",
            Tag::Removed => "r ",
            Tag::Modified => "c ",
            Tag::Other => "! ",
            Tag::Killed => "k ",
            Tag::SkipWorktree => "s ",
            Tag::ResolveUndo => "u ",
        }
    }
}
