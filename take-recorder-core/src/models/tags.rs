use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator placed between tag values in a take's file name.
pub const TAG_SEPARATOR: char = '_';

/// Ordered descriptive labels for a take (model, chord, position, knobs, player).
///
/// The tuple is cloned when a take is finalized, so later edits to the
/// inputs never rename a take that is already on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTuple(Vec<String>);

impl TagTuple {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// File-name stem without the numeric suffix, e.g. `A_open_1_1`.
    ///
    /// Path separators inside a value are replaced with `-`. Values that
    /// contain the tag separator itself are kept as-is, which makes prefix
    /// matching over existing files ambiguous for such values.
    pub fn base_name(&self) -> String {
        let mut base = String::new();
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                base.push(TAG_SEPARATOR);
            }
            base.extend(tag.trim().chars().map(|c| match c {
                '/' | '\\' => '-',
                c => c,
            }));
        }
        base
    }
}

impl fmt::Display for TagTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

impl<S: Into<String>> FromIterator<S> for TagTuple {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
