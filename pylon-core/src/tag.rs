//! Tag - Locate struct fields by their serialization or configuration tag
//!
//! Tags may carry trailing modifiers after a comma (`"name,omitempty"`); only
//! the part before the first comma takes part in matching. A tag of `"-"`
//! marks a field that is never mapped.

use std::collections::HashMap;

/// Tag that excludes a field from mapping
pub const SKIP_TAG: &str = "-";

/// Strip trailing modifiers from a raw tag
/// e.g., "name,omitempty" -> "name"
pub fn tag_name(raw: &str) -> &str {
    raw.split(',').next().unwrap_or(raw).trim()
}

/// Find the position of the field tagged `tag` by scanning the raw tags in
/// declaration order
pub fn find_field(raw_tags: &[&str], tag: &str) -> Option<usize> {
    raw_tags.iter().position(|raw| {
        let name = tag_name(raw);
        name != SKIP_TAG && name == tag
    })
}

/// Memoized tag lookup for one struct type
///
/// Built once per concrete type by the model macros. Tags must be unique
/// within a struct; when they are not, which field wins is unspecified.
#[derive(Debug, Clone)]
pub struct TagIndex {
    entries: Vec<(&'static str, usize)>,
    positions: HashMap<&'static str, usize>,
}

impl TagIndex {
    pub fn new(raw_tags: &[&'static str]) -> Self {
        let mut entries = Vec::with_capacity(raw_tags.len());
        let mut positions = HashMap::with_capacity(raw_tags.len());

        for (position, &raw) in raw_tags.iter().enumerate() {
            let name = tag_name(raw);
            if name == SKIP_TAG || name.is_empty() {
                continue;
            }
            if positions.contains_key(name) {
                log::warn!("duplicate field tag '{}' at position {}", name, position);
                continue;
            }
            positions.insert(name, position);
            entries.push((name, position));
        }

        Self { entries, positions }
    }

    /// Position of the field tagged `tag`
    pub fn position(&self, tag: &str) -> Option<usize> {
        self.positions.get(tag).copied()
    }

    /// Mapped fields as (tag, position), in declaration order
    pub fn entries(&self) -> &[(&'static str, usize)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
