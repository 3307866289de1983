use std::collections::HashSet;

use super::state::State;
use crate::error::{Error, Result};
use crate::types::Tag;

/// Tag vocabulary seeded into a fresh data directory.
pub const DEFAULT_TAGS: &[&str] = &[
    "fragment",
    "vertex",
    "compute",
    "raytracing",
    "animation",
    "procedural",
    "lighting",
    "post-processing",
];

// These run with the write lock already held and must not take it again.
impl State {
    /// Resolves a label to its canonical tag, creating it on first use.
    pub fn normalize_tag(&mut self, raw: &str) -> Result<Tag> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(Error::Validation("tag name cannot be empty".to_string()));
        }
        self.resolve_tag(name)
    }

    /// Normalizes a caller-supplied tag list. Blank entries and case-folded
    /// repeats are dropped; order of first appearance is kept.
    pub fn normalize_tags<S: AsRef<str>>(&mut self, raw: &[S]) -> Result<Vec<Tag>> {
        let mut seen = HashSet::with_capacity(raw.len());
        let mut tags = Vec::with_capacity(raw.len());

        for name in raw {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let tag = self.resolve_tag(name)?;
            if seen.insert(tag.id) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    fn resolve_tag(&mut self, name: &str) -> Result<Tag> {
        if let Some(tag) = self.index.tag_id(name).and_then(|id| self.tags.get(&id)) {
            return Ok(tag.clone());
        }

        let tag = Tag {
            id: self.ids.tags.next()?,
            name: name.to_string(),
        };
        self.index.insert_tag(&tag);
        self.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}
