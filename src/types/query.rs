use serde::{Deserialize, Serialize};

use super::{ShaderId, ShaderListing, UserId};

/// Filter set for shader search. Every supplied predicate must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShaderQuery {
    /// Case-insensitive substring of the name or any script source.
    #[serde(default)]
    pub text: Option<String>,
    /// The shader must carry every listed tag. Empty means no constraint.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// Resolved to an owner id; an unknown username matches nothing.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub shader_id: Option<ShaderId>,
    /// `None` returns every match after `offset`.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl ShaderQuery {
    #[must_use]
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn paged(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<ShaderListing>,
    /// Number of matches before pagination.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SearchPage {
    #[must_use]
    pub fn ids(&self) -> Vec<ShaderId> {
        self.items.iter().map(|l| l.shader.id).collect()
    }
}
