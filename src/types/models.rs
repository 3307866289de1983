use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ShaderId = u64;
pub type TagId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A tag together with the number of shaders currently carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub id: TagId,
    pub name: String,
    pub shader_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    #[default]
    Fragment,
    Compute,
}

/// Render target a script draws into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSpec {
    pub format: String,
    pub width: u32,
    pub height: u32,
}

impl Default for BufferSpec {
    fn default() -> Self {
        Self {
            format: "rgba8unorm".to_string(),
            width: 512,
            height: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkgroupSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeSpec {
    pub workgroup_size: WorkgroupSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderScript {
    pub id: u32,
    pub code: String,
    #[serde(default)]
    pub kind: ScriptKind,
    #[serde(default)]
    pub buffer: BufferSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<ComputeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shader {
    pub id: ShaderId,
    pub owner_id: UserId,
    pub name: String,
    pub scripts: Vec<ShaderScript>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shader {
    /// Case-insensitive substring match against the name and every script.
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .scripts
                .iter()
                .any(|s| s.code.to_lowercase().contains(needle))
    }
}

/// A shader with its owner's username resolved at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderListing {
    #[serde(flatten)]
    pub shader: Shader,
    pub author: String,
}

/// Input for creating a shader. Tags are free-text labels.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewShader {
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub scripts: Vec<ShaderScript>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShaderUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scripts: Option<Vec<ShaderScript>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
