mod ids;
mod index;
mod memory;
mod search;
mod snapshot;
mod state;
mod tags;

pub use memory::MemoryStore;
pub use snapshot::SnapshotDoc;
pub use tags::DEFAULT_TAGS;

use crate::error::Result;
use crate::types::*;

/// Store defines the record store interface used by the HTTP layer.
///
/// Lookups fail with `Error::NotFound`; mutations that target another user's
/// shader fail with `Error::Forbidden`.
pub trait Store: Send + Sync {
    // User operations
    fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;
    fn get_user(&self, id: UserId) -> Result<User>;
    fn get_user_by_username(&self, username: &str) -> Result<User>;

    // Shader operations
    fn create_shader(&self, shader: NewShader) -> Result<Shader>;
    fn update_shader(&self, id: ShaderId, caller: UserId, update: ShaderUpdate) -> Result<Shader>;
    fn delete_shader(&self, id: ShaderId, caller: UserId) -> Result<()>;
    fn get_shader(&self, id: ShaderId) -> Result<ShaderListing>;
    fn list_user_shaders(&self, owner: UserId) -> Result<Vec<ShaderListing>>;
    fn search(&self, query: &ShaderQuery) -> Result<SearchPage>;

    // Tag operations
    fn create_tag(&self, name: &str) -> Result<Tag>;
    fn list_tags(&self) -> Result<Vec<TagSummary>>;

    /// Writes the current state to stable storage, if the store has any.
    fn flush(&self) -> Result<()>;
}
