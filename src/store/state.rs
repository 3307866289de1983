use std::collections::{HashMap, HashSet};

use chrono::Utc;

use super::ids::Allocators;
use super::index::Indexes;
use crate::error::{Error, Result};
use crate::types::*;

pub(crate) const UNKNOWN_AUTHOR: &str = "unknown";

/// Everything guarded by the store lock: primary tables, secondary indexes
/// and id allocators. Methods here assume the caller already holds the lock.
#[derive(Debug, Default)]
pub struct State {
    pub(super) users: HashMap<UserId, User>,
    pub(super) shaders: HashMap<ShaderId, Shader>,
    pub(super) tags: HashMap<TagId, Tag>,
    pub(super) index: Indexes,
    pub(super) ids: Allocators,
    /// Bumped on every committed mutation.
    pub(super) version: u64,
}

impl State {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.shaders.is_empty() && self.tags.is_empty()
    }

    // User operations

    pub fn insert_user(&mut self, username: &str, password_hash: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::Validation("username cannot be empty".to_string()));
        }
        if self.index.user_id(username).is_some() {
            return Err(Error::AlreadyExists);
        }

        let user = User {
            id: self.ids.users.next()?,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.index.insert_user(&user);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    #[must_use]
    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.index.user_id(username).and_then(|id| self.users.get(&id))
    }

    // Shader operations

    pub fn insert_shader(&mut self, new: NewShader) -> Result<Shader> {
        let name = clean_name(&new.name)?;
        validate_scripts(&new.scripts)?;

        let tags = self.normalize_tags(&new.tags)?;
        let now = Utc::now();
        let shader = Shader {
            id: self.ids.shaders.next()?,
            owner_id: new.owner_id,
            name,
            scripts: new.scripts,
            tags,
            created_at: now,
            updated_at: now,
        };

        self.index.add_shader(&shader);
        self.shaders.insert(shader.id, shader.clone());
        Ok(shader)
    }

    pub fn apply_update(
        &mut self,
        id: ShaderId,
        caller: UserId,
        update: ShaderUpdate,
    ) -> Result<Shader> {
        self.check_owner(id, caller)?;

        let name = update.name.as_deref().map(clean_name).transpose()?;
        if let Some(scripts) = &update.scripts {
            validate_scripts(scripts)?;
        }
        let tags = update
            .tags
            .map(|raw| self.normalize_tags(&raw))
            .transpose()?;

        let mut shader = self.shaders.remove(&id).ok_or(Error::NotFound)?;
        self.index.remove_shader(&shader);

        if let Some(name) = name {
            shader.name = name;
        }
        if let Some(scripts) = update.scripts {
            shader.scripts = scripts;
        }
        if let Some(tags) = tags {
            shader.tags = tags;
        }
        shader.updated_at = Utc::now();

        self.index.add_shader(&shader);
        self.shaders.insert(id, shader.clone());
        Ok(shader)
    }

    pub fn remove_shader(&mut self, id: ShaderId, caller: UserId) -> Result<Shader> {
        self.check_owner(id, caller)?;

        let shader = self.shaders.remove(&id).ok_or(Error::NotFound)?;
        self.index.remove_shader(&shader);
        Ok(shader)
    }

    fn check_owner(&self, id: ShaderId, caller: UserId) -> Result<()> {
        let shader = self.shaders.get(&id).ok_or(Error::NotFound)?;
        if shader.owner_id != caller {
            return Err(Error::Forbidden);
        }
        Ok(())
    }

    /// Shaders owned by `owner`, newest first.
    #[must_use]
    pub fn shaders_owned_by(&self, owner: UserId) -> Vec<Shader> {
        self.index
            .owned_by(owner)
            .into_iter()
            .flatten()
            .rev()
            .filter_map(|id| self.shaders.get(id).cloned())
            .collect()
    }

    #[must_use]
    pub fn author_of(&self, owner: UserId) -> String {
        self.users
            .get(&owner)
            .map_or_else(|| UNKNOWN_AUTHOR.to_string(), |u| u.username.clone())
    }

    #[must_use]
    pub fn listing(&self, shader: &Shader) -> ShaderListing {
        ShaderListing {
            shader: shader.clone(),
            author: self.author_of(shader.owner_id),
        }
    }

    // Tag operations

    /// Every tag with its live shader count, ordered by folded name.
    #[must_use]
    pub fn tag_summaries(&self) -> Vec<TagSummary> {
        let mut summaries: Vec<TagSummary> = self
            .tags
            .values()
            .map(|tag| TagSummary {
                id: tag.id,
                name: tag.name.clone(),
                shader_count: self.index.tag_count(&tag.name),
            })
            .collect();

        summaries.sort_by_cached_key(|t| (t.name.to_lowercase(), t.id));
        summaries
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("shader name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_scripts(scripts: &[ShaderScript]) -> Result<()> {
    let mut seen = HashSet::with_capacity(scripts.len());
    for script in scripts {
        if !seen.insert(script.id) {
            return Err(Error::Validation(format!(
                "duplicate script id {} in shader",
                script.id
            )));
        }
    }
    Ok(())
}
