use std::collections::{BTreeSet, HashMap};

use crate::types::{Shader, ShaderId, Tag, TagId, User, UserId};

/// Case-folded lookup key shared by usernames and tag names.
#[must_use]
pub fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Secondary indexes derived from the primary tables.
///
/// The owner and tag buckets always hold exactly the ids of the shaders whose
/// stored record matches; buckets that become empty are dropped.
#[derive(Debug, Default)]
pub struct Indexes {
    users_by_name: HashMap<String, UserId>,
    tags_by_name: HashMap<String, TagId>,
    shaders_by_owner: HashMap<UserId, BTreeSet<ShaderId>>,
    shaders_by_tag: HashMap<String, BTreeSet<ShaderId>>,
}

impl Indexes {
    pub fn insert_user(&mut self, user: &User) {
        self.users_by_name.insert(fold(&user.username), user.id);
    }

    #[must_use]
    pub fn user_id(&self, username: &str) -> Option<UserId> {
        self.users_by_name.get(&fold(username)).copied()
    }

    pub fn insert_tag(&mut self, tag: &Tag) {
        self.tags_by_name.insert(fold(&tag.name), tag.id);
    }

    #[must_use]
    pub fn tag_id(&self, name: &str) -> Option<TagId> {
        self.tags_by_name.get(&fold(name)).copied()
    }

    pub fn add_shader(&mut self, shader: &Shader) {
        self.shaders_by_owner
            .entry(shader.owner_id)
            .or_default()
            .insert(shader.id);

        for tag in &shader.tags {
            self.shaders_by_tag
                .entry(fold(&tag.name))
                .or_default()
                .insert(shader.id);
        }
    }

    pub fn remove_shader(&mut self, shader: &Shader) {
        remove_from(&mut self.shaders_by_owner, &shader.owner_id, shader.id);
        for tag in &shader.tags {
            remove_from(&mut self.shaders_by_tag, &fold(&tag.name), shader.id);
        }
    }

    #[must_use]
    pub fn owned_by(&self, owner: UserId) -> Option<&BTreeSet<ShaderId>> {
        self.shaders_by_owner.get(&owner)
    }

    /// `key` must already be folded.
    #[must_use]
    pub fn tagged(&self, key: &str) -> Option<&BTreeSet<ShaderId>> {
        self.shaders_by_tag.get(key)
    }

    #[must_use]
    pub fn tag_count(&self, name: &str) -> usize {
        self.tagged(&fold(name)).map_or(0, BTreeSet::len)
    }
}

fn remove_from<K>(map: &mut HashMap<K, BTreeSet<ShaderId>>, key: &K, id: ShaderId)
where
    K: std::hash::Hash + Eq,
{
    if let Some(ids) = map.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}
