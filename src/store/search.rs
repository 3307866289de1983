use std::collections::BTreeSet;

use super::index::fold;
use super::state::State;
use crate::types::{SearchPage, Shader, ShaderId, ShaderQuery};

impl State {
    /// Evaluates `query` against the indexes, newest shader first.
    #[must_use]
    pub fn search(&self, query: &ShaderQuery) -> SearchPage {
        let needle = query
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut hits: Vec<&Shader> = self
            .candidates(query)
            .into_iter()
            .filter_map(|id| self.shaders.get(&id))
            .filter(|shader| needle.as_deref().is_none_or(|n| shader.matches_text(n)))
            .collect();
        hits.sort_unstable_by(|a, b| b.id.cmp(&a.id));

        let total = hits.len();
        let items = hits
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|shader| self.listing(shader))
            .collect();

        SearchPage {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        }
    }

    /// Ids satisfying every indexed predicate of `query`.
    fn candidates(&self, query: &ShaderQuery) -> Vec<ShaderId> {
        let mut constraints: Vec<&BTreeSet<ShaderId>> = Vec::new();

        if let Some(owner) = query.owner_id {
            let Some(ids) = self.index.owned_by(owner) else {
                return Vec::new();
            };
            constraints.push(ids);
        }

        if let Some(username) = query.username.as_deref().filter(|u| !u.trim().is_empty()) {
            let Some(ids) = self
                .index
                .user_id(username)
                .and_then(|owner| self.index.owned_by(owner))
            else {
                return Vec::new();
            };
            constraints.push(ids);
        }

        for tag in &query.tags {
            let key = fold(tag);
            if key.is_empty() {
                continue;
            }
            let Some(ids) = self.index.tagged(&key) else {
                return Vec::new();
            };
            constraints.push(ids);
        }

        constraints.sort_by_key(|ids| ids.len());

        let mut ids: Vec<ShaderId> = match query.shader_id {
            Some(id) if self.shaders.contains_key(&id) => vec![id],
            Some(_) => return Vec::new(),
            None => match constraints.first() {
                Some(smallest) => smallest.iter().copied().collect(),
                None => self.shaders.keys().copied().collect(),
            },
        };

        ids.retain(|id| constraints.iter().all(|set| set.contains(id)));
        ids
    }
}
