use crate::error::{Error, Result};

/// Per-table monotonic identifier counter. Ids start at 1 and are never
/// handed out twice; the owning table's write lock serialises `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next(&mut self) -> Result<u64> {
        let id = self.next;
        self.next = id
            .checked_add(1)
            .ok_or_else(|| Error::Validation("id space exhausted".to_string()))?;
        Ok(id)
    }

    /// Moves the watermark past an id that already exists. `u64::MAX` can
    /// never be observed; callers reject it first.
    pub fn observe(&mut self, id: u64) {
        if let Some(next) = id.checked_add(1).filter(|next| *next > self.next) {
            self.next = next;
        }
    }

    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Allocators {
    pub users: IdAllocator,
    pub shaders: IdAllocator,
    pub tags: IdAllocator,
}
