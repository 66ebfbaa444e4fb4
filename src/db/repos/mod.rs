mod buckets;
mod console;
mod freeze_events;
mod projects;
mod tx;
mod users;

pub use buckets::*;
pub use console::*;
pub use freeze_events::*;
pub use projects::*;
pub use tx::*;
pub use users::*;

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Another page may follow.
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
