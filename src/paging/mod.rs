/// Incremental loading of page-keyed collections
mod pager;
mod planet_source;

pub use pager::{FeedSnapshot, ItemAccess, LoadState, LoadStates, Pager, PagingConfig};
pub use planet_source::{PlanetPagingSource, STARTING_PAGE_INDEX};

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

/// Request for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParams<K> {
    /// `None` asks for the first page
    pub key: Option<K>,
    pub load_size: usize,
}

/// A page failed to load. The feed keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<K, V> {
    pub data: Vec<V>,
    pub prev_key: Option<K>,
    pub next_key: Option<K>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult<K, V> {
    Page(Page<K, V>),
    Error(LoadError),
}

/// Pages loaded so far and the last position the screen looked at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState<K, V> {
    pub pages: Vec<Page<K, V>>,
    pub anchor_position: Option<usize>,
}

impl<K, V> Default for PagingState<K, V> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            anchor_position: None,
        }
    }
}

impl<K, V> PagingState<K, V> {
    /// Page holding the item at `anchor_position`. Positions past the end
    /// resolve to the last non-empty page.
    pub fn closest_page_to_position(&self, anchor_position: usize) -> Option<&Page<K, V>> {
        if self.pages.iter().all(|p| p.data.is_empty()) {
            return None;
        }

        let mut remaining = anchor_position;
        for page in &self.pages {
            if remaining < page.data.len() {
                return Some(page);
            }
            remaining -= page.data.len();
        }

        self.pages.iter().rev().find(|p| !p.data.is_empty())
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.data.len()).sum()
    }
}

/// Source of pages for a `Pager`
#[async_trait]
pub trait PagingSource: Send + Sync + 'static {
    type Key: Copy + Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    async fn load(&self, params: LoadParams<Self::Key>) -> LoadResult<Self::Key, Self::Value>;

    /// Key to reload from on refresh, `None` starts from the beginning
    fn refresh_key(&self, state: &PagingState<Self::Key, Self::Value>) -> Option<Self::Key>;
}
