use super::{LoadError, LoadParams, LoadResult, Page, PagingSource, PagingState};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Page size and prefetch window of a `Pager`. No placeholders are ever
/// emitted for items that are not loaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub page_size: usize,
    /// Loads start when an accessed item is this close to either edge
    pub prefetch_distance: usize,
    pub initial_load_size: usize,
}

impl PagingConfig {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            prefetch_distance: page_size,
            initial_load_size: page_size * 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoading { end_of_pagination_reached: bool },
    Loading,
    Error(LoadError),
}

impl LoadState {
    fn idle(end_of_pagination_reached: bool) -> Self {
        LoadState::NotLoading {
            end_of_pagination_reached,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    /// Not loading, not failed, more pages may follow
    pub fn can_load(&self) -> bool {
        matches!(
            self,
            LoadState::NotLoading {
                end_of_pagination_reached: false
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStates {
    pub refresh: LoadState,
    pub prepend: LoadState,
    pub append: LoadState,
}

impl Default for LoadStates {
    fn default() -> Self {
        Self {
            refresh: LoadState::idle(false),
            prepend: LoadState::idle(false),
            append: LoadState::idle(false),
        }
    }
}

impl LoadStates {
    /// First failing direction, refresh before append before prepend
    pub fn error(&self) -> Option<&LoadError> {
        [&self.refresh, &self.append, &self.prepend]
            .into_iter()
            .find_map(|s| match s {
                LoadState::Error(e) => Some(e),
                _ => None,
            })
    }
}

/// What the list screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot<V> {
    pub items: Vec<V>,
    pub load_states: LoadStates,
}

impl<V> Default for FeedSnapshot<V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            load_states: LoadStates::default(),
        }
    }
}

/// Result of looking at one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAccess<V> {
    pub item: Option<V>,
    pub load_next: bool,
    pub load_previous: bool,
}

struct PagerState<K, V> {
    paging: PagingState<K, V>,
    load_states: LoadStates,
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Prepend,
    Append,
}

/// Drives a `PagingSource` and publishes the accumulated items.
///
/// Loads are serialized: a second load waits for the first to finish, then
/// re-reads the keys from the updated state.
pub struct Pager<S: PagingSource> {
    source: S,
    config: PagingConfig,
    state: Mutex<PagerState<S::Key, S::Value>>,
    load_lock: tokio::sync::Mutex<()>,
    snapshot: watch::Sender<FeedSnapshot<S::Value>>,
}

impl<S: PagingSource> Pager<S> {
    pub fn new(source: S, config: PagingConfig) -> Self {
        let (snapshot, _) = watch::channel(FeedSnapshot::default());
        Self {
            source,
            config,
            state: Mutex::new(PagerState {
                paging: PagingState::default(),
                load_states: LoadStates::default(),
            }),
            load_lock: tokio::sync::Mutex::new(()),
            snapshot,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot<S::Value>> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot<S::Value> {
        self.snapshot.borrow().clone()
    }

    /// Reload from the key the source picks for the current anchor. Loaded
    /// pages stay visible until the new page arrives; a failed refresh keeps
    /// them.
    pub async fn refresh(&self) {
        let _guard = self.load_lock.lock().await;

        let key = {
            let mut state = self.lock_state();
            let key = self.source.refresh_key(&state.paging);
            state.load_states.refresh = LoadState::Loading;
            self.publish(&state);
            key
        };
        debug!("Refreshing feed from key {:?}", key);

        let result = self
            .source
            .load(LoadParams {
                key,
                load_size: self.config.initial_load_size,
            })
            .await;

        let mut state = self.lock_state();
        match result {
            LoadResult::Page(page) => {
                state.load_states = LoadStates {
                    refresh: LoadState::idle(false),
                    prepend: LoadState::idle(page.prev_key.is_none()),
                    append: LoadState::idle(page.next_key.is_none()),
                };
                state.paging = PagingState {
                    pages: vec![page],
                    anchor_position: None,
                };
            }
            LoadResult::Error(e) => {
                warn!("Feed refresh failed: {}", e);
                state.load_states.refresh = LoadState::Error(e);
            }
        }
        self.publish(&state);
    }

    /// Load the page after the last one
    pub async fn append(&self) {
        self.load_edge(Direction::Append).await
    }

    /// Load the page before the first one
    pub async fn prepend(&self) {
        self.load_edge(Direction::Prepend).await
    }

    /// Re-run every failed load
    pub async fn retry(&self) {
        let (refresh, append, prepend) = {
            let mut state = self.lock_state();
            let states = &mut state.load_states;
            let failed = (
                states.refresh.is_error(),
                states.append.is_error(),
                states.prepend.is_error(),
            );
            if failed.1 {
                states.append = LoadState::idle(false);
            }
            if failed.2 {
                states.prepend = LoadState::idle(false);
            }
            failed
        };

        if refresh {
            self.refresh().await;
        }
        if append {
            self.append().await;
        }
        if prepend {
            self.prepend().await;
        }
    }

    /// Record that the screen looked at `index` and tell the caller whether
    /// it is close enough to an edge to load more.
    ///
    /// A direction reported as needing a load is marked `Loading` right away,
    /// so later accesses do not ask for it again until that load finishes.
    /// The caller must follow a `true` with `append` / `prepend`.
    pub fn access(&self, index: usize) -> ItemAccess<S::Value> {
        let mut state = self.lock_state();
        let count = state.paging.item_count();
        if count > 0 {
            state.paging.anchor_position = Some(index.min(count - 1));
        }

        let item = state
            .paging
            .pages
            .iter()
            .flat_map(|p| p.data.iter())
            .nth(index)
            .cloned();

        let can_append = state.paging.pages.last().is_some_and(|p| p.next_key.is_some())
            && state.load_states.append.can_load();
        let can_prepend = state.paging.pages.first().is_some_and(|p| p.prev_key.is_some())
            && state.load_states.prepend.can_load();

        let load_next =
            can_append && index.saturating_add(self.config.prefetch_distance) >= count;
        let load_previous = can_prepend && index < self.config.prefetch_distance;
        if load_next {
            state.load_states.append = LoadState::Loading;
        }
        if load_previous {
            state.load_states.prepend = LoadState::Loading;
        }
        if load_next || load_previous {
            self.publish(&state);
        }

        ItemAccess {
            item,
            load_next,
            load_previous,
        }
    }

    async fn load_edge(&self, direction: Direction) {
        let _guard = self.load_lock.lock().await;

        let key = {
            let mut state = self.lock_state();
            let load_state = match direction {
                Direction::Append => &state.load_states.append,
                Direction::Prepend => &state.load_states.prepend,
            };
            // `Loading` here means `access` claimed this load for us
            if !(load_state.can_load() || *load_state == LoadState::Loading) {
                return;
            }

            let key = match direction {
                Direction::Append => state.paging.pages.last().and_then(|p| p.next_key),
                Direction::Prepend => state.paging.pages.first().and_then(|p| p.prev_key),
            };
            // Nothing loaded yet: only a refresh can start the feed
            if state.paging.pages.is_empty() {
                return;
            }
            let next_state = match key {
                Some(_) => LoadState::Loading,
                None => LoadState::idle(true),
            };
            *self.edge_state(&mut state, direction) = next_state;
            self.publish(&state);
            match key {
                Some(key) => key,
                None => return,
            }
        };
        debug!("Loading {:?} page {:?}", direction, key);

        let result = self
            .source
            .load(LoadParams {
                key: Some(key),
                load_size: self.config.page_size,
            })
            .await;

        let mut state = self.lock_state();
        match result {
            LoadResult::Page(page) => {
                let end_reached = match direction {
                    Direction::Append => page.next_key.is_none(),
                    Direction::Prepend => page.prev_key.is_none(),
                };
                self.insert_page(&mut state, direction, page);
                *self.edge_state(&mut state, direction) = LoadState::idle(end_reached);
            }
            LoadResult::Error(e) => {
                warn!("Loading {:?} page {:?} failed: {}", direction, key, e);
                *self.edge_state(&mut state, direction) = LoadState::Error(e);
            }
        }
        self.publish(&state);
    }

    fn insert_page(
        &self,
        state: &mut PagerState<S::Key, S::Value>,
        direction: Direction,
        page: Page<S::Key, S::Value>,
    ) {
        match direction {
            Direction::Append => state.paging.pages.push(page),
            Direction::Prepend => {
                // Keep the anchor on the same item
                if let Some(anchor) = state.paging.anchor_position.as_mut() {
                    *anchor += page.data.len();
                }
                state.paging.pages.insert(0, page);
            }
        }
    }

    fn edge_state<'a>(
        &self,
        state: &'a mut PagerState<S::Key, S::Value>,
        direction: Direction,
    ) -> &'a mut LoadState {
        match direction {
            Direction::Append => &mut state.load_states.append,
            Direction::Prepend => &mut state.load_states.prepend,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PagerState<S::Key, S::Value>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &PagerState<S::Key, S::Value>) {
        let items = state
            .paging
            .pages
            .iter()
            .flat_map(|p| p.data.iter().cloned())
            .collect();
        self.snapshot.send_replace(FeedSnapshot {
            items,
            load_states: state.load_states.clone(),
        });
    }
}
