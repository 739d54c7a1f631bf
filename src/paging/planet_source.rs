use super::{LoadError, LoadParams, LoadResult, Page, PagingSource, PagingState};
use crate::domain::{Outcome, Planet};
use crate::repo::PlanetRepository;
use crate::utils::panic_message;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

pub const STARTING_PAGE_INDEX: u32 = 1;

/// Pages of planets keyed by the catalog's 1-based page number
#[derive(Clone)]
pub struct PlanetPagingSource {
    repository: PlanetRepository,
}

impl PlanetPagingSource {
    pub fn new(repository: PlanetRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PagingSource for PlanetPagingSource {
    type Key = u32;
    type Value = Planet;

    async fn load(&self, params: LoadParams<u32>) -> LoadResult<u32, Planet> {
        let position = params.key.unwrap_or(STARTING_PAGE_INDEX);
        debug!("Loading planet page {}", position);

        let attempt = AssertUnwindSafe(self.repository.get_planets(position))
            .catch_unwind()
            .await;

        let outcome = match attempt {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Planet page {} load panicked: {}", position, message);
                return LoadResult::Error(LoadError::new(message));
            }
        };

        match outcome {
            Outcome::Success { data, .. } => {
                let next_key = data.has_next().then(|| position + 1);
                LoadResult::Page(Page {
                    data: data.planets,
                    prev_key: (position > STARTING_PAGE_INDEX).then(|| position - 1),
                    next_key,
                })
            }
            Outcome::Error(e) => LoadResult::Error(LoadError::new(e.message)),
            Outcome::Loading => LoadResult::Error(LoadError::new("Loading")),
            Outcome::Idle => LoadResult::Error(LoadError::new("Idle")),
        }
    }

    fn refresh_key(&self, state: &PagingState<u32, Planet>) -> Option<u32> {
        let anchor = state.anchor_position?;
        let page = state.closest_page_to_position(anchor)?;
        page.prev_key
            .map(|k| k + 1)
            .or_else(|| page.next_key.map(|k| k - 1))
    }
}
