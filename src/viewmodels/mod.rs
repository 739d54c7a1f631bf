/// State holders bound to the two screens.
///
/// Each holder owns the tasks it spawns. Dropping the holder aborts whatever
/// is still in flight, so both must be created inside a Tokio runtime.
use crate::domain::{Outcome, Planet};
use crate::paging::{FeedSnapshot, Pager, PagingConfig, PlanetPagingSource};
use crate::repo::PlanetRepository;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::debug;

/// Tasks spawned on behalf of one screen
#[derive(Default)]
struct ScreenScope {
    tasks: Mutex<JoinSet<()>>,
}

impl ScreenScope {
    fn launch<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        // Reap finished tasks so the set does not grow with every tap
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }
}

/// Detail screen state
pub struct PlanetDetailsViewModel {
    repository: PlanetRepository,
    planet_details: Arc<watch::Sender<Outcome<Planet>>>,
    scope: ScreenScope,
}

impl PlanetDetailsViewModel {
    pub fn new(repository: PlanetRepository) -> Self {
        let (planet_details, _) = watch::channel(Outcome::Idle);
        Self {
            repository,
            planet_details: Arc::new(planet_details),
            scope: ScreenScope::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Outcome<Planet>> {
        self.planet_details.subscribe()
    }

    pub fn state(&self) -> Outcome<Planet> {
        self.planet_details.borrow().clone()
    }

    /// Emit `Loading`, then whatever the repository returns.
    ///
    /// Overlapping calls are neither cancelled nor sequenced: whichever
    /// response arrives last is the one left on screen, even if it belongs to
    /// the older request.
    pub fn load_planet_details(&self, planet_id: u32) {
        debug!("Loading details of planet {}", planet_id);
        self.planet_details.send_replace(Outcome::Loading);

        let repository = self.repository.clone();
        let planet_details = self.planet_details.clone();
        self.scope.launch(async move {
            let outcome = repository.get_planet_details(planet_id).await;
            planet_details.send_replace(outcome);
        });
    }
}

/// List screen state
pub struct PlanetListViewModel {
    pager: Arc<Pager<PlanetPagingSource>>,
    scope: ScreenScope,
}

impl PlanetListViewModel {
    /// Builds the feed and starts loading the first page
    pub fn new(repository: PlanetRepository, page_size: usize) -> Self {
        let pager = Pager::new(
            PlanetPagingSource::new(repository),
            PagingConfig::new(page_size),
        );
        let view_model = Self {
            pager: Arc::new(pager),
            scope: ScreenScope::default(),
        };
        view_model.refresh();
        view_model
    }

    pub fn feed(&self) -> watch::Receiver<FeedSnapshot<Planet>> {
        self.pager.subscribe()
    }

    /// Pull-to-refresh
    pub fn refresh(&self) {
        let pager = self.pager.clone();
        self.scope.launch(async move { pager.refresh().await });
    }

    /// Retry button of the error panel
    pub fn retry(&self) {
        let pager = self.pager.clone();
        self.scope.launch(async move { pager.retry().await });
    }

    /// Called as rows scroll into view; loads neighbouring pages when needed
    pub fn on_item_visible(&self, index: usize) -> Option<Planet> {
        let access = self.pager.access(index);
        if access.load_next {
            let pager = self.pager.clone();
            self.scope.launch(async move { pager.append().await });
        }
        if access.load_previous {
            let pager = self.pager.clone();
            self.scope.launch(async move { pager.prepend().await });
        }
        access.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::FakeApi;
    use crate::config::PAGE_SIZE;
    use crate::domain::fixtures::{page, planet};
    use crate::domain::ErrorKind;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn repository(api: Arc<FakeApi>) -> PlanetRepository {
        PlanetRepository::new(api)
    }

    async fn wait_for_items(rx: &mut watch::Receiver<FeedSnapshot<Planet>>, len: usize) {
        timeout(WAIT, rx.wait_for(|s| s.items.len() == len))
            .await
            .expect("feed did not reach expected length")
            .unwrap();
    }

    #[tokio::test]
    async fn test_details_starts_idle() {
        let vm = PlanetDetailsViewModel::new(repository(Arc::new(FakeApi::default())));
        assert_eq!(vm.state(), Outcome::Idle);
    }

    #[tokio::test]
    async fn test_details_emits_loading_then_success() {
        let tatooine = planet(1, "Tatooine");
        let api = Arc::new(FakeApi::with_details(vec![tatooine.clone()]));
        let gate = api.gate(1);
        let vm = PlanetDetailsViewModel::new(repository(api));
        let mut rx = vm.subscribe();

        vm.load_planet_details(1);
        assert_eq!(*rx.borrow_and_update(), Outcome::Loading);

        gate.notify_one();
        timeout(WAIT, rx.changed()).await.unwrap().unwrap();
        assert_eq!(*rx.borrow_and_update(), Outcome::success(tatooine));
    }

    #[tokio::test]
    async fn test_details_emits_error_for_unknown_planet() {
        let vm = PlanetDetailsViewModel::new(repository(Arc::new(FakeApi::default())));
        let mut rx = vm.subscribe();

        vm.load_planet_details(42);
        let outcome = timeout(WAIT, rx.wait_for(|o| o.is_terminal()))
            .await
            .unwrap()
            .unwrap()
            .clone();
        match outcome {
            Outcome::Error(e) => {
                assert_eq!(e.code, Some(404));
                assert_eq!(e.error_type, Some(ErrorKind::Server));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_details_stale_response_wins_race() {
        let first = planet(1, "Tatooine");
        let second = planet(2, "Alderaan");
        let api = Arc::new(FakeApi::with_details(vec![first.clone(), second.clone()]));
        let slow = api.gate(1);
        let vm = PlanetDetailsViewModel::new(repository(api));
        let mut rx = vm.subscribe();

        vm.load_planet_details(1);
        vm.load_planet_details(2);
        timeout(WAIT, rx.wait_for(|o| *o == Outcome::success(second.clone())))
            .await
            .unwrap()
            .unwrap();

        slow.notify_one();
        timeout(WAIT, rx.wait_for(|o| *o == Outcome::success(first.clone())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(vm.state(), Outcome::success(first));
    }

    #[tokio::test]
    async fn test_details_drop_aborts_pending_load() {
        let api = Arc::new(FakeApi::with_details(vec![planet(1, "Tatooine")]));
        let _gate = api.gate(1);
        let vm = PlanetDetailsViewModel::new(repository(api));
        let mut rx = vm.subscribe();

        vm.load_planet_details(1);
        assert_eq!(*rx.borrow_and_update(), Outcome::Loading);
        drop(vm);

        // Every sender is gone once the task is aborted
        assert!(timeout(WAIT, rx.changed()).await.unwrap().is_err());
        assert_eq!(*rx.borrow(), Outcome::Loading);
    }

    #[tokio::test]
    async fn test_list_loads_first_page_on_creation() {
        let api = Arc::new(FakeApi::with_pages(vec![(1, page(1..11, true))]));
        let vm = PlanetListViewModel::new(repository(api), PAGE_SIZE);
        let mut feed = vm.feed();

        wait_for_items(&mut feed, 10).await;
        assert_eq!(vm.on_item_visible(0).map(|p| p.id()), Some(1));
    }

    #[tokio::test]
    async fn test_list_scrolling_appends_pages() {
        let api = Arc::new(FakeApi::with_pages(vec![
            (1, page(1..11, true)),
            (2, page(11..16, false)),
        ]));
        let vm = PlanetListViewModel::new(repository(api.clone()), PAGE_SIZE);
        let mut feed = vm.feed();
        wait_for_items(&mut feed, 10).await;

        vm.on_item_visible(9);
        wait_for_items(&mut feed, 15).await;
        assert_eq!(
            feed.borrow().load_states.append,
            crate::paging::LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        );
    }

    #[tokio::test]
    async fn test_list_visible_rows_load_one_page() {
        let api = Arc::new(FakeApi::with_pages(
            (1..=6)
                .map(|n| (n, page(n * 10 - 9..n * 10 + 1, n < 6)))
                .collect(),
        ));
        let vm = PlanetListViewModel::new(repository(api.clone()), PAGE_SIZE);
        let mut feed = vm.feed();
        wait_for_items(&mut feed, 10).await;

        // The whole first screen becomes visible at once
        for index in 0..10 {
            vm.on_item_visible(index);
        }
        timeout(
            WAIT,
            feed.wait_for(|s| s.items.len() == 20 && s.load_states.append.can_load()),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(api.page_calls(), 2);
        assert_eq!(feed.borrow().items.len(), 20);
    }

    #[tokio::test]
    async fn test_list_retry_after_failed_refresh() {
        let api = Arc::new(FakeApi::with_pages(vec![(1, page(1..11, false))]));
        api.fail_page(1);
        let vm = PlanetListViewModel::new(repository(api.clone()), PAGE_SIZE);
        let mut feed = vm.feed();

        let error = timeout(WAIT, feed.wait_for(|s| s.load_states.refresh.is_error()))
            .await
            .unwrap()
            .unwrap()
            .load_states
            .error()
            .cloned();
        assert_eq!(error.map(|e| e.message), Some("Upstream exploded".to_string()));

        api.heal_page(1);
        vm.retry();
        wait_for_items(&mut feed, 10).await;
        assert!(feed.borrow().load_states.error().is_none());
    }
}
