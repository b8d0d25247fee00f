//! End-to-end controller flows against fake collaborators
//!
//! Effects are run inline and their resulting actions fed back into the
//! store until nothing is left, the same loop the runtime drives with tasks.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use locsearch::{
    action::Action,
    effect::Effect,
    reducer::reducer,
    service::{Collaborators, DeviceLocator, LocationService, ServiceError},
    state::{
        AppState, Coordinates, DisplayMode, Listing, LocationState, NOTICE_DURATION_MS,
        NoticeKind, Place,
    },
};
use pretty_assertions::assert_eq;
use tui_dispatch::EffectStore;

#[derive(Default)]
struct FakeService {
    history: Mutex<Vec<Place>>,
    results: Mutex<HashMap<String, Vec<LocationState>>>,
    selected: Mutex<Vec<Place>>,
    calls: Mutex<Vec<String>>,
}

impl FakeService {
    fn with_history(places: Vec<Place>) -> Self {
        let service = Self::default();
        *service.history.lock().unwrap() = places;
        service
    }

    fn answer(self, query: &str, results: Vec<LocationState>) -> Self {
        self.results.lock().unwrap().insert(query.to_string(), results);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn selected(&self) -> Vec<Place> {
        self.selected.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationService for FakeService {
    async fn find_location(&self, query: &str) -> Vec<LocationState> {
        self.calls.lock().unwrap().push(format!("find:{query}"));
        self.results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default()
    }

    async fn history_list(&self) -> Result<Vec<Place>, ServiceError> {
        self.calls.lock().unwrap().push("history".to_string());
        Ok(self.history.lock().unwrap().clone())
    }

    async fn delete_entry(&self, label: &str) -> Result<(), ServiceError> {
        // Slow deletion: a refresh that did not wait would still see the entry
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.calls.lock().unwrap().push(format!("delete:{label}"));
        self.history.lock().unwrap().retain(|place| place.label != label);
        Ok(())
    }

    async fn select_location(&self, place: &Place) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(format!("select:{}", place.label));
        self.selected.lock().unwrap().push(place.clone());
        Ok(())
    }
}

struct FakeLocator(Option<Coordinates>);

#[async_trait]
impl DeviceLocator for FakeLocator {
    async fn current_position(&self) -> Option<Coordinates> {
        self.0
    }
}

fn collaborators(service: &Arc<FakeService>, position: Option<Coordinates>) -> Collaborators {
    Collaborators::new(service.clone(), Arc::new(FakeLocator(position)))
}

/// Dispatch `first`, run every resulting effect, feed results back; returns all actions seen.
async fn settle(
    mut dispatch: impl FnMut(Action) -> Vec<Effect>,
    deps: &Collaborators,
    first: Action,
) -> Vec<Action> {
    let mut seen = Vec::new();
    let mut queue = VecDeque::from([first]);
    while let Some(action) = queue.pop_front() {
        seen.push(action.clone());
        for effect in dispatch(action) {
            queue.push_back(effect.run(deps.clone()).await);
        }
    }
    seen
}

fn paris() -> Place {
    Place::new("Paris", 48.8, 2.3)
}

fn rome() -> Place {
    Place::new("Rome", 41.9, 12.5)
}

#[tokio::test]
async fn test_init_shows_history() {
    let service = Arc::new(FakeService::with_history(vec![paris(), rome()]));
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);

    settle(|a| store.dispatch(a).effects, &deps, Action::Init).await;

    assert_eq!(store.state().mode, DisplayMode::History);
    assert_eq!(store.state().listing, Listing::History(vec![paris(), rome()]));
    assert!(!store.state().is_loading());
}

#[tokio::test]
async fn test_long_query_shows_found_results() {
    let service = Arc::new(FakeService::with_history(vec![rome()]).answer(
        "Par",
        vec![LocationState::Success(paris())],
    ));
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);

    settle(|a| store.dispatch(a).effects, &deps, Action::QueryChange("Par".into())).await;

    assert_eq!(store.state().listing, Listing::Found(vec![paris()]));
    assert_eq!(store.state().mode.title(), "Found results");
    assert_eq!(service.calls(), vec!["find:Par".to_string()]);
}

#[tokio::test]
async fn test_error_in_results_shows_nothing() {
    let service = Arc::new(FakeService::default().answer(
        "Par",
        vec![
            LocationState::Success(paris()),
            LocationState::Success(rome()),
            LocationState::Error,
        ],
    ));
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);

    settle(|a| store.dispatch(a).effects, &deps, Action::QueryChange("Par".into())).await;

    assert_eq!(store.state().listing, Listing::Found(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn test_delete_then_refresh_never_shows_deleted_entry() {
    let service = Arc::new(FakeService::with_history(vec![paris(), rome()]));
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);
    settle(|a| store.dispatch(a).effects, &deps, Action::Init).await;

    let seen = settle(
        |a| store.dispatch(a).effects,
        &deps,
        Action::HistoryDelete("Paris".into()),
    )
    .await;

    assert_eq!(store.state().listing, Listing::History(vec![rome()]));
    for action in seen {
        match action {
            Action::HistoryDidLoad(places) | Action::HistoryDidDelete { places, .. } => {
                assert!(places.iter().all(|place| place.label != "Paris"));
            }
            _ => {}
        }
    }
    assert!(!store.state().is_loading());
    let calls = service.calls();
    let delete_at = calls.iter().position(|c| c == "delete:Paris").unwrap();
    assert_eq!(calls[delete_at + 1], "history");
}

#[tokio::test]
async fn test_selecting_entry_calls_back_and_closes() {
    let service = Arc::new(FakeService::with_history(vec![paris()]));
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);
    settle(|a| store.dispatch(a).effects, &deps, Action::Init).await;

    let seen = settle(|a| store.dispatch(a).effects, &deps, Action::ResultSelect(0)).await;

    assert_eq!(service.selected(), vec![Place::new("Paris", 48.8, 2.3)]);
    assert!(store.state().closing);
    assert_eq!(seen.last(), Some(&Action::Quit));
}

#[tokio::test]
async fn test_search_submit_on_empty_list_does_nothing() {
    let service = Arc::new(FakeService::default());
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);
    settle(|a| store.dispatch(a).effects, &deps, Action::Init).await;

    let seen = settle(|a| store.dispatch(a).effects, &deps, Action::SearchSubmit).await;

    assert_eq!(seen, vec![Action::SearchSubmit]);
    assert!(service.selected().is_empty());
    assert!(!store.state().closing);
}

#[tokio::test(start_paused = true)]
async fn test_current_location_unavailable_shows_error_and_stays_open() {
    let service = Arc::new(FakeService::default());
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);

    let result = store.dispatch(Action::CurrentLocationRequest);
    let failed = result.effects[0].clone().run(deps.clone()).await;
    assert_eq!(failed, Action::CurrentLocationDidFail);

    let result = store.dispatch(failed);
    let notice = store.state().notice.clone().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(!store.state().closing);
    assert!(service.selected().is_empty());

    // The notice goes away on its own
    let expired = result.effects[0].clone().run(deps.clone()).await;
    assert_eq!(expired, Action::NoticeExpire(notice.id));
    store.dispatch(expired);
    assert!(store.state().notice.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_current_location_selects_then_closes_after_notice() {
    let service = Arc::new(FakeService::default());
    let position = Coordinates {
        lat: 10.0,
        lon: 20.0,
    };
    let deps = collaborators(&service, Some(position));
    let mut store = EffectStore::new(AppState::default(), reducer);

    let result = store.dispatch(Action::CurrentLocationRequest);
    let located = result.effects[0].clone().run(deps.clone()).await;
    assert_eq!(located, Action::CurrentLocationDidLoad(position));

    let result = store.dispatch(located);
    assert_eq!(
        store.state().notice.as_ref().map(|n| n.kind),
        Some(NoticeKind::Info)
    );

    let started = tokio::time::Instant::now();
    let close = result.effects[0].clone().run(deps.clone()).await;
    assert_eq!(close, Action::Quit);
    assert!(started.elapsed() >= Duration::from_millis(NOTICE_DURATION_MS));
    assert_eq!(
        service.selected(),
        vec![Place::new("Current Position", 10.0, 20.0)]
    );
}

#[tokio::test]
async fn test_typing_back_to_short_query_returns_to_history() {
    let service = Arc::new(
        FakeService::with_history(vec![rome()])
            .answer("Par", vec![LocationState::Success(paris())]),
    );
    let deps = collaborators(&service, None);
    let mut store = EffectStore::new(AppState::default(), reducer);

    settle(|a| store.dispatch(a).effects, &deps, Action::QueryChange("Par".into())).await;
    assert_eq!(store.state().listing, Listing::Found(vec![paris()]));

    settle(|a| store.dispatch(a).effects, &deps, Action::QueryChange("Pa".into())).await;
    assert_eq!(store.state().listing, Listing::History(vec![rome()]));
    assert_eq!(store.state().mode.title(), "Recently requested");
}
