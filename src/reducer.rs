//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{
    AppState, CURRENT_POSITION_LABEL, DisplayMode, LOCATION_DEFINED_TEXT, LOOKUP_FAILED_TEXT,
    Listing, NOTICE_DURATION_MS, NoticeKind, Place, SPINNER_CYCLE_TICKS, accept_results,
};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    // Once a selection is on its way out, only results and timers matter
    if state.closing && is_user_intent(&action) {
        return DispatchResult::unchanged();
    }

    match action {
        Action::Init | Action::QueryRefresh => apply_query(state),

        // ===== Query actions =====
        Action::QueryChange(query) => {
            state.query = query;
            apply_query(state)
        }

        // ===== Search actions =====
        Action::SearchSubmit => select(state, 0),

        Action::SearchDidLoad { query, results } => {
            if state.in_flight.search.as_deref() == Some(query.as_str()) {
                state.in_flight.search = None;
            }
            // Stale or arrived after switching to history
            if state.mode != DisplayMode::LiveSearch || query != state.query {
                return DispatchResult::changed();
            }
            state.listing = Listing::Found(accept_results(results));
            state.highlighted = 0;
            DispatchResult::changed()
        }

        // ===== History actions =====
        Action::HistoryDidLoad(places) => {
            state.in_flight.history = false;
            if state.mode == DisplayMode::History {
                state.listing = Listing::History(places);
                state.highlighted = 0;
            }
            DispatchResult::changed()
        }

        Action::HistoryDidError(_) => {
            state.in_flight.history = false;
            let id = state.show_notice(NoticeKind::Error, LOOKUP_FAILED_TEXT);
            DispatchResult::changed_with(expire(id))
        }

        Action::HistoryDelete(label) => {
            if state.mode != DisplayMode::History {
                return DispatchResult::unchanged();
            }
            state.in_flight.deleting.insert(label.clone());
            DispatchResult::changed_with(Effect::DeleteHistoryEntry { label })
        }

        Action::HistoryDidDelete { label, places } => {
            state.in_flight.deleting.remove(&label);
            if state.mode == DisplayMode::History {
                state.listing = Listing::History(places);
                state.highlighted = 0;
            }
            DispatchResult::changed()
        }

        Action::HistoryDeleteDidError { label, .. } => {
            state.in_flight.deleting.remove(&label);
            let id = state.show_notice(NoticeKind::Error, LOOKUP_FAILED_TEXT);
            DispatchResult::changed_with(expire(id))
        }

        // ===== Result actions =====
        Action::ResultHighlight(index) => {
            if index < state.listing.len() && index != state.highlighted {
                state.highlighted = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::ResultSelect(index) => select(state, index),

        // ===== Current location actions =====
        Action::CurrentLocationRequest => {
            if state.in_flight.locate {
                return DispatchResult::unchanged();
            }
            state.in_flight.locate = true;
            DispatchResult::changed_with(Effect::LocateDevice)
        }

        Action::CurrentLocationDidLoad(coords) => {
            state.in_flight.locate = false;
            if state.closing {
                return DispatchResult::changed();
            }
            let place = Place::new(CURRENT_POSITION_LABEL, coords.lat, coords.lon);
            state.selected = Some(place.clone());
            state.closing = true;
            state.show_notice(NoticeKind::Info, LOCATION_DEFINED_TEXT);
            DispatchResult::changed_with(Effect::SelectLocation {
                place,
                close_after_ms: NOTICE_DURATION_MS,
            })
        }

        Action::CurrentLocationDidFail => {
            state.in_flight.locate = false;
            let id = state.show_notice(NoticeKind::Error, LOOKUP_FAILED_TEXT);
            DispatchResult::changed_with(expire(id))
        }

        // ===== Notice actions =====
        Action::NoticeExpire(id) => {
            if state.notice.as_ref().is_some_and(|notice| notice.id == id) {
                state.notice = None;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // ===== Global actions =====
        Action::Render => DispatchResult::changed(),

        Action::Tick => {
            if state.is_loading() {
                state.tick_count = (state.tick_count + 1) % SPINNER_CYCLE_TICKS.max(1);
                DispatchResult::changed()
            } else if state.tick_count != 0 {
                state.tick_count = 0;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn is_user_intent(action: &Action) -> bool {
    matches!(
        action,
        Action::QueryChange(_)
            | Action::QueryRefresh
            | Action::SearchSubmit
            | Action::HistoryDelete(_)
            | Action::ResultHighlight(_)
            | Action::ResultSelect(_)
            | Action::CurrentLocationRequest
    )
}

/// Switch mode from the query length and ask for the matching list.
fn apply_query(state: &mut AppState) -> DispatchResult<Effect> {
    let mode = DisplayMode::for_query(&state.query);
    state.mode = mode;
    state.highlighted = 0;
    if state.listing.mode() != mode {
        state.listing = Listing::empty_for(mode);
    }

    match mode {
        DisplayMode::History => {
            state.in_flight.search = None;
            state.in_flight.history = true;
            DispatchResult::changed_with(Effect::LoadHistory)
        }
        DisplayMode::LiveSearch => {
            let query = state.query.clone();
            state.in_flight.search = Some(query.clone());
            DispatchResult::changed_with(Effect::SearchLocations { query })
        }
    }
}

fn select(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let Some(place) = state.listing.get(index).cloned() else {
        return DispatchResult::unchanged();
    };
    state.selected = Some(place.clone());
    state.closing = true;
    DispatchResult::changed_with(Effect::SelectLocation {
        place,
        close_after_ms: 0,
    })
}

fn expire(id: u64) -> Effect {
    Effect::ExpireNotice {
        id,
        after_ms: NOTICE_DURATION_MS,
    }
}
