//! Actions: user intents and async results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{Coordinates, LocationState, Place};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    /// Screen shown: run the query logic for the initial text
    Init,

    // ===== Query category =====
    /// Search text changed
    QueryChange(String),

    /// Input focused again: rerun the query logic without editing
    QueryRefresh,

    // ===== Search category =====
    /// Keyboard search action: pick the first displayed element
    SearchSubmit,

    /// Result: location search finished for `query`
    SearchDidLoad {
        query: String,
        results: Vec<LocationState>,
    },

    // ===== History category =====
    /// Result: history list loaded (also after a deletion)
    HistoryDidLoad(Vec<Place>),

    /// Result: history storage failed
    HistoryDidError(String),

    /// Delete the history entry with this label, then refresh
    HistoryDelete(String),

    /// Result: `label` deleted, history reloaded afterwards
    HistoryDidDelete { label: String, places: Vec<Place> },

    /// Result: deleting `label` or the reload after it failed
    HistoryDeleteDidError { label: String, error: String },

    // ===== Result category =====
    /// Move the list cursor
    ResultHighlight(usize),

    /// Pick the element at this index
    ResultSelect(usize),

    // ===== CurrentLocation category =====
    /// Ask the device for its position
    CurrentLocationRequest,

    /// Result: device position resolved
    CurrentLocationDidLoad(Coordinates),

    /// Result: device position unavailable
    CurrentLocationDidFail,

    // ===== Notice category =====
    /// Hide the notice with this id if it is still shown
    NoticeExpire(u64),

    // ===== Uncategorized (global) =====
    /// Force a re-render (cursor movement, etc.)
    Render,

    /// Spinner animation tick
    Tick,

    /// Close the screen
    Quit,
}
