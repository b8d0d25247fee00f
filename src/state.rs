//! Application state - single source of truth

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Queries up to this many characters show the history instead of searching.
pub const HISTORY_QUERY_MAX_CHARS: usize = 2;

/// Label given to the place resolved from the device position.
pub const CURRENT_POSITION_LABEL: &str = "Current Position";

/// How long a transient notice stays on screen.
pub const NOTICE_DURATION_MS: u64 = 1500;

/// Spinner animation timing for the loading indicator.
pub const SPINNER_TICK_MS: u64 = 80;
pub const SPINNER_CYCLE_TICKS: u32 = 40;

pub const LOCATION_DEFINED_TEXT: &str = "Location defined";
pub const LOOKUP_FAILED_TEXT: &str = "An error occurred";

/// A named point: a history entry or a successful search hit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Place {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            label: label.into(),
            lat,
            lon,
        }
    }
}

/// Outcome of a location search for one item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum LocationState {
    Success(Place),
    Error,
}

/// Position reported by a device locator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// What the list is currently showing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DisplayMode {
    #[default]
    History,
    LiveSearch,
}

impl DisplayMode {
    pub fn for_query(query: &str) -> Self {
        if query.chars().count() <= HISTORY_QUERY_MAX_CHARS {
            DisplayMode::History
        } else {
            DisplayMode::LiveSearch
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DisplayMode::History => "Recently requested",
            DisplayMode::LiveSearch => "Found results",
        }
    }
}

/// The displayed list. One variant per mode, so history and live results
/// can never share a list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Listing {
    History(Vec<Place>),
    Found(Vec<Place>),
}

impl Default for Listing {
    fn default() -> Self {
        Listing::History(Vec::new())
    }
}

impl Listing {
    pub fn empty_for(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::History => Listing::History(Vec::new()),
            DisplayMode::LiveSearch => Listing::Found(Vec::new()),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        match self {
            Listing::History(_) => DisplayMode::History,
            Listing::Found(_) => DisplayMode::LiveSearch,
        }
    }

    pub fn places(&self) -> &[Place] {
        match self {
            Listing::History(places) | Listing::Found(places) => places,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Place> {
        self.places().get(index)
    }

    pub fn len(&self) -> usize {
        self.places().len()
    }

    pub fn is_empty(&self) -> bool {
        self.places().is_empty()
    }
}

/// Keep a result list only if every element succeeded.
///
/// A single `Error` anywhere discards the whole list.
pub fn accept_results(results: Vec<LocationState>) -> Vec<Place> {
    results
        .into_iter()
        .map(|state| match state {
            LocationState::Success(place) => Some(place),
            LocationState::Error => None,
        })
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Short-lived message shown under the list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

/// Requests currently running in the background
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InFlight {
    /// Query of the search whose results are still awaited
    pub search: Option<String>,
    pub history: bool,
    /// Labels whose delete-then-refresh task has not reported back
    pub deleting: BTreeSet<String>,
    pub locate: bool,
}

impl InFlight {
    pub fn any(&self) -> bool {
        self.search.is_some() || self.history || !self.deleting.is_empty() || self.locate
    }
}

/// Application state - everything the screen needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    #[debug(section = "Search", label = "Query")]
    pub query: String,

    /// History below the threshold, live search above it
    #[debug(section = "Search", label = "Mode", debug_fmt)]
    pub mode: DisplayMode,

    #[debug(section = "Search", label = "Listing", debug_fmt)]
    pub listing: Listing,

    /// Cursor in the list; reset to the first row whenever the list changes
    #[debug(section = "Search", label = "Highlighted")]
    pub highlighted: usize,

    #[debug(section = "Requests", label = "In flight", debug_fmt)]
    pub in_flight: InFlight,

    #[debug(section = "Screen", label = "Notice", debug_fmt)]
    pub notice: Option<Notice>,

    /// Place handed to the selection callback
    #[debug(section = "Screen", label = "Selected", debug_fmt)]
    pub selected: Option<Place>,

    /// Set once a selection was made; the screen is on its way out
    #[debug(section = "Screen", label = "Closing")]
    pub closing: bool,

    // --- Animation internals (skipped) ---
    #[debug(skip)]
    pub tick_count: u32,

    #[debug(skip)]
    pub next_notice_id: u64,
}

impl AppState {
    pub fn with_query(query: impl Into<String>) -> Self {
        let query = query.into();
        let mode = DisplayMode::for_query(&query);
        Self {
            query,
            mode,
            listing: Listing::empty_for(mode),
            highlighted: 0,
            in_flight: InFlight::default(),
            notice: None,
            selected: None,
            closing: false,
            tick_count: 0,
            next_notice_id: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.any()
    }

    pub fn highlighted_place(&self) -> Option<&Place> {
        self.listing.get(self.highlighted)
    }

    /// Replace the current notice and return its id.
    pub fn show_notice(&mut self, kind: NoticeKind, text: impl Into<String>) -> u64 {
        self.next_notice_id = self.next_notice_id.wrapping_add(1);
        let id = self.next_notice_id;
        self.notice = Some(Notice {
            id,
            kind,
            text: text.into(),
        });
        id
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_query("")
    }
}
