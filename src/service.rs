//! Collaborators the screen talks to

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::api::{Geocoder, IpLocator};
use crate::history::HistoryStore;
use crate::state::{Coordinates, LocationState, Place};

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service rejected the request: {0}")]
    Api(String),
    #[error("history storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("history file is corrupted: {0}")]
    Format(#[from] serde_json::Error),
}

/// Search, history and selection backend
#[async_trait]
pub trait LocationService: Send + Sync {
    /// Never fails outright: failures come back as `LocationState::Error`.
    async fn find_location(&self, query: &str) -> Vec<LocationState>;

    async fn history_list(&self) -> Result<Vec<Place>, ServiceError>;

    async fn delete_entry(&self, label: &str) -> Result<(), ServiceError>;

    /// The selection callback: receives the chosen place.
    async fn select_location(&self, place: &Place) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// `None` when the position cannot be determined.
    async fn current_position(&self) -> Option<Coordinates>;
}

/// Everything effects need to run
#[derive(Clone)]
pub struct Collaborators {
    pub service: Arc<dyn LocationService>,
    pub locator: Arc<dyn DeviceLocator>,
}

impl Collaborators {
    pub fn new(service: Arc<dyn LocationService>, locator: Arc<dyn DeviceLocator>) -> Self {
        Self { service, locator }
    }
}

/// Where the chosen place ends up for the host to pick up after the screen closes
#[derive(Clone, Debug, Default)]
pub struct SelectionSlot(Arc<Mutex<Option<Place>>>);

impl SelectionSlot {
    pub async fn publish(&self, place: Place) {
        *self.0.lock().await = Some(place);
    }

    pub async fn take(&self) -> Option<Place> {
        self.0.lock().await.take()
    }
}

/// Geocoding search + file-backed history + selection slot
pub struct AppLocationService {
    geocoder: Geocoder,
    history: HistoryStore,
    selection: SelectionSlot,
}

impl AppLocationService {
    pub fn new(geocoder: Geocoder, history: HistoryStore, selection: SelectionSlot) -> Self {
        Self {
            geocoder,
            history,
            selection,
        }
    }
}

#[async_trait]
impl LocationService for AppLocationService {
    async fn find_location(&self, query: &str) -> Vec<LocationState> {
        match self.geocoder.search(query).await {
            Ok(places) => {
                tracing::debug!(query, count = places.len(), "location search finished");
                places.into_iter().map(LocationState::Success).collect()
            }
            Err(error) => {
                tracing::warn!(query, %error, "location search failed");
                vec![LocationState::Error]
            }
        }
    }

    async fn history_list(&self) -> Result<Vec<Place>, ServiceError> {
        self.history.load().await
    }

    async fn delete_entry(&self, label: &str) -> Result<(), ServiceError> {
        let removed = self.history.delete(label).await?;
        tracing::info!(label, removed, "history entry deleted");
        Ok(())
    }

    async fn select_location(&self, place: &Place) -> Result<(), ServiceError> {
        self.selection.publish(place.clone()).await;
        self.history.remember(place.clone()).await?;
        tracing::info!(label = %place.label, lat = place.lat, lon = place.lon, "location selected");
        Ok(())
    }
}

#[async_trait]
impl DeviceLocator for IpLocator {
    async fn current_position(&self) -> Option<Coordinates> {
        match self.locate().await {
            Ok(coords) => coords,
            Err(error) => {
                tracing::warn!(%error, "device position lookup failed");
                None
            }
        }
    }
}

/// Locator that always reports the same position
#[derive(Clone, Copy, Debug)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl DeviceLocator for FixedLocator {
    async fn current_position(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}
