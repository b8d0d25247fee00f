//! Effects - side effects declared by the reducer

use std::time::Duration;

use crate::action::Action;
use crate::service::Collaborators;
use crate::state::Place;

/// Side effects that can be triggered by actions
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load the history list
    LoadHistory,
    /// Search for places matching the query
    SearchLocations { query: String },
    /// Delete a history entry, then reload the list
    DeleteHistoryEntry { label: String },
    /// Resolve the device position
    LocateDevice,
    /// Hand the place to the selection callback, then close after the delay
    SelectLocation { place: Place, close_after_ms: u64 },
    /// Hide a notice once its display time is over
    ExpireNotice { id: u64, after_ms: u64 },
}

impl Effect {
    /// Task slot for this effect; a new task replaces the running one in the same slot.
    pub fn task_key(&self) -> String {
        match self {
            Effect::LoadHistory => "history".to_string(),
            Effect::SearchLocations { .. } => "location_search".to_string(),
            Effect::DeleteHistoryEntry { label } => format!("history_delete_{label}"),
            Effect::LocateDevice => "locate".to_string(),
            Effect::SelectLocation { .. } => "select".to_string(),
            Effect::ExpireNotice { .. } => "notice".to_string(),
        }
    }

    /// Run against the collaborators and report back with an action.
    pub async fn run(self, deps: Collaborators) -> Action {
        match self {
            Effect::LoadHistory => match deps.service.history_list().await {
                Ok(places) => Action::HistoryDidLoad(places),
                Err(e) => {
                    tracing::warn!(error = %e, "history load failed");
                    Action::HistoryDidError(e.to_string())
                }
            },
            Effect::SearchLocations { query } => {
                let results = deps.service.find_location(&query).await;
                Action::SearchDidLoad { query, results }
            }
            Effect::DeleteHistoryEntry { label } => {
                // Refresh only after the deletion finished
                if let Err(e) = deps.service.delete_entry(&label).await {
                    tracing::warn!(label = %label, error = %e, "history delete failed");
                    return Action::HistoryDeleteDidError {
                        label,
                        error: e.to_string(),
                    };
                }
                match deps.service.history_list().await {
                    Ok(places) => Action::HistoryDidDelete { label, places },
                    Err(e) => Action::HistoryDeleteDidError {
                        label,
                        error: e.to_string(),
                    },
                }
            }
            Effect::LocateDevice => match deps.locator.current_position().await {
                Some(coords) => Action::CurrentLocationDidLoad(coords),
                None => Action::CurrentLocationDidFail,
            },
            Effect::SelectLocation {
                place,
                close_after_ms,
            } => {
                if let Err(e) = deps.service.select_location(&place).await {
                    tracing::error!(label = %place.label, error = %e, "failed to store selection");
                }
                if close_after_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(close_after_ms)).await;
                }
                Action::Quit
            }
            Effect::ExpireNotice { id, after_ms } => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                Action::NoticeExpire(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_tasks_do_not_share_a_slot() {
        let paris = Effect::DeleteHistoryEntry {
            label: "Paris".into(),
        };
        let rome = Effect::DeleteHistoryEntry {
            label: "Rome".into(),
        };
        assert_ne!(paris.task_key(), rome.task_key());
        assert_ne!(paris.task_key(), Effect::LoadHistory.task_key());
    }

    #[test]
    fn test_searches_share_a_slot() {
        let a = Effect::SearchLocations {
            query: "Par".into(),
        };
        let b = Effect::SearchLocations {
            query: "Pari".into(),
        };
        assert_eq!(a.task_key(), b.task_key());
    }
}
