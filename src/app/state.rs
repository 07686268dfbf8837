//! Application state
//!
//! Holds the current occurrence set (replaced wholesale on every reload),
//! the derived marker groups, filter and popup state, the chat session,
//! and the slots that spawned network tasks post their results into.

use crate::api::camera::{CameraFeed, StillImageStream};
use crate::api::chat::{ChatReply, ChatSession, HistoryEntry};
use crate::api::{ApiError, Filters};
use crate::app::settings::Settings;
use crate::data::{
    Bounds, BoundsTracker, FetchDebouncer, GroupCache, MarkerGroup, Occurrence, OccurrencePage,
    PopupTracker, Statistics,
};
use instant::Instant;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Filters,
    Statistics,
    Chat,
}

/// Result slot a spawned network task writes into, polled by the UI thread
/// with `try_write` each frame.
pub type Slot<T> = Arc<RwLock<Option<Result<T, ApiError>>>>;

fn new_slot<T>() -> Slot<T> {
    Arc::new(RwLock::new(None))
}

/// Main application state
pub struct AppState {
    /// Current occurrence set; replaced wholesale on each viewport reload.
    pub occurrences: Vec<Occurrence>,

    /// Bumped whenever the occurrence set is replaced; keys the group cache.
    pub generation: u64,

    group_cache: GroupCache,

    /// Total records matching the last query (may exceed the page).
    pub total_records: u64,

    /// Upstream search URL for the last query, when provided.
    pub ala_url: Option<String>,

    /// User filters forwarded to occurrence queries.
    pub filters: Filters,

    /// Only request records that have images.
    pub image_only: bool,

    /// Viewport change detection.
    pub bounds_tracker: BoundsTracker,

    /// Coalesces viewport changes into single fetches.
    pub debouncer: FetchDebouncer,

    /// Most recently observed viewport, used when filters change.
    pub last_bounds: Option<Bounds>,

    /// Popup lifecycle state machine.
    pub popup: PopupTracker,

    /// Chat conversation state.
    pub chat: ChatSession,

    /// Text currently typed into the chat input.
    pub chat_input: String,

    /// Base64 image attached to the next chat send, if any.
    pub pending_image: Option<String>,

    /// Latest dataset statistics, if loaded.
    pub statistics: Option<Statistics>,

    pub stats_loading: bool,

    /// An occurrence fetch is in flight.
    pub fetching: bool,

    /// The clear-chat confirmation modal is showing.
    pub confirm_clear: bool,

    pub sidebar_open: bool,
    pub active_tab: SidebarTab,

    // Result slots for spawned tasks.
    pub occurrence_slot: Slot<OccurrencePage>,
    pub chat_slot: Slot<ChatReply>,
    pub stats_slot: Slot<Statistics>,
    pub suggestions_slot: Slot<Vec<String>>,
    pub history_slot: Slot<Vec<HistoryEntry>>,
}

impl AppState {
    pub fn new(settings: &Settings, now: Instant) -> Self {
        Self {
            occurrences: Vec::new(),
            generation: 0,
            group_cache: GroupCache::default(),
            total_records: 0,
            ala_url: None,
            filters: Filters::default(),
            image_only: settings.image_only(),
            bounds_tracker: BoundsTracker::new(now),
            debouncer: FetchDebouncer::default(),
            last_bounds: None,
            popup: PopupTracker::default(),
            chat: ChatSession::new(),
            chat_input: String::new(),
            pending_image: None,
            statistics: None,
            stats_loading: false,
            fetching: false,
            confirm_clear: false,
            sidebar_open: true,
            active_tab: SidebarTab::Filters,
            occurrence_slot: new_slot(),
            chat_slot: new_slot(),
            stats_slot: new_slot(),
            suggestions_slot: new_slot(),
            history_slot: new_slot(),
        }
    }

    /// Replace the occurrence set with a freshly fetched page.
    pub fn replace_occurrences(&mut self, page: OccurrencePage) {
        self.occurrences = page.occurrences;
        self.total_records = page.total_records;
        self.ala_url = page.ala_url;
        self.generation += 1;
    }

    /// Marker groups for the current occurrence set (memoized per
    /// generation).
    pub fn groups(&mut self) -> Arc<Vec<MarkerGroup>> {
        self.group_cache.groups(self.generation, &self.occurrences)
    }

    /// The group at a coordinate key, if it exists in the current set.
    pub fn find_group(&mut self, key: &str) -> Option<MarkerGroup> {
        self.groups().iter().find(|g| g.key == key).cloned()
    }

    /// Attach an image to the next chat send. The bytes flow through a
    /// [`CameraFeed`] so the stream release discipline holds for picked
    /// files and live captures alike.
    pub fn attach_image(&mut self, bytes: Vec<u8>) {
        let mut feed = CameraFeed::open(Box::new(StillImageStream::new(bytes)));
        self.pending_image = feed.capture_base64();
        feed.stop();
        debug_assert!(!feed.is_live(), "stream must be released after a capture");
    }

    /// Whether any background work should keep the UI repainting.
    pub fn has_pending_work(&self) -> bool {
        self.fetching || self.chat.pending || self.stats_loading || self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn settings() -> Settings {
        Settings::parse_from(["museum-explorer"])
    }

    fn page_with(ids: &[&str]) -> OccurrencePage {
        OccurrencePage {
            occurrences: ids
                .iter()
                .map(|id| {
                    serde_json::from_value(serde_json::json!({
                        "id": id,
                        "latitude": -33.8688,
                        "longitude": 151.2093,
                    }))
                    .unwrap()
                })
                .collect(),
            total_records: ids.len() as u64,
            facets: Default::default(),
            ala_url: None,
        }
    }

    #[test]
    fn replacing_occurrences_bumps_generation_and_regroups() {
        let mut state = AppState::new(&settings(), Instant::now());
        assert_eq!(state.generation, 0);
        assert!(state.groups().is_empty());

        state.replace_occurrences(page_with(&["a", "b"]));
        assert_eq!(state.generation, 1);
        let groups = state.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].records.len(), 2);

        // Same generation: cached Arc is reused.
        let again = state.groups();
        assert!(Arc::ptr_eq(&groups, &again));
    }

    #[test]
    fn attach_image_produces_base64_payload() {
        let mut state = AppState::new(&settings(), Instant::now());
        state.attach_image(vec![1, 2, 3]);
        assert_eq!(state.pending_image.as_deref(), Some("AQID"));
    }

    #[test]
    fn image_only_defaults_on_and_flag_disables_it() {
        assert!(settings().image_only());
        let all = Settings::parse_from(["museum-explorer", "--all-records"]);
        assert!(!all.image_only());
    }
}
