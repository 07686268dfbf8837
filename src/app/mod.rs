//! Application module
//!
//! Main application structure with a clean UI:
//! - Full-screen map view with occurrence markers and a specimen popup
//! - Toggleable sidebar with tabs (Filters, Statistics and Chat)
//! - Responsive layout (sidebar from bottom on portrait displays)
//!
//! Network work never blocks the frame: tasks are spawned onto the async
//! runtime and post their results into slots the update loop polls.

mod markers;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::api::{ApiClient, OccurrenceQuery};
use crate::app::markers::{MapProbe, OccurrencePlugin};
use crate::app::settings::Settings;
use crate::app::state::AppState;
use crate::data::{FetchRequest, PopupOutcome};
use crate::entrypoints::async_runtime::spawn;
use eframe::egui;
use instant::Instant;
use std::sync::{Arc, Mutex};
use walkers::{HttpTiles, Map, MapMemory, sources::OpenStreetMap};

const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Main application structure
pub struct MuseumExplorerApp {
    /// CLI / GET-parameter settings
    settings: Settings,

    /// Application state (occurrences, filters, popup, chat, etc.)
    state: AppState,

    /// Client for the explorer backend
    api: ApiClient,

    /// Map tiles provider (OpenStreetMap)
    tiles: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Per-frame output of the map plugin
    probe: Arc<Mutex<MapProbe>>,

    /// Whether the first-frame fetches have been kicked off
    initialized: bool,
}

impl MuseumExplorerApp {
    pub fn new(settings: Settings, api: ApiClient, cc: &eframe::CreationContext<'_>) -> Self {
        let tiles = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        map_memory.center_at(walkers::lat_lon(settings.center_lat, settings.center_lon));
        let _ = map_memory.set_zoom(settings.zoom);

        let state = AppState::new(&settings, Instant::now());

        tracing::info!(
            api = %settings.api_base_url,
            lat = settings.center_lat,
            lon = settings.center_lon,
            "initialized"
        );

        Self {
            settings,
            state,
            api,
            tiles,
            map_memory,
            probe: Arc::new(Mutex::new(MapProbe::default())),
            initialized: false,
        }
    }

    /// Fetch suggestions, statistics and any server-side history once at
    /// startup.
    fn start_initial_fetches(&mut self, ctx: &egui::Context) {
        self.spawn_statistics(ctx);

        let api = self.api.clone();
        let slot = self.state.suggestions_slot.clone();
        let repaint = ctx.clone();
        spawn(async move {
            let result = api.chat_suggestions().await;
            *slot.write().await = Some(result);
            repaint.request_repaint();
        });

        let api = self.api.clone();
        let slot = self.state.history_slot.clone();
        let session_id = self.state.chat.session_id().to_string();
        let repaint = ctx.clone();
        spawn(async move {
            let result = api.chat_history(&session_id).await;
            *slot.write().await = Some(result);
            repaint.request_repaint();
        });
    }

    fn spawn_statistics(&mut self, ctx: &egui::Context) {
        if self.state.stats_loading {
            return;
        }
        self.state.stats_loading = true;

        let api = self.api.clone();
        let slot = self.state.stats_slot.clone();
        let repaint = ctx.clone();
        spawn(async move {
            let result = api.statistics().await;
            *slot.write().await = Some(result);
            repaint.request_repaint();
        });
    }

    fn spawn_occurrence_fetch(&mut self, request: FetchRequest, ctx: &egui::Context) {
        self.state.fetching = true;

        let query = OccurrenceQuery::first_page(
            request.bounds,
            self.state.filters.clone(),
            request.image_only,
            self.settings.page_size,
        );

        let api = self.api.clone();
        let slot = self.state.occurrence_slot.clone();
        let repaint = ctx.clone();
        spawn(async move {
            let result = api.occurrences(&query).await;
            *slot.write().await = Some(result);
            repaint.request_repaint();
        });
    }

    fn send_chat_message(&mut self, ctx: &egui::Context) {
        let Some(request) = self
            .state
            .chat
            .prepare_request(&self.state.chat_input, self.state.pending_image.as_deref())
        else {
            return;
        };

        self.state.chat.push_user(&request);
        self.state.chat.pending = true;
        self.state.chat_input.clear();
        self.state.pending_image = None;

        let api = self.api.clone();
        let slot = self.state.chat_slot.clone();
        let repaint = ctx.clone();
        spawn(async move {
            let result = api.chat(&request).await;
            *slot.write().await = Some(result);
            repaint.request_repaint();
        });
    }

    fn clear_chat(&mut self) {
        self.state.chat.clear();

        // Fire-and-forget; the local transcript is already gone.
        let api = self.api.clone();
        let session_id = self.state.chat.session_id().to_string();
        spawn(async move {
            if let Err(error) = api.chat_clear(&session_id).await {
                tracing::warn!(%error, "failed to clear server-side conversation");
            }
        });
    }

    fn handle_panel_events(&mut self, events: ui_panels::PanelEvents, ctx: &egui::Context) {
        if events.filters_applied
            && let Some(bounds) = self.state.last_bounds
        {
            // Apply immediately; the debounce window is for map movement.
            self.state.debouncer.cancel_pending();
            self.spawn_occurrence_fetch(
                FetchRequest {
                    bounds,
                    image_only: self.state.image_only,
                },
                ctx,
            );
        }

        if events.stats_refresh {
            self.spawn_statistics(ctx);
        }

        if events.chat_send {
            self.send_chat_message(ctx);
        }

        if events.chat_clear_confirmed {
            self.clear_chat();
        }
    }

    /// Apply everything the map plugin observed this frame.
    fn drain_probe(&mut self, now: Instant) {
        let probe = match self.probe.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => return,
        };

        if let Some(key) = probe.clicked_group {
            if let Some(group) = self.state.find_group(&key) {
                self.state.popup.open(group.key.clone(), group.record_ids());
            }
        } else if probe.clicked_elsewhere || probe.close_requested {
            self.state.popup.close();
        }

        if probe.carousel_delta != 0
            && let Some(key) = self.state.popup.open_key().map(str::to_owned)
            && let Some(group) = self.state.find_group(&key)
        {
            self.state
                .popup
                .step_carousel(probe.carousel_delta, group.records.len());
        }

        if let Some(bounds) = probe.bounds
            && let Some(settled) = self.state.bounds_tracker.observe(bounds, now)
        {
            self.state.last_bounds = Some(settled);

            // A popup that just re-anchored suppresses the refetch its own
            // re-centering would otherwise cause.
            let schedule = if self.state.popup.is_open() {
                self.state.popup.note_viewport_change(now)
            } else {
                true
            };

            if schedule {
                self.state.debouncer.schedule(
                    FetchRequest {
                        bounds: settled,
                        image_only: self.state.image_only,
                    },
                    now,
                );
            }
        }
    }

    /// Poll the result slots spawned tasks write into. Non-blocking: a busy
    /// lock is retried next frame.
    fn poll_slots(&mut self, now: Instant) {
        let taken = self
            .state
            .occurrence_slot
            .try_write()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(result) = taken {
            self.state.fetching = false;
            // Failures are logged at the client layer; keep the stale set.
            if let Ok(page) = result {
                tracing::debug!(
                    records = page.occurrences.len(),
                    total = page.total_records,
                    "occurrences loaded"
                );
                self.state.replace_occurrences(page);

                let groups = self.state.groups();
                match self.state.popup.reconcile(&groups, now) {
                    PopupOutcome::Reanchored(key) => {
                        if let Some(group) = self.state.find_group(&key) {
                            self.map_memory
                                .center_at(walkers::lat_lon(group.latitude, group.longitude));
                        }
                    }
                    PopupOutcome::Closed | PopupOutcome::Dismissed => {}
                }
            }
        }

        let taken = self
            .state
            .chat_slot
            .try_write()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(result) = taken {
            self.state.chat.pending = false;
            // Failures become the fallback assistant message.
            self.state.chat.apply_reply(result.ok());
        }

        let taken = self
            .state
            .stats_slot
            .try_write()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(result) = taken {
            self.state.stats_loading = false;
            if let Ok(stats) = result {
                self.state.statistics = Some(stats);
            }
        }

        let taken = self
            .state
            .suggestions_slot
            .try_write()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(Ok(suggestions)) = taken {
            self.state.chat.set_suggestions(suggestions);
        }

        let taken = self
            .state
            .history_slot
            .try_write()
            .ok()
            .and_then(|mut slot| slot.take());
        // Only restore server-side history while the transcript is untouched.
        if let Some(Ok(entries)) = taken
            && !entries.is_empty()
            && self.state.chat.transcript.is_empty()
        {
            self.state.chat.replace_history(entries);
        }
    }
}

#[profiling::all_functions]
impl eframe::App for MuseumExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if !self.initialized {
            self.initialized = true;
            self.start_initial_fetches(ctx);
        }

        self.poll_slots(now);

        // Render the main sidebar (responsive: side or bottom based on orientation)
        let events = ui_panels::render_sidebar(ctx, &mut self.state);
        self.handle_panel_events(events, ctx);

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let plugin = OccurrencePlugin::new(
                    self.state.groups(),
                    self.state.popup.open_key().map(str::to_owned),
                    self.state.popup.carousel(),
                    self.probe.clone(),
                );

                let map = Map::new(
                    Some(&mut self.tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(self.settings.center_lat, self.settings.center_lon),
                )
                .with_plugin(plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let screen_rect = ui.max_rect();
                ui.painter().text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    OSM_ATTRIBUTION,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        self.drain_probe(now);

        if let Some(request) = self.state.debouncer.poll(now) {
            self.spawn_occurrence_fetch(request, ctx);
        }

        // Keep repainting while timers the input system can't see are armed
        // (debounce expiry, the popup refetch guard, in-flight requests).
        if self.state.has_pending_work() || self.state.popup.refetch_suppressed(now) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
