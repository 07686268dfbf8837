//! Walkers plugin for occurrence markers and the specimen popup
//!
//! Draws one marker per coordinate group, hit-tests clicks, reports the
//! frame's viewport rectangle through a shared probe, and renders the open
//! popup as a window pinned near its marker. All state changes flow back to
//! the app through the probe; the plugin itself never mutates `AppState`.

use crate::data::{Bounds, MarkerGroup, Occurrence};
use egui::{Color32, Stroke};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Pixel radius within which a click selects a marker.
const MARKER_HIT_RADIUS: f32 = 12.0;

const MARKER_FILL: Color32 = Color32::from_rgb(70, 130, 220);
const MARKER_FILL_MULTI: Color32 = Color32::from_rgb(220, 120, 70);

/// Per-frame output of the map plugin, drained by the app after the map
/// widget has been added.
#[derive(Default)]
pub struct MapProbe {
    /// Viewport rectangle observed this frame.
    pub bounds: Option<Bounds>,

    /// Key of the marker the user clicked this frame.
    pub clicked_group: Option<String>,

    /// The user clicked the map away from any marker.
    pub clicked_elsewhere: bool,

    /// The popup's close button was pressed.
    pub close_requested: bool,

    /// Carousel steps requested from the popup (+1 next, -1 previous).
    pub carousel_delta: isize,
}

impl MapProbe {
    pub fn take(&mut self) -> MapProbe {
        std::mem::take(self)
    }
}

/// Plugin rendering occurrence markers on the map.
pub struct OccurrencePlugin {
    groups: Arc<Vec<MarkerGroup>>,
    open_key: Option<String>,
    carousel: usize,
    probe: Arc<Mutex<MapProbe>>,
}

impl OccurrencePlugin {
    pub fn new(
        groups: Arc<Vec<MarkerGroup>>,
        open_key: Option<String>,
        carousel: usize,
        probe: Arc<Mutex<MapProbe>>,
    ) -> Self {
        Self {
            groups,
            open_key,
            carousel,
            probe,
        }
    }

    fn screen_pos(group: &MarkerGroup, projector: &Projector) -> egui::Pos2 {
        let position = walkers::lat_lon(group.latitude, group.longitude);
        let vec = projector.project(position);
        egui::Pos2::new(vec.x, vec.y)
    }

    fn draw_marker(&self, painter: &egui::Painter, pos: egui::Pos2, group: &MarkerGroup) {
        let multi = group.records.len() > 1;
        let radius = if multi { 9.0 } else { 6.5 };
        let fill = if multi { MARKER_FILL_MULTI } else { MARKER_FILL };

        painter.circle(pos, radius, fill, Stroke::new(1.5, Color32::WHITE));
        if multi {
            painter.text(
                pos,
                egui::Align2::CENTER_CENTER,
                format!("{}", group.records.len()),
                egui::FontId::proportional(10.0),
                Color32::WHITE,
            );
        }
    }
}

impl Plugin for OccurrencePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("OccurrencePlugin::run");

        let viewport_rect = response.rect;

        // Unproject the widget corners to get the visible rectangle.
        let top_left =
            projector.unproject(egui::Vec2::new(viewport_rect.min.x, viewport_rect.min.y));
        let bottom_right =
            projector.unproject(egui::Vec2::new(viewport_rect.max.x, viewport_rect.max.y));
        let bounds = Bounds::from_corners(
            (top_left.y(), top_left.x()),
            (bottom_right.y(), bottom_right.x()),
        );

        // Draw markers and hit-test this frame's click, if any.
        let painter = ui.painter();
        let click_pos = if response.clicked() {
            response.interact_pointer_pos()
        } else {
            None
        };
        let mut clicked_group: Option<String> = None;

        for group in self.groups.iter() {
            if !bounds.contains(group.latitude, group.longitude) {
                continue;
            }
            let pos = Self::screen_pos(group, projector);
            self.draw_marker(painter, pos, group);

            if let Some(click) = click_pos
                && clicked_group.is_none()
                && pos.distance(click) <= MARKER_HIT_RADIUS
            {
                clicked_group = Some(group.key.clone());
            }
        }

        // Render the open popup pinned near its marker.
        let mut close_requested = false;
        let mut carousel_delta = 0isize;
        if let Some(open_key) = &self.open_key
            && let Some(group) = self.groups.iter().find(|g| &g.key == open_key)
        {
            let anchor = Self::screen_pos(group, projector) + egui::vec2(14.0, -14.0);
            egui::Window::new("specimen_popup")
                .id(egui::Id::new("occurrence_popup"))
                .title_bar(false)
                .collapsible(false)
                .resizable(false)
                .fixed_pos(anchor)
                .show(ui.ctx(), |ui| {
                    let (closed, delta) = popup_contents(ui, group, self.carousel);
                    close_requested = closed;
                    carousel_delta = delta;
                });
        }

        let clicked_elsewhere = click_pos.is_some() && clicked_group.is_none();
        if let Ok(mut probe) = self.probe.lock() {
            probe.bounds = Some(bounds);
            if clicked_group.is_some() {
                probe.clicked_group = clicked_group;
            }
            probe.clicked_elsewhere |= clicked_elsewhere;
            probe.close_requested |= close_requested;
            probe.carousel_delta += carousel_delta;
        }
    }
}

/// Popup body: one record at a time, with a carousel when the group holds
/// several. Returns (close requested, carousel delta).
fn popup_contents(ui: &mut egui::Ui, group: &MarkerGroup, carousel: usize) -> (bool, isize) {
    let mut close_requested = false;
    let mut delta = 0isize;

    let count = group.records.len();
    let index = carousel.min(count.saturating_sub(1));
    let record = &group.records[index];

    ui.set_max_width(280.0);

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(record.display_name())
                .strong()
                .italics(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").clicked() {
                close_requested = true;
            }
        });
    });

    if count > 1 {
        ui.horizontal(|ui| {
            if ui.small_button("◀").clicked() {
                delta -= 1;
            }
            ui.label(
                egui::RichText::new(format!("{} of {}", index + 1, count))
                    .small()
                    .weak(),
            );
            if ui.small_button("▶").clicked() {
                delta += 1;
            }
        });
    }

    ui.separator();
    record_details(ui, record);

    (close_requested, delta)
}

fn record_details(ui: &mut egui::Ui, record: &Occurrence) {
    let mut row = |label: &str, value: &Option<String>| {
        if let Some(value) = value {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(label).small().weak());
                ui.label(egui::RichText::new(value).small());
            });
        }
    };

    row("Common name:", &record.common_name);
    row("Taxonomy:", &record.taxonomy_path());
    row("Basis:", &record.basis_of_record);
    row("Catalog no.:", &record.catalog_number);
    row("Collection:", &record.collection_name);
    row("Institution:", &record.institution_name);
    row("Date:", &record.event_date);
    row("Locality:", &record.locality);
    row("State:", &record.state_province);
    row("Recorded by:", &record.recorded_by);

    if let Some(url) = record.best_image_url() {
        ui.add_space(4.0);
        ui.hyperlink_to("🖼 View image", url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_take_resets_per_frame_state() {
        let mut probe = MapProbe {
            bounds: Some(Bounds {
                north: 1.0,
                south: 0.0,
                east: 1.0,
                west: 0.0,
            }),
            clicked_group: Some("k".to_string()),
            clicked_elsewhere: true,
            close_requested: true,
            carousel_delta: 2,
        };

        let drained = probe.take();
        assert!(drained.bounds.is_some());
        assert_eq!(drained.clicked_group.as_deref(), Some("k"));

        assert!(probe.bounds.is_none());
        assert!(probe.clicked_group.is_none());
        assert!(!probe.clicked_elsewhere);
        assert!(!probe.close_requested);
        assert_eq!(probe.carousel_delta, 0);
    }
}
