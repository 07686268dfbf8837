//! UI panels for the application
//!
//! Responsive sidebar (side on landscape, bottom on portrait) with three
//! tabs: query filters, dataset statistics, and the chat assistant. Panels
//! only mutate presentation state directly; anything that triggers network
//! work is reported back to the app through [`PanelEvents`].

use crate::api::chat::Role;
use crate::app::state::{AppState, SidebarTab};
use crate::data::linkify::{Segment, scan_links};
use egui::{Color32, RichText, Ui};

/// Actions requested by the panels this frame.
#[derive(Default)]
pub struct PanelEvents {
    /// Filters were applied; refetch the current viewport.
    pub filters_applied: bool,

    /// The statistics tab asked for a refresh.
    pub stats_refresh: bool,

    /// The chat input was submitted.
    pub chat_send: bool,

    /// The user confirmed clearing the conversation.
    pub chat_clear_confirmed: bool,
}

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        state.sidebar_open = !state.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.sidebar_open { "✕" } else { "☰" };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on
/// portrait). Returns the actions the panels requested.
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) -> PanelEvents {
    let mut events = PanelEvents::default();

    if state.confirm_clear {
        confirm_clear_modal(ctx, state, &mut events);
    }

    if !state.sidebar_open {
        return events;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(300.0)
            .min_height(200.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, state, &mut events);
            });
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(320.0)
            .min_width(280.0)
            .max_width(460.0)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, state, &mut events);
            });
    }

    events
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState, events: &mut PanelEvents) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.active_tab, SidebarTab::Filters, "🔍 Filters");
        ui.selectable_value(
            &mut state.active_tab,
            SidebarTab::Statistics,
            "📊 Statistics",
        );
        ui.selectable_value(&mut state.active_tab, SidebarTab::Chat, "💬 Chat");
    });

    ui.separator();

    match state.active_tab {
        SidebarTab::Filters => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| render_filters_tab(ui, state, events));
        }
        SidebarTab::Statistics => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| render_statistics_tab(ui, state, events));
        }
        // The chat tab manages its own scroll areas.
        SidebarTab::Chat => render_chat_tab(ui, state, events),
    }
}

/// Render the Filters tab
fn render_filters_tab(ui: &mut Ui, state: &mut AppState, events: &mut PanelEvents) {
    ui.label(RichText::new("🔍 Query Filters").strong());
    ui.add_space(6.0);

    egui::Grid::new("filters_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Collection:");
            ui.text_edit_singleline(&mut state.filters.collection_name);
            ui.end_row();

            ui.label("State:");
            ui.text_edit_singleline(&mut state.filters.state_province);
            ui.end_row();

            ui.label("Year:");
            ui.text_edit_singleline(&mut state.filters.year);
            ui.end_row();
        });

    ui.add_space(4.0);
    ui.checkbox(&mut state.image_only, "Only records with images");

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("Apply filters").clicked() {
            events.filters_applied = true;
        }
        if ui
            .add_enabled(!state.filters.is_empty(), egui::Button::new("Reset"))
            .clicked()
        {
            state.filters = Default::default();
            events.filters_applied = true;
        }
    });

    ui.add_space(12.0);
    ui.separator();

    ui.label(RichText::new("Current view").strong());
    ui.add_space(4.0);
    ui.label(format!(
        "{} records shown ({} matching)",
        state.occurrences.len(),
        state.total_records
    ));
    if state.fetching {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading occurrences…").weak());
        });
    }
    if let Some(url) = state.ala_url.clone() {
        ui.add_space(4.0);
        ui.hyperlink_to("Open this search in the Atlas of Living Australia", url);
    }
}

/// Render the Statistics tab
fn render_statistics_tab(ui: &mut Ui, state: &mut AppState, events: &mut PanelEvents) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("📊 Dataset Statistics").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(!state.stats_loading, egui::Button::new("⟳ Refresh"))
                .clicked()
            {
                events.stats_refresh = true;
            }
        });
    });
    ui.add_space(6.0);

    if state.stats_loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading statistics…").weak());
        });
        return;
    }

    let Some(stats) = &state.statistics else {
        ui.label(RichText::new("No statistics loaded yet.").weak());
        return;
    };

    ui.label(format!("Total records: {}", stats.total_records));
    ui.add_space(8.0);
    ui.label(RichText::new("Records by state/province").strong());
    ui.add_space(4.0);

    egui::Grid::new("stats_regions_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for region in stats.by_region() {
                ui.label(&region.value);
                ui.label(RichText::new(format!("{}", region.count)).strong());
                ui.end_row();
            }
        });
}

/// Render the Chat tab
fn render_chat_tab(ui: &mut Ui, state: &mut AppState, events: &mut PanelEvents) {
    // Input area is laid out from the bottom so the transcript can take the
    // remaining height.
    egui::TopBottomPanel::bottom("chat_input_panel")
        .show_separator_line(false)
        .show_inside(ui, |ui| {
            render_chat_input(ui, state, events);
        });

    egui::CentralPanel::default().show_inside(ui, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in &state.chat.transcript {
                    render_chat_message(ui, message.role, &message.text, message.image.is_some());
                    ui.add_space(6.0);
                }
                if state.chat.pending {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Thinking…").weak());
                    });
                }
            });
    });
}

fn render_chat_message(ui: &mut Ui, role: Role, text: &str, has_image: bool) {
    let (who, color) = match role {
        Role::User => ("You", ui.visuals().strong_text_color()),
        Role::Assistant => ("Assistant", Color32::from_rgb(70, 130, 220)),
    };
    ui.label(RichText::new(who).small().strong().color(color));

    match role {
        Role::User => {
            ui.label(text);
            if has_image {
                ui.label(RichText::new("📷 image attached").small().weak());
            }
        }
        // Assistant replies may contain URLs; render them clickable.
        Role::Assistant => {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                for segment in scan_links(text) {
                    match segment {
                        Segment::Text(t) => {
                            ui.label(t);
                        }
                        Segment::Link(url) => {
                            ui.hyperlink(url);
                        }
                    }
                }
            });
        }
    }
}

fn render_chat_input(ui: &mut Ui, state: &mut AppState, events: &mut PanelEvents) {
    // Suggestions, capped upstream at three.
    let suggestions = state.chat.suggestions.clone();
    if !suggestions.is_empty() && !state.chat.pending {
        ui.horizontal_wrapped(|ui| {
            for suggestion in suggestions {
                if ui.small_button(&suggestion).clicked() {
                    state.chat_input = suggestion;
                }
            }
        });
        ui.add_space(4.0);
    }

    if state.pending_image.is_some() {
        ui.horizontal(|ui| {
            ui.label(RichText::new("📷 image ready to send").small());
            if ui.small_button("✕").clicked() {
                state.pending_image = None;
            }
        });
    }

    let can_send = !state.chat.pending
        && (!state.chat_input.trim().is_empty() || state.pending_image.is_some());

    ui.horizontal(|ui| {
        let input = ui.add(
            egui::TextEdit::singleline(&mut state.chat_input)
                .hint_text("Ask about the collection…")
                .desired_width(ui.available_width() - 140.0),
        );
        let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui
            .add_enabled(can_send, egui::Button::new("Send"))
            .clicked()
            || (submitted && can_send)
        {
            events.chat_send = true;
        }
    });

    ui.horizontal(|ui| {
        #[cfg(not(target_arch = "wasm32"))]
        if ui
            .add_enabled(!state.chat.pending, egui::Button::new("🖼 Attach image…"))
            .clicked()
            && let Some(path) = rfd::FileDialog::new()
                .add_filter("Images", &["jpg", "jpeg", "png"])
                .set_title("Select an image to identify")
                .pick_file()
        {
            match std::fs::read(&path) {
                Ok(bytes) => state.attach_image(bytes),
                Err(error) => tracing::warn!(%error, "failed to read picked image"),
            }
        }

        if ui
            .add_enabled(
                !state.chat.transcript.is_empty(),
                egui::Button::new("🗑 Clear chat"),
            )
            .clicked()
        {
            state.confirm_clear = true;
        }
    });
}

/// Confirmation modal for clearing the conversation; replaces the browser
/// confirm dialog with an injected in-app one.
fn confirm_clear_modal(ctx: &egui::Context, state: &mut AppState, events: &mut PanelEvents) {
    egui::Window::new("Clear conversation?")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("This removes the conversation on this device and on the server.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    state.confirm_clear = false;
                    events.chat_clear_confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    state.confirm_clear = false;
                }
            });
        });
}
