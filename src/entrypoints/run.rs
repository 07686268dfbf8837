use crate::api::{ApiClient, telemetry::Telemetry};
use crate::app::MuseumExplorerApp;
use crate::app::settings::Settings;
use crate::entrypoints::cli::parse_args;

/// Setup and create the app
#[allow(dead_code)]
pub async fn setup_app()
-> Option<Box<dyn FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>>> {
    let settings = match parse_args::<Settings>() {
        Ok(args) => args,
        Err(e) => {
            #[cfg(not(target_arch = "wasm32"))]
            e.exit();
            #[cfg(target_arch = "wasm32")]
            {
                let user_msg = format!(
                    "Error parsing CLI:\n{}\n
You should change the GET params, using the cli prefix.\n
Starting anyway without args.",
                    e
                );
                if let Some(window) = web_sys::window() {
                    window.alert_with_message(&user_msg).unwrap_or(());
                } else {
                    tracing::error!(user_msg);
                }
                use clap::Parser;
                Settings::parse_from(Vec::<String>::new()) // Default args on web if parsing fails
            }
        }
    };

    let api = match ApiClient::new(settings.api_base_url.clone(), Telemetry::tracing()) {
        Ok(api) => api,
        Err(error) => {
            tracing::error!(%error, "failed to build the API client");
            return None;
        }
    };

    Some(Box::new(move |cc| {
        Box::new(MuseumExplorerApp::new(settings, api, cc))
    }))
}

/// Native entry point
#[allow(dead_code)]
#[cfg(not(target_arch = "wasm32"))]
pub async fn native_main() {
    // Setup logging
    tracing_subscriber::fmt::init();

    if let Some(app_creator) = setup_app().await {
        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 720.0])
                .with_title("Museum Specimen Explorer"),
            ..Default::default()
        };

        let _ = eframe::run_native(
            "Museum Specimen Explorer",
            native_options,
            Box::new(move |cc| Ok(app_creator(cc))),
        );
    }
}
