mod api;
mod app;
mod data;
mod entrypoints;

// Entry point for desktop builds
#[cfg(not(target_arch = "wasm32"))]
pub use entrypoints::main::main as native_main;

// Entry point for the web build
#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;
