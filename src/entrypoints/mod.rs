// Shared modules
pub(crate) mod async_runtime;
pub(crate) mod cli;
mod run;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Entry points
pub mod main;
