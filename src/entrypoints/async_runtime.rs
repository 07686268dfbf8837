//! Cross-platform async runtime abstraction
//!
//! Spawned tasks carry network requests; they post their results into state
//! slots and never touch the UI directly.
//!
//! On web, tokio-with-wasm runs async tasks on the JavaScript event loop,
//! so no manual runtime management is needed.

/// Spawn an async task.
///
/// On native: Uses tokio's multi-threaded runtime
/// On web: Uses tokio-with-wasm which runs on the JS event loop
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
}

/// Spawn an async task.
///
/// On native: Uses tokio's multi-threaded runtime
/// On web: Uses tokio-with-wasm which runs on the JS event loop
#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F) -> tokio_with_wasm::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio_with_wasm::spawn(future)
}
