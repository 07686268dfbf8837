//! Domain logic for the specimen explorer
//!
//! Pure, I/O-free building blocks behind the map and chat views:
//!
//! - **[`occurrence`]**: occurrence records and endpoint payloads
//! - **[`grouping`]**: coordinate-bucket grouping of records into markers
//! - **[`viewport`]**: bounds tracking and fetch debouncing
//! - **[`popup`]**: the popup lifecycle state machine
//! - **[`linkify`]**: URL extraction from assistant replies
//!
//! Everything here is synchronous and deterministic; timing-sensitive pieces
//! take `Instant` parameters instead of reading a clock.

pub mod grouping;
pub mod linkify;
pub mod occurrence;
pub mod popup;
pub mod viewport;

pub use grouping::{GroupCache, MarkerGroup};
pub use occurrence::{Occurrence, OccurrencePage, Statistics};
pub use popup::{PopupOutcome, PopupTracker};
pub use viewport::{Bounds, BoundsTracker, FetchDebouncer, FetchRequest};
