//! # Audio Module
//!
//! Playable items and their ordering for a guild player.
//!
//! ### [`track`] - Tracks
//! - Opaque metadata plus a lazily resolved playable reference
//! - Resolution through an injected [`track::TrackResolver`] (the search backend)
//! - Idempotent: a resolved track never hits the backend again unless forced
//!
//! ### [`queue`] - Queue Management
//! - Upcoming tracks plus the `current` and `previous` slots
//! - Loop modes (none, queue, track)
//! - Shuffle, removal and total duration helpers

pub mod queue;
pub mod track;
