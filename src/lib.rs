//! # Guild Player
//!
//! Per-guild audio playback controller sitting between a Lavalink-style audio
//! node and a Discord bot.
//!
//! - [`player::Player`]: the event-driven state machine (commands + node event
//!   reactions)
//! - [`audio`]: tracks, lazy resolution and the queue
//! - [`node`] / [`gateway`]: the narrow interfaces towards the node transport
//!   and the Discord voice gateway
//! - [`events`]: domain events published to the application
//! - [`manager::PlayerManager`]: registry of players keyed by guild
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use guild_player::{config::PlayerConfig, manager::{CreatePlayerOptions, PlayerManager, SearchOptions}};
//! # use std::sync::Arc;
//! # use serenity::model::id::{ChannelId, GuildId};
//! # async fn example(
//! #     gateway: Arc<dyn guild_player::gateway::VoiceGateway>,
//! #     resolver: Arc<dyn guild_player::audio::track::TrackResolver>,
//! #     node: Arc<dyn guild_player::node::NodePlayer>,
//! #     node_events: guild_player::node::NodeEventReceiver,
//! # ) -> anyhow::Result<()> {
//! let config = PlayerConfig::load()?;
//! guild_player::logging::init(&config.log_filter)?;
//!
//! let manager = PlayerManager::new(config, gateway, resolver);
//! let player = manager
//!     .create_player(
//!         CreatePlayerOptions {
//!             guild_id: GuildId::new(1),
//!             voice_channel: ChannelId::new(2),
//!             text_channel: None,
//!             volume: None,
//!             self_deaf: None,
//!             self_mute: None,
//!         },
//!         node,
//!         node_events,
//!     )
//!     .await?;
//!
//! let result = manager.search("never gonna give you up", SearchOptions::default()).await?;
//! player.update_queue(|queue| result.tracks.into_iter().for_each(|track| queue.push(track)));
//! player.play(None, Default::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod manager;
pub mod node;
pub mod player;

pub use audio::queue::{LoopMode, TrackQueue};
pub use audio::track::{Track, TrackInfo, TrackResolver};
pub use error::{PlayerError, Result};
pub use events::PlayerEvent;
pub use manager::PlayerManager;
pub use player::Player;
