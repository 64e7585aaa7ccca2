use dashmap::{mapref::entry::Entry, DashMap};
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::audio::track::{LoadType, SearchResult, TrackResolver};
use crate::config::PlayerConfig;
use crate::error::{PlayerError, ResolveError, Result};
use crate::events::{EventEmitter, PlayerEvent};
use crate::gateway::VoiceGateway;
use crate::node::{NodeEventReceiver, NodePlayer};
use crate::player::{Player, PlayerContext, PlayerOptions};

/// Capacidad mínima que un player necesita del registro: quitarse al destruirse
#[cfg_attr(test, mockall::automock)]
pub trait PlayerRegistry: Send + Sync {
    fn remove(&self, guild_id: GuildId);
}

/// Parámetros para crear el player de un guild
#[derive(Debug, Clone)]
pub struct CreatePlayerOptions {
    pub guild_id: GuildId,
    pub voice_channel: ChannelId,
    pub text_channel: Option<ChannelId>,
    /// En porcentaje; por defecto el de la configuración
    pub volume: Option<u16>,
    pub self_deaf: Option<bool>,
    pub self_mute: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub engine: Option<String>,
    pub requester: Option<UserId>,
}

/// Registro de players por guild
pub struct PlayerManager {
    config: PlayerConfig,
    gateway: Arc<dyn VoiceGateway>,
    resolver: Arc<dyn TrackResolver>,
    events: EventEmitter,
    players: DashMap<GuildId, Arc<Player>>,
}

impl PlayerManager {
    pub fn new(
        config: PlayerConfig,
        gateway: Arc<dyn VoiceGateway>,
        resolver: Arc<dyn TrackResolver>,
    ) -> Arc<Self> {
        info!("🎼 {}", config.summary());
        Arc::new(Self {
            events: EventEmitter::new(config.event_buffer),
            config,
            gateway,
            resolver,
            players: DashMap::new(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<Player>> {
        self.players.get(&guild_id).map(|player| Arc::clone(player.value()))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Crea el player del guild, o devuelve el existente.
    ///
    /// El player nuevo se une al canal de voz, aplica el volumen inicial y
    /// empieza a consumir los eventos del nodo.
    pub async fn create_player(
        self: &Arc<Self>,
        options: CreatePlayerOptions,
        node: Arc<dyn NodePlayer>,
        events: NodeEventReceiver,
    ) -> Result<Arc<Player>> {
        let guild_id = options.guild_id;
        let manager: Weak<PlayerManager> = Arc::downgrade(self);
        let registry: Weak<dyn PlayerRegistry> = manager;
        let context = PlayerContext {
            gateway: Arc::clone(&self.gateway),
            resolver: Arc::clone(&self.resolver),
            registry,
            events: self.events.clone(),
            options: PlayerOptions {
                self_mute: options.self_mute.unwrap_or(self.config.self_mute),
                self_deaf: options.self_deaf.unwrap_or(self.config.self_deaf),
                search_engine: self.config.default_search_engine.clone(),
            },
        };

        let player = match self.players.entry(guild_id) {
            Entry::Occupied(existing) => return Ok(Arc::clone(existing.get())),
            Entry::Vacant(slot) => {
                let player = Arc::new(Player::new(guild_id, node, context, options.text_channel));
                slot.insert(Arc::clone(&player));
                player
            }
        };

        if let Err(e) = player.connect(options.voice_channel) {
            self.players.remove(&guild_id);
            return Err(e);
        }
        player.spawn_event_loop(events);

        let volume = options.volume.unwrap_or(self.config.default_volume);
        if volume != 100 {
            player.set_volume(f32::from(volume)).await?;
        }

        info!("✅ Player creado en guild {} ({} activos)", guild_id, self.players.len());
        Ok(player)
    }

    /// Destruye el player del guild. Devuelve `false` si no existía.
    pub async fn destroy_player(&self, guild_id: GuildId) -> Result<bool> {
        let Some(player) = self.get(guild_id) else {
            return Ok(false);
        };
        player.destroy().await?;
        Ok(true)
    }

    /// Busca tracks; las consultas que no son URL usan el motor configurado
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchResult> {
        let identifier = if query.starts_with("http://") || query.starts_with("https://") {
            query.to_string()
        } else {
            let engine = options
                .engine
                .as_deref()
                .unwrap_or(&self.config.default_search_engine);
            format!("{engine}:{query}")
        };

        let mut result = self.resolver.load_tracks(&identifier).await?;

        match result.load_type {
            LoadType::Empty => warn!("No se encontraron resultados para: {}", identifier),
            LoadType::Error => {
                let message = result
                    .exception
                    .take()
                    .unwrap_or_else(|| "error desconocido".to_string());
                error!("Error al cargar '{}': {}", identifier, message);
                return Err(PlayerError::Resolution(ResolveError::Backend(message)));
            }
            _ => {}
        }

        if let Some(requester) = options.requester {
            result.tracks = result
                .tracks
                .into_iter()
                .map(|track| track.with_requester(requester))
                .collect();
        }

        Ok(result)
    }
}

impl PlayerRegistry for PlayerManager {
    fn remove(&self, guild_id: GuildId) {
        if self.players.remove(&guild_id).is_some() {
            info!("🗑️ Player de guild {} eliminado del registro", guild_id);
        }
    }
}
