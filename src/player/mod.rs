//! # Player Module
//!
//! Per-guild playback state machine.
//!
//! A [`Player`] owns its [`TrackQueue`], holds a non-owning handle to the
//! node transport and reacts to [`NodeEvent`]s. Commands run to completion
//! without waiting on the node's event loop; the only suspension point in
//! [`Player::play`] is track resolution.
//!
//! ## Concurrency
//!
//! All mutable state lives behind one `parking_lot::Mutex` that is never held
//! across an `.await`. `play()` commits `current` before resolving and takes a
//! ticket; when the resolution finishes after a newer `play()` or after
//! `destroy()`, the result is discarded and no directive reaches the node.
//!
//! ## End-of-track handling
//!
//! The decision itself is the pure [`decision::decide_next_action`]; this
//! module only applies it to the queue and emits the resulting events.

pub mod decision;
pub mod state;


use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::audio::queue::{LoopMode, TrackQueue};
use crate::audio::track::{ResolveOptions, Track, TrackResolver};
use crate::error::{PlayerError, Result};
use crate::events::{EventEmitter, PlayerEvent};
use crate::gateway::{VoiceGateway, VoiceStateUpdate};
use crate::manager::PlayerRegistry;
use crate::node::payloads::{EndReason, Filters, PlayOptions, PlayTrackRequest};
use crate::node::{NodeEvent, NodeEventReceiver, NodePlayer};
use decision::{decide_next_action, EndAction, QueueSnapshot, Requeue};
use state::PlayerState;

/// Opciones fijas de un player
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    pub self_mute: bool,
    pub self_deaf: bool,
    pub search_engine: String,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            self_mute: false,
            self_deaf: true,
            search_engine: "ytsearch".to_string(),
        }
    }
}

/// Colaboradores externos que el manager entrega a cada player
#[derive(Clone)]
pub struct PlayerContext {
    pub gateway: Arc<dyn VoiceGateway>,
    pub resolver: Arc<dyn TrackResolver>,
    pub registry: Weak<dyn PlayerRegistry>,
    pub events: EventEmitter,
    pub options: PlayerOptions,
}

#[derive(Debug)]
struct PlayerInner {
    state: PlayerState,
    paused: bool,
    loop_mode: LoopMode,
    voice_channel: Option<ChannelId>,
    text_channel: Option<ChannelId>,
    queue: TrackQueue,
    filters: Filters,
    play_ticket: u64,
}

enum Resolved {
    Discard,
    Failed(String),
    Ready(String),
}

pub struct Player {
    guild_id: GuildId,
    node: Arc<dyn NodePlayer>,
    context: PlayerContext,
    inner: Mutex<PlayerInner>,
}

impl Player {
    pub fn new(
        guild_id: GuildId,
        node: Arc<dyn NodePlayer>,
        context: PlayerContext,
        text_channel: Option<ChannelId>,
    ) -> Self {
        Self {
            guild_id,
            node,
            context,
            inner: Mutex::new(PlayerInner {
                state: PlayerState::Connecting,
                paused: false,
                loop_mode: LoopMode::None,
                voice_channel: None,
                text_channel,
                queue: TrackQueue::new(),
                filters: Filters::default(),
                play_ticket: 0,
            }),
        }
    }

    // Getters
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }
    pub fn state(&self) -> PlayerState {
        self.inner.lock().state
    }
    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }
    pub fn loop_mode(&self) -> LoopMode {
        self.inner.lock().loop_mode
    }
    pub fn voice_channel(&self) -> Option<ChannelId> {
        self.inner.lock().voice_channel
    }
    pub fn text_channel(&self) -> Option<ChannelId> {
        self.inner.lock().text_channel
    }
    pub fn filters(&self) -> Filters {
        self.inner.lock().filters.clone()
    }

    /// Volumen en porcentaje (100 si nunca se cambió)
    pub fn volume(&self) -> f32 {
        self.inner.lock().filters.volume.unwrap_or(1.0) * 100.0
    }

    /// Copia de la cola en este instante
    pub fn queue(&self) -> TrackQueue {
        self.inner.lock().queue.clone()
    }

    /// Modifica la cola (push, unshift, clear, shuffle...) bajo el lock del player
    pub fn update_queue<R>(&self, f: impl FnOnce(&mut TrackQueue) -> R) -> R {
        f(&mut self.inner.lock().queue)
    }

    fn ensure_alive(&self, inner: &PlayerInner, operation: &'static str) -> Result<()> {
        if inner.state.is_terminal() {
            return Err(PlayerError::InvalidState {
                operation,
                state: inner.state,
            });
        }
        Ok(())
    }

    fn emit(&self, event: PlayerEvent) {
        self.context.events.emit(event);
    }

    fn debug_event(&self, message: String) {
        self.context
            .events
            .debug(format!("[guild {}] {}", self.guild_id, message));
    }

    /// Se une a un canal de voz
    pub fn connect(&self, channel_id: ChannelId) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_alive(&inner, "connect")?;
        if inner.state == PlayerState::Connected || inner.voice_channel.is_some() {
            return Err(PlayerError::InvalidState {
                operation: "connect",
                state: inner.state,
            });
        }

        let options = &self.context.options;
        self.context.gateway.send(
            self.guild_id,
            VoiceStateUpdate::join(self.guild_id, channel_id, options.self_mute, options.self_deaf),
        )?;

        inner.voice_channel = Some(channel_id);
        inner.state = PlayerState::Connected;
        drop(inner);

        info!("🔊 Conectado al canal {} en guild {}", channel_id, self.guild_id);
        self.debug_event(format!("conectado al canal de voz {channel_id}"));
        Ok(())
    }

    /// Sale del canal de voz, dejando la reproducción en pausa
    pub async fn disconnect(&self) -> Result<()> {
        let previous = {
            let mut inner = self.inner.lock();
            self.ensure_alive(&inner, "disconnect")?;
            if inner.state == PlayerState::Disconnected || inner.voice_channel.is_none() {
                return Err(PlayerError::InvalidState {
                    operation: "disconnect",
                    state: inner.state,
                });
            }
            let previous = inner.state;
            inner.state = PlayerState::Disconnecting;
            previous
        };

        if let Err(e) = self.leave_voice().await {
            let mut inner = self.inner.lock();
            if inner.state == PlayerState::Disconnecting {
                inner.state = previous;
            }
            warn!("⚠️ No se pudo desconectar en guild {}: {}", self.guild_id, e);
            return Err(e);
        }
        Ok(())
    }

    async fn leave_voice(&self) -> Result<()> {
        let was_paused = self.is_paused();
        self.apply_pause(true).await?;

        let sent = {
            let options = &self.context.options;
            self.context.gateway.send(
                self.guild_id,
                VoiceStateUpdate::leave(self.guild_id, options.self_mute, options.self_deaf),
            )
        };
        if let Err(e) = sent {
            // El leave no salió: la reproducción sigue en el canal
            if !was_paused {
                if let Err(resume) = self.apply_pause(false).await {
                    warn!("⚠️ No se pudo reanudar en guild {}: {}", self.guild_id, resume);
                }
            }
            return Err(e.into());
        }

        let mut inner = self.inner.lock();
        inner.voice_channel = None;
        // Durante destroy el estado ya es Destroying
        if !inner.state.is_terminal() {
            inner.state = PlayerState::Disconnected;
        }
        drop(inner);

        info!("🔌 Desconectado del canal de voz en guild {}", self.guild_id);
        self.debug_event("desconectado del canal de voz".to_string());
        Ok(())
    }

    /// Destruye el player: sale del canal, libera el player del nodo y se
    /// quita del registro. Un segundo `destroy()` falla.
    pub async fn destroy(&self) -> Result<()> {
        let was_connected = {
            let mut inner = self.inner.lock();
            if inner.state.is_terminal() {
                return Err(PlayerError::InvalidState {
                    operation: "destroy",
                    state: inner.state,
                });
            }
            let connected =
                inner.state != PlayerState::Disconnected && inner.voice_channel.is_some();
            inner.state = PlayerState::Destroying;
            connected
        };
        self.debug_event("destruyendo player".to_string());

        if was_connected {
            if let Err(e) = self.leave_voice().await {
                warn!("⚠️ Error al salir del canal en guild {}: {}", self.guild_id, e);
            }
        }

        let released = self.node.destroy_player().await;
        if let Err(e) = &released {
            error!("❌ Error al liberar el player del nodo en guild {}: {}", self.guild_id, e);
        }

        if let Some(registry) = self.context.registry.upgrade() {
            registry.remove(self.guild_id);
        }

        self.inner.lock().state = PlayerState::Destroyed;
        info!("💥 Player destruido en guild {}", self.guild_id);
        self.emit(PlayerEvent::Destroy {
            guild_id: self.guild_id,
        });

        released.map_err(PlayerError::from)
    }

    /// Mueve el player a otro canal de voz
    pub fn set_voice_channel(&self, channel_id: ChannelId) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_alive(&inner, "set_voice_channel")?;

        let options = &self.context.options;
        self.context.gateway.send(
            self.guild_id,
            VoiceStateUpdate::join(self.guild_id, channel_id, options.self_mute, options.self_deaf),
        )?;

        inner.voice_channel = Some(channel_id);
        inner.state = PlayerState::Connecting;
        drop(inner);

        self.debug_event(format!("moviendo al canal de voz {channel_id}"));
        Ok(())
    }

    pub fn set_text_channel(&self, channel_id: ChannelId) -> Result<()> {
        let mut inner = self.inner.lock();
        self.ensure_alive(&inner, "set_text_channel")?;
        inner.text_channel = Some(channel_id);
        Ok(())
    }

    /// Pausa o reanuda. No hace nada si ya está en el estado pedido.
    pub async fn pause(&self, paused: bool) -> Result<()> {
        {
            let inner = self.inner.lock();
            self.ensure_alive(&inner, "pause")?;
        }
        self.apply_pause(paused).await
    }

    async fn apply_pause(&self, paused: bool) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            if inner.paused == paused {
                return Ok(());
            }
            inner.paused = paused;
        }

        if let Err(e) = self.node.set_paused(paused).await {
            self.inner.lock().paused = !paused;
            return Err(e.into());
        }

        if paused {
            info!("⏸️ Reproducción pausada en guild {}", self.guild_id);
        } else {
            info!("▶️ Reproducción reanudada en guild {}", self.guild_id);
        }
        Ok(())
    }

    /// Sin argumento rota none → queue → track → none
    pub fn set_loop(&self, mode: Option<LoopMode>) -> Result<LoopMode> {
        let mut inner = self.inner.lock();
        self.ensure_alive(&inner, "set_loop")?;

        let next = mode.unwrap_or_else(|| inner.loop_mode.cycle());
        inner.loop_mode = next;
        match next {
            LoopMode::None => info!("➡️ Repetición desactivada en guild {}", self.guild_id),
            LoopMode::Track => info!("🔂 Repetir canción activado en guild {}", self.guild_id),
            LoopMode::Queue => info!("🔁 Repetir cola activado en guild {}", self.guild_id),
        }
        Ok(next)
    }

    /// Igual que `set_loop` pero desde texto ("none", "queue", "track")
    pub fn set_loop_named(&self, mode: &str) -> Result<LoopMode> {
        let mode: LoopMode = mode.parse()?;
        self.set_loop(Some(mode))
    }

    /// Volumen en porcentaje; el nodo recibe `volume / 100`
    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        let filters = {
            let mut inner = self.inner.lock();
            self.ensure_alive(&inner, "set_volume")?;
            if !volume.is_finite() {
                return Err(PlayerError::InvalidArgument(format!(
                    "el volumen debe ser un número, se recibió {volume}"
                )));
            }
            inner.filters.volume = Some(volume / 100.0);
            inner.filters.clone()
        };

        self.node.update_filters(filters).await?;
        info!("🔊 Volumen ajustado a {}% en guild {}", volume, self.guild_id);
        Ok(())
    }

    /// Salta a una posición (ms) del track actual
    pub async fn seek(&self, position: u64) -> Result<()> {
        {
            let inner = self.inner.lock();
            self.ensure_alive(&inner, "seek")?;
            match inner.queue.current() {
                None => return Err(PlayerError::NoTrackAvailable),
                Some(track) if track.is_stream() => {
                    return Err(PlayerError::InvalidArgument(
                        "no se puede buscar en un stream en vivo".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }

        self.node.seek(position).await?;
        debug!("⏩ Seek a {}ms en guild {}", position, self.guild_id);
        Ok(())
    }

    /// Detiene el track actual. El avance de la cola ocurre al llegar el
    /// evento "end" del nodo.
    pub async fn skip(&self) -> Result<()> {
        {
            let inner = self.inner.lock();
            self.ensure_alive(&inner, "skip")?;
        }

        self.node.stop_track().await?;
        info!("⏭️ Saltando track en guild {}", self.guild_id);
        Ok(())
    }

    /// Reproduce `track`, o el siguiente de la cola si no se pasa ninguno.
    ///
    /// Con un track explícito y sin `replace_current`, el `current` anterior
    /// vuelve al frente de la cola. El inicio real lo confirma el evento
    /// "start" del nodo.
    pub async fn play(&self, track: Option<Track>, options: PlayOptions) -> Result<()> {
        let (mut track, ticket) = {
            let mut inner = self.inner.lock();
            self.ensure_alive(&inner, "play")?;

            match track {
                Some(track) => {
                    if !track.is_valid() {
                        return Err(PlayerError::InvalidArgument(
                            "el track no tiene identificador".to_string(),
                        ));
                    }
                    if !options.replace_current {
                        if let Some(current) = inner.queue.current.take() {
                            inner.queue.unshift(current);
                        }
                    }
                    inner.queue.current = Some(track);
                }
                None => {
                    if inner.queue.total_size() == 0 {
                        return Err(PlayerError::NoTrackAvailable);
                    }
                    if inner.queue.current.is_none() {
                        inner.queue.current = inner.queue.shift();
                    }
                }
            }

            let current = inner
                .queue
                .current
                .clone()
                .ok_or(PlayerError::NoTrackAvailable)?;
            inner.play_ticket += 1;
            (current, inner.play_ticket)
        };

        let resolve_options = ResolveOptions {
            engine: self.context.options.search_engine.clone(),
            force: false,
        };
        let resolution = track
            .resolve(&*self.context.resolver, &resolve_options)
            .await;

        let outcome = {
            let mut inner = self.inner.lock();
            if inner.state.is_terminal() || inner.play_ticket != ticket {
                Resolved::Discard
            } else {
                match resolution {
                    Err(e) => Resolved::Failed(e.to_string()),
                    Ok(()) => match track.encoded() {
                        Some(encoded) => {
                            let encoded = encoded.to_string();
                            inner.queue.current = Some(track.clone());
                            Resolved::Ready(encoded)
                        }
                        None => Resolved::Failed("track sin referencia reproducible".to_string()),
                    },
                }
            }
        };

        match outcome {
            Resolved::Discard => {
                debug!(
                    "🗑️ Resolución de '{}' descartada en guild {}",
                    track.title(),
                    self.guild_id
                );
                Ok(())
            }
            Resolved::Failed(message) => {
                warn!(
                    "⚠️ No se pudo resolver '{}' en guild {}: {}",
                    track.title(),
                    self.guild_id,
                    message
                );
                self.emit(PlayerEvent::ResolveError {
                    guild_id: self.guild_id,
                    track,
                    message,
                });
                self.skip().await
            }
            Resolved::Ready(encoded) => {
                info!("🎵 Reproduciendo: {} en guild {}", track.title(), self.guild_id);
                let request = PlayTrackRequest {
                    encoded,
                    options: PlayOptions {
                        no_replace: false,
                        ..options
                    },
                };
                self.node.play_track(request).await?;
                self.debug_event(format!("directiva play enviada para '{}'", track.title()));
                Ok(())
            }
        }
    }

    /// Atiende los eventos del nodo hasta que el canal se cierre o el player
    /// sea destruido.
    pub fn spawn_event_loop(self: &Arc<Self>, mut events: NodeEventReceiver) -> JoinHandle<()> {
        let player = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(player) = player.upgrade() else {
                    break;
                };
                player.handle_node_event(event);
                if player.state() == PlayerState::Destroyed {
                    break;
                }
            }
        })
    }

    /// Reacciona a una señal del nodo. No espera a la resolución del
    /// siguiente track: el avance se lanza como tarea aparte.
    pub fn handle_node_event(self: &Arc<Self>, event: NodeEvent) {
        debug!("📡 Evento '{}' en guild {}", event.kind(), self.guild_id);

        match event {
            NodeEvent::Start { encoded } => self.on_track_start(&encoded),
            NodeEvent::End { reason, .. } => self.on_track_end(reason),
            NodeEvent::Closed(payload) => {
                self.inner.lock().paused = true;
                warn!(
                    "🔌 Websocket de voz cerrado en guild {}: {} {}",
                    self.guild_id, payload.code, payload.reason
                );
                self.emit(PlayerEvent::Closed {
                    guild_id: self.guild_id,
                    payload,
                });
            }
            NodeEvent::Exception(payload) => {
                self.inner.lock().paused = true;
                error!(
                    "❌ Excepción del nodo en guild {}: {:?}",
                    self.guild_id, payload.message
                );
                self.emit(PlayerEvent::Exception {
                    guild_id: self.guild_id,
                    payload,
                });
            }
            NodeEvent::Update(payload) => self.emit(PlayerEvent::Update {
                guild_id: self.guild_id,
                payload,
            }),
        }
    }

    fn on_track_start(&self, encoded: &str) {
        let track = {
            let mut inner = self.inner.lock();
            inner.paused = false;
            inner.queue.find_by_encoded(encoded).cloned()
        };

        if track.is_none() {
            debug!("Track iniciado fuera de la cola en guild {}", self.guild_id);
        }
        self.emit(PlayerEvent::Start {
            guild_id: self.guild_id,
            track,
        });
    }

    fn on_track_end(self: &Arc<Self>, reason: EndReason) {
        let (action, finished) = {
            let mut inner = self.inner.lock();
            let snapshot = QueueSnapshot {
                state: inner.state,
                has_current: inner.queue.current.is_some(),
                upcoming: inner.queue.len(),
            };
            let action = decide_next_action(reason, inner.loop_mode, snapshot);

            match action {
                EndAction::Suppress => (action, None),
                // current ya es el track que lo reemplazó
                EndAction::EndOnly => (action, None),
                EndAction::Idle { requeue } | EndAction::Advance { requeue, .. } => {
                    // Reinsertar antes de limpiar current
                    if let (Some(requeue), Some(current)) = (requeue, inner.queue.current.clone()) {
                        match requeue {
                            Requeue::Front => inner.queue.unshift(current),
                            Requeue::Back => inner.queue.push(current),
                        }
                    }

                    let finished = inner.queue.current.take();
                    if finished.is_some() {
                        inner.queue.previous = finished.clone();
                    }
                    inner.paused = match action {
                        EndAction::Advance { paused, .. } => paused,
                        _ => true,
                    };
                    (action, finished)
                }
            }
        };

        match action {
            EndAction::Suppress => {
                debug!("Evento end ignorado durante destroy en guild {}", self.guild_id);
            }
            EndAction::EndOnly => self.emit(PlayerEvent::End {
                guild_id: self.guild_id,
                track: finished,
            }),
            EndAction::Idle { .. } => {
                info!("📭 Cola vacía en guild {}", self.guild_id);
                self.emit(PlayerEvent::Empty {
                    guild_id: self.guild_id,
                });
            }
            EndAction::Advance { .. } => {
                self.emit(PlayerEvent::End {
                    guild_id: self.guild_id,
                    track: finished,
                });

                let player = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(e) = player.play(None, PlayOptions::default()).await {
                        error!(
                            "Error al reproducir siguiente track en guild {}: {:?}",
                            player.guild_id, e
                        );
                    }
                });
            }
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("guild_id", &self.guild_id)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}
