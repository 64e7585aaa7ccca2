use serenity::model::id::GuildId;
use tokio::sync::broadcast;
use tracing::debug;

use crate::audio::track::Track;
use crate::node::payloads::{ClosedPayload, ExceptionPayload, UpdatePayload};

/// Eventos de dominio que el player publica hacia la aplicación.
///
/// Cada evento identifica al player por su guild; la aplicación obtiene el
/// `Player` a través del manager.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Start {
        guild_id: GuildId,
        track: Option<Track>,
    },
    End {
        guild_id: GuildId,
        track: Option<Track>,
    },
    Empty {
        guild_id: GuildId,
    },
    Closed {
        guild_id: GuildId,
        payload: ClosedPayload,
    },
    Exception {
        guild_id: GuildId,
        payload: ExceptionPayload,
    },
    Update {
        guild_id: GuildId,
        payload: UpdatePayload,
    },
    ResolveError {
        guild_id: GuildId,
        track: Track,
        message: String,
    },
    Destroy {
        guild_id: GuildId,
    },
    Debug {
        message: String,
    },
}

impl PlayerEvent {
    pub fn guild_id(&self) -> Option<GuildId> {
        match self {
            PlayerEvent::Start { guild_id, .. }
            | PlayerEvent::End { guild_id, .. }
            | PlayerEvent::Empty { guild_id }
            | PlayerEvent::Closed { guild_id, .. }
            | PlayerEvent::Exception { guild_id, .. }
            | PlayerEvent::Update { guild_id, .. }
            | PlayerEvent::ResolveError { guild_id, .. }
            | PlayerEvent::Destroy { guild_id } => Some(*guild_id),
            PlayerEvent::Debug { .. } => None,
        }
    }
}

/// Emisor compartido por todos los players de un manager
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn emit(&self, event: PlayerEvent) {
        // Sin suscriptores no es un error
        let _ = self.tx.send(event);
    }

    /// Mensaje informativo; también va al log
    pub fn debug(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("{}", message);
        self.emit(PlayerEvent::Debug { message });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_subscribers_is_silent() {
        let emitter = EventEmitter::new(4);
        emitter.emit(PlayerEvent::Empty {
            guild_id: GuildId::new(1),
        });
    }

    #[tokio::test]
    async fn test_subscribers_receive_debug_messages() {
        let emitter = EventEmitter::new(4);
        let mut rx = emitter.subscribe();
        emitter.debug("hola");

        match rx.recv().await.unwrap() {
            PlayerEvent::Debug { message } => assert_eq!(message, "hola"),
            other => panic!("evento inesperado: {other:?}"),
        }
    }
}
