//! Error types for the guild player.
//!
//! State and argument violations are returned straight to the caller.
//! Resolution failures are the exception: the player turns them into a
//! [`PlayerEvent::ResolveError`](crate::events::PlayerEvent::ResolveError)
//! and skips the track, because they happen mid-playback with no caller.

use thiserror::Error;

use crate::player::state::PlayerState;

/// Errores de los comandos del player
#[derive(Debug, Error)]
pub enum PlayerError {
    /// El comando no es válido en el estado actual del ciclo de vida
    #[error("Operación '{operation}' inválida en estado {state:?}")]
    InvalidState {
        operation: &'static str,
        state: PlayerState,
    },

    /// Argumento con tipo o valor incorrecto
    #[error("Argumento inválido: {0}")]
    InvalidArgument(String),

    /// Se pidió reproducir sin nada en la cola
    #[error("No hay tracks disponibles para reproducir")]
    NoTrackAvailable,

    /// Falló la resolución de un track
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// El nodo de audio rechazó una directiva
    #[error(transparent)]
    Node(#[from] NodeError),

    /// El gateway de voz no aceptó la actualización de estado
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Fallo del backend de búsqueda/resolución
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Error del backend de búsqueda: {0}")]
    Backend(String),

    #[error("Sin resultados para '{0}'")]
    NoMatches(String),
}

/// Fallo del transporte hacia el nodo de audio
#[derive(Debug, Clone, Error)]
#[error("Error del nodo de audio: {message}")]
pub struct NodeError {
    pub message: String,
}

impl NodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fallo al enviar una directiva al gateway de voz
#[derive(Debug, Clone, Error)]
#[error("Error del gateway de voz: {0}")]
pub struct GatewayError(pub String);

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
