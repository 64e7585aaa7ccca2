use serde::{Deserialize, Serialize};

/// Ciclo de vida del player.
///
/// Conexión: `Connecting → Connected → Disconnecting → Disconnected`.
/// Destrucción: `Destroying → Destroyed` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerState {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    Destroying,
    Destroyed,
}

impl PlayerState {
    /// En teardown o destruido: no se procesa nada más
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlayerState::Destroying | PlayerState::Destroyed)
    }
}
