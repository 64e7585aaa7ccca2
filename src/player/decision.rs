//! Decisión pura ante el fin de un track.
//!
//! Reconciliar el motivo reportado por el nodo con el modo de loop y la cola
//! produce exactamente una acción. No toca la cola ni el transporte, de modo
//! que se puede probar sin nodo.

use crate::audio::queue::LoopMode;
use crate::node::payloads::EndReason;
use crate::player::state::PlayerState;

/// Dónde reinsertar el track terminado antes de avanzar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    Front,
    Back,
}

/// Vista mínima del player en el momento del evento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub state: PlayerState,
    pub has_current: bool,
    pub upcoming: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Teardown en curso: no emitir nada
    Suppress,
    /// Otro `play()` ya reemplazó el track: solo "end"
    EndOnly,
    /// Nada más que reproducir: `current` pasa a `previous` y se emite "empty"
    Idle { requeue: Option<Requeue> },
    /// Emitir "end" con el track terminado y reproducir el siguiente
    Advance { requeue: Option<Requeue>, paused: bool },
}

pub fn decide_next_action(reason: EndReason, loop_mode: LoopMode, snapshot: QueueSnapshot) -> EndAction {
    if snapshot.state.is_terminal() {
        return EndAction::Suppress;
    }

    if reason == EndReason::Replaced {
        return EndAction::EndOnly;
    }

    // Un track que falló al cargar nunca se repite
    if reason.is_failure() {
        return if snapshot.upcoming == 0 {
            EndAction::Idle { requeue: None }
        } else {
            EndAction::Advance {
                requeue: None,
                paused: true,
            }
        };
    }

    let requeue = match (snapshot.has_current, loop_mode) {
        (true, LoopMode::Track) => Some(Requeue::Front),
        (true, LoopMode::Queue) => Some(Requeue::Back),
        _ => None,
    };

    let remaining = snapshot.upcoming + usize::from(requeue.is_some());
    if remaining == 0 {
        EndAction::Idle { requeue }
    } else {
        EndAction::Advance {
            requeue,
            paused: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(state: PlayerState, has_current: bool, upcoming: usize) -> QueueSnapshot {
        QueueSnapshot {
            state,
            has_current,
            upcoming,
        }
    }

    #[test]
    fn test_teardown_suppresses_every_reason() {
        for state in [PlayerState::Destroying, PlayerState::Destroyed] {
            for reason in [
                EndReason::Finished,
                EndReason::LoadFailed,
                EndReason::Stopped,
                EndReason::Replaced,
                EndReason::Cleanup,
            ] {
                assert_eq!(
                    decide_next_action(reason, LoopMode::Queue, snapshot(state, true, 3)),
                    EndAction::Suppress
                );
            }
        }
    }

    #[test]
    fn test_replaced_only_emits_end() {
        assert_eq!(
            decide_next_action(
                EndReason::Replaced,
                LoopMode::Track,
                snapshot(PlayerState::Connected, true, 0)
            ),
            EndAction::EndOnly
        );
    }

    #[test]
    fn test_load_failure_ignores_loop_mode() {
        let connected = PlayerState::Connected;
        assert_eq!(
            decide_next_action(EndReason::LoadFailed, LoopMode::Track, snapshot(connected, true, 0)),
            EndAction::Idle { requeue: None }
        );
        assert_eq!(
            decide_next_action(EndReason::Cleanup, LoopMode::Queue, snapshot(connected, true, 2)),
            EndAction::Advance {
                requeue: None,
                paused: true
            }
        );
    }

    #[test]
    fn test_normal_end_applies_loop_policy() {
        let connected = PlayerState::Connected;
        assert_eq!(
            decide_next_action(EndReason::Finished, LoopMode::Track, snapshot(connected, true, 0)),
            EndAction::Advance {
                requeue: Some(Requeue::Front),
                paused: false
            }
        );
        assert_eq!(
            decide_next_action(EndReason::Stopped, LoopMode::Queue, snapshot(connected, true, 1)),
            EndAction::Advance {
                requeue: Some(Requeue::Back),
                paused: false
            }
        );
        assert_eq!(
            decide_next_action(EndReason::Finished, LoopMode::None, snapshot(connected, true, 1)),
            EndAction::Advance {
                requeue: None,
                paused: false
            }
        );
    }

    #[test]
    fn test_normal_end_with_nothing_left_goes_idle() {
        assert_eq!(
            decide_next_action(
                EndReason::Finished,
                LoopMode::None,
                snapshot(PlayerState::Connected, true, 0)
            ),
            EndAction::Idle { requeue: None }
        );
        // Sin current no hay nada que reinsertar
        assert_eq!(
            decide_next_action(
                EndReason::Finished,
                LoopMode::Track,
                snapshot(PlayerState::Connecting, false, 0)
            ),
            EndAction::Idle { requeue: None }
        );
    }
}
