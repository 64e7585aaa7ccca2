use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, str::FromStr, time::Duration};
use tracing::debug;

use crate::audio::track::Track;
use crate::error::PlayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    #[default]
    None,
    Queue,
    Track,
}

impl LoopMode {
    /// Siguiente modo en el ciclo none → queue → track → none
    pub fn cycle(self) -> Self {
        match self {
            LoopMode::None => LoopMode::Queue,
            LoopMode::Queue => LoopMode::Track,
            LoopMode::Track => LoopMode::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopMode::None => "none",
            LoopMode::Queue => "queue",
            LoopMode::Track => "track",
        }
    }
}

impl FromStr for LoopMode {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LoopMode::None),
            "queue" => Ok(LoopMode::Queue),
            "track" => Ok(LoopMode::Track),
            other => Err(PlayerError::InvalidArgument(format!(
                "modo de loop desconocido '{other}', se esperaba none, queue o track"
            ))),
        }
    }
}

/// Cola de tracks con las ranuras `current` y `previous`.
///
/// `current` nunca está a la vez en `upcoming`. Ninguna operación falla:
/// una cola vacía se expresa con `None` o longitud 0.
#[derive(Debug, Default, Clone)]
pub struct TrackQueue {
    upcoming: VecDeque<Track>,
    pub(crate) current: Option<Track>,
    pub(crate) previous: Option<Track>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un track al final
    pub fn push(&mut self, track: Track) {
        debug!("➕ Agregado a la cola: {}", track.title());
        self.upcoming.push_back(track);
    }

    /// Inserta un track al frente
    pub fn unshift(&mut self, track: Track) {
        debug!("⏫ Agregado al frente de la cola: {}", track.title());
        self.upcoming.push_front(track);
    }

    /// Saca el primer track pendiente (FIFO)
    pub fn shift(&mut self) -> Option<Track> {
        self.upcoming.pop_front()
    }

    /// Limpia los tracks pendientes
    pub fn clear(&mut self) {
        self.upcoming.clear();
        debug!("🗑️ Cola limpiada");
    }

    /// Elimina un track pendiente por posición
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        self.upcoming.remove(index)
    }

    /// Mezcla la cola
    pub fn shuffle(&mut self) {
        let mut items: Vec<_> = self.upcoming.drain(..).collect();
        let mut rng = rand::thread_rng();
        items.shuffle(&mut rng);
        self.upcoming.extend(items);
        debug!("🔀 Cola mezclada");
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.upcoming.iter()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Track> {
        self.previous.as_ref()
    }

    /// Tracks pendientes (sin contar `current`)
    pub fn len(&self) -> usize {
        self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
    }

    /// Pendientes más el actual
    pub fn total_size(&self) -> usize {
        self.upcoming.len() + usize::from(self.current.is_some())
    }

    /// Duración total sin contar streams
    pub fn duration(&self) -> Duration {
        self.current
            .iter()
            .chain(self.upcoming.iter())
            .filter(|track| !track.is_stream())
            .map(Track::duration)
            .sum()
    }

    /// Busca en current, previous y upcoming el track cuya referencia coincide.
    ///
    /// Es best-effort: si el nodo reproduce algo que ya no está en la cola
    /// devuelve `None`.
    pub fn find_by_encoded(&self, encoded: &str) -> Option<&Track> {
        self.current
            .iter()
            .chain(self.previous.iter())
            .chain(self.upcoming.iter())
            .find(|track| track.encoded() == Some(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::track::test_track;
    use pretty_assertions::assert_eq;

    fn ids(queue: &TrackQueue) -> Vec<&str> {
        queue.iter().map(Track::identifier).collect()
    }

    #[test]
    fn test_push_unshift_shift_order() {
        let mut queue = TrackQueue::new();
        queue.push(test_track("b"));
        queue.push(test_track("c"));
        queue.unshift(test_track("a"));
        assert_eq!(ids(&queue), vec!["a", "b", "c"]);

        assert_eq!(queue.shift().map(|t| t.identifier().to_string()), Some("a".to_string()));
        assert_eq!(ids(&queue), vec!["b", "c"]);
    }

    #[test]
    fn test_shift_on_empty_queue_is_none() {
        let mut queue = TrackQueue::new();
        assert!(queue.shift().is_none());
        assert_eq!(queue.total_size(), 0);
    }

    #[test]
    fn test_total_size_tracks_current_and_upcoming() {
        let mut queue = TrackQueue::new();
        let ops: [fn(&mut TrackQueue); 6] = [
            |q| q.push(test_track("a")),
            |q| q.unshift(test_track("b")),
            |q| q.current = q.shift(),
            |q| q.push(test_track("c")),
            |q| {
                q.shift();
            },
            |q| q.current = None,
        ];

        for op in ops {
            op(&mut queue);
            let expected = usize::from(queue.current().is_some()) + queue.len();
            assert_eq!(queue.total_size(), expected);
        }
    }

    #[test]
    fn test_clear_keeps_current() {
        let mut queue = TrackQueue::new();
        queue.current = Some(test_track("a"));
        queue.push(test_track("b"));
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.total_size(), 1);
    }

    #[test]
    fn test_remove_and_shuffle_keep_tracks() {
        let mut queue = TrackQueue::new();
        for id in ["a", "b", "c", "d"] {
            queue.push(test_track(id));
        }
        assert_eq!(queue.remove(1).map(|t| t.identifier().to_string()), Some("b".to_string()));
        assert!(queue.remove(10).is_none());

        queue.shuffle();
        let mut shuffled = ids(&queue);
        shuffled.sort_unstable();
        assert_eq!(shuffled, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_duration_skips_streams() {
        let mut queue = TrackQueue::new();
        queue.current = Some(test_track("a"));
        queue.push(test_track("b"));
        let mut live = crate::audio::track::test_info("live");
        live.is_stream = true;
        queue.push(Track::resolved("enc-live", live));

        assert_eq!(queue.duration(), Duration::from_secs(360));
    }

    #[test]
    fn test_find_by_encoded_checks_all_slots() {
        let mut queue = TrackQueue::new();
        queue.current = Some(test_track("a"));
        queue.previous = Some(test_track("p"));
        queue.push(test_track("b"));

        assert_eq!(queue.find_by_encoded("enc-a").map(Track::identifier), Some("a"));
        assert_eq!(queue.find_by_encoded("enc-p").map(Track::identifier), Some("p"));
        assert_eq!(queue.find_by_encoded("enc-b").map(Track::identifier), Some("b"));
        assert!(queue.find_by_encoded("enc-zzz").is_none());
    }

    #[test]
    fn test_loop_mode_cycle() {
        let mut mode = LoopMode::Track;
        let mut seen = Vec::new();
        for _ in 0..4 {
            mode = mode.cycle();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![LoopMode::None, LoopMode::Queue, LoopMode::Track, LoopMode::None]
        );
    }

    #[test]
    fn test_loop_mode_from_str() {
        assert_eq!("queue".parse::<LoopMode>().unwrap(), LoopMode::Queue);
        assert!(matches!(
            "forever".parse::<LoopMode>(),
            Err(PlayerError::InvalidArgument(_))
        ));
    }
}
