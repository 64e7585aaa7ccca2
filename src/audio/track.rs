use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::model::id::UserId;
use std::time::Duration;
use tracing::debug;

use crate::error::ResolveError;

/// Backend de búsqueda que convierte un identificador en tracks reproducibles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Carga tracks para un identificador (`ytsearch:...`, URL directa, etc.)
    async fn load_tracks(&self, identifier: &str) -> Result<SearchResult, ResolveError>;
}

/// Tipo de resultado devuelto por el backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadType {
    Track,
    Playlist,
    Search,
    Empty,
    Error,
}

/// Resultado de una búsqueda
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub load_type: LoadType,
    pub tracks: Vec<Track>,
    pub playlist_name: Option<String>,
    pub exception: Option<String>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            load_type: LoadType::Empty,
            tracks: Vec::new(),
            playlist_name: None,
            exception: None,
        }
    }

    pub fn search(tracks: Vec<Track>) -> Self {
        Self {
            load_type: LoadType::Search,
            tracks,
            playlist_name: None,
            exception: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            load_type: LoadType::Error,
            tracks: Vec::new(),
            playlist_name: None,
            exception: Some(message.into()),
        }
    }
}

/// Metadatos opacos del track, en la forma en que los entrega el nodo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub uri: Option<String>,
    /// Duración en milisegundos
    pub length: u64,
    pub is_stream: bool,
    pub source_name: String,
}

/// Opciones para resolver un track sin referencia reproducible
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub engine: String,
    pub force: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            engine: "ytsearch".to_string(),
            force: false,
        }
    }
}

/// Representa un track de la cola
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    encoded: Option<String>,
    info: TrackInfo,
    requester: Option<UserId>,
    added_at: DateTime<Utc>,
}

impl Track {
    /// Track sin resolver: solo metadatos
    pub fn new(info: TrackInfo) -> Self {
        Self {
            encoded: None,
            info,
            requester: None,
            added_at: Utc::now(),
        }
    }

    /// Track ya resuelto, tal como lo devuelve el backend
    pub fn resolved(encoded: impl Into<String>, info: TrackInfo) -> Self {
        Self {
            encoded: Some(encoded.into()),
            ..Self::new(info)
        }
    }

    // Getters
    pub fn encoded(&self) -> Option<&str> {
        self.encoded.as_deref()
    }
    pub fn info(&self) -> &TrackInfo {
        &self.info
    }
    pub fn title(&self) -> &str {
        &self.info.title
    }
    pub fn author(&self) -> &str {
        &self.info.author
    }
    pub fn identifier(&self) -> &str {
        &self.info.identifier
    }
    pub fn uri(&self) -> Option<&str> {
        self.info.uri.as_deref()
    }
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.info.length)
    }
    pub fn is_stream(&self) -> bool {
        self.info.is_stream
    }
    pub fn requester(&self) -> Option<UserId> {
        self.requester
    }
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn is_resolved(&self) -> bool {
        self.encoded.is_some()
    }

    /// Un track sin identificador no puede entregarse al nodo
    pub fn is_valid(&self) -> bool {
        !self.info.identifier.trim().is_empty()
    }

    // Setters
    pub fn with_requester(mut self, requester: UserId) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Resuelve la referencia reproducible del track.
    ///
    /// Es idempotente: un track ya resuelto no vuelve a consultar el backend
    /// salvo que `options.force` esté activo.
    pub async fn resolve(
        &mut self,
        resolver: &dyn TrackResolver,
        options: &ResolveOptions,
    ) -> Result<(), ResolveError> {
        if self.is_resolved() && !options.force {
            return Ok(());
        }

        let query = self.resolve_query(&options.engine);
        debug!("🔎 Resolviendo '{}' con '{}'", self.info.title, query);

        let result = resolver.load_tracks(&query).await?;
        if result.load_type == LoadType::Error {
            return Err(ResolveError::Backend(
                result
                    .exception
                    .unwrap_or_else(|| "error desconocido".to_string()),
            ));
        }

        let encoded = self
            .best_match(&result.tracks)
            .and_then(|track| track.encoded.clone())
            .ok_or(ResolveError::NoMatches(query))?;

        self.encoded = Some(encoded);
        Ok(())
    }

    fn resolve_query(&self, engine: &str) -> String {
        match &self.info.uri {
            Some(uri) => uri.clone(),
            None => format!("{}:{} - {}", engine, self.info.author, self.info.title),
        }
    }

    // Mismo identificador > mismo título y autor > duración más cercana > primero
    fn best_match<'a>(&self, candidates: &'a [Track]) -> Option<&'a Track> {
        let resolvable = || candidates.iter().filter(|t| t.is_resolved());

        if let Some(exact) = resolvable().find(|t| t.info.identifier == self.info.identifier) {
            return Some(exact);
        }

        if let Some(named) = resolvable().find(|t| {
            t.info.title.eq_ignore_ascii_case(&self.info.title)
                && t.info.author.eq_ignore_ascii_case(&self.info.author)
        }) {
            return Some(named);
        }

        if self.info.length > 0 && !self.info.is_stream {
            return resolvable().min_by_key(|t| t.info.length.abs_diff(self.info.length));
        }

        resolvable().next()
    }
}

#[cfg(test)]
pub(crate) fn test_track(id: &str) -> Track {
    Track::resolved(format!("enc-{id}"), test_info(id))
}

#[cfg(test)]
pub(crate) fn test_info(id: &str) -> TrackInfo {
    TrackInfo {
        identifier: id.to_string(),
        title: format!("Song {id}"),
        author: "Artist".to_string(),
        uri: None,
        length: 180_000,
        is_stream: false,
        source_name: "youtube".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_resolved_track_skips_backend() {
        let mut resolver = MockTrackResolver::new();
        resolver.expect_load_tracks().times(0);

        let mut track = test_track("a");
        track
            .resolve(&resolver, &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(track.encoded(), Some("enc-a"));
    }

    #[tokio::test]
    async fn test_resolve_prefers_same_identifier() {
        let mut resolver = MockTrackResolver::new();
        resolver
            .expect_load_tracks()
            .withf(|query: &str| query == "ytsearch:Artist - Song b")
            .times(1)
            .returning(|_| Ok(SearchResult::search(vec![test_track("x"), test_track("b")])));

        let mut track = Track::new(test_info("b"));
        track
            .resolve(&resolver, &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(track.encoded(), Some("enc-b"));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_closest_length() {
        let mut short = test_info("short");
        short.title = "Other".to_string();
        short.length = 60_000;
        let mut close = test_info("close");
        close.title = "Another".to_string();
        close.length = 175_000;

        let mut resolver = MockTrackResolver::new();
        resolver.expect_load_tracks().returning(move |_| {
            Ok(SearchResult::search(vec![
                Track::resolved("enc-short", short.clone()),
                Track::resolved("enc-close", close.clone()),
            ]))
        });

        let mut track = Track::new(test_info("wanted"));
        track
            .resolve(&resolver, &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(track.encoded(), Some("enc-close"));
    }

    #[tokio::test]
    async fn test_resolve_uses_uri_when_present() {
        let mut resolver = MockTrackResolver::new();
        resolver
            .expect_load_tracks()
            .withf(|query: &str| query == "https://example.com/song.mp3")
            .returning(|_| Ok(SearchResult::search(vec![test_track("u")])));

        let mut info = test_info("u");
        info.uri = Some("https://example.com/song.mp3".to_string());
        let mut track = Track::new(info);
        track
            .resolve(&resolver, &ResolveOptions::default())
            .await
            .unwrap();
        assert!(track.is_resolved());
    }

    #[tokio::test]
    async fn test_resolve_reports_backend_errors() {
        let mut resolver = MockTrackResolver::new();
        resolver
            .expect_load_tracks()
            .returning(|_| Ok(SearchResult::failed("rate limited")));

        let mut track = Track::new(test_info("a"));
        let err = track
            .resolve(&resolver, &ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Backend(msg) if msg == "rate limited"));
        assert!(!track.is_resolved());
    }

    #[tokio::test]
    async fn test_resolve_without_results_fails() {
        let mut resolver = MockTrackResolver::new();
        resolver
            .expect_load_tracks()
            .returning(|_| Ok(SearchResult::empty()));

        let mut track = Track::new(test_info("a"));
        let result = track.resolve(&resolver, &ResolveOptions::default()).await;
        assert!(matches!(result, Err(ResolveError::NoMatches(_))));
    }

    #[test]
    fn test_track_validity() {
        assert!(test_track("a").is_valid());
        assert!(!Track::new(test_info("  ")).is_valid());
    }
}
