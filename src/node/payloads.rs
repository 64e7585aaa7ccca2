use serde::{Deserialize, Serialize};

/// Motivo reportado por el nodo al terminar un track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    #[serde(alias = "FINISHED")]
    Finished,
    #[serde(alias = "LOAD_FAILED")]
    LoadFailed,
    #[serde(alias = "STOPPED")]
    Stopped,
    #[serde(alias = "REPLACED")]
    Replaced,
    #[serde(alias = "CLEAN_UP", alias = "CLEANUP")]
    Cleanup,
}

impl EndReason {
    /// El track no pudo reproducirse y no debe repetirse
    pub fn is_failure(&self) -> bool {
        matches!(self, EndReason::LoadFailed | EndReason::Cleanup)
    }
}

/// Opciones de la directiva de reproducción
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOptions {
    /// Reemplaza el `current` en lugar de devolverlo al frente de la cola
    #[serde(skip)]
    pub replace_current: bool,
    pub no_replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause: Option<bool>,
    /// Posición inicial en milisegundos
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u16>,
}

/// Directiva "play" que recibe el nodo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayTrackRequest {
    pub encoded: String,
    #[serde(flatten)]
    pub options: PlayOptions,
}

/// Estado de filtros del player en el nodo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// 1.0 = volumen original
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
}

/// Cierre del websocket de voz (Discord)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedPayload {
    pub code: u16,
    pub reason: String,
    #[serde(default)]
    pub by_remote: bool,
}

/// Excepción reportada por el nodo durante la reproducción
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionPayload {
    pub message: Option<String>,
    pub severity: String,
    pub cause: String,
}

/// Telemetría periódica de posición
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    /// Timestamp unix en milisegundos
    pub time: u64,
    /// Posición del track en milisegundos
    pub position: u64,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ping: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_end_reason_accepts_both_spellings() {
        let lower: EndReason = serde_json::from_str("\"loadFailed\"").unwrap();
        let upper: EndReason = serde_json::from_str("\"LOAD_FAILED\"").unwrap();
        let cleanup: EndReason = serde_json::from_str("\"CLEAN_UP\"").unwrap();
        assert_eq!(lower, EndReason::LoadFailed);
        assert_eq!(upper, EndReason::LoadFailed);
        assert_eq!(cleanup, EndReason::Cleanup);
        assert!(cleanup.is_failure());
        assert!(!EndReason::Stopped.is_failure());
    }

    #[test]
    fn test_play_request_wire_shape() {
        let request = PlayTrackRequest {
            encoded: "QAAA".to_string(),
            options: PlayOptions {
                replace_current: true,
                start_time: Some(1_500),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "encoded": "QAAA", "noReplace": false, "startTime": 1500 })
        );
    }

    #[test]
    fn test_update_payload_from_node_json() {
        let payload: UpdatePayload =
            serde_json::from_str(r#"{"time":1500467109,"position":60000,"connected":true,"ping":50}"#)
                .unwrap();
        assert_eq!(payload.position, 60_000);
        assert!(payload.connected);
    }
}
