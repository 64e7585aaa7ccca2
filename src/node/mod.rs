//! # Node Module
//!
//! Narrow boundary towards the external audio node (a Lavalink-style server).
//!
//! The node connection itself (websocket, REST session, resume) lives outside
//! this crate. A player only needs:
//!
//! - [`NodePlayer`]: the per-guild directive surface (pause, stop, play,
//!   filters, seek and the one-time resource release)
//! - [`NodeEvent`]: the asynchronous signals the node reports back, delivered
//!   through an unbounded channel ([`NodeEventReceiver`])
//!
//! Payload types in [`payloads`] follow the Lavalink v4 wire shape so a
//! transport can deserialize them directly.

pub mod payloads;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::NodeError;
use payloads::{ClosedPayload, EndReason, ExceptionPayload, Filters, PlayTrackRequest, UpdatePayload};

/// Directivas que un player puede enviar al nodo para su guild
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodePlayer: Send + Sync {
    async fn set_paused(&self, paused: bool) -> Result<(), NodeError>;

    async fn stop_track(&self) -> Result<(), NodeError>;

    async fn play_track(&self, request: PlayTrackRequest) -> Result<(), NodeError>;

    async fn update_filters(&self, filters: Filters) -> Result<(), NodeError>;

    /// Posición en milisegundos
    async fn seek(&self, position: u64) -> Result<(), NodeError>;

    /// Libera el player del lado del nodo. Se invoca una sola vez por guild.
    async fn destroy_player(&self) -> Result<(), NodeError>;
}

/// Señales asíncronas del nodo
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    Start { encoded: String },
    End { encoded: Option<String>, reason: EndReason },
    Closed(ClosedPayload),
    Exception(ExceptionPayload),
    Update(UpdatePayload),
}

impl NodeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeEvent::Start { .. } => "start",
            NodeEvent::End { .. } => "end",
            NodeEvent::Closed(_) => "closed",
            NodeEvent::Exception(_) => "exception",
            NodeEvent::Update(_) => "update",
        }
    }
}

pub type NodeEventSender = mpsc::UnboundedSender<NodeEvent>;
pub type NodeEventReceiver = mpsc::UnboundedReceiver<NodeEvent>;

/// Canal por el que el transporte entrega los eventos de un guild
pub fn event_channel() -> (NodeEventSender, NodeEventReceiver) {
    mpsc::unbounded_channel()
}
