use serde::Serialize;
use serenity::model::id::{ChannelId, GuildId};

use crate::error::GatewayError;

/// Op code del gateway de Discord para "voice state update"
pub const VOICE_STATE_UPDATE_OP: u8 = 4;

/// Sumidero de directivas hacia el gateway de Discord (el shard del guild)
#[cfg_attr(test, mockall::automock)]
pub trait VoiceGateway: Send + Sync {
    fn send(&self, guild_id: GuildId, payload: VoiceStateUpdate) -> Result<(), GatewayError>;
}

/// `{ op: 4, d: { guild_id, channel_id, self_mute, self_deaf } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceStateUpdate {
    pub op: u8,
    pub d: VoiceStateData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceStateData {
    pub guild_id: GuildId,
    pub channel_id: Option<ChannelId>,
    pub self_mute: bool,
    pub self_deaf: bool,
}

impl VoiceStateUpdate {
    /// Unirse (o moverse) a un canal de voz
    pub fn join(guild_id: GuildId, channel_id: ChannelId, self_mute: bool, self_deaf: bool) -> Self {
        Self::new(guild_id, Some(channel_id), self_mute, self_deaf)
    }

    /// Salir del canal de voz actual
    pub fn leave(guild_id: GuildId, self_mute: bool, self_deaf: bool) -> Self {
        Self::new(guild_id, None, self_mute, self_deaf)
    }

    fn new(guild_id: GuildId, channel_id: Option<ChannelId>, self_mute: bool, self_deaf: bool) -> Self {
        Self {
            op: VOICE_STATE_UPDATE_OP,
            d: VoiceStateData {
                guild_id,
                channel_id,
                self_mute,
                self_deaf,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_leave_payload_wire_shape() {
        let payload = VoiceStateUpdate::leave(GuildId::new(42), false, true);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "op": 4,
                "d": { "guild_id": "42", "channel_id": null, "self_mute": false, "self_deaf": true }
            })
        );
    }

    #[test]
    fn test_join_payload_targets_channel() {
        let payload = VoiceStateUpdate::join(GuildId::new(1), ChannelId::new(7), false, true);
        assert_eq!(payload.op, VOICE_STATE_UPDATE_OP);
        assert_eq!(payload.d.channel_id, Some(ChannelId::new(7)));
    }
}
