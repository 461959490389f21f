//! Message contracts with the embedding page and the session relay
//!
//! The game never owns a socket. It posts [`ShellMessage`]s to the page that
//! embeds it; the page forwards them to the session service as
//! [`RelayMessage`]s and feeds opponent updates back in.

use serde::{Deserialize, Serialize};

use crate::arena::ArenaTable;
use crate::error::MatchError;
use crate::sim::{GameEvent, MatchParams};

/// Frame messages from the game to the embedding page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellMessage {
    Score { value: u64 },
    /// `value` is the dead player's user id
    Death { value: u64 },
}

impl ShellMessage {
    /// The page-facing message for a simulation event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ScoreChanged { score } => Some(ShellMessage::Score { value: *score }),
            GameEvent::Death { user_id, .. } => Some(ShellMessage::Death { value: *user_id }),
            GameEvent::Jumped | GameEvent::Landed { .. } => None,
        }
    }

    /// The relay message the page sends on our behalf
    pub fn to_relay(&self) -> RelayMessage {
        match self {
            ShellMessage::Score { value } => RelayMessage::Score { value: *value },
            ShellMessage::Death { value } => RelayMessage::PlayerDeath { value: *value },
        }
    }
}

/// Opponent progress carried by `opponent_score`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentScore {
    pub user_id: u64,
    pub score: u64,
}

/// Session relay WebSocket messages (JSON text frames)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    // Client -> relay
    Score { value: u64 },
    PlayerDeath { value: u64 },
    Join { user_id: u64 },

    // Relay -> client
    Seed { value: u32 },
    OpponentScore { value: OpponentScore },
    OpponentDeath { value: u64 },
    PlayerJoined { user_id: u64 },
    PlayerLeft { user_id: u64 },
    SessionFinished { winner_id: u64 },
}

impl RelayMessage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        // Plain enum of integers, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Session record returned by the session service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: u64,
    pub seed: u32,
    pub arena_id: String,
    pub status: String,
}

impl SessionInfo {
    /// Match parameters for `user_id` joining this session
    pub fn match_params(&self, user_id: u64, arenas: &ArenaTable) -> Result<MatchParams, MatchError> {
        let arena = arenas.get(&self.arena_id)?.clone();
        Ok(MatchParams::new(self.seed, user_id, arena))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_wire_format() {
        assert_eq!(
            RelayMessage::Score { value: 42 }.to_json(),
            r#"{"type":"score","value":42}"#
        );
        assert_eq!(
            RelayMessage::PlayerDeath { value: 20 }.to_json(),
            r#"{"type":"player_death","value":20}"#
        );
        assert_eq!(
            serde_json::to_string(&ShellMessage::Death { value: 3 }).unwrap(),
            r#"{"type":"death","value":3}"#
        );
    }

    #[test]
    fn test_incoming_messages() {
        let msg =
            RelayMessage::from_json(r#"{"type":"opponent_score","value":{"user_id":11,"score":57}}"#)
                .unwrap();
        assert_eq!(
            msg,
            RelayMessage::OpponentScore {
                value: OpponentScore {
                    user_id: 11,
                    score: 57
                }
            }
        );

        let msg = RelayMessage::from_json(r#"{"type":"seed","value":1792108570}"#).unwrap();
        assert_eq!(msg, RelayMessage::Seed { value: 1_792_108_570 });

        let msg = RelayMessage::from_json(r#"{"type":"player_left","user_id":2}"#).unwrap();
        assert_eq!(msg, RelayMessage::PlayerLeft { user_id: 2 });

        let msg = RelayMessage::from_json(r#"{"type":"session_finished","winner_id":9}"#).unwrap();
        assert_eq!(msg, RelayMessage::SessionFinished { winner_id: 9 });

        assert!(RelayMessage::from_json(r#"{"type":"chat","value":"hi"}"#).is_err());
    }

    #[test]
    fn test_events_to_shell_messages() {
        assert_eq!(
            ShellMessage::from_event(&GameEvent::ScoreChanged { score: 5 }),
            Some(ShellMessage::Score { value: 5 })
        );
        let death = ShellMessage::from_event(&GameEvent::Death {
            final_score: 12,
            user_id: 4,
        })
        .unwrap();
        assert_eq!(death.to_relay(), RelayMessage::PlayerDeath { value: 4 });
        assert_eq!(ShellMessage::from_event(&GameEvent::Jumped), None);
    }

    #[test]
    fn test_session_to_match_params() {
        let session: SessionInfo = serde_json::from_str(
            r#"{"id":3,"seed":777,"arena_id":"moon","status":"active"}"#,
        )
        .unwrap();
        let params = session.match_params(20, &ArenaTable::builtin()).unwrap();
        assert_eq!(params.seed, 777);
        assert_eq!(params.user_id, 20);
        assert_eq!(params.arena.id, "moon");

        let session = SessionInfo {
            arena_id: "pluto".to_string(),
            ..session
        };
        assert!(session.match_params(20, &ArenaTable::builtin()).is_err());
    }
}
