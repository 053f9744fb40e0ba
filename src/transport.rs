//! 与频道传输层之间的约定：推送的意图、收到的消息。
//!
//! 真正的 socket/channel 由前端 JS 负责，这里只做编码与解码。

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app::Viewer;
use crate::bus::BusMessage;
use crate::error::BoardError;
use crate::game::{GameState, HAND_SIZE};
use crate::board_log;

/// 意图要推送到的频道：大厅（`room:lobby`）或当前对局（`game:{id}`）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Lobby,
    Game,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Lobby => "lobby",
            Channel::Game => "game",
        }
    }
}

/// 用户点击产生的动作意图；合法性由服务端裁决。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    CreateGame,
    JoinGame { game_id: String },
    StartGame,
    LeaveGame,
    TakeFromDeck,
    TakeFromTable,
    Discard,
    UncoverCard { hand_index: usize },
    SwapCard { hand_index: usize },
}

impl Intent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Intent::CreateGame => "create_game",
            Intent::JoinGame { .. } => "join_game",
            Intent::StartGame => "start_game",
            Intent::LeaveGame => "leave_game",
            Intent::TakeFromDeck => "take_from_deck",
            Intent::TakeFromTable => "take_from_table",
            Intent::Discard => "discard",
            Intent::UncoverCard { .. } => "uncover_card",
            Intent::SwapCard { .. } => "swap_card",
        }
    }

    /// 建局和加入走大厅频道，其余都发给当前对局。
    pub fn channel(&self) -> Channel {
        match self {
            Intent::CreateGame | Intent::JoinGame { .. } => Channel::Lobby,
            _ => Channel::Game,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Intent::JoinGame { game_id } => json!({ "gameId": game_id }),
            Intent::UncoverCard { hand_index } | Intent::SwapCard { hand_index } => {
                json!({ "handIndex": hand_index })
            }
            _ => json!({}),
        }
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        match self {
            Intent::UncoverCard { hand_index } | Intent::SwapCard { hand_index }
                if *hand_index >= HAND_SIZE =>
            {
                Err(BoardError::HandIndexOutOfRange { index: *hand_index })
            }
            Intent::JoinGame { game_id } if game_id.trim().is_empty() => {
                Err(BoardError::InvalidPayload {
                    reason: "game id is empty".into(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// 把意图推送给服务端的出口。
pub trait IntentSink {
    fn push(&self, intent: Intent);
}

#[derive(Deserialize)]
struct UserReply {
    user: Option<Viewer>,
}

#[derive(Deserialize)]
struct GameReply {
    game: GameState,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Deserialize)]
struct NotFoundReply {
    #[serde(rename = "gameId", alias = "game_id")]
    game_id: Value,
}

/// 把频道事件解码成总线消息。
///
/// 空的 `{user: null}` 大厅回复没有可发布的内容，返回 `Ok(None)`。
pub fn decode_channel_message(
    event: &str,
    payload: &str,
) -> Result<Option<BusMessage>, BoardError> {
    match event {
        "user_update" | "lobby_joined" => {
            let reply: UserReply = serde_json::from_str(payload)?;
            Ok(reply.user.map(BusMessage::ViewerUpdated))
        }
        "game_update" | "game_joined" => {
            let reply: GameReply = serde_json::from_str(payload)?;
            if let Some(msg) = reply.msg.as_deref() {
                board_log!("{msg}");
            }
            Ok(Some(BusMessage::GameUpdated(reply.game)))
        }
        "game_left" => Ok(Some(BusMessage::GameLeft)),
        "game_not_found" => {
            let reply: NotFoundReply = serde_json::from_str(payload)?;
            let game_id = match reply.game_id {
                Value::String(id) => id,
                other => other.to_string(),
            };
            Ok(Some(BusMessage::GameNotFound(game_id)))
        }
        other => Err(BoardError::UnknownChannelEvent {
            event: other.to_string(),
        }),
    }
}
