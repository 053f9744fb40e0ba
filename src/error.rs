use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{IntegrityError, PlayerId};

/// 渲染与交互层的错误。
///
/// 座位数、手牌下标之类的违例意味着快照与客户端约定不符，
/// 整个场景构建随之中止，不会画出半张桌面。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BoardError {
    UnsupportedSeatCount { count: usize },
    HandIndexOutOfRange { index: usize },
    PlayerNotFound { player_id: PlayerId },
    IntegrityViolation { error: IntegrityError },
    ViewerMissing,
    InvalidPayload { reason: String },
    UnknownChannelEvent { event: String },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::UnsupportedSeatCount { count } => {
                write!(f, "invalid player count: {count}")
            }
            BoardError::HandIndexOutOfRange { index } => {
                write!(f, "hand index {index} out of range")
            }
            BoardError::PlayerNotFound { player_id } => {
                write!(f, "player {player_id} not found in snapshot")
            }
            BoardError::IntegrityViolation { error } => {
                write!(f, "snapshot integrity violation: {error:?}")
            }
            BoardError::ViewerMissing => write!(f, "no viewer identity received yet"),
            BoardError::InvalidPayload { reason } => write!(f, "invalid payload: {reason}"),
            BoardError::UnknownChannelEvent { event } => {
                write!(f, "unknown channel event: {event}")
            }
        }
    }
}

impl std::error::Error for BoardError {}

impl From<IntegrityError> for BoardError {
    fn from(error: IntegrityError) -> Self {
        BoardError::IntegrityViolation { error }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(error: serde_json::Error) -> Self {
        BoardError::InvalidPayload {
            reason: error.to_string(),
        }
    }
}
