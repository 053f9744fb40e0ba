//! 服务端快照的数据模型（只读，客户端不做规则校验）。

pub mod state;

pub use state::{
    Action,
    CardCode,
    GameEvent,
    GameState,
    HandCard,
    IntegrityError,
    Phase,
    Player,
    PlayerId,
    HAND_SIZE,
    MAX_SEATS,
};
