use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 每位玩家的手牌数量（发牌后固定）。
pub const HAND_SIZE: usize = 6;
/// 单局最多座位数。
pub const MAX_SEATS: usize = 4;

/// 玩家标识。
pub type PlayerId = u64;
/// 卡牌编码，例如 "KH"、"3C"，同时也是图片资源名。
pub type CardCode = String;

/// 游戏阶段。
///
/// 服务端下发的 `state` 字段；未知取值统一落入 `Unknown`，
/// 此时没有任何元素可交互。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    UncoverTwo,
    Take,
    Discard,
    Uncover,
    Over,
    #[serde(other)]
    Unknown,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Init
    }
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::UncoverTwo => "uncover_two",
            Phase::Take => "take",
            Phase::Discard => "discard",
            Phase::Uncover => "uncover",
            Phase::Over => "over",
            Phase::Unknown => "unknown",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Over)
    }
}

/// 最近一次事件的动作类型，只用于决定动画的起点与终点。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TakeFromDeck,
    TakeFromTable,
    Discard,
    SwapCard,
    UncoverCard,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEvent {
    pub action: Action,
    pub player_id: PlayerId,
}

impl GameEvent {
    pub fn new(action: Action, player_id: PlayerId) -> Self {
        Self { action, player_id }
    }
}

/// 手牌中的一张牌。`covered` 为真时对所有人（包括持有者）显示牌背。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandCard {
    pub card: CardCode,
    #[serde(rename = "covered?", alias = "covered", default)]
    pub covered: bool,
}

impl HandCard {
    pub fn covered(card: impl Into<CardCode>) -> Self {
        Self {
            card: card.into(),
            covered: true,
        }
    }

    pub fn uncovered(card: impl Into<CardCode>) -> Self {
        Self {
            card: card.into(),
            covered: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub hand: Vec<HandCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub held_card: Option<CardCode>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            hand: Vec::new(),
            held_card: None,
        }
    }

    pub fn with_hand(mut self, hand: Vec<HandCard>) -> Self {
        self.hand = hand;
        self
    }

    pub fn with_held_card(mut self, card: impl Into<CardCode>) -> Self {
        self.held_card = Some(card.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    InvalidSeatCount { count: usize },
    MissingPlayer { player_id: PlayerId },
    DuplicateSeat { player_id: PlayerId },
    NextPlayerNotSeated { player_id: PlayerId },
    HandTooLarge { player_id: PlayerId, size: usize },
}

/// 服务端下发的整局快照；客户端从不局部修改，只整体替换。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub id: String,
    #[serde(rename = "state", default)]
    pub phase: Phase,
    #[serde(default)]
    pub player_order: Vec<PlayerId>,
    #[serde(default)]
    pub players: HashMap<PlayerId, Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_player_id: Option<PlayerId>,
    pub host_id: PlayerId,
    #[serde(default)]
    pub table_cards: Vec<CardCode>,
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(id: impl Into<String>, host_id: PlayerId) -> Self {
        Self {
            id: id.into(),
            phase: Phase::default(),
            player_order: Vec::new(),
            players: HashMap::new(),
            next_player_id: None,
            host_id,
            table_cards: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn seat_player(&mut self, player: Player) {
        if !self.player_order.contains(&player.id) {
            self.player_order.push(player.id);
        }
        self.players.insert(player.id, player);
    }

    /// 事件按时间倒序存放，新事件插到最前面。
    pub fn record_event(&mut self, event: GameEvent) {
        self.events.insert(0, event);
    }

    pub fn last_event(&self) -> Option<&GameEvent> {
        self.events.first()
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn top_table_card(&self) -> Option<&CardCode> {
        self.table_cards.first()
    }

    pub fn is_turn_of(&self, id: PlayerId) -> bool {
        self.next_player_id == Some(id)
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let count = self.player_order.len();
        if count == 0 || count > MAX_SEATS {
            return Err(IntegrityError::InvalidSeatCount { count });
        }

        let mut seen = HashSet::new();
        for id in &self.player_order {
            let player = self
                .players
                .get(id)
                .ok_or(IntegrityError::MissingPlayer { player_id: *id })?;
            if !seen.insert(*id) {
                return Err(IntegrityError::DuplicateSeat { player_id: *id });
            }
            if player.hand.len() > HAND_SIZE {
                return Err(IntegrityError::HandTooLarge {
                    player_id: *id,
                    size: player.hand.len(),
                });
            }
        }

        if let Some(next) = self.next_player_id {
            if !self.player_order.contains(&next) {
                return Err(IntegrityError::NextPlayerNotSeated { player_id: next });
            }
        }

        Ok(())
    }

    /// 生成一个 `player_count` 人、处于 `phase` 阶段的示例对局，便于调试和测试。
    ///
    /// 玩家 id 从 1 开始，1 号玩家是房主并且轮到其行动。
    pub fn sample(player_count: usize, phase: Phase) -> Self {
        const NAMES: [&str; MAX_SEATS] = ["alice", "bob", "carol", "dave"];
        const SUITS: [char; MAX_SEATS] = ['H', 'S', 'D', 'C'];
        const RANKS: [&str; HAND_SIZE] = ["A", "2", "5", "9", "J", "K"];

        let mut state = GameState::new("sample", 1).with_phase(phase);
        for seat in 0..player_count.min(MAX_SEATS) {
            let id = seat as PlayerId + 1;
            let hand = if phase == Phase::Init {
                Vec::new()
            } else {
                RANKS
                    .iter()
                    .enumerate()
                    .map(|(index, rank)| {
                        let code = format!("{rank}{}", SUITS[seat]);
                        // 前两张在 uncover_two 之后翻开
                        let revealed = !matches!(phase, Phase::UncoverTwo) && index < 2;
                        if revealed || phase == Phase::Over {
                            HandCard::uncovered(code)
                        } else {
                            HandCard::covered(code)
                        }
                    })
                    .collect()
            };
            let mut player = Player::new(id, NAMES[seat]).with_hand(hand);
            player.score = (seat as i32) * 3;
            state.seat_player(player);
        }

        if phase != Phase::Init && phase != Phase::Over {
            state.next_player_id = Some(1);
        }
        if !matches!(phase, Phase::Init | Phase::UncoverTwo) {
            state.table_cards = vec!["QD".into(), "7S".into()];
        }
        state
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new("", 0)
    }
}
