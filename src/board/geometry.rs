//! 座位与坐标计算。
//!
//! 原点位于棋盘中心，观看者自己的手牌永远在 BOTTOM，其余座位顺时针排列。

use serde::{Deserialize, Serialize};

use super::config::BoardConfig;
use crate::error::BoardError;
use crate::game::{GameState, Phase, PlayerId, HAND_SIZE};

/// 相对观看者的座位。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Seat {
    Bottom,
    Left,
    Top,
    Right,
}

impl Seat {
    pub fn rotation(self) -> f64 {
        match self {
            Seat::Bottom => 0.0,
            Seat::Left => 90.0,
            Seat::Top => 180.0,
            Seat::Right => 270.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    /// 角度制，取值 0/90/180/270。
    pub rotate: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64, rotate: f64) -> Self {
        Self { x, y, rotate }
    }

    pub const fn at(x: f64, y: f64) -> Self {
        Self { x, y, rotate: 0.0 }
    }
}

/// 各人数对应的座位序列。
pub fn hand_positions(player_count: usize) -> Result<&'static [Seat], BoardError> {
    match player_count {
        1 => Ok(&[Seat::Bottom]),
        2 => Ok(&[Seat::Bottom, Seat::Top]),
        3 => Ok(&[Seat::Bottom, Seat::Left, Seat::Right]),
        4 => Ok(&[Seat::Bottom, Seat::Left, Seat::Top, Seat::Right]),
        count => Err(BoardError::UnsupportedSeatCount { count }),
    }
}

/// 以 `pivot` 为起点循环旋转序列：`rotate(&[a, b, c, d], 2) == [c, d, a, b]`。
pub fn rotate<T: Clone>(items: &[T], pivot: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    let pivot = pivot % items.len();
    items[pivot..]
        .iter()
        .chain(items[..pivot].iter())
        .cloned()
        .collect()
}

/// 观看者视角下的 (玩家, 座位) 列表，观看者排在第一位。
///
/// 不在座位上的观看者（旁观者）按原始顺序观看。
pub fn seating(
    viewer: PlayerId,
    player_order: &[PlayerId],
) -> Result<Vec<(PlayerId, Seat)>, BoardError> {
    let positions = hand_positions(player_order.len())?;
    let pivot = player_order
        .iter()
        .position(|id| *id == viewer)
        .unwrap_or(0);
    Ok(rotate(player_order, pivot)
        .into_iter()
        .zip(positions.iter().copied())
        .collect())
}

pub fn player_seat(
    viewer: PlayerId,
    state: &GameState,
    player: PlayerId,
) -> Result<Seat, BoardError> {
    seating(viewer, &state.player_order)?
        .into_iter()
        .find(|(id, _)| *id == player)
        .map(|(_, seat)| seat)
        .ok_or(BoardError::PlayerNotFound { player_id: player })
}

/// 按棋盘尺寸计算各元素坐标。
#[derive(Debug, Clone, Copy)]
pub struct Geometry<'a> {
    config: &'a BoardConfig,
}

impl<'a> Geometry<'a> {
    pub fn new(config: &'a BoardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoardConfig {
        self.config
    }

    /// 手牌区离棋盘边缘的距离。
    fn edge_inset(&self) -> f64 {
        self.config.card_height + self.config.hand_padding * 4.0
    }

    pub fn hand_coord(&self, seat: Seat) -> Coord {
        let half_w = self.config.width / 2.0;
        let half_h = self.config.height / 2.0;
        let inset = self.edge_inset();
        let rotate = seat.rotation();
        match seat {
            Seat::Bottom => Coord::new(0.0, half_h - inset, rotate),
            Seat::Left => Coord::new(-half_w + inset, 0.0, rotate),
            Seat::Top => Coord::new(0.0, -half_h + inset, rotate),
            Seat::Right => Coord::new(half_w - inset, 0.0, rotate),
        }
    }

    pub fn held_card_coord(&self, seat: Seat) -> Coord {
        let half_w = self.config.width / 2.0;
        let half_h = self.config.height / 2.0;
        let inset = self.edge_inset();
        let beside = self.config.card_width * 1.5;
        let pad = self.config.hand_padding * 4.0;
        match seat {
            Seat::Bottom => Coord::new(beside, half_h - inset, 0.0),
            Seat::Left => Coord::new(-half_w + inset, beside + pad, 90.0),
            Seat::Top => Coord::new(-beside, -half_h + inset, 0.0),
            Seat::Right => Coord::new(half_w - inset, -beside - pad, 90.0),
        }
    }

    pub fn score_coord(&self, seat: Seat) -> Coord {
        let half_w = self.config.width / 2.0;
        let half_h = self.config.height / 2.0;
        let inset = self.edge_inset();
        let cw = self.config.card_width;
        match seat {
            Seat::Bottom => Coord::at(-cw * 3.0, half_h - inset),
            Seat::Left => Coord::at(-half_w + inset, -cw * 2.4),
            Seat::Top => Coord::at(cw * 3.0, -half_h + inset),
            Seat::Right => Coord::at(half_w - inset, -cw * 2.4),
        }
    }

    /// 开局前牌堆居中，之后让出右侧给桌面牌。
    pub fn deck_coord(&self, phase: Phase) -> Coord {
        if phase == Phase::Init {
            Coord::at(0.0, 0.0)
        } else {
            Coord::at(-self.config.card_width / 2.0 - self.config.hand_padding, 0.0)
        }
    }

    pub fn table_card_coord(&self) -> Coord {
        Coord::at(self.config.card_width / 2.0 + self.config.hand_padding, 0.0)
    }

    /// 手牌 3×2 排列：0–2 为上排，3–5 为下排，坐标相对手牌组原点。
    pub fn hand_card_coord(&self, index: usize) -> Result<Coord, BoardError> {
        if index >= HAND_SIZE {
            return Err(BoardError::HandIndexOutOfRange { index });
        }
        let cw = self.config.card_width;
        let ch = self.config.card_height;
        let pad = self.config.hand_padding;
        let column = (index % 3) as f64;
        let row_offset = if index < 3 { 0.0 } else { ch + pad };
        Ok(Coord::at(
            cw * column + pad * column - cw,
            row_offset - ch / 2.0,
        ))
    }
}
