//! 当前可点击元素的判定。
//!
//! 这里只做提示性的过滤，服务端会再次校验每个动作。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, Phase, PlayerId, HAND_SIZE};

/// 可交互元素的类别标签，对应 SVG 元素上的 class。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(tag = "type", content = "index")]
pub enum ElementTag {
    Deck,
    TableCard,
    HeldCard,
    HandSlot(u8),
}

const HAND_SLOTS: [ElementTag; HAND_SIZE] = [
    ElementTag::HandSlot(0),
    ElementTag::HandSlot(1),
    ElementTag::HandSlot(2),
    ElementTag::HandSlot(3),
    ElementTag::HandSlot(4),
    ElementTag::HandSlot(5),
];

impl ElementTag {
    pub fn hand_slot(index: usize) -> Option<Self> {
        HAND_SLOTS.get(index).copied()
    }

    pub fn class_name(self) -> String {
        match self {
            ElementTag::Deck => "deck".into(),
            ElementTag::TableCard => "table-card".into(),
            ElementTag::HeldCard => "held-card".into(),
            ElementTag::HandSlot(index) => format!("h{index}"),
        }
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name())
    }
}

/// 每个阶段可以操作的元素。
pub fn playable_cards(phase: Phase) -> Vec<ElementTag> {
    match phase {
        Phase::UncoverTwo | Phase::Uncover => HAND_SLOTS.to_vec(),
        Phase::Take => vec![ElementTag::Deck, ElementTag::TableCard],
        Phase::Discard => {
            let mut tags = HAND_SLOTS.to_vec();
            tags.push(ElementTag::HeldCard);
            tags
        }
        Phase::Init | Phase::Over | Phase::Unknown => Vec::new(),
    }
}

/// 只有轮到观看者行动、且该元素在当前阶段可操作时才返回 true。
pub fn is_playable(viewer: PlayerId, state: &GameState, tag: ElementTag) -> bool {
    state.is_turn_of(viewer) && playable_cards(state.phase).contains(&tag)
}
