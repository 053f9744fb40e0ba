use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_BOARD_WIDTH: f64 = 600.0;
const DEFAULT_BOARD_HEIGHT: f64 = 500.0;
const DEFAULT_CARD_WIDTH: f64 = 60.0;
const DEFAULT_CARD_HEIGHT: f64 = 84.0;
const DEFAULT_HAND_PADDING: f64 = 2.0;
const DEFAULT_TRANSITION_SECS: f64 = 0.8;
const DEFAULT_ASSET_ROOT: &str = "/images/cards";
/// 牌背的保留编码。
pub const CARD_BACK: &str = "2B";

/// 棋盘尺寸、卡牌尺寸、动画时长与资源路径。
///
/// 所有字段都有默认值，前端传入的 JSON 只需包含要覆盖的字段。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub width: f64,
    pub height: f64,
    pub card_width: f64,
    pub card_height: f64,
    pub hand_padding: f64,
    pub transition_secs: f64,
    pub asset_root: String,
    pub card_back: String,
}

impl BoardConfig {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_transition_secs(mut self, secs: f64) -> Self {
        self.transition_secs = secs.max(0.0);
        self
    }

    pub fn transition(&self) -> Duration {
        Duration::from_secs_f64(self.transition_secs.max(0.0))
    }

    pub fn card_href(&self, code: &str) -> String {
        format!("{}/{}.svg", self.asset_root.trim_end_matches('/'), code)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            card_width: DEFAULT_CARD_WIDTH,
            card_height: DEFAULT_CARD_HEIGHT,
            hand_padding: DEFAULT_HAND_PADDING,
            transition_secs: DEFAULT_TRANSITION_SECS,
            asset_root: DEFAULT_ASSET_ROOT.into(),
            card_back: CARD_BACK.into(),
        }
    }
}
