pub mod app;
pub mod board;
pub mod bus;
pub mod error;
pub mod game;
pub mod transport;
pub mod utils;

use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

pub use app::{AppContext, GamePage, PageChrome, SharedContext, Viewer};
pub use board::{
    hand_positions, is_playable, playable_cards, render_scene, rotate, AnimationPlan,
    AnimationRequest, AnimationTrigger, BoardConfig, BuiltScene, Coord, ElementTag,
    FrameScheduler, Geometry, ManualScheduler, MemorySurface, Node, NodeId, Offset, Renderer,
    Scene, SceneBuilder, Seat, Shape, Surface,
};
pub use bus::{Bus, BusMessage, Topic};
pub use error::BoardError;
pub use game::{
    Action, CardCode, GameEvent, GameState, HandCard, IntegrityError, Phase, Player, PlayerId,
};
pub use transport::{decode_channel_message, Channel, Intent, IntentSink};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error(error: BoardError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_phase(phase: &str) -> Phase {
    serde_json::from_value(serde_json::Value::String(phase.to_string())).unwrap_or(Phase::Unknown)
}

/// 返回一个示例对局的 JSON，方便前端调试或初始化。
#[wasm_bindgen(js_name = "createSampleGame")]
pub fn create_sample_game(player_count: u32, phase: &str) -> Result<String, JsValue> {
    let state = GameState::sample(player_count as usize, parse_phase(phase));
    serde_json::to_string(&state).map_err(serde_to_js_error)
}

/// 指定阶段可交互的元素 class 列表。
#[wasm_bindgen(js_name = "playableCards")]
pub fn playable_cards_js(phase: &str) -> Vec<String> {
    playable_cards(parse_phase(phase))
        .into_iter()
        .map(ElementTag::class_name)
        .collect()
}

/// 不挂载，只把场景与动画计划序列化成 JSON，便于调试。
#[wasm_bindgen(js_name = "buildSceneJson")]
pub fn build_scene_json(
    viewer_id: u32,
    state_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let state: GameState = serde_json::from_str(state_json).map_err(serde_to_js_error)?;
    let config = match config_json {
        Some(json) => BoardConfig::from_json(&json).map_err(serde_to_js_error)?,
        None => BoardConfig::default(),
    };
    let built = SceneBuilder::new(config)
        .build(PlayerId::from(viewer_id), &state)
        .map_err(to_js_error)?;
    let output = serde_json::json!({
        "scene": built.scene,
        "animation": built.plan,
    });
    serde_json::to_string(&output).map_err(serde_to_js_error)
}

#[cfg(target_arch = "wasm32")]
pub use web::GameBoard;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::js_sys::Function;
    use web_sys::Element;

    use super::{serde_to_js_error, to_js_error};
    use crate::app::{AppContext, GamePage, Viewer};
    use crate::board::animation::{SharedScheduler, SharedSurface};
    use crate::board::dom::{DomSurface, JsIntentSink, RafScheduler};
    use crate::board::{BoardConfig, Renderer, SceneBuilder};
    use crate::bus::{Bus, BusMessage};
    use crate::error::BoardError;
    use crate::game::GameState;
    use crate::transport::{decode_channel_message, Intent, IntentSink};

    /// 前端传输层驱动的桌面句柄。
    ///
    /// JS 把频道消息交给 `deliver`（或各 `publish_*` 方法），
    /// 用户点击产生的意图通过 `onIntent` 注册的回调推回频道。
    #[wasm_bindgen]
    pub struct GameBoard {
        bus: Bus,
        page: Rc<GamePage>,
        sink: Rc<JsIntentSink>,
    }

    #[wasm_bindgen]
    impl GameBoard {
        #[wasm_bindgen(constructor)]
        pub fn new(container: Element, config_json: Option<String>) -> Result<GameBoard, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("no document"))?;

            let config = match config_json {
                Some(json) => BoardConfig::from_json(&json).map_err(serde_to_js_error)?,
                None => {
                    let (width, height) = (container.client_width(), container.client_height());
                    if width > 0 && height > 0 {
                        BoardConfig::default().with_size(width as f64, height as f64)
                    } else {
                        BoardConfig::default()
                    }
                }
            };

            let sink = Rc::new(JsIntentSink::new());
            let intents: Rc<dyn IntentSink> = sink.clone();
            let surface: SharedSurface = Rc::new(RefCell::new(DomSurface::new(
                document,
                container,
                config.width,
                config.height,
                intents,
            )));
            let scheduler: SharedScheduler = Rc::new(RafScheduler::new(window));
            let renderer = Renderer::new(SceneBuilder::new(config), surface);
            let context = Rc::new(RefCell::new(AppContext::default()));
            let page = Rc::new(GamePage::new(context, renderer, scheduler));

            let mut bus = Bus::new();
            page.install(&mut bus);
            Ok(GameBoard { bus, page, sink })
        }

        /// 注册 `(eventName, payload, channel) => void`，用于把意图推送到频道；
        /// `channel` 为 `"lobby"` 或 `"game"`。
        #[wasm_bindgen(js_name = "onIntent")]
        pub fn on_intent(&self, callback: Function) {
            self.sink.set_callback(callback);
        }

        /// 大厅里的“新建对局”按钮。
        #[wasm_bindgen(js_name = "createGame")]
        pub fn create_game(&self) {
            self.sink.push(Intent::CreateGame);
        }

        #[wasm_bindgen(js_name = "joinGame")]
        pub fn join_game(&self, game_id: String) {
            self.sink.push(Intent::JoinGame { game_id });
        }

        #[wasm_bindgen(js_name = "startGame")]
        pub fn start_game(&self) {
            self.sink.push(Intent::StartGame);
        }

        #[wasm_bindgen(js_name = "leaveGame")]
        pub fn leave_game(&self) {
            self.sink.push(Intent::LeaveGame);
        }

        /// 交付一条频道消息，例如 `deliver("game_update", '{"game": {...}}')`。
        pub fn deliver(&mut self, event: &str, payload_json: &str) -> Result<(), JsValue> {
            let message = decode_channel_message(event, payload_json).map_err(to_js_error)?;
            if let Some(message) = message {
                self.bus.publish(&message);
            }
            Ok(())
        }

        #[wasm_bindgen(js_name = "publishViewer")]
        pub fn publish_viewer(&mut self, viewer_json: &str) -> Result<(), JsValue> {
            let viewer: Viewer = serde_json::from_str(viewer_json)
                .map_err(|error| to_js_error(BoardError::from(error)))?;
            self.bus.publish(&BusMessage::ViewerUpdated(viewer));
            Ok(())
        }

        #[wasm_bindgen(js_name = "publishGame")]
        pub fn publish_game(&mut self, game_json: &str) -> Result<(), JsValue> {
            let game: GameState = serde_json::from_str(game_json)
                .map_err(|error| to_js_error(BoardError::from(error)))?;
            self.bus.publish(&BusMessage::GameUpdated(game));
            Ok(())
        }

        #[wasm_bindgen(js_name = "publishGameLeft")]
        pub fn publish_game_left(&mut self) {
            self.bus.publish(&BusMessage::GameLeft);
        }

        #[wasm_bindgen(js_name = "publishGameNotFound")]
        pub fn publish_game_not_found(&mut self, game_id: String) {
            self.bus.publish(&BusMessage::GameNotFound(game_id));
        }

        /// 当前上下文的 JSON 快照，供调试查看。
        #[wasm_bindgen(js_name = "contextJson")]
        pub fn context_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(&*self.page.context().borrow()).map_err(serde_to_js_error)
        }
    }
}
