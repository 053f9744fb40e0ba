//! 游戏页面：显式的应用上下文与总线订阅者。

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::board::animation::{play, SharedScheduler};
use crate::board::scene::Renderer;
use crate::bus::{Bus, BusMessage, Topic};
use crate::error::BoardError;
use crate::game::{GameState, Phase, PlayerId};
use crate::{board_error, board_log, board_warn};

/// 本地观看者身份。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewer {
    pub id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_game: Option<String>,
}

impl Viewer {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            current_game: None,
        }
    }
}

/// 桌面之外的页面元素：标题、按钮与提示。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageChrome {
    pub label: String,
    pub show_start: bool,
    pub show_leave: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

impl PageChrome {
    pub fn for_game(viewer: &Viewer, game: &GameState) -> Self {
        Self {
            label: format!("Game: {}", game.id),
            show_start: viewer.id == game.host_id && game.phase == Phase::Init,
            show_leave: true,
            alert: None,
        }
    }
}

/// 每次更新整体替换，不做局部修改。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppContext {
    pub viewer: Option<Viewer>,
    pub game: Option<GameState>,
    pub chrome: PageChrome,
}

pub type SharedContext = Rc<RefCell<AppContext>>;

pub struct GamePage {
    context: SharedContext,
    renderer: Renderer,
    scheduler: SharedScheduler,
}

impl GamePage {
    pub fn new(context: SharedContext, renderer: Renderer, scheduler: SharedScheduler) -> Self {
        Self {
            context,
            renderer,
            scheduler,
        }
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    /// 注册四个主题的订阅者。
    pub fn install(self: &Rc<Self>, bus: &mut Bus) {
        for topic in [
            Topic::ViewerUpdated,
            Topic::GameUpdated,
            Topic::GameLeft,
            Topic::GameNotFound,
        ] {
            let page = Rc::clone(self);
            bus.subscribe(topic, move |message| page.handle(message));
        }
    }

    pub fn handle(&self, message: &BusMessage) {
        let result = match message {
            BusMessage::ViewerUpdated(viewer) => self.on_viewer(viewer.clone()),
            BusMessage::GameUpdated(game) => self.on_game(game.clone()),
            BusMessage::GameLeft => {
                self.on_left();
                Ok(())
            }
            BusMessage::GameNotFound(game_id) => {
                self.on_not_found(game_id);
                Ok(())
            }
        };
        if let Err(error) = result {
            board_error!("{error}");
        }
    }

    fn on_viewer(&self, viewer: Viewer) -> Result<(), BoardError> {
        let pending = {
            let mut context = self.context.borrow_mut();
            context.viewer = Some(viewer);
            context.game.clone()
        };
        // 身份晚于对局到达时补画一次
        match pending {
            Some(game) => self.redraw(game),
            None => Ok(()),
        }
    }

    fn on_game(&self, game: GameState) -> Result<(), BoardError> {
        let has_viewer = {
            let mut context = self.context.borrow_mut();
            context.game = Some(game.clone());
            context.viewer.is_some()
        };
        if !has_viewer {
            board_warn!("game {} received before viewer identity", game.id);
            return Ok(());
        }
        self.redraw(game)
    }

    fn redraw(&self, game: GameState) -> Result<(), BoardError> {
        let (viewer_id, chrome) = {
            let mut context = self.context.borrow_mut();
            let viewer = context.viewer.as_ref().ok_or(BoardError::ViewerMissing)?;
            let chrome = PageChrome {
                alert: context.chrome.alert.clone(),
                ..PageChrome::for_game(viewer, &game)
            };
            let viewer_id = viewer.id;
            context.chrome = chrome.clone();
            (viewer_id, chrome)
        };

        self.renderer.surface().borrow_mut().apply_chrome(&chrome);
        if let Some(trigger) = self.renderer.render(viewer_id, &game)? {
            play(trigger, &self.scheduler, self.renderer.surface());
        }
        Ok(())
    }

    fn on_left(&self) {
        board_log!("Left game.");
        let chrome = {
            let mut context = self.context.borrow_mut();
            context.game = None;
            context.chrome = PageChrome {
                alert: context.chrome.alert.take(),
                ..PageChrome::default()
            };
            context.chrome.clone()
        };
        self.renderer.clear();
        self.renderer.surface().borrow_mut().apply_chrome(&chrome);
    }

    fn on_not_found(&self, game_id: &str) {
        let chrome = {
            let mut context = self.context.borrow_mut();
            context.chrome.alert = Some(format!("Game '{game_id}' not found."));
            context.chrome.clone()
        };
        self.renderer.surface().borrow_mut().apply_chrome(&chrome);
    }
}
