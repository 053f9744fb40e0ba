//! 桌面渲染：坐标、可交互判定、场景构建与动画。

pub mod animation;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod geometry;
pub mod oracle;
pub mod scene;
pub mod surface;

pub use animation::{
    play,
    AnimationPlan,
    AnimationRequest,
    AnimationTrigger,
    FrameScheduler,
    ManualScheduler,
    Offset,
    SharedScheduler,
    SharedSurface,
};
pub use config::{BoardConfig, CARD_BACK};
pub use geometry::{hand_positions, player_seat, rotate, seating, Coord, Geometry, Seat};
pub use oracle::{is_playable, playable_cards, ElementTag};
pub use scene::{render_scene, BuiltScene, Node, NodeId, Renderer, Scene, SceneBuilder, Shape};
pub use surface::{MemorySurface, OffsetChange, Surface};
