//! 由快照构建完整桌面场景。
//!
//! 场景是 `(viewer, state)` 的纯函数：每次更新整体重建，不做增量比对。

use serde::{Deserialize, Serialize};

use super::animation::{AnimationPlan, AnimationRequest, AnimationTrigger, Offset, SharedSurface};
use super::config::BoardConfig;
use super::geometry::{player_seat, seating, Coord, Geometry, Seat};
use super::oracle::{is_playable, ElementTag};
use super::surface::Surface;
use crate::error::BoardError;
use crate::game::{Action, GameState, Phase, Player, PlayerId};
use crate::transport::Intent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// `translate(x, y) rotate(rotate)` 的分组。
    Group { x: f64, y: f64, rotate: f64 },
    Image {
        x: f64,
        y: f64,
        href: String,
        width: String,
        rotate: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// 居中的文字标签。
    Text { x: f64, y: f64, text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|name| name == class)
    }

    pub fn is_highlighted(&self) -> bool {
        self.has_class("highlight")
    }

    pub fn href(&self) -> Option<&str> {
        match &self.shape {
            Shape::Image { href, .. } => Some(href),
            _ => None,
        }
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Node>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// 按绘制顺序排列的顶层节点。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub nodes: Vec<Node>,
}

impl Scene {
    /// 深度优先遍历所有节点。
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.walk(&mut out);
        }
        out.into_iter()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.iter().find(|node| node.id == id)
    }

    pub fn with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.iter().filter(move |node| node.has_class(class))
    }

    pub fn interactive(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter(|node| node.intent.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltScene {
    pub scene: Scene,
    pub plan: Option<AnimationPlan>,
}

struct CardSpec<'s> {
    coord: Coord,
    code: &'s str,
    tag: Option<ElementTag>,
    intent: Option<Intent>,
}

/// 一次构建过程的可变上下文。
struct Draft<'a> {
    config: &'a BoardConfig,
    geometry: Geometry<'a>,
    viewer: PlayerId,
    state: &'a GameState,
    next_id: u32,
    nodes: Vec<Node>,
    plan: AnimationPlan,
}

impl<'a> Draft<'a> {
    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn node(&mut self, shape: Shape, classes: Vec<String>) -> Node {
        Node {
            id: self.node_id(),
            shape,
            classes,
            intent: None,
            children: Vec::new(),
        }
    }

    /// 坐标是卡牌中心，图片左上角需要各减去半张牌。
    fn card(&mut self, spec: CardSpec<'_>) -> Node {
        let x = spec.coord.x - self.config.card_width / 2.0;
        let y = spec.coord.y - self.config.card_height / 2.0;
        let mut classes = vec!["card".to_string()];
        if let Some(tag) = spec.tag {
            classes.push(tag.class_name());
        }
        if spec.intent.is_some() {
            classes.push("highlight".into());
        }
        let shape = Shape::Image {
            x,
            y,
            href: self.config.card_href(spec.code),
            width: "10%".into(),
            rotate: spec.coord.rotate,
        };
        let mut node = self.node(shape, classes);
        node.intent = spec.intent;
        node
    }

    fn playable(&self, tag: ElementTag) -> bool {
        is_playable(self.viewer, self.state, tag)
    }

    /// 观看者自己手牌上的意图。`uncover_two` 阶段所有玩家同时翻牌，不看轮次。
    fn hand_intent(&self, tag: ElementTag, index: usize, covered: bool) -> Option<Intent> {
        match self.state.phase {
            Phase::UncoverTwo if covered => Some(Intent::UncoverCard { hand_index: index }),
            Phase::Uncover if covered && self.playable(tag) => {
                Some(Intent::UncoverCard { hand_index: index })
            }
            Phase::Discard if self.playable(tag) => Some(Intent::SwapCard { hand_index: index }),
            _ => None,
        }
    }

    fn glide(&mut self, target: NodeId, from: Offset) {
        let duration = self.config.transition();
        self.plan
            .push(AnimationRequest::glide_home(target, from, duration));
    }

    fn player(&self, id: PlayerId) -> Result<&'a Player, BoardError> {
        self.state
            .get_player(id)
            .ok_or(BoardError::PlayerNotFound { player_id: id })
    }

    /// 最近一次事件及其发起者的座位；发起者已不在座位上时不做动画。
    fn last_move(&self) -> Option<(Action, PlayerId, Seat)> {
        let event = self.state.last_event()?;
        let seat = player_seat(self.viewer, self.state, event.player_id).ok()?;
        Some((event.action, event.player_id, seat))
    }

    fn add_deck(&mut self) {
        let coord = self.geometry.deck_coord(self.state.phase);
        let intent = self
            .playable(ElementTag::Deck)
            .then_some(Intent::TakeFromDeck);
        let back = self.config.card_back.clone();
        let deck = self.card(CardSpec {
            coord,
            code: &back,
            tag: Some(ElementTag::Deck),
            intent,
        });
        if self.state.phase == Phase::Init {
            // 开局洗牌：牌堆从棋盘上方落入中央
            let from = Offset::new(0.0, -self.config.height / 2.0);
            self.glide(deck.id, from);
        }
        self.nodes.push(deck);
    }

    fn add_hands(&mut self) -> Result<(), BoardError> {
        for (player_id, seat) in seating(self.viewer, &self.state.player_order)? {
            let player = self.player(player_id)?;
            let coord = self.geometry.hand_coord(seat);
            let mut group = self.node(
                Shape::Group {
                    x: coord.x,
                    y: coord.y,
                    rotate: coord.rotate,
                },
                vec!["hand".into()],
            );

            for (index, hand_card) in player.hand.iter().enumerate() {
                let tag = ElementTag::hand_slot(index)
                    .ok_or(BoardError::HandIndexOutOfRange { index })?;
                let card_coord = self.geometry.hand_card_coord(index)?;
                let code = if hand_card.covered {
                    self.config.card_back.clone()
                } else {
                    hand_card.card.clone()
                };

                let intent = if player_id == self.viewer {
                    self.hand_intent(tag, index, hand_card.covered)
                } else {
                    None
                };

                let card = self.card(CardSpec {
                    coord: card_coord,
                    code: &code,
                    tag: Some(tag),
                    intent,
                });
                group.children.push(card);
            }

            self.nodes.push(group);
        }
        Ok(())
    }

    fn add_table_cards(&mut self) {
        let Some(top) = self.state.top_table_card().cloned() else {
            return;
        };
        let coord = self.geometry.table_card_coord();

        // 下面一张先画，压在顶牌之下
        if let Some(beneath) = self.state.table_cards.get(1).cloned() {
            let card = self.card(CardSpec {
                coord,
                code: &beneath,
                tag: None,
                intent: None,
            });
            self.nodes.push(card);
        }

        let intent = self
            .playable(ElementTag::TableCard)
            .then_some(Intent::TakeFromTable);
        let card = self.card(CardSpec {
            coord,
            code: &top,
            tag: Some(ElementTag::TableCard),
            intent,
        });

        let half_card = self.config.card_width / 2.0;
        let from = match self.last_move() {
            Some((Action::Discard, _, seat)) => {
                let held = self.geometry.held_card_coord(seat);
                Some(Offset::new(held.x - half_card, held.y))
            }
            Some((Action::SwapCard, _, seat)) => {
                let hand = self.geometry.hand_coord(seat);
                Some(Offset::new(
                    hand.x - half_card,
                    hand.y - self.config.card_height / 12.0,
                ))
            }
            _ => None,
        };
        if let Some(from) = from {
            self.glide(card.id, from);
        }
        self.nodes.push(card);
    }

    fn add_held_cards(&mut self) -> Result<(), BoardError> {
        let last_move = self.last_move();
        let half_card = self.config.card_width / 2.0;

        for (player_id, seat) in seating(self.viewer, &self.state.player_order)? {
            let player = self.player(player_id)?;
            let Some(code) = player.held_card.as_deref() else {
                continue;
            };
            let coord = self.geometry.held_card_coord(seat);
            let intent = (player_id == self.viewer && self.playable(ElementTag::HeldCard))
                .then_some(Intent::Discard);
            let card = self.card(CardSpec {
                coord,
                code,
                tag: Some(ElementTag::HeldCard),
                intent,
            });

            // 新拿到的牌从牌堆（左）或桌面（右）飞到手边
            let source_shift = match last_move {
                Some((Action::TakeFromDeck, actor, _)) if actor == player_id => Some(half_card),
                Some((Action::TakeFromTable, actor, _)) if actor == player_id => Some(-half_card),
                _ => None,
            };
            if let Some(shift) = source_shift {
                self.glide(card.id, Offset::new(-(coord.x + shift), -coord.y));
            }
            self.nodes.push(card);
        }
        Ok(())
    }

    fn add_score(&mut self) -> Result<(), BoardError> {
        let Some((player_id, seat)) = seating(self.viewer, &self.state.player_order)?
            .into_iter()
            .next()
        else {
            return Ok(());
        };
        let player = self.player(player_id)?;
        let coord = self.geometry.score_coord(seat);
        let width = self.config.width * 0.25;
        let height = self.config.height * 0.15;

        let mut group = self.node(
            Shape::Group {
                x: 0.0,
                y: 0.0,
                rotate: 0.0,
            },
            vec!["player-score".into()],
        );
        let rect = self.node(
            Shape::Rect {
                x: coord.x - width / 2.0,
                y: coord.y - height / 2.0,
                width,
                height,
            },
            Vec::new(),
        );
        let name = self.node(
            Shape::Text {
                x: coord.x,
                y: coord.y - 10.0,
                text: format!("Name: {}", player.name),
            },
            Vec::new(),
        );
        let score = self.node(
            Shape::Text {
                x: coord.x,
                y: coord.y + 12.0,
                text: format!("Score: {}", player.score),
            },
            Vec::new(),
        );
        group.children.extend([rect, name, score]);
        self.nodes.push(group);
        Ok(())
    }

    fn add_game_over(&mut self) {
        let mut group = self.node(
            Shape::Group {
                x: 0.0,
                y: 0.0,
                rotate: 0.0,
            },
            vec!["game-over-message".into()],
        );
        let text = self.node(
            Shape::Text {
                x: 0.0,
                y: 0.0,
                text: "Game Over".into(),
            },
            Vec::new(),
        );
        group.children.push(text);
        self.nodes.push(group);
    }

    fn finish(self) -> BuiltScene {
        BuiltScene {
            scene: Scene { nodes: self.nodes },
            plan: self.plan.into_option(),
        }
    }
}

pub struct SceneBuilder {
    config: BoardConfig,
}

impl SceneBuilder {
    pub fn new(config: BoardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn build(&self, viewer: PlayerId, state: &GameState) -> Result<BuiltScene, BoardError> {
        state.integrity_check()?;

        let mut draft = Draft {
            config: &self.config,
            geometry: Geometry::new(&self.config),
            viewer,
            state,
            next_id: 0,
            nodes: Vec::new(),
            plan: AnimationPlan::default(),
        };

        draft.add_deck();
        if state.phase == Phase::Init {
            // 还没发牌，只有牌堆
            return Ok(draft.finish());
        }

        draft.add_hands()?;
        draft.add_table_cards();
        draft.add_held_cards()?;
        draft.add_score()?;

        if state.phase.is_terminal() {
            draft.add_game_over();
            let mut built = draft.finish();
            built.plan = None;
            return Ok(built);
        }

        Ok(draft.finish())
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

/// 构建场景并挂载到 `surface`，返回场景及与本次挂载绑定的动画。
///
/// 场景先完整构建再触碰容器，构建失败时旧桌面保持不变。
pub fn render_scene(
    surface: &mut dyn Surface,
    builder: &SceneBuilder,
    viewer: PlayerId,
    state: &GameState,
) -> Result<(Scene, Option<AnimationTrigger>), BoardError> {
    let BuiltScene { scene, plan } = builder.build(viewer, state)?;
    let generation = surface.mount(&scene);
    let trigger = plan.map(|plan| AnimationTrigger { generation, plan });
    Ok((scene, trigger))
}

/// 持有场景宿主的渲染器。
pub struct Renderer {
    builder: SceneBuilder,
    surface: SharedSurface,
}

impl Renderer {
    pub fn new(builder: SceneBuilder, surface: SharedSurface) -> Self {
        Self { builder, surface }
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    pub fn render(
        &self,
        viewer: PlayerId,
        state: &GameState,
    ) -> Result<Option<AnimationTrigger>, BoardError> {
        let mut surface = self.surface.borrow_mut();
        let (_, trigger) = render_scene(&mut *surface, &self.builder, viewer, state)?;
        Ok(trigger)
    }

    pub fn clear(&self) {
        self.surface.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::surface::MemorySurface;
    use crate::game::{CardCode, GameEvent, HandCard};

    fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    fn single(scene: &Scene, class: &str) -> Node {
        let mut found: Vec<_> = scene.with_class(class).cloned().collect();
        assert_eq!(found.len(), 1, "expected exactly one .{class}");
        found.remove(0)
    }

    fn hands(scene: &Scene) -> Vec<Node> {
        scene.with_class("hand").cloned().collect()
    }

    #[test]
    fn init_phase_draws_only_the_deck_with_intro() {
        let state = GameState::sample(3, Phase::Init);
        let built = builder().build(1, &state).expect("scene should build");

        assert_eq!(built.scene.nodes.len(), 1);
        let deck = single(&built.scene, "deck");
        assert_eq!(deck.href(), Some("/images/cards/2B.svg"));
        let plan = built.plan.expect("intro animation expected");
        let request = plan.request_for(deck.id).expect("deck should animate");
        assert_eq!(request.from, Offset::new(0.0, -250.0));
        assert_eq!(request.to, Offset::ZERO);
    }

    #[test]
    fn game_over_shows_banner_without_animation() {
        let mut state = GameState::sample(2, Phase::Over);
        state.record_event(GameEvent::new(Action::Discard, 2));
        let built = builder().build(1, &state).expect("scene should build");

        let banner = single(&built.scene, "game-over-message");
        assert!(matches!(
            &banner.children[0].shape,
            Shape::Text { text, .. } if text == "Game Over"
        ));
        assert!(built.plan.is_none());
        assert_eq!(built.scene.interactive().count(), 0);
    }

    #[test]
    fn covered_cards_always_show_the_back() {
        let mut state = GameState::sample(2, Phase::Uncover);
        if let Some(player) = state.get_player_mut(1) {
            player.hand[5] = HandCard::covered("AS");
        }
        for viewer in [1, 2, 99] {
            let built = builder().build(viewer, &state).expect("scene should build");
            for hand in hands(&built.scene) {
                let slot = hand
                    .children
                    .iter()
                    .find(|card| card.has_class("h5"))
                    .expect("sixth slot should exist");
                assert_eq!(slot.href(), Some("/images/cards/2B.svg"));
            }
        }
    }

    #[test]
    fn viewer_hand_sits_at_bottom() {
        let state = GameState::sample(4, Phase::Take);
        let built = builder().build(3, &state).expect("scene should build");
        let groups = hands(&built.scene);
        assert_eq!(groups.len(), 4);
        assert_eq!(
            groups[0].shape,
            Shape::Group {
                x: 0.0,
                y: 158.0,
                rotate: 0.0
            }
        );
        // 3 号玩家的牌是方块
        assert_eq!(groups[0].children[0].href(), Some("/images/cards/AD.svg"));
        assert!(matches!(groups[1].shape, Shape::Group { rotate, .. } if rotate == 90.0));
    }

    #[test]
    fn take_phase_binds_deck_and_table_for_acting_player() {
        let state = GameState::sample(2, Phase::Take);
        let built = builder().build(1, &state).expect("scene should build");

        let deck = single(&built.scene, "deck");
        assert_eq!(deck.intent, Some(Intent::TakeFromDeck));
        assert!(deck.is_highlighted());
        let table = single(&built.scene, "table-card");
        assert_eq!(table.intent, Some(Intent::TakeFromTable));
        assert_eq!(table.href(), Some("/images/cards/QD.svg"));
        assert_eq!(built.scene.interactive().count(), 2);

        let other = builder().build(2, &state).expect("scene should build");
        assert_eq!(other.scene.interactive().count(), 0);
        assert!(!single(&other.scene, "deck").is_highlighted());
    }

    #[test]
    fn table_pile_draws_card_beneath_first() {
        let state = GameState::sample(2, Phase::Take);
        let built = builder().build(1, &state).expect("scene should build");
        let images: Vec<_> = built
            .scene
            .nodes
            .iter()
            .filter_map(|node| node.href())
            .collect();
        let beneath = images
            .iter()
            .position(|href| *href == "/images/cards/7S.svg")
            .expect("card beneath should be drawn");
        let top = images
            .iter()
            .position(|href| *href == "/images/cards/QD.svg")
            .expect("top card should be drawn");
        assert!(beneath < top);
    }

    #[test]
    fn empty_table_pile_renders_nothing() {
        let mut state = GameState::sample(2, Phase::Take);
        state.table_cards.clear();
        let built = builder().build(1, &state).expect("scene should build");
        assert_eq!(built.scene.with_class("table-card").count(), 0);
        assert_eq!(built.scene.interactive().count(), 1);
    }

    #[test]
    fn uncover_binds_only_own_covered_cards() {
        let state = GameState::sample(2, Phase::Uncover);
        let built = builder().build(1, &state).expect("scene should build");
        let groups = hands(&built.scene);

        let own: Vec<_> = groups[0]
            .children
            .iter()
            .map(|card| card.intent.clone())
            .collect();
        assert_eq!(own[0], None, "already uncovered");
        assert_eq!(own[1], None, "already uncovered");
        assert_eq!(own[2], Some(Intent::UncoverCard { hand_index: 2 }));
        assert_eq!(own[5], Some(Intent::UncoverCard { hand_index: 5 }));
        assert!(groups[1].children.iter().all(|card| card.intent.is_none()));
    }

    #[test]
    fn uncover_two_is_open_to_every_seat() {
        let state = GameState::sample(2, Phase::UncoverTwo);
        let acting = builder().build(1, &state).expect("scene should build");
        assert_eq!(acting.scene.interactive().count(), 6);
        let waiting = builder().build(2, &state).expect("scene should build");
        assert_eq!(waiting.scene.interactive().count(), 6);
        let own = &hands(&waiting.scene)[0];
        assert!(own.children[0].has_class("h0"));
        assert_eq!(own.children[0].href(), Some("/images/cards/2B.svg"));
        assert_eq!(
            own.children[3].intent,
            Some(Intent::UncoverCard { hand_index: 3 })
        );
        assert!(hands(&waiting.scene)[1]
            .children
            .iter()
            .all(|card| card.intent.is_none()));

        let spectator = builder().build(99, &state).expect("scene should build");
        assert_eq!(spectator.scene.interactive().count(), 0);
    }

    #[test]
    fn uncover_two_skips_revealed_cards() {
        let mut state = GameState::sample(3, Phase::UncoverTwo);
        if let Some(player) = state.get_player_mut(3) {
            player.hand[1] = HandCard::uncovered("2D");
        }
        let built = builder().build(3, &state).expect("scene should build");
        let own = &hands(&built.scene)[0];
        assert_eq!(own.children[1].intent, None);
        assert!(!own.children[1].is_highlighted());
        assert_eq!(built.scene.interactive().count(), 5);
    }

    #[test]
    fn uncover_still_waits_for_turn() {
        let state = GameState::sample(2, Phase::Uncover);
        let waiting = builder().build(2, &state).expect("scene should build");
        assert_eq!(waiting.scene.interactive().count(), 0);
    }

    #[test]
    fn discard_binds_swaps_and_own_held_card() {
        let mut state = GameState::sample(3, Phase::Discard);
        if let Some(player) = state.get_player_mut(1) {
            player.held_card = Some("TC".into());
        }
        if let Some(player) = state.get_player_mut(2) {
            player.held_card = Some("4H".into());
        }
        let built = builder().build(1, &state).expect("scene should build");

        let held: Vec<_> = built.scene.with_class("held-card").cloned().collect();
        assert_eq!(held.len(), 2);
        assert_eq!(held[0].intent, Some(Intent::Discard));
        assert_eq!(held[1].intent, None);
        let own_hand = &hands(&built.scene)[0];
        for (index, card) in own_hand.children.iter().enumerate() {
            assert_eq!(card.intent, Some(Intent::SwapCard { hand_index: index }));
        }
        assert_eq!(built.scene.interactive().count(), 7);
    }

    #[test]
    fn take_from_deck_animates_held_card_from_deck() {
        let mut state = GameState::sample(2, Phase::Discard);
        if let Some(player) = state.get_player_mut(1) {
            player.held_card = Some("TC".into());
        }
        state.record_event(GameEvent::new(Action::TakeFromDeck, 1));
        let built = builder().build(1, &state).expect("scene should build");

        let held = single(&built.scene, "held-card");
        let plan = built.plan.expect("animation expected");
        let request = plan.request_for(held.id).expect("held card should animate");
        // 手边位置 (90, 158)，牌堆在左半张牌处
        assert_eq!(request.from, Offset::new(-120.0, -158.0));
        assert_eq!(request.to, Offset::ZERO);
        assert!(request.duration > std::time::Duration::ZERO);
    }

    #[test]
    fn take_from_table_animates_from_right() {
        let mut state = GameState::sample(2, Phase::Discard);
        if let Some(player) = state.get_player_mut(2) {
            player.held_card = Some("QD".into());
        }
        state.table_cards.remove(0);
        state.record_event(GameEvent::new(Action::TakeFromTable, 2));
        let built = builder().build(1, &state).expect("scene should build");

        let held = single(&built.scene, "held-card");
        let plan = built.plan.expect("animation expected");
        let request = plan.request_for(held.id).expect("held card should animate");
        // TOP 座位的手边位置是 (-90, -158)
        assert_eq!(request.from, Offset::new(120.0, 158.0));
    }

    #[test]
    fn discard_animates_table_card_from_actor() {
        let mut state = GameState::sample(2, Phase::Take);
        state.record_event(GameEvent::new(Action::Discard, 2));
        let built = builder().build(1, &state).expect("scene should build");

        let table = single(&built.scene, "table-card");
        let plan = built.plan.expect("animation expected");
        let request = plan.request_for(table.id).expect("table card should animate");
        assert_eq!(request.from, Offset::new(-120.0, -158.0));
    }

    #[test]
    fn swap_animates_table_card_from_hand() {
        let mut state = GameState::sample(2, Phase::Take);
        state.record_event(GameEvent::new(Action::SwapCard, 1));
        let built = builder().build(1, &state).expect("scene should build");

        let table = single(&built.scene, "table-card");
        let plan = built.plan.expect("animation expected");
        let request = plan.request_for(table.id).expect("table card should animate");
        assert_eq!(request.from, Offset::new(-30.0, 151.0));
    }

    #[test]
    fn fresh_game_has_no_animation() {
        let state = GameState::sample(2, Phase::Take);
        let built = builder().build(1, &state).expect("scene should build");
        assert!(built.plan.is_none());
    }

    #[test]
    fn score_placard_shows_viewer() {
        let state = GameState::sample(3, Phase::Take);
        let built = builder().build(2, &state).expect("scene should build");
        let placard = single(&built.scene, "player-score");
        let texts: Vec<_> = placard
            .children
            .iter()
            .filter_map(|node| match &node.shape {
                Shape::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Name: bob".to_string(), "Score: 3".to_string()]);
        assert!(matches!(
            placard.children[0].shape,
            Shape::Rect { width, height, .. } if width == 150.0 && height == 75.0
        ));
    }

    #[test]
    fn rebuild_is_structurally_identical() {
        let mut state = GameState::sample(4, Phase::Discard);
        if let Some(player) = state.get_player_mut(4) {
            player.held_card = Some("8H".into());
        }
        state.record_event(GameEvent::new(Action::TakeFromTable, 4));
        let first = builder().build(2, &state).expect("scene should build");
        let second = builder().build(2, &state).expect("scene should build");
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_seat_count_aborts_build() {
        let mut state = GameState::sample(4, Phase::Take);
        state.seat_player(Player::new(5, "eve"));
        let error = builder().build(1, &state).expect_err("five seats should fail");
        assert!(matches!(error, BoardError::IntegrityViolation { .. }));
    }

    #[test]
    fn oversized_hand_aborts_build() {
        let mut state = GameState::sample(2, Phase::Take);
        if let Some(player) = state.get_player_mut(2) {
            player.hand.push(HandCard::uncovered(CardCode::from("3H")));
        }
        assert!(builder().build(1, &state).is_err());
    }

    #[test]
    fn failed_build_leaves_previous_scene_mounted() {
        let mut surface = MemorySurface::new();
        let state = GameState::sample(2, Phase::Take);
        let (scene, _) =
            render_scene(&mut surface, &builder(), 1, &state).expect("first render should work");

        let mut broken = state.clone();
        broken.player_order.clear();
        assert!(render_scene(&mut surface, &builder(), 1, &broken).is_err());
        assert_eq!(surface.scene(), Some(&scene));
        assert_eq!(surface.mounts(), 1);
    }

    #[test]
    fn render_binds_trigger_to_mount_generation() {
        let mut surface = MemorySurface::new();
        let mut state = GameState::sample(2, Phase::Take);
        state.record_event(GameEvent::new(Action::Discard, 2));
        let (_, first) = render_scene(&mut surface, &builder(), 1, &state)
            .expect("render should work");
        let (_, second) = render_scene(&mut surface, &builder(), 1, &state)
            .expect("render should work");
        let first = first.expect("trigger expected");
        let second = second.expect("trigger expected");
        assert_eq!(second.generation, first.generation + 1);
        assert_eq!(second.generation, surface.generation());
    }
}
