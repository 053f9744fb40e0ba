//! 绘制工具的抽象：容器清空、场景挂载、元素平移。

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use super::animation::Offset;
use super::scene::{NodeId, Scene};
use crate::app::PageChrome;
use crate::transport::{Intent, IntentSink};

/// 场景的唯一宿主。只有渲染流程会修改它，因此不需要任何锁。
pub trait Surface {
    /// 清空旧场景并挂载新场景，返回本次挂载的代号。
    fn mount(&mut self, scene: &Scene) -> u64;

    fn clear(&mut self);

    /// 对 `generation` 代的元素施加平移；代号过期时忽略并返回 false。
    fn set_offset(
        &mut self,
        generation: u64,
        target: NodeId,
        offset: Offset,
        transition: Duration,
    ) -> bool;

    fn apply_chrome(&mut self, chrome: &PageChrome);
}

#[derive(Debug, Clone, PartialEq)]
pub struct OffsetChange {
    pub target: NodeId,
    pub offset: Offset,
    pub transition: Duration,
}

/// 内存中的宿主，供原生构建与测试使用。
#[derive(Default)]
pub struct MemorySurface {
    generation: u64,
    scene: Option<Scene>,
    offsets: HashMap<NodeId, Offset>,
    offset_log: Vec<OffsetChange>,
    chrome: PageChrome,
    mounts: usize,
    sink: Option<Rc<dyn IntentSink>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Rc<dyn IntentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mounts(&self) -> usize {
        self.mounts
    }

    pub fn offset_of(&self, target: NodeId) -> Offset {
        self.offsets.get(&target).copied().unwrap_or(Offset::ZERO)
    }

    /// 当前代的平移记录。
    pub fn offset_log(&self) -> &[OffsetChange] {
        &self.offset_log
    }

    pub fn chrome(&self) -> &PageChrome {
        &self.chrome
    }

    /// 模拟点击：元素有绑定的意图时推送给 sink 并返回该意图。
    pub fn click(&self, target: NodeId) -> Option<Intent> {
        let intent = self.scene.as_ref()?.node(target)?.intent.clone()?;
        if let Some(sink) = &self.sink {
            sink.push(intent.clone());
        }
        Some(intent)
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.offsets.clear();
        self.offset_log.clear();
    }
}

impl Surface for MemorySurface {
    fn mount(&mut self, scene: &Scene) -> u64 {
        self.reset();
        self.scene = Some(scene.clone());
        self.mounts += 1;
        self.generation
    }

    fn clear(&mut self) {
        self.reset();
        self.scene = None;
    }

    fn set_offset(
        &mut self,
        generation: u64,
        target: NodeId,
        offset: Offset,
        transition: Duration,
    ) -> bool {
        if generation != self.generation || self.scene.is_none() {
            return false;
        }
        self.offsets.insert(target, offset);
        self.offset_log.push(OffsetChange {
            target,
            offset,
            transition,
        });
        true
    }

    fn apply_chrome(&mut self, chrome: &PageChrome) {
        self.chrome = chrome.clone();
    }
}
