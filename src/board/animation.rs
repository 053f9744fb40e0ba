//! 两帧动画编排。
//!
//! 第一帧把元素瞬间（0 时长过渡）放到起始偏移，第二帧再清除偏移并带上
//! 过渡时长，元素就会从起点滑回布局位置。两帧必须分开提交，合并后浏览器
//! 会跳过过渡。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::scene::NodeId;
use super::surface::Surface;

/// 相对布局位置的平移量（像素）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationRequest {
    pub target: NodeId,
    pub from: Offset,
    pub to: Offset,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl AnimationRequest {
    /// 从 `from` 滑回布局位置。
    pub fn glide_home(target: NodeId, from: Offset, duration: Duration) -> Self {
        Self {
            target,
            from,
            to: Offset::ZERO,
            duration,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimationPlan {
    pub requests: Vec<AnimationRequest>,
}

impl AnimationPlan {
    pub fn push(&mut self, request: AnimationRequest) {
        self.requests.push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn request_for(&self, target: NodeId) -> Option<&AnimationRequest> {
        self.requests.iter().find(|request| request.target == target)
    }

    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// 与某次挂载绑定的动画；挂载被新场景取代后，残留的帧不再生效。
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrigger {
    pub generation: u64,
    pub plan: AnimationPlan,
}

/// 可绘制帧调度器（浏览器中即 `requestAnimationFrame`）。
pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>);
}

pub type SharedSurface = Rc<RefCell<dyn Surface>>;
pub type SharedScheduler = Rc<dyn FrameScheduler>;

/// 在下一帧提交起始偏移，再下一帧提交终点偏移。
pub fn play(trigger: AnimationTrigger, scheduler: &SharedScheduler, surface: &SharedSurface) {
    let frame_scheduler = Rc::clone(scheduler);
    let surface = Rc::clone(surface);
    scheduler.request_frame(Box::new(move || {
        let AnimationTrigger { generation, plan } = trigger;
        {
            let mut target = surface.borrow_mut();
            for request in &plan.requests {
                target.set_offset(generation, request.target, request.from, Duration::ZERO);
            }
        }
        frame_scheduler.request_frame(Box::new(move || {
            let mut target = surface.borrow_mut();
            for request in &plan.requests {
                target.set_offset(generation, request.target, request.to, request.duration);
            }
        }));
    }));
}

/// 手动推进的调度器，测试中代替浏览器的帧回调。
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 执行当前已排队的帧；执行期间新请求的帧留到下一次。
    pub fn run_frame(&self) -> usize {
        let batch: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(callback);
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::surface::{MemorySurface, OffsetChange};

    fn trigger(generation: u64) -> AnimationTrigger {
        AnimationTrigger {
            generation,
            plan: AnimationPlan {
                requests: vec![AnimationRequest::glide_home(
                    NodeId(3),
                    Offset::new(-120.0, -158.0),
                    Duration::from_millis(800),
                )],
            },
        }
    }

    #[test]
    fn snap_frame_runs_before_glide_frame() {
        let memory = Rc::new(RefCell::new(MemorySurface::new()));
        memory.borrow_mut().mount(&Default::default());
        let surface: SharedSurface = memory.clone();
        let manual = Rc::new(ManualScheduler::new());
        let scheduler: SharedScheduler = manual.clone();

        play(trigger(1), &scheduler, &surface);
        assert!(memory.borrow().offset_log().is_empty(), "nothing before first frame");

        assert_eq!(manual.run_frame(), 1);
        assert_eq!(
            memory.borrow().offset_log(),
            &[OffsetChange {
                target: NodeId(3),
                offset: Offset::new(-120.0, -158.0),
                transition: Duration::ZERO,
            }]
        );
        assert_eq!(manual.pending(), 1, "glide frame queued from snap frame");

        manual.run_frame();
        let log = memory.borrow().offset_log().to_vec();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].offset, Offset::ZERO);
        assert_eq!(log[1].transition, Duration::from_millis(800));
        assert_eq!(manual.pending(), 0);
    }

    #[test]
    fn superseded_generation_is_ignored() {
        let memory = Rc::new(RefCell::new(MemorySurface::new()));
        memory.borrow_mut().mount(&Default::default());
        let surface: SharedSurface = memory.clone();
        let manual = Rc::new(ManualScheduler::new());
        let scheduler: SharedScheduler = manual.clone();

        play(trigger(1), &scheduler, &surface);
        memory.borrow_mut().mount(&Default::default());
        manual.run_frame();
        manual.run_frame();
        assert!(memory.borrow().offset_log().is_empty());
    }

    #[test]
    fn empty_plan_becomes_none() {
        assert!(AnimationPlan::default().into_option().is_none());
    }
}
