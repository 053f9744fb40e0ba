//! 进程内发布/订阅总线，把传输层的推送与渲染解耦。
//!
//! 主题是封闭枚举，由消息本身决定，不可能把负载发到错误的主题上。
//! 回调同步、按注册顺序执行，不做错误隔离：某个订阅者 panic 会中断
//! 本次发布的剩余订阅者。

use serde::{Deserialize, Serialize};

use crate::app::Viewer;
use crate::game::GameState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ViewerUpdated,
    GameUpdated,
    GameLeft,
    GameNotFound,
}

const TOPIC_COUNT: usize = 4;

impl Topic {
    fn slot(self) -> usize {
        match self {
            Topic::ViewerUpdated => 0,
            Topic::GameUpdated => 1,
            Topic::GameLeft => 2,
            Topic::GameNotFound => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "topic", content = "payload", rename_all = "snake_case")]
pub enum BusMessage {
    ViewerUpdated(Viewer),
    GameUpdated(GameState),
    GameLeft,
    GameNotFound(String),
}

impl BusMessage {
    pub fn topic(&self) -> Topic {
        match self {
            BusMessage::ViewerUpdated(_) => Topic::ViewerUpdated,
            BusMessage::GameUpdated(_) => Topic::GameUpdated,
            BusMessage::GameLeft => Topic::GameLeft,
            BusMessage::GameNotFound(_) => Topic::GameNotFound,
        }
    }
}

pub type Subscriber = Box<dyn FnMut(&BusMessage)>;

/// 订阅在页面生命周期内一直有效，不提供退订。
#[derive(Default)]
pub struct Bus {
    subscribers: [Vec<Subscriber>; TOPIC_COUNT],
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, topic: Topic, callback: F)
    where
        F: FnMut(&BusMessage) + 'static,
    {
        self.subscribers[topic.slot()].push(Box::new(callback));
    }

    /// 返回被调用的订阅者数量。
    pub fn publish(&mut self, message: &BusMessage) -> usize {
        let subscribers = &mut self.subscribers[message.topic().slot()];
        for callback in subscribers.iter_mut() {
            callback(message);
        }
        subscribers.len()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers[topic.slot()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_runs_subscribers_in_registration_order() {
        let mut bus = Bus::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let calls = Rc::clone(&calls);
            bus.subscribe(Topic::GameLeft, move |_| calls.borrow_mut().push(label));
        }

        assert_eq!(bus.publish(&BusMessage::GameLeft), 3);
        assert_eq!(*calls.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn other_topics_are_not_invoked() {
        let mut bus = Bus::new();
        let hits = Rc::new(RefCell::new(0));
        {
            let hits = Rc::clone(&hits);
            bus.subscribe(Topic::GameNotFound, move |message| {
                assert_eq!(message, &BusMessage::GameNotFound("ABCD".into()));
                *hits.borrow_mut() += 1;
            });
        }

        assert_eq!(bus.publish(&BusMessage::GameLeft), 0);
        assert_eq!(*hits.borrow(), 0);
        bus.publish(&BusMessage::GameNotFound("ABCD".into()));
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.subscriber_count(Topic::GameNotFound), 1);
        assert_eq!(bus.subscriber_count(Topic::ViewerUpdated), 0);
    }

    #[test]
    #[should_panic(expected = "subscriber failed")]
    fn panicking_subscriber_aborts_publish() {
        let mut bus = Bus::new();
        let reached = Rc::new(RefCell::new(false));
        bus.subscribe(Topic::GameLeft, |_| panic!("subscriber failed"));
        {
            let reached = Rc::clone(&reached);
            bus.subscribe(Topic::GameLeft, move |_| *reached.borrow_mut() = true);
        }
        bus.publish(&BusMessage::GameLeft);
    }

    #[test]
    fn message_topic_follows_variant() {
        let viewer = Viewer::new(1, "ann");
        assert_eq!(BusMessage::ViewerUpdated(viewer).topic(), Topic::ViewerUpdated);
        assert_eq!(
            BusMessage::GameUpdated(GameState::sample(1, crate::game::Phase::Take)).topic(),
            Topic::GameUpdated
        );
    }
}
