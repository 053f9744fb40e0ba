//! 基于 web-sys 的 SVG 宿主与 `requestAnimationFrame` 调度器。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use gloo_events::EventListener;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Function;
use web_sys::{Document, Element, HtmlElement, Window};

use super::animation::{FrameScheduler, Offset};
use super::scene::{Node, NodeId, Scene, Shape};
use super::surface::Surface;
use crate::app::PageChrome;
use crate::transport::{Intent, IntentSink};
use crate::{board_error, board_warn};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const TEXT_COLOR: &str = "white";
const TEXT_SIZE: u32 = 16;

struct ChromeElements {
    label: Option<Element>,
    start: Option<Element>,
    leave: Option<Element>,
    alert: Option<Element>,
}

impl ChromeElements {
    fn lookup(document: &Document) -> Self {
        let find = |selector: &str| document.query_selector(selector).ok().flatten();
        Self {
            label: find(".game-label"),
            start: find(".start-game-button"),
            leave: find(".leave-game-button"),
            alert: find(".alert-danger"),
        }
    }
}

/// 只改 `display`，按钮上其余内联样式保持不变。
fn set_display(element: &Option<Element>, visible: bool) {
    let Some(element) = element else {
        return;
    };
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        board_warn!("page button is not an HTML element");
        return;
    };
    let display = if visible { "inline-block" } else { "none" };
    if let Err(error) = html.style().set_property("display", display) {
        board_warn!("failed to toggle page button: {error:?}");
    }
}

/// 页面按钮在整个页面生命周期内只绑定一次，不随场景重建。
fn bind_button(
    element: &Option<Element>,
    intent: Intent,
    sink: &Rc<dyn IntentSink>,
) -> Option<EventListener> {
    let element = element.as_ref()?;
    let sink = Rc::clone(sink);
    Some(EventListener::new(element, "click", move |_event| {
        sink.push(intent.clone())
    }))
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// 以一个 `<svg>` 容器为宿主，场景中的节点逐一映射为 SVG 元素。
pub struct DomSurface {
    document: Document,
    container: Element,
    generation: u64,
    elements: HashMap<NodeId, Element>,
    listeners: Vec<EventListener>,
    sink: Rc<dyn IntentSink>,
    chrome: ChromeElements,
    _chrome_listeners: Vec<EventListener>,
}

impl DomSurface {
    pub fn new(
        document: Document,
        container: Element,
        width: f64,
        height: f64,
        sink: Rc<dyn IntentSink>,
    ) -> Self {
        if !container.has_attribute("viewBox") {
            let view_box = format!(
                "{} {} {} {}",
                fmt_num(-width / 2.0),
                fmt_num(-height / 2.0),
                fmt_num(width),
                fmt_num(height)
            );
            if let Err(error) = container.set_attribute("viewBox", &view_box) {
                board_warn!("failed to set viewBox: {error:?}");
            }
        }
        let chrome = ChromeElements::lookup(&document);
        let chrome_listeners = [
            bind_button(&chrome.start, Intent::StartGame, &sink),
            bind_button(&chrome.leave, Intent::LeaveGame, &sink),
        ]
        .into_iter()
        .flatten()
        .collect();
        Self {
            document,
            container,
            generation: 0,
            elements: HashMap::new(),
            listeners: Vec::new(),
            sink,
            chrome,
            _chrome_listeners: chrome_listeners,
        }
    }

    fn remove_children(&mut self) {
        while let Some(child) = self.container.first_child() {
            if self.container.remove_child(&child).is_err() {
                break;
            }
        }
        self.elements.clear();
        self.listeners.clear();
    }

    fn svg(&self, tag: &str) -> Result<Element, JsValue> {
        self.document.create_element_ns(Some(SVG_NS), tag)
    }

    fn create(&mut self, node: &Node) -> Result<Element, JsValue> {
        let element = match &node.shape {
            Shape::Group { x, y, rotate } => {
                let group = self.svg("g")?;
                if *x != 0.0 || *y != 0.0 || *rotate != 0.0 {
                    let transform = format!(
                        "translate({}, {}) rotate({})",
                        fmt_num(*x),
                        fmt_num(*y),
                        fmt_num(*rotate)
                    );
                    group.set_attribute("transform", &transform)?;
                }
                group
            }
            Shape::Image {
                x,
                y,
                href,
                width,
                rotate,
            } => {
                let image = self.svg("image")?;
                image.set_attribute("x", &fmt_num(*x))?;
                image.set_attribute("y", &fmt_num(*y))?;
                image.set_attribute("href", href)?;
                image.set_attribute("width", width)?;
                if *rotate != 0.0 {
                    image.set_attribute("transform", &format!("rotate({})", fmt_num(*rotate)))?;
                }
                image
            }
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                let rect = self.svg("rect")?;
                rect.set_attribute("x", &fmt_num(*x))?;
                rect.set_attribute("y", &fmt_num(*y))?;
                rect.set_attribute("width", &fmt_num(*width))?;
                rect.set_attribute("height", &fmt_num(*height))?;
                rect
            }
            Shape::Text { x, y, text } => {
                let label = self.svg("text")?;
                label.set_attribute("x", &fmt_num(*x))?;
                label.set_attribute("y", &fmt_num(*y))?;
                label.set_attribute("text-anchor", "middle")?;
                label.set_attribute("dominant-baseline", "middle")?;
                label.set_attribute("font-size", &TEXT_SIZE.to_string())?;
                label.set_attribute("fill", TEXT_COLOR)?;
                label.set_text_content(Some(text));
                label
            }
        };

        if !node.classes.is_empty() {
            element.set_attribute("class", &node.classes.join(" "))?;
        }

        if let Some(intent) = node.intent.clone() {
            let sink = Rc::clone(&self.sink);
            let listener = EventListener::new(&element, "click", move |_event| {
                sink.push(intent.clone())
            });
            self.listeners.push(listener);
        }

        for child in &node.children {
            let child_element = self.create(child)?;
            element.append_child(&child_element)?;
        }

        self.elements.insert(node.id, element.clone());
        Ok(element)
    }

    /// 先在容器外建好全部元素，再一次性挂进容器。
    fn try_mount(&mut self, scene: &Scene) -> Result<(), JsValue> {
        let roots = scene
            .nodes
            .iter()
            .map(|node| self.create(node))
            .collect::<Result<Vec<_>, _>>()?;
        for root in &roots {
            self.container.append_child(root)?;
        }
        Ok(())
    }
}

impl Surface for DomSurface {
    fn mount(&mut self, scene: &Scene) -> u64 {
        self.remove_children();
        self.generation += 1;
        if let Err(error) = self.try_mount(scene) {
            // 宁可留空，也不留半张桌面
            board_error!("failed to mount scene: {error:?}");
            self.remove_children();
        }
        self.generation
    }

    fn clear(&mut self) {
        self.remove_children();
        self.generation += 1;
    }

    fn set_offset(
        &mut self,
        generation: u64,
        target: NodeId,
        offset: Offset,
        transition: Duration,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some(element) = self.elements.get(&target) else {
            return false;
        };
        let transform = if offset.is_zero() {
            String::new()
        } else {
            format!("translate({}px, {}px)", fmt_num(offset.x), fmt_num(offset.y))
        };
        let style = format!(
            "transform: {transform}; transition: transform {}s",
            transition.as_secs_f64()
        );
        element.set_attribute("style", &style).is_ok()
    }

    fn apply_chrome(&mut self, chrome: &PageChrome) {
        if let Some(label) = &self.chrome.label {
            label.set_text_content(Some(&chrome.label));
        }
        set_display(&self.chrome.start, chrome.show_start);
        set_display(&self.chrome.leave, chrome.show_leave);
        if let (Some(alert), Some(text)) = (&self.chrome.alert, chrome.alert.as_deref()) {
            alert.set_text_content(Some(text));
        }
    }
}

/// `window.requestAnimationFrame` 调度器。
pub struct RafScheduler {
    window: Window,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        let closure = Closure::once_into_js(move || callback());
        if let Err(error) = self
            .window
            .request_animation_frame(closure.unchecked_ref::<Function>())
        {
            board_error!("requestAnimationFrame failed: {error:?}");
        }
    }
}

/// 把意图转交给 JS 侧的频道推送函数 `(eventName, payload, channel)`。
#[derive(Default)]
pub struct JsIntentSink {
    callback: RefCell<Option<Function>>,
}

impl JsIntentSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&self, callback: Function) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl IntentSink for JsIntentSink {
    fn push(&self, intent: Intent) {
        if let Err(error) = intent.validate() {
            board_warn!("dropping intent: {error}");
            return;
        }
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            board_warn!("no intent handler registered for {}", intent.event_name());
            return;
        };
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let payload = match intent.payload().serialize(&serializer) {
            Ok(payload) => payload,
            Err(error) => {
                board_error!("failed to encode intent payload: {error}");
                return;
            }
        };
        if let Err(error) = callback.call3(
            &JsValue::NULL,
            &JsValue::from_str(intent.event_name()),
            &payload,
            &JsValue::from_str(intent.channel().as_str()),
        ) {
            board_error!("intent handler threw: {error:?}");
        }
    }
}
