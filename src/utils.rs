//! 日志与 panic hook 等杂项。
//!
//! wasm32 下日志写到浏览器控制台，其余目标写到 stderr，便于原生测试。

#[doc(hidden)]
pub fn console_write(level: Level, message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let value = wasm_bindgen::JsValue::from_str(message);
        match level {
            Level::Log => web_sys::console::log_1(&value),
            Level::Warn => web_sys::console::warn_1(&value),
            Level::Error => web_sys::console::error_1(&value),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        eprintln!("[{}] {message}", level.as_str());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Log,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[macro_export]
macro_rules! board_log {
    ($($arg:tt)*) => {
        $crate::utils::console_write($crate::utils::Level::Log, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! board_warn {
    ($($arg:tt)*) => {
        $crate::utils::console_write($crate::utils::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! board_error {
    ($($arg:tt)*) => {
        $crate::utils::console_write($crate::utils::Level::Error, &format!($($arg)*))
    };
}

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}
