//! Logging bridge for engines built as native plugins.
//!
//! A plugin links its own copy of `log`, so records emitted inside it never
//! reach the host's logger. Plugins log through a `ModuleLogger` instead,
//! which forwards every line to a callback owned by the host.

use std::ffi::{c_char, CString};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

pub type LogCallback = extern "C" fn(level: LogLevel, target: *const c_char, message: *const c_char);

pub struct ModuleLogger {
    callback: LogCallback,
    target: CString,
}

impl ModuleLogger {
    pub fn new(callback: LogCallback, target: &str) -> Self {
        Self {
            callback,
            target: to_cstring(target),
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        let msg = to_cstring(message);
        (self.callback)(level, self.target.as_ptr(), msg.as_ptr());
    }
}

// Interior NULs would truncate the line on the host side anyway.
fn to_cstring(s: &str) -> CString {
    CString::new(s.replace('\0', " ")).unwrap_or_default()
}
