//! Logger collaborator interface (spec §6): "Sink for leveled messages
//! (debug, info, warning, error, critical); optional per-node hierarchical
//! loggers." The engine itself always logs through the `log` facade (as the
//! teacher crate does throughout); this trait exists only for embedders who
//! want to intercept or fan those messages out to a hierarchical per-node
//! sink instead of the process-global logger.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, target: &str, message: &str);

    /// Create a child logger scoped under `name`, for a per-node hierarchy.
    /// Default implementation just returns a boxed clone of a forwarding
    /// logger sharing the same sink.
    fn child(&self, _name: &str) -> Box<dyn Logger>
    where
        Self: Sized + Clone + 'static,
    {
        Box::new(self.clone())
    }
}

/// Default [`Logger`] that forwards to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdLogger;

impl Logger for StdLogger {
    fn log(&self, level: LogLevel, target: &str, message: &str) {
        match level {
            LogLevel::Debug => log::debug!(target: "rg", "[{}] {}", target, message),
            LogLevel::Info => log::info!(target: "rg", "[{}] {}", target, message),
            LogLevel::Warning => log::warn!(target: "rg", "[{}] {}", target, message),
            LogLevel::Error | LogLevel::Critical => {
                log::error!(target: "rg", "[{}] {}", target, message)
            }
        }
    }
}
