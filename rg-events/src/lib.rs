//! Event bus coupling (spec §4.12): typed publish/subscribe with category
//! flags, mediating cleanup, recompile, and resource-invalidation messages
//! between nodes and the compiler.

mod bus;
mod category;
mod message;

pub use bus::EventBus;
pub use category::MessageCategory;
pub use message::{CleanupScope, Event, Message};
