//! Message taxonomy (spec §6: "The numeric type codes are an interface
//! contract") and the payload each code carries (spec §4.12).

use rg_core::NodeId;

use crate::category::MessageCategory;

/// `CleanupRequested`'s scope (spec §4.12: "scope: specific / by-tag /
/// by-type / full").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupScope {
    Specific(String),
    ByTag(String),
    ByType(String),
    Full,
}

/// One engine-produced message and its numeric type code. The codes are a
/// published interface contract (spec §6) and must never be renumbered.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    CleanupRequested { scope: CleanupScope, reason: String },
    CleanupCompleted { cleaned: Vec<String> },
    RecompileRequested { nodes: Vec<String>, reason: String },
    RecompileCompleted { nodes: Vec<String> },
    WindowResized { width: u32, height: u32 },
    SwapchainInvalidated,
    ShaderReloaded { path: String },
    TextureReloaded { path: String },
}

impl Event {
    /// Spec §6: "cleanup-requested=100, cleanup-completed=101,
    /// recompile-requested=200, recompile-completed=201,
    /// window-resized=300, swapchain-invalidated=301,
    /// shader-reloaded=302, texture-reloaded=303."
    pub fn type_code(&self) -> u16 {
        match self {
            Event::CleanupRequested { .. } => 100,
            Event::CleanupCompleted { .. } => 101,
            Event::RecompileRequested { .. } => 200,
            Event::RecompileCompleted { .. } => 201,
            Event::WindowResized { .. } => 300,
            Event::SwapchainInvalidated => 301,
            Event::ShaderReloaded { .. } => 302,
            Event::TextureReloaded { .. } => 303,
        }
    }

    pub fn category(&self) -> MessageCategory {
        match self {
            Event::CleanupRequested { .. } | Event::CleanupCompleted { .. } => MessageCategory::CLEANUP,
            Event::RecompileRequested { .. } | Event::RecompileCompleted { .. } => MessageCategory::RECOMPILE,
            Event::WindowResized { .. }
            | Event::SwapchainInvalidated
            | Event::ShaderReloaded { .. }
            | Event::TextureReloaded { .. } => MessageCategory::RESOURCE_INVALIDATION,
        }
    }
}

/// An `Event` plus the identity of whoever published it (spec §4.12:
/// "(type code, category bitflag, sender id)"). `sender` is `None` for
/// messages the compiler itself originates rather than relaying from a
/// node.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub event: Event,
    pub sender: Option<NodeId>,
}

impl Message {
    pub fn new(event: Event, sender: Option<NodeId>) -> Self {
        Message { event, sender }
    }

    pub fn type_code(&self) -> u16 {
        self.event.type_code()
    }

    pub fn category(&self) -> MessageCategory {
        self.event.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_match_the_published_contract() {
        assert_eq!(Event::CleanupRequested { scope: CleanupScope::Full, reason: String::new() }.type_code(), 100);
        assert_eq!(Event::CleanupCompleted { cleaned: vec![] }.type_code(), 101);
        assert_eq!(Event::RecompileRequested { nodes: vec![], reason: String::new() }.type_code(), 200);
        assert_eq!(Event::RecompileCompleted { nodes: vec![] }.type_code(), 201);
        assert_eq!(Event::WindowResized { width: 0, height: 0 }.type_code(), 300);
        assert_eq!(Event::SwapchainInvalidated.type_code(), 301);
        assert_eq!(Event::ShaderReloaded { path: String::new() }.type_code(), 302);
        assert_eq!(Event::TextureReloaded { path: String::new() }.type_code(), 303);
    }

    #[test]
    fn categories_group_as_spec_describes() {
        assert_eq!(Event::SwapchainInvalidated.category(), MessageCategory::RESOURCE_INVALIDATION);
        assert_eq!(Event::CleanupCompleted { cleaned: vec![] }.category(), MessageCategory::CLEANUP);
        assert_eq!(
            Event::RecompileRequested { nodes: vec![], reason: String::new() }.category(),
            MessageCategory::RECOMPILE
        );
    }
}
