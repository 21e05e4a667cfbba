//! Node instance state machine (spec §4.3):
//!
//! ```text
//! Created → Setup → Compiled → Ready → Executing → Ready → Cleaned
//! ```
//!
//! Plus the "needs recompile" escape hatch from any state back to `Setup`
//! between frames.

use rg_core::LifecycleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeState {
    Created,
    Setup,
    Compiled,
    Ready,
    Executing,
    Cleaned,
}

impl NodeState {
    fn name(self) -> &'static str {
        match self {
            NodeState::Created => "Created",
            NodeState::Setup => "Setup",
            NodeState::Compiled => "Compiled",
            NodeState::Ready => "Ready",
            NodeState::Executing => "Executing",
            NodeState::Cleaned => "Cleaned",
        }
    }

    /// Validate and perform a transition, per the state diagram in spec
    /// §4.3. `force_to_setup` (the "needs recompile" flag) is handled by
    /// the caller directly setting `Setup` via [`Self::force_setup`] rather
    /// than through this table, since it is legal from every state.
    pub fn transition(self, to: NodeState, node_name: &str, hook: &'static str) -> Result<NodeState, LifecycleError> {
        use NodeState::*;
        let allowed = matches!(
            (self, to),
            (Created, Setup)
                | (Setup, Compiled)
                | (Compiled, Ready)
                | (Ready, Executing)
                | (Executing, Ready)
                | (Ready, Cleaned)
                | (Compiled, Cleaned)
                | (Setup, Cleaned)
                | (Created, Cleaned)
        );
        if allowed {
            Ok(to)
        } else {
            Err(LifecycleError::WrongState {
                node: node_name.to_string(),
                hook,
                state: self.name(),
            })
        }
    }

    /// "A node may also flag 'needs recompile' in any state; the graph
    /// moves it back to Setup between frames." Legal from any state.
    pub fn force_setup(self) -> NodeState {
        NodeState::Setup
    }
}
