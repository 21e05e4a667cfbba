//! Error kinds per spec §7. Each is a `thiserror` enum owned by the crate
//! that raises it; `EngineError` is the umbrella type callers that don't
//! care about the distinction can convert into.

use thiserror::Error;

/// Slot type incompatibility, unregistered type, duplicate slot index,
/// unknown parameter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("resource type `{0}` is not registered")]
    UnregisteredType(String),
    #[error("slot `{slot}` on node type `{node_type}` expects `{expected}`, found `{found}`")]
    IncompatibleSlot {
        node_type: String,
        slot: String,
        expected: String,
        found: String,
    },
    #[error("duplicate slot index {index} on node type `{node_type}`")]
    DuplicateSlotIndex { node_type: String, index: usize },
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
}

/// Cycle detected, dangling reference, node removed while depended upon.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    #[error("graph contains a cycle involving node `{0}`")]
    Cycle(String),
    #[error("edge references non-existent node `{0}`")]
    DanglingReference(String),
    #[error("node `{0}` removed while still depended upon by `{1}`")]
    RemovedWhileDependedUpon(String, String),
}

/// Required input unconnected, parameter missing/out-of-range, incompatible
/// device affinity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("required input `{slot}` on node `{node}` is not connected")]
    RequiredInputUnconnected { node: String, slot: String },
    #[error("parameter `{parameter}` on node `{node}` is missing")]
    ParameterMissing { node: String, parameter: String },
    #[error("parameter `{parameter}` on node `{node}` out of range: {detail}")]
    ParameterOutOfRange {
        node: String,
        parameter: String,
        detail: String,
    },
    #[error("incompatible device affinity between `{from}` and `{to}`")]
    IncompatibleDeviceAffinity { from: String, to: String },
}

/// Strict category over limit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("budget category `{category:?}` over limit: requested {requested} bytes, available {available} bytes")]
pub struct BudgetError {
    pub category: BudgetCategoryTag,
    pub requested: u64,
    pub available: u64,
}

/// Lightweight copy of the budget category tag for error reporting without
/// creating a dependency cycle on `rg-budget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetCategoryTag {
    HostMemory,
    DeviceMemory,
    CommandBuffers,
    Descriptors,
    Custom,
}

/// Lifetime invariant violation (birth > death), incompatible memory
/// requirements for a forced alias.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AliasError {
    #[error("resource `{0}` has birth index greater than death index")]
    BirthAfterDeath(String),
    #[error("resources `{a}` and `{b}` have incompatible memory requirements")]
    IncompatibleRequirements { a: String, b: String },
    #[error("producer of resource `{0}` is not present in the execution order")]
    ProducerNotScheduled(String),
}

/// Hook called in wrong state; double cleanup is swallowed by design (§7),
/// so this variant exists for completeness but callers are not expected to
/// surface it to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("node `{node}` hook `{hook}` called while in state `{state}`")]
    WrongState {
        node: String,
        hook: &'static str,
        state: &'static str,
    },
    #[error("node `{0}` cleaned up more than once")]
    DoubleCleanup(String),
}

/// An external collaborator (backend device, presentation) reported failure;
/// surfaced verbatim.
#[derive(Error, Debug, Clone)]
#[error("backend error: {0}")]
pub struct BackendError(pub String);

/// Umbrella error every component error converts into.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Alias(#[from] AliasError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
