//! Shared plumbing used by every `rg-*` crate: stable ids, the top-level
//! error enum, the scope-hash combine rule, and the logging/collaborator
//! traits the core exposes to its embedder (spec §6).

mod error;
mod hash;
mod ids;
mod lifetime_scope;
mod logger;

pub use error::{
    AliasError, BackendError, BudgetCategoryTag, BudgetError, EngineError, LifecycleError,
    SchemaError, TopologyError, ValidationError,
};
pub use hash::{combine, fnv1a, ScopeHash};
pub use ids::{DeviceId, LoopId, NodeHandle, NodeId, NodeTypeId, ResourceRef, SubscriptionId};
pub use lifetime_scope::{
    classify_span, LifetimeScope, PASS_MAX_SPAN, SUBPASS_MAX_SPAN, TRANSIENT_MAX_SPAN,
};
pub use logger::{LogLevel, Logger, StdLogger};

pub use log;
