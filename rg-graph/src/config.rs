//! Compile-time and run-time tunables grouped into a single `Default`-able
//! struct, following the teacher's `HeapsConfig`/`LinearConfig` pattern
//! (plain data, constructed once and passed by value into the subsystem
//! that owns it) rather than threading a dozen loose parameters through
//! every constructor.

use std::collections::HashMap;

use rg_budget::{Budget, BudgetCategory};

#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Forwarded to `rg_alias::AliasingEngine::new` (spec §4.8 default:
    /// 1 MiB).
    pub alias_threshold_bytes: u64,
    /// Forwarded to every loop registered without an explicit cap (spec
    /// §4.11 default: 250 ms).
    pub default_max_catch_up_seconds: f64,
    /// Per-category budgets applied to a fresh `BudgetManager` before the
    /// first compile. Categories left unconfigured fall back to
    /// `Budget::unlimited()`.
    pub budgets: HashMap<BudgetCategory, Budget>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            alias_threshold_bytes: rg_alias::DEFAULT_ALIAS_THRESHOLD_BYTES,
            default_max_catch_up_seconds: rg_loop::DEFAULT_MAX_CATCH_UP_SECONDS,
            budgets: HashMap::new(),
        }
    }
}
