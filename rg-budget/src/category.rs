//! Budget categories (spec §4.9): "host memory, device memory, command
//! buffers, descriptors, plus user-defined string-keyed categories."

use rg_core::BudgetCategoryTag;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BudgetCategory {
    HostMemory,
    DeviceMemory,
    CommandBuffers,
    Descriptors,
    Custom(String),
}

impl BudgetCategory {
    /// Lightweight copy used when constructing [`rg_core::BudgetError`],
    /// which can't depend on this crate's richer, string-keyed category
    /// without a dependency cycle.
    pub fn tag(&self) -> BudgetCategoryTag {
        match self {
            BudgetCategory::HostMemory => BudgetCategoryTag::HostMemory,
            BudgetCategory::DeviceMemory => BudgetCategoryTag::DeviceMemory,
            BudgetCategory::CommandBuffers => BudgetCategoryTag::CommandBuffers,
            BudgetCategory::Descriptors => BudgetCategoryTag::Descriptors,
            BudgetCategory::Custom(_) => BudgetCategoryTag::Custom,
        }
    }
}

impl std::fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetCategory::HostMemory => write!(f, "host-memory"),
            BudgetCategory::DeviceMemory => write!(f, "device-memory"),
            BudgetCategory::CommandBuffers => write!(f, "command-buffers"),
            BudgetCategory::Descriptors => write!(f, "descriptors"),
            BudgetCategory::Custom(name) => write!(f, "custom({})", name),
        }
    }
}
