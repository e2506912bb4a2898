//! Service layer - Business logic over the repositories.

pub mod batch;
mod categorization_service;
mod container;
mod progress_service;
mod rule_service;

pub use batch::{for_each_user, BatchSummary, UserFailure};
pub use categorization_service::{
    CategorizationManager, CategorizationReport, CategorizationService,
};
pub use container::Services;
pub use progress_service::{ProgressManager, ProgressService, UserProgress};
pub use rule_service::{RuleManager, RuleService};
