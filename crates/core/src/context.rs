//! Who is performing an operation.

use bursar_shared::types::{BranchId, UserId};
use serde::{Deserialize, Serialize};

/// Identity passed explicitly to every originator.
///
/// `user_id` is recorded as `created_by`; `branch_id`, when present, is
/// stamped on each journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// The acting user.
    pub user_id: UserId,
    /// The branch the user operates in.
    pub branch_id: Option<BranchId>,
}

impl ActorContext {
    /// Creates a context for a user without a branch.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            branch_id: None,
        }
    }

    /// Attaches a branch.
    #[must_use]
    pub const fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }
}
