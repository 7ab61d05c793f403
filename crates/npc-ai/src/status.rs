//! Status of a goal in its lifecycle.

/// Lifecycle state of a goal.
///
/// # Turn-based Semantics
///
/// A goal is processed at most once per actor turn:
/// - `Inactive` goals activate (and plan) on their next processing
/// - `Active` goals keep running on the following turns
/// - `Completed` and `Failed` are terminal; the owner pops the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
pub enum GoalStatus {
    /// Created or re-armed, not planned yet.
    #[default]
    Inactive,

    /// Planned and running.
    Active,

    /// Finished what it set out to do.
    Completed,

    /// Cannot finish (blocked path, vanished target, ...).
    Failed,
}

impl GoalStatus {
    #[inline]
    pub fn is_inactive(self) -> bool {
        matches!(self, GoalStatus::Inactive)
    }

    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, GoalStatus::Active)
    }

    #[inline]
    pub fn is_completed(self) -> bool {
        matches!(self, GoalStatus::Completed)
    }

    #[inline]
    pub fn has_failed(self) -> bool {
        matches!(self, GoalStatus::Failed)
    }

    /// Returns `true` for `Completed` and `Failed`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Failed)
    }
}
