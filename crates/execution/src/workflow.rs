//! Workflow state for the position lifecycle.
//!
//! One explicit state value replaces a pile of independent busy flags:
//! funding without a shell, or creating a second shell over a pending one,
//! is unrepresentable rather than merely disabled.

use dlmm_lp_domain::entities::PendingShell;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("an operation is already in flight")]
    Busy,

    #[error("a pending shell already exists; fund it or reset first")]
    ShellExists,

    #[error("no position shell is awaiting funding")]
    NoPendingShell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing in flight, no shell pending.
    Idle,
    /// Position-creation transaction in flight.
    Creating,
    /// Shell created, waiting to be funded.
    AwaitingFunding(PendingShell),
    /// Funding pipeline in flight.
    Funding(PendingShell),
    /// Last operation failed. A shell that was mid-funding stays attached
    /// so the attempt can be retried; confirmed on-chain steps are final
    /// and a retry existence-checks its way past them.
    Failed {
        reason: String,
        shell: Option<PendingShell>,
    },
}

impl WorkflowState {
    /// Enters the creation phase. Refused while work is in flight or a
    /// shell is still pending.
    pub fn begin_create(&mut self) -> Result<(), WorkflowError> {
        match self {
            WorkflowState::Idle | WorkflowState::Failed { shell: None, .. } => {
                *self = WorkflowState::Creating;
                Ok(())
            }
            WorkflowState::AwaitingFunding(_) | WorkflowState::Failed { shell: Some(_), .. } => {
                Err(WorkflowError::ShellExists)
            }
            WorkflowState::Creating | WorkflowState::Funding(_) => Err(WorkflowError::Busy),
        }
    }

    /// Records a freshly created shell.
    pub fn shell_created(&mut self, shell: PendingShell) -> Result<(), WorkflowError> {
        match self {
            WorkflowState::Creating => {
                *self = WorkflowState::AwaitingFunding(shell);
                Ok(())
            }
            _ => Err(WorkflowError::Busy),
        }
    }

    /// Enters the funding phase, yielding the shell to fund. Allowed from
    /// a pending shell or a failed funding attempt that kept one.
    pub fn begin_funding(&mut self) -> Result<PendingShell, WorkflowError> {
        match std::mem::replace(self, WorkflowState::Idle) {
            WorkflowState::AwaitingFunding(shell)
            | WorkflowState::Failed {
                shell: Some(shell), ..
            } => {
                *self = WorkflowState::Funding(shell.clone());
                Ok(shell)
            }
            state @ (WorkflowState::Creating | WorkflowState::Funding(_)) => {
                *self = state;
                Err(WorkflowError::Busy)
            }
            state => {
                *self = state;
                Err(WorkflowError::NoPendingShell)
            }
        }
    }

    /// Marks the funding run successful, discarding the shell.
    pub fn funding_succeeded(&mut self) -> Result<(), WorkflowError> {
        match self {
            WorkflowState::Funding(_) => {
                *self = WorkflowState::Idle;
                Ok(())
            }
            _ => Err(WorkflowError::NoPendingShell),
        }
    }

    /// Records a failure. A shell in flight or pending carries over.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let shell = self.pending_shell().cloned();
        *self = WorkflowState::Failed {
            reason: reason.into(),
            shell,
        };
    }

    /// Explicitly discards whatever is pending.
    pub fn reset(&mut self) {
        *self = WorkflowState::Idle;
    }

    /// The shell the workflow is holding, if any.
    pub fn pending_shell(&self) -> Option<&PendingShell> {
        match self {
            WorkflowState::AwaitingFunding(shell) | WorkflowState::Funding(shell) => Some(shell),
            WorkflowState::Failed {
                shell: Some(shell), ..
            } => Some(shell),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> PendingShell {
        PendingShell {
            pair: "pair".to_string(),
            position_mint: "mint".to_string(),
            lower_bin_id: 190,
            upper_bin_id: 230,
            created_at: 0,
        }
    }

    #[test]
    fn test_happy_path() {
        let mut state = WorkflowState::Idle;
        state.begin_create().unwrap();
        state.shell_created(shell()).unwrap();
        let funded = state.begin_funding().unwrap();
        assert_eq!(funded, shell());
        state.funding_succeeded().unwrap();
        assert_eq!(state, WorkflowState::Idle);
    }

    #[test]
    fn test_funding_without_shell_is_refused() {
        let mut state = WorkflowState::Idle;
        assert_eq!(state.begin_funding(), Err(WorkflowError::NoPendingShell));
        assert_eq!(state, WorkflowState::Idle);
    }

    #[test]
    fn test_second_shell_over_pending_one_is_refused() {
        let mut state = WorkflowState::AwaitingFunding(shell());
        assert_eq!(state.begin_create(), Err(WorkflowError::ShellExists));
        assert!(state.pending_shell().is_some());
    }

    #[test]
    fn test_failed_funding_keeps_shell_for_retry() {
        let mut state = WorkflowState::AwaitingFunding(shell());
        state.begin_funding().unwrap();
        state.fail("deposit rejected");
        assert_eq!(state.pending_shell(), Some(&shell()));
        // Retry goes straight back into funding with the same shell.
        assert_eq!(state.begin_funding().unwrap(), shell());
    }

    #[test]
    fn test_failed_creation_allows_fresh_create() {
        let mut state = WorkflowState::Idle;
        state.begin_create().unwrap();
        state.fail("confirmation timeout");
        assert_eq!(state.pending_shell(), None);
        state.begin_create().unwrap();
    }

    #[test]
    fn test_reset_discards_pending_shell() {
        let mut state = WorkflowState::AwaitingFunding(shell());
        state.reset();
        assert_eq!(state, WorkflowState::Idle);
        assert_eq!(state.begin_funding(), Err(WorkflowError::NoPendingShell));
    }

    #[test]
    fn test_reentrant_operations_are_busy() {
        let mut state = WorkflowState::Creating;
        assert_eq!(state.begin_create(), Err(WorkflowError::Busy));

        let mut state = WorkflowState::Funding(shell());
        assert_eq!(state.begin_funding(), Err(WorkflowError::Busy));
        assert_eq!(state.begin_create(), Err(WorkflowError::Busy));
    }
}
