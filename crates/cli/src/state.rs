//! Pending-shell persistence between CLI invocations.
//!
//! The shell file is the on-disk half of the workflow state: present means
//! a shell is awaiting funding, absent means idle. It is removed on
//! funding success or an explicit reset, and deliberately survives a
//! failed funding run so the attempt can be retried.

use anyhow::{Context, Result};
use dlmm_lp_domain::entities::PendingShell;
use dlmm_lp_execution::prelude::WorkflowState;
use std::fs;
use std::path::Path;

pub fn load_shell(path: &Path) -> Result<Option<PendingShell>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read shell state {}", path.display()))?;
    let shell = serde_json::from_str(&raw)
        .with_context(|| format!("corrupt shell state {}", path.display()))?;
    Ok(Some(shell))
}

/// Maps the on-disk state onto the workflow machine.
pub fn load_workflow(path: &Path) -> Result<WorkflowState> {
    Ok(match load_shell(path)? {
        Some(shell) => WorkflowState::AwaitingFunding(shell),
        None => WorkflowState::Idle,
    })
}

pub fn save_shell(path: &Path, shell: &PendingShell) -> Result<()> {
    let raw = serde_json::to_string_pretty(shell)?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write shell state {}", path.display()))
}

/// Removes the shell file; returns whether one existed.
pub fn clear_shell(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)
        .with_context(|| format!("failed to remove shell state {}", path.display()))?;
    Ok(true)
}
