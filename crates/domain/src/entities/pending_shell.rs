use crate::bin_math::BinRange;
use serde::{Deserialize, Serialize};

/// A created-but-unfunded position. Lives in the workflow between the
/// creation and funding steps and is discarded on funding success or an
/// explicit reset; a failed funding run keeps it so the attempt can be
/// retried against the same shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingShell {
    /// Address of the pair the shell was created on.
    pub pair: String,
    /// Mint of the created position account.
    pub position_mint: String,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    /// Unix timestamp of the creation transaction.
    pub created_at: u64,
}

impl PendingShell {
    pub fn bin_range(&self) -> BinRange {
        BinRange::new(self.lower_bin_id, self.upper_bin_id)
    }
}
