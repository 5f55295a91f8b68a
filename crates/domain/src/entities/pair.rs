use serde::{Deserialize, Serialize};

/// A liquidity-book market between two tokens. Read-only from the client's
/// perspective: the chain is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    /// On-chain pair address (base58).
    pub address: String,
    /// Price increment per bin, in basis points.
    pub bin_step: u16,
    /// Bin currently holding the market price.
    pub active_bin: i32,
    /// Token X mint address.
    pub token_x_mint: String,
    /// Token Y mint address.
    pub token_y_mint: String,
}
