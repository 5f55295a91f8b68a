use thiserror::Error;

/// Validation failures raised when building domain records from raw data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid bin range [{lower}, {upper}]")]
    InvalidBinRange { lower: i32, upper: i32 },

    #[error("expected {expected} liquidity shares for the bin range, got {actual}")]
    ShareCountMismatch { expected: usize, actual: usize },

    #[error("price computation overflowed for bin {bin_id}")]
    PriceOverflow { bin_id: i32 },
}
