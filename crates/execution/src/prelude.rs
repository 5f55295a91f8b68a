pub use crate::aggregator::{AggregatorConfig, PositionAggregator, PositionBook};
pub use crate::chain::ChainClient;
pub use crate::funding::{
    CommittedTx, DepositAmounts, FundingConfig, FundingError, FundingOutcome, FundingPipeline,
    FundingStep,
};
pub use crate::shell::{ShellCreator, ShellError};
pub use crate::workflow::{WorkflowError, WorkflowState};
