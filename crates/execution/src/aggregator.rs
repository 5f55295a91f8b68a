//! Read-side aggregation: positions joined with their pair metadata.

use dlmm_lp_domain::entities::{Pair, Position};
use dlmm_lp_protocols::LiquidityBookReader;
use dlmm_lp_protocols::error::ProtocolError;
use futures_util::future::join_all;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the position aggregator.
#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    /// Markets to scan. Curated externally; positions on pairs outside
    /// this list are invisible to the aggregator.
    pub known_pairs: Vec<Pubkey>,
}

/// Aggregation result: the flat position list plus pair metadata keyed by
/// pair address.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    pub positions: Vec<Position>,
    pub pairs: HashMap<String, Pair>,
}

impl PositionBook {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pair metadata for a position, when present.
    pub fn pair_for(&self, position: &Position) -> Option<&Pair> {
        self.pairs.get(&position.pair)
    }
}

/// Fetches a wallet's positions across the known markets and joins them
/// with pair metadata.
pub struct PositionAggregator<R> {
    reader: Arc<R>,
    config: AggregatorConfig,
}

impl<R: LiquidityBookReader> PositionAggregator<R> {
    pub fn new(reader: Arc<R>, config: AggregatorConfig) -> Self {
        Self { reader, config }
    }

    /// Refreshes the position book. On any fetch failure the whole result
    /// is empty; callers never see partial data. Concurrent refreshes are
    /// not coordinated here; the caller keeps at most one in flight.
    pub async fn refresh(&self, owner: &Pubkey) -> PositionBook {
        match self.try_refresh(owner).await {
            Ok(book) => book,
            Err(error) => {
                warn!(owner = %owner, error = %error, "Position refresh failed; reporting empty set");
                PositionBook::default()
            }
        }
    }

    async fn try_refresh(&self, owner: &Pubkey) -> Result<PositionBook, ProtocolError> {
        let fetches = self
            .config
            .known_pairs
            .iter()
            .map(|pair| self.reader.fetch_user_positions(owner, pair));
        let results = join_all(fetches).await;

        let mut positions = Vec::new();
        let mut referenced: Vec<Pubkey> = Vec::new();
        for (pair, result) in self.config.known_pairs.iter().zip(results) {
            let batch = result?;
            if !batch.is_empty() && !referenced.contains(pair) {
                referenced.push(*pair);
            }
            positions.extend(batch);
        }

        if positions.is_empty() {
            debug!(owner = %owner, "No positions found");
            return Ok(PositionBook::default());
        }

        // Pair metadata only for markets actually referenced by a position.
        let infos = join_all(referenced.iter().map(|pair| self.reader.fetch_pair(pair))).await;
        let mut pairs = HashMap::new();
        for (pair, info) in referenced.iter().zip(infos) {
            pairs.insert(pair.to_string(), info?);
        }

        info!(
            owner = %owner,
            positions = positions.len(),
            pairs = pairs.len(),
            "Position refresh complete"
        );
        Ok(PositionBook { positions, pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockReader {
        positions: HashMap<Pubkey, Vec<Position>>,
        pairs: HashMap<Pubkey, Pair>,
        fail_positions: bool,
        fail_pairs: bool,
        pair_fetches: Mutex<Vec<Pubkey>>,
    }

    impl MockReader {
        fn new() -> Self {
            Self {
                positions: HashMap::new(),
                pairs: HashMap::new(),
                fail_positions: false,
                fail_pairs: false,
                pair_fetches: Mutex::new(Vec::new()),
            }
        }

        fn with_market(mut self, pair: Pubkey, count: usize) -> Self {
            let entry = self.positions.entry(pair).or_default();
            for i in 0..count {
                entry.push(
                    Position::try_new(
                        format!("mint-{pair}-{i}"),
                        pair.to_string(),
                        0,
                        1,
                        vec![1, 1],
                    )
                    .unwrap(),
                );
            }
            self.pairs.insert(
                pair,
                Pair {
                    address: pair.to_string(),
                    bin_step: 25,
                    active_bin: 0,
                    token_x_mint: Pubkey::new_unique().to_string(),
                    token_y_mint: Pubkey::new_unique().to_string(),
                },
            );
            self
        }
    }

    #[async_trait]
    impl LiquidityBookReader for MockReader {
        async fn fetch_user_positions(
            &self,
            _owner: &Pubkey,
            pair: &Pubkey,
        ) -> Result<Vec<Position>, ProtocolError> {
            if self.fail_positions {
                return Err(ProtocolError::AccountNotFound { address: *pair });
            }
            Ok(self.positions.get(pair).cloned().unwrap_or_default())
        }

        async fn fetch_pair(&self, pair: &Pubkey) -> Result<Pair, ProtocolError> {
            self.pair_fetches.lock().unwrap().push(*pair);
            if self.fail_pairs {
                return Err(ProtocolError::AccountNotFound { address: *pair });
            }
            self.pairs
                .get(pair)
                .cloned()
                .ok_or(ProtocolError::AccountNotFound { address: *pair })
        }
    }

    fn aggregator(reader: MockReader, known: Vec<Pubkey>) -> PositionAggregator<MockReader> {
        PositionAggregator::new(Arc::new(reader), AggregatorConfig { known_pairs: known })
    }

    #[tokio::test]
    async fn test_joins_positions_with_exactly_referenced_pairs() {
        let p1 = Pubkey::new_unique();
        let p2 = Pubkey::new_unique();
        let p3 = Pubkey::new_unique();
        let reader = MockReader::new()
            .with_market(p1, 2)
            .with_market(p2, 1)
            .with_market(p3, 0);
        let agg = aggregator(reader, vec![p1, p2, p3]);

        let book = agg.refresh(&Pubkey::new_unique()).await;
        assert_eq!(book.positions.len(), 3);
        let mut keys: Vec<_> = book.pairs.keys().cloned().collect();
        keys.sort();
        let mut expected = vec![p1.to_string(), p2.to_string()];
        expected.sort();
        // Exactly the referenced pairs, never a superset or subset.
        assert_eq!(keys, expected);
        // One metadata fetch per distinct pair, not per position.
        assert_eq!(agg.reader.pair_fetches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_positions_skips_pair_fetches() {
        let p1 = Pubkey::new_unique();
        let reader = MockReader::new().with_market(p1, 0);
        let agg = aggregator(reader, vec![p1]);

        let book = agg.refresh(&Pubkey::new_unique()).await;
        assert!(book.is_empty());
        assert!(agg.reader.pair_fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pair_fetch_failure_yields_empty_book() {
        let p1 = Pubkey::new_unique();
        let mut reader = MockReader::new().with_market(p1, 2);
        reader.fail_pairs = true;
        let agg = aggregator(reader, vec![p1]);

        let book = agg.refresh(&Pubkey::new_unique()).await;
        // Never a half-populated result.
        assert!(book.positions.is_empty());
        assert!(book.pairs.is_empty());
    }

    #[tokio::test]
    async fn test_position_fetch_failure_yields_empty_book() {
        let p1 = Pubkey::new_unique();
        let mut reader = MockReader::new().with_market(p1, 2);
        reader.fail_positions = true;
        let agg = aggregator(reader, vec![p1]);

        let book = agg.refresh(&Pubkey::new_unique()).await;
        assert!(book.is_empty());
    }
}
