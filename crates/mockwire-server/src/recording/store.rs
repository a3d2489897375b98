//! In-memory store of recorded exchanges.

use super::filter::UrlFilter;
use super::types::RecordedExchange;
use parking_lot::Mutex;
use tracing::debug;

/// Thread-safe, append-only (until drained) list of exchanges in arrival order.
#[derive(Debug, Default)]
pub struct ExchangeRecorder {
    exchanges: Mutex<Vec<RecordedExchange>>,
}

impl ExchangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exchange
    pub fn record(&self, exchange: RecordedExchange) {
        debug!("Recording {} {}", exchange.method, exchange.raw_uri);
        self.exchanges.lock().push(exchange);
    }

    /// Remove and return the exchanges whose raw URI passes `filter`.
    ///
    /// Without a filter everything is drained. The partition happens under a
    /// single lock so concurrent appends land wholly before or after it;
    /// remaining exchanges keep their order.
    pub fn drain_matching(&self, filter: Option<&UrlFilter>) -> Vec<RecordedExchange> {
        let mut exchanges = self.exchanges.lock();
        let Some(filter) = filter else {
            return std::mem::take(&mut *exchanges);
        };

        let (drained, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut *exchanges)
            .into_iter()
            .partition(|exchange| filter.matches(&exchange.raw_uri));
        *exchanges = remaining;
        drained
    }

    /// Clear all recordings
    pub fn clear(&self) -> usize {
        let mut exchanges = self.exchanges.lock();
        let count = exchanges.len();
        exchanges.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.exchanges.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.lock().is_empty()
    }
}
