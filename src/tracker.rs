//! Stream reducer: folds PITCH records into ledger, summary and failure log.
//!
//! `SalesTracker` is the single owner of all running state. Each record is
//! handled against the current ledger (see [`handle_message`]) and the
//! outcome is folded in:
//! - success: sale value added to the ticker's total; the updated record
//!   stored, or removed once it has no open shares (trades carry none)
//! - failure: appended to the failure log, nothing else changes
//!
//! Records are processed strictly in input order.

use crate::codec::RecordLayout;
use crate::error::Result;
use crate::failures::FailureLog;
use crate::handler::handle_message;
use crate::ledger::OrderLedger;
use crate::report::{top_n, TopN, DEFAULT_TOP_N};
use crate::source::RecordSource;
use crate::summary::SalesSummary;
use crate::types::{MessageKind, Outcome};

/// Configuration for tracker behavior.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Field offsets of the feed
    pub layout: RecordLayout,

    /// Number of symbols in the report
    pub top_n: usize,

    /// Log and skip undecodable records instead of returning an error
    pub skip_malformed: bool,

    /// Log every rejected message at debug level
    pub log_failures: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            layout: RecordLayout::pitch(),
            top_n: DEFAULT_TOP_N,
            skip_malformed: false,
            log_failures: true,
        }
    }
}

impl TrackerConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-standard record layout.
    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the report size.
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Enable/disable skipping of malformed records.
    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    /// Enable/disable failure logs.
    pub fn with_logging(mut self, log: bool) -> Self {
        self.log_failures = log;
        self
    }
}

/// Counters for monitoring a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Records handled (successes + failures)
    pub records_processed: u64,

    /// Records accepted
    pub successes: u64,

    /// Records rejected
    pub failures: u64,

    /// Undecodable records skipped (`skip_malformed`)
    pub malformed_skipped: u64,

    /// Accepted add messages
    pub adds: u64,

    /// Accepted execute messages
    pub executions: u64,

    /// Accepted cancel messages
    pub cancels: u64,

    /// Accepted trade messages
    pub trades: u64,

    /// Open orders after the last record
    pub open_orders: usize,

    /// Timestamp of the last handled record
    pub last_timestamp: Option<u64>,
}

/// Final state of a run, split into owned parts.
#[derive(Debug, Clone, Default)]
pub struct TrackerParts {
    pub ledger: OrderLedger,
    pub failures: FailureLog,
    pub summary: SalesSummary,
    pub stats: TrackerStats,
}

/// Sequential fold over a PITCH record stream.
///
/// # Example
/// ```
/// use pitch_sales::SalesTracker;
///
/// let mut tracker = SalesTracker::new();
/// tracker.process_records([
///     "11111111A000000000007S000010XYZxyz0000000005Y",
///     "11111112E000000000007000004000000000001",
///     "11111113E000000000008000004000000000002",
/// ]).unwrap();
///
/// assert_eq!(tracker.summary().get("XYZxyz"), Some(20));
/// assert_eq!(tracker.ledger().get(7).map(|o| o.amount), Some(6));
/// assert_eq!(tracker.failures().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SalesTracker {
    config: TrackerConfig,
    ledger: OrderLedger,
    failures: FailureLog,
    summary: SalesSummary,
    stats: TrackerStats,
    layout_checked: bool,
}

impl SalesTracker {
    /// Create a tracker with default configuration.
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    /// Create a tracker with custom configuration.
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            ledger: OrderLedger::new(),
            failures: FailureLog::new(),
            summary: SalesSummary::new(),
            stats: TrackerStats::default(),
            layout_checked: false,
        }
    }

    /// Get a reference to the current configuration.
    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Handle one raw record and fold its outcome into the running state.
    ///
    /// Returns the outcome so callers can react per message.
    ///
    /// # Errors
    /// `PitchError::Config` if the configured layout is invalid (checked on
    /// the first record). `PitchError::MalformedRecord` if the record does
    /// not decode and `skip_malformed` is off. State is untouched in both
    /// cases.
    pub fn process_record(&mut self, raw: &str) -> Result<Option<Outcome>> {
        if !self.layout_checked {
            if let Err(e) = self.config.layout.validate() {
                log::error!("Rejecting record layout: {e}");
                return Err(e);
            }
            self.layout_checked = true;
        }

        let outcome = match handle_message(&self.ledger, raw, &self.config.layout) {
            Ok(outcome) => outcome,
            Err(e) if e.is_malformed() && self.config.skip_malformed => {
                log::warn!("Skipping malformed record: {e}");
                self.stats.malformed_skipped += 1;
                return Ok(None);
            }
            Err(e) => {
                log::error!("Malformed record: {e}");
                return Err(e);
            }
        };

        self.apply(&outcome, raw);
        Ok(Some(outcome))
    }

    /// Fold an outcome into ledger, summary, failure log and stats.
    fn apply(&mut self, outcome: &Outcome, raw: &str) {
        self.stats.records_processed += 1;
        self.stats.last_timestamp = Some(outcome.timestamp());

        match outcome {
            Outcome::Success(success) => {
                self.stats.successes += 1;
                self.summary.record(&success.ticker, success.value);
                if let Some(record) = &success.record {
                    self.ledger.apply(record.clone());
                }
                self.count_kind(raw);
            }
            Outcome::Failure(failure) => {
                self.stats.failures += 1;
                if self.config.log_failures {
                    log::debug!("Rejected message #{}: {failure}", self.stats.records_processed);
                }
                self.failures.push(failure.clone());
            }
        }

        self.stats.open_orders = self.ledger.len();
    }

    /// Per-kind counters for accepted messages.
    #[inline]
    fn count_kind(&mut self, raw: &str) {
        let kind = raw
            .as_bytes()
            .get(self.config.layout.message_type)
            .and_then(|b| MessageKind::from_byte(*b));
        match kind {
            Some(MessageKind::Add) => self.stats.adds += 1,
            Some(MessageKind::Execute) => self.stats.executions += 1,
            Some(MessageKind::Cancel) => self.stats.cancels += 1,
            Some(MessageKind::Trade) => self.stats.trades += 1,
            None => {}
        }
    }

    /// Process a sequence of raw records in order.
    ///
    /// Stops at the first malformed record unless `skip_malformed` is set.
    pub fn process_records<I, S>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in records {
            self.process_record(raw.as_ref())?;
        }
        Ok(())
    }

    /// Drain a record source into the tracker.
    pub fn process_source<S: RecordSource>(&mut self, source: S) -> Result<()> {
        let origin = source
            .metadata()
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| source.metadata().provider.clone())
            .unwrap_or_else(|| "unknown".to_string());

        for raw in source.records()? {
            self.process_record(&raw?)?;
        }

        log::info!(
            "Processed {} records from {origin}: {} accepted, {} rejected, {} skipped, {} open orders ({} shares), {} symbols, total value {}",
            self.stats.records_processed,
            self.stats.successes,
            self.stats.failures,
            self.stats.malformed_skipped,
            self.stats.open_orders,
            self.ledger.open_shares(),
            self.summary.len(),
            self.summary.total_value(),
        );
        Ok(())
    }

    /// Open-order ledger.
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// Per-symbol sale totals.
    pub fn summary(&self) -> &SalesSummary {
        &self.summary
    }

    /// Rejected messages, in input order.
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Get current statistics.
    pub fn stats(&self) -> &TrackerStats {
        &self.stats
    }

    /// Rank the `n` best-selling symbols so far.
    pub fn top_n(&self, n: usize) -> TopN {
        top_n(&self.summary, n)
    }

    /// Rank using the configured `top_n`.
    pub fn report(&self) -> TopN {
        self.top_n(self.config.top_n)
    }

    /// Reset to an empty state, keeping the configuration.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.failures.clear();
        self.summary.clear();
        self.stats = TrackerStats::default();
    }

    /// Consume the tracker and return its state.
    pub fn into_parts(self) -> TrackerParts {
        TrackerParts {
            ledger: self.ledger,
            failures: self.failures,
            summary: self.summary,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PitchError;
    use crate::failures::FailureCategory;
    use crate::source::VecSource;

    fn quiet() -> SalesTracker {
        SalesTracker::with_config(TrackerConfig::new().with_logging(false))
    }

    /// Add record builder: 12-char base-36 id, shares, 6-char symbol, price.
    fn add(ts: u64, id: &str, shares: u32, symbol: &str, price: u64) -> String {
        format!("{ts:08}A{id:0>12}B{shares:06}{symbol:<6}{price:010}Y")
    }

    fn exec(ts: u64, id: &str, shares: u32) -> String {
        format!("{ts:08}E{id:0>12}{shares:06}000000000001")
    }

    fn cancel(ts: u64, id: &str, shares: u32) -> String {
        format!("{ts:08}X{id:0>12}{shares:06}")
    }

    fn trade(ts: u64, id: &str, shares: u32, symbol: &str, price: u64) -> String {
        format!("{ts:08}P{id:0>12}S{shares:06}{symbol:<6}{price:010}000000000001")
    }

    #[test]
    fn test_new_tracker() {
        let tracker = SalesTracker::new();
        assert!(tracker.ledger().is_empty());
        assert!(tracker.summary().is_empty());
        assert!(tracker.failures().is_empty());
        assert_eq!(tracker.config().top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn test_add_creates_zero_summary_entry() {
        let mut tracker = quiet();
        tracker.process_record(&add(1, "A1", 100, "AAPL", 50)).unwrap();

        assert_eq!(tracker.ledger().len(), 1);
        assert_eq!(tracker.summary().get("AAPL  "), Some(0));
        assert_eq!(tracker.stats().adds, 1);
    }

    #[test]
    fn test_execute_accumulates_and_partial_stays_open() {
        let mut tracker = quiet();
        tracker
            .process_records([add(1, "A1", 100, "AAPL", 50), exec(2, "A1", 30)])
            .unwrap();

        assert_eq!(tracker.summary().get("AAPL  "), Some(1500));
        let order = tracker.ledger().get(base36("A1")).unwrap();
        assert_eq!(order.amount, 70);
        assert_eq!(order.timestamp, 2);
    }

    #[test]
    fn test_full_execution_removes_order() {
        let mut tracker = quiet();
        tracker
            .process_records([add(1, "A1", 100, "AAPL", 50), exec(2, "A1", 100)])
            .unwrap();

        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.summary().get("AAPL  "), Some(5000));
        assert_eq!(tracker.stats().open_orders, 0);
    }

    #[test]
    fn test_full_cancel_removes_order_without_value() {
        let mut tracker = quiet();
        tracker
            .process_records([add(1, "B2", 10, "MSFT", 7), cancel(2, "B2", 10)])
            .unwrap();

        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.summary().get("MSFT  "), Some(0));
        assert_eq!(tracker.stats().cancels, 1);
    }

    #[test]
    fn test_trade_leaves_ledger_untouched() {
        let mut tracker = quiet();
        tracker
            .process_records([add(1, "A1", 10, "AAPL", 5), trade(2, "ZZ", 4, "IBM", 25)])
            .unwrap();

        assert_eq!(tracker.ledger().len(), 1);
        assert_eq!(tracker.summary().get("IBM   "), Some(100));
        assert_eq!(tracker.stats().trades, 1);
    }

    #[test]
    fn test_last_timestamp_follows_every_message() {
        let mut tracker = quiet();
        assert_eq!(tracker.stats().last_timestamp, None);

        tracker.process_record(&add(100, "A1", 10, "AAPL", 5)).unwrap();
        assert_eq!(tracker.stats().last_timestamp, Some(100));

        tracker.process_record(&trade(200, "ZZ", 4, "IBM", 25)).unwrap();
        assert_eq!(tracker.stats().last_timestamp, Some(200));

        // rejected messages count too
        tracker.process_record(&cancel(300, "A1", 11)).unwrap();
        assert_eq!(tracker.stats().last_timestamp, Some(300));
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let mut bad = RecordLayout::pitch();
        bad.order_id = 7..19;
        let config = TrackerConfig::new()
            .with_layout(bad)
            .with_logging(false)
            .with_skip_malformed(true);
        let mut tracker = SalesTracker::with_config(config);

        let err = tracker
            .process_record(&add(1, "A1", 10, "AAPL", 5))
            .unwrap_err();
        assert!(matches!(err, PitchError::Config(_)));
        assert!(!err.is_malformed());
        assert_eq!(tracker.stats().records_processed, 0);
        assert!(tracker.ledger().is_empty());
    }

    #[test]
    fn test_wide_price_layout_saturates_summary() {
        let mut layout = RecordLayout::pitch();
        layout.price = 34..54;
        let mut tracker = SalesTracker::with_config(
            TrackerConfig::new().with_layout(layout).with_logging(false),
        );

        for ts in ["28800011", "28800012"] {
            let raw = format!("{ts}P000000000001S000002AAPL  18446744073709551615");
            tracker.process_record(&raw).unwrap();
        }
        assert_eq!(tracker.summary().get("AAPL  "), Some(u64::MAX));
    }

    #[test]
    fn test_failure_is_logged_and_state_kept() {
        let mut tracker = quiet();
        tracker
            .process_records([
                add(5, "A1", 10, "AAPL", 5),
                cancel(6, "A1", 11),
                exec(3, "A1", 1),
                add(7, "A1", 1, "AAPL", 5),
            ])
            .unwrap();

        assert_eq!(tracker.failures().len(), 3);
        assert_eq!(tracker.failures().count_by_category(FailureCategory::Overdraft), 1);
        assert_eq!(tracker.failures().count_by_category(FailureCategory::StaleEvent), 1);
        assert_eq!(tracker.failures().count_by_category(FailureCategory::DuplicateAdd), 1);

        let order = tracker.ledger().get(base36("A1")).unwrap();
        assert_eq!(order.amount, 10);
        assert_eq!(order.timestamp, 5);
        assert_eq!(tracker.summary().get("AAPL  "), Some(0));
        assert_eq!(tracker.stats().failures, 3);
        assert_eq!(tracker.stats().successes, 1);
    }

    #[test]
    fn test_malformed_aborts_by_default() {
        let mut tracker = quiet();
        tracker.process_record(&add(1, "A1", 10, "AAPL", 5)).unwrap();

        let result = tracker.process_records(["1111x111E000000000001000001"]);
        assert!(result.is_err());
        assert_eq!(tracker.stats().records_processed, 1);
    }

    #[test]
    fn test_malformed_skipped_when_configured() {
        let config = TrackerConfig::new()
            .with_logging(false)
            .with_skip_malformed(true);
        let mut tracker = SalesTracker::with_config(config);

        tracker
            .process_records([
                "garbage".to_string(),
                add(1, "A1", 10, "AAPL", 5),
                "11111111E00000000A1".to_string(),
                exec(2, "A1", 2),
            ])
            .unwrap();

        assert_eq!(tracker.stats().malformed_skipped, 2);
        assert_eq!(tracker.stats().records_processed, 2);
        assert_eq!(tracker.summary().get("AAPL  "), Some(10));
    }

    #[test]
    fn test_process_source() {
        let source: VecSource = [add(1, "A1", 10, "AAPL", 5), exec(2, "A1", 10)]
            .into_iter()
            .collect();
        let mut tracker = quiet();
        tracker.process_source(source).unwrap();

        assert_eq!(tracker.stats().records_processed, 2);
        assert_eq!(tracker.summary().get("AAPL  "), Some(50));
    }

    #[test]
    fn test_report_uses_configured_n() {
        let config = TrackerConfig::new().with_top_n(2).with_logging(false);
        let mut tracker = SalesTracker::with_config(config);
        tracker
            .process_records([
                trade(1, "1", 1, "AAA", 10),
                trade(1, "2", 1, "BBB", 30),
                trade(1, "3", 1, "CCC", 20),
            ])
            .unwrap();

        let report = tracker.report();
        assert_eq!(report.tickers(), vec!["BBB   ", "CCC   "]);
        assert_eq!(tracker.top_n(5).len(), 3);
    }

    #[test]
    fn test_reset_and_into_parts() {
        let mut tracker = quiet();
        tracker.process_record(&add(1, "A1", 10, "AAPL", 5)).unwrap();

        let parts = tracker.clone().into_parts();
        assert_eq!(parts.ledger.len(), 1);
        assert_eq!(parts.stats.adds, 1);

        tracker.reset();
        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.stats(), &TrackerStats::default());
    }

    fn base36(s: &str) -> u64 {
        crate::base36::decode(s).unwrap()
    }
}
