//! Failure log for rejected messages.
//!
//! Every message the dispatcher rejects ends up here, in input order.
//! Failures are categorized so a run can be summarized at a glance and
//! exported for root-cause analysis.
//!
//! # Example
//!
//! ```ignore
//! use pitch_sales::{SalesTracker, FailureCategory};
//!
//! let mut tracker = SalesTracker::new();
//! tracker.process_records(lines)?;
//!
//! let log = tracker.failures();
//! println!("Overdrafts: {}", log.count_by_category(FailureCategory::Overdraft));
//! log.export_json("failures.json")?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::types::{Failure, Rejection};

/// Category of a rejection, for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureCategory {
    /// Add for an already-open order
    DuplicateAdd,

    /// Execute/cancel for an order that is not open
    NeverAdded,

    /// Execute/cancel for more shares than are open
    Overdraft,

    /// Message older than the last one seen for its order
    StaleEvent,

    /// Message type outside the handled set
    UnknownMessageType,
}

impl FailureCategory {
    /// All categories, in declaration order.
    pub const ALL: [FailureCategory; 5] = [
        FailureCategory::DuplicateAdd,
        FailureCategory::NeverAdded,
        FailureCategory::Overdraft,
        FailureCategory::StaleEvent,
        FailureCategory::UnknownMessageType,
    ];

    /// Get a human-readable name for the category.
    pub fn name(&self) -> &'static str {
        match self {
            FailureCategory::DuplicateAdd => "DUPLICATE_ADD",
            FailureCategory::NeverAdded => "NEVER_ADDED",
            FailureCategory::Overdraft => "OVERDRAFT",
            FailureCategory::StaleEvent => "STALE_EVENT",
            FailureCategory::UnknownMessageType => "UNKNOWN_MESSAGE_TYPE",
        }
    }

    /// Get severity level (1=low, 2=medium, 3=high).
    ///
    /// Unknown types are expected in real feeds (we only handle four of
    /// them); ledger inconsistencies are not.
    pub fn severity(&self) -> u8 {
        match self {
            FailureCategory::UnknownMessageType => 1,
            FailureCategory::NeverAdded => 2,
            FailureCategory::StaleEvent => 2,
            FailureCategory::DuplicateAdd => 3,
            FailureCategory::Overdraft => 3,
        }
    }
}

impl From<&Rejection> for FailureCategory {
    fn from(reason: &Rejection) -> Self {
        match reason {
            Rejection::DuplicateAdd => FailureCategory::DuplicateAdd,
            Rejection::NeverAdded { .. } => FailureCategory::NeverAdded,
            Rejection::Overdraft { .. } => FailureCategory::Overdraft,
            Rejection::StaleEvent { .. } => FailureCategory::StaleEvent,
            Rejection::UnknownMessageType { .. } => FailureCategory::UnknownMessageType,
        }
    }
}

impl Failure {
    /// Category of this failure.
    pub fn category(&self) -> FailureCategory {
        FailureCategory::from(&self.reason)
    }
}

/// Summary statistics for a failure log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSummary {
    /// Total number of failures
    pub total: u64,

    /// Count by category name
    pub by_category: BTreeMap<String, u64>,

    /// Count by severity
    pub by_severity: BTreeMap<u8, u64>,

    /// Timestamp of the first failure
    pub first_timestamp: Option<u64>,

    /// Timestamp of the last failure
    pub last_timestamp: Option<u64>,

    /// Number of distinct order ids involved
    pub unique_orders: u64,
}

/// Append-only, input-ordered list of failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureLog {
    failures: Vec<Failure>,
}

#[derive(Serialize)]
struct FailureRow<'a> {
    category: &'static str,
    severity: u8,
    order_id: u64,
    timestamp: u64,
    message: String,
    raw: &'a str,
}

impl<'a> From<&'a Failure> for FailureRow<'a> {
    fn from(failure: &'a Failure) -> Self {
        let category = failure.category();
        Self {
            category: category.name(),
            severity: category.severity(),
            order_id: failure.order_id,
            timestamp: failure.timestamp,
            message: failure.message(),
            raw: &failure.raw,
        }
    }
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure.
    #[inline]
    pub fn push(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.failures.iter()
    }

    pub fn as_slice(&self) -> &[Failure] {
        &self.failures
    }

    /// Failures of one category, in input order.
    pub fn by_category(&self, category: FailureCategory) -> Vec<&Failure> {
        self.failures
            .iter()
            .filter(|f| f.category() == category)
            .collect()
    }

    /// Number of failures of one category.
    pub fn count_by_category(&self, category: FailureCategory) -> u64 {
        self.failures
            .iter()
            .filter(|f| f.category() == category)
            .count() as u64
    }

    /// Get summary statistics.
    pub fn summary(&self) -> FailureSummary {
        let mut by_category = BTreeMap::new();
        let mut by_severity = BTreeMap::new();
        let mut orders = HashSet::new();

        for failure in &self.failures {
            let category = failure.category();
            *by_category.entry(category.name().to_string()).or_insert(0) += 1;
            *by_severity.entry(category.severity()).or_insert(0) += 1;
            orders.insert(failure.order_id);
        }

        FailureSummary {
            total: self.failures.len() as u64,
            by_category,
            by_severity,
            first_timestamp: self.failures.first().map(|f| f.timestamp),
            last_timestamp: self.failures.last().map(|f| f.timestamp),
            unique_orders: orders.len() as u64,
        }
    }

    /// Export summary and failures to a JSON file.
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let rows: Vec<FailureRow<'_>> = self.failures.iter().map(FailureRow::from).collect();
        let document = serde_json::json!({
            "summary": self.summary(),
            "failures": rows,
        });
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    /// Export failures to a CSV file (for spreadsheet analysis).
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "category,severity,order_id,timestamp,message,raw")?;

        for failure in &self.failures {
            let row = FailureRow::from(failure);
            writeln!(
                writer,
                "{},{},{},{},{:?},{:?}",
                row.category, row.severity, row.order_id, row.timestamp, row.message, row.raw,
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export, choosing CSV for a `.csv` extension and JSON otherwise.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv {
            self.export_csv(path)
        } else {
            self.export_json(path)
        }
    }

    /// Clear all failures.
    pub fn clear(&mut self) {
        self.failures.clear();
    }
}

impl<'a> IntoIterator for &'a FailureLog {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}
