//! # pitch-sales
//!
//! Order-state tracking and top-N sales reporting for fixed-width PITCH
//! order feeds.
//!
//! The crate replays a stream of PITCH messages (add order, order executed,
//! order cancel, trade), keeps a ledger of open orders, accumulates the
//! executed sale value per symbol and ranks the best-selling symbols.
//!
//! ## Features
//!
//! - **Pure message handlers**: each message type is a pure transition over
//!   the previous order record; business-rule violations are values, not errors
//! - **Strict ordering checks**: duplicate adds, overdrafts and out-of-order
//!   events are rejected per order and never corrupt the ledger
//! - **Configurable layout**: field offsets live in [`RecordLayout`]
//! - **Failure log**: categorized, summarized, exportable to JSON/CSV
//! - **Sources**: in-memory records or PITCH capture files (`S` framing stripped)
//!
//! ## Quick Start
//!
//! ```rust
//! use pitch_sales::SalesTracker;
//!
//! let mut tracker = SalesTracker::new();
//!
//! tracker.process_records([
//!     // add order 7: 100 shares of AAPL at 50
//!     "28800000A000000000007B000100AAPL  0000000050Y",
//!     // execute 40 shares of order 7
//!     "28800100E000000000007000040000000000001",
//!     // hidden-order trade: 10 shares of MSFT at 300
//!     "28800200P00000000000ZS000010MSFT  0000000300000000000002",
//! ]).unwrap();
//!
//! let top = tracker.top_n(10);
//! assert_eq!(top.tickers(), vec!["MSFT  ", "AAPL  "]);
//! assert_eq!(top.entries[0].value, 3000);
//! assert_eq!(top.entries[1].value, 2000);
//! ```
//!
//! ### Reading a capture file
//!
//! ```ignore
//! use pitch_sales::{FileSource, SalesTracker, TrackerConfig};
//!
//! let source = FileSource::open("data/pitch_example_data")?;
//! let mut tracker = SalesTracker::with_config(TrackerConfig::new().with_skip_malformed(true));
//! tracker.process_source(source)?;
//!
//! for entry in tracker.report().iter() {
//!     println!("{} {}", entry.ticker, entry.value);
//! }
//! if !tracker.failures().is_empty() {
//!     tracker.failures().export_json("failures.json")?;
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | `MessageKind`, `OrderState`, `Outcome`, `Success`, `Failure`, `Rejection` |
//! | [`codec`] | Fixed-width field extraction: `RecordLayout`, `decode_header` |
//! | [`base36`] | Order id encoding |
//! | [`ledger`] | Open-order ledger: `OrderLedger` |
//! | [`handler`] | Per-type transitions and `handle_message` dispatcher |
//! | [`tracker`] | Stream reducer: `SalesTracker`, `TrackerConfig`, `TrackerStats` |
//! | [`summary`] | Per-symbol totals: `SalesSummary` |
//! | [`report`] | Ranking: `top_n`, `TopN` |
//! | [`failures`] | Failure log: `FailureLog`, `FailureCategory`, `FailureSummary` |
//! | [`source`] | Record sources: `RecordSource`, `VecSource`, `FileSource` |

pub mod base36;
pub mod codec;
pub mod error;
pub mod failures;
pub mod handler;
pub mod ledger;
pub mod report;
pub mod source;
pub mod summary;
pub mod tracker;
pub mod types;

// Re-exports - Core types
pub use error::{PitchError, Result};
pub use types::{Failure, MessageKind, OrderState, Outcome, ReduceAction, Rejection, Success};

// Re-exports - Decoding and dispatch
pub use codec::RecordLayout;
pub use handler::{handle_add, handle_cancel, handle_execute, handle_message, handle_trade};
pub use ledger::OrderLedger;

// Re-exports - Reduction and reporting
pub use report::{top_n, SymbolSales, TopN, DEFAULT_TOP_N};
pub use summary::SalesSummary;
pub use tracker::{SalesTracker, TrackerConfig, TrackerParts, TrackerStats};

// Re-exports - Failures
pub use failures::{FailureCategory, FailureLog, FailureSummary};

// Re-exports - Sources
pub use source::{FileSource, RecordSource, SourceMetadata, VecSource};
