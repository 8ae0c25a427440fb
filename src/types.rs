//! Core data types for PITCH messages and order state.
//!
//! - [`MessageKind`]: the closed set of message types the tracker handles
//! - [`OrderState`]: one open order in the ledger
//! - [`Outcome`]: result of handling one message, either [`Success`] or [`Failure`]
//! - [`Rejection`]: why a message was rejected

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::base36;

/// PITCH message type (byte at the message-type offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    /// New order enters the book
    Add = b'A',
    /// Shares of an open order were executed
    Execute = b'E',
    /// Shares of an open order were withdrawn
    Cancel = b'X',
    /// Execution against a non-displayed order (not tracked in the ledger)
    Trade = b'P',
}

impl MessageKind {
    /// Parse a message kind from its wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(MessageKind::Add),
            b'E' => Some(MessageKind::Execute),
            b'X' => Some(MessageKind::Cancel),
            b'P' => Some(MessageKind::Trade),
            _ => None,
        }
    }

    /// Convert to the wire byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}

/// Which side of the shared decrease transition is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceAction {
    Execute,
    Cancel,
}

impl ReduceAction {
    /// Whether the decrease realizes sale value.
    #[inline]
    pub fn is_sale(self) -> bool {
        matches!(self, ReduceAction::Execute)
    }

    /// Verb used in diagnostics.
    pub fn verb(self) -> &'static str {
        match self {
            ReduceAction::Execute => "execute",
            ReduceAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ReduceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// An open order.
///
/// A record exists in the ledger only while `amount > 0`. Ticker and price
/// are fixed by the add message; later messages only move `timestamp` and
/// `amount` (see [`OrderState::updated`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderState {
    /// Order identifier (base-36 on the wire)
    pub order_id: u64,

    /// Timestamp of the last message that touched this order
    pub timestamp: u64,

    /// Stock symbol, raw fixed-width field (padding included)
    pub ticker: String,

    /// Remaining open shares
    pub amount: u32,

    /// Per-share price, fixed at creation
    pub price: u64,
}

impl OrderState {
    /// Create a new order record.
    pub fn new(
        order_id: u64,
        timestamp: u64,
        ticker: impl Into<String>,
        amount: u32,
        price: u64,
    ) -> Self {
        Self {
            order_id,
            timestamp,
            ticker: ticker.into(),
            amount,
            price,
        }
    }

    /// Derive a copy with a new timestamp and amount.
    pub fn updated(&self, timestamp: u64, amount: u32) -> Self {
        Self {
            timestamp,
            amount,
            ..self.clone()
        }
    }

    /// Whether the order still has open shares.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.amount > 0
    }
}

/// Good outcome of handling a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    /// Timestamp of the accepted message
    pub timestamp: u64,

    /// Updated order record to store, absent for trades
    pub record: Option<OrderState>,

    /// Stock symbol involved
    pub ticker: String,

    /// Sale value realized by this message (0 unless execute/trade)
    pub value: u64,
}

/// Reason a message was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Add for an order id that is already open
    #[error("Duplicate Add record")]
    DuplicateAdd,

    /// Execute/cancel for an order id with no open record
    #[error("Cannot {action} order, it was never added")]
    NeverAdded { action: ReduceAction },

    /// Execute/cancel for more shares than are open
    #[error("Trying to {action} {requested} shares when only got {open}")]
    Overdraft {
        action: ReduceAction,
        requested: u32,
        open: u32,
    },

    /// Message older than the last one seen for this order
    #[error("Event '{}' from past; already seen {last_seen}", .kind.escape_ascii())]
    StaleEvent { kind: u8, last_seen: u64 },

    /// Message type outside the handled set
    #[error("Unknown message type '{}'", .kind.escape_ascii())]
    UnknownMessageType { kind: u8 },
}

/// Bad outcome of handling a message.
///
/// Displays as `"<reason>: order <base36 id> at <timestamp>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Order the failure refers to
    pub order_id: u64,

    /// Timestamp of the rejected message
    pub timestamp: u64,

    /// Why the message was rejected
    pub reason: Rejection,

    /// The rejected record, for troubleshooting
    pub raw: String,
}

impl Failure {
    pub fn new(order_id: u64, timestamp: u64, reason: Rejection, raw: &str) -> Self {
        Self {
            order_id,
            timestamp,
            reason,
            raw: raw.to_string(),
        }
    }

    /// Human-readable diagnostic.
    pub fn message(&self) -> String {
        self.reason.to_string()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: order {} at {}",
            self.reason,
            base36::encode(self.order_id),
            self.timestamp
        )
    }
}

impl std::error::Error for Failure {}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success(Success),
    Failure(Failure),
}

impl Outcome {
    /// Successful outcome.
    pub fn success(
        timestamp: u64,
        record: Option<OrderState>,
        ticker: impl Into<String>,
        value: u64,
    ) -> Self {
        Outcome::Success(Success {
            timestamp,
            record,
            ticker: ticker.into(),
            value,
        })
    }

    /// Failed outcome.
    pub fn failure(order_id: u64, timestamp: u64, reason: Rejection, raw: &str) -> Self {
        Outcome::Failure(Failure::new(order_id, timestamp, reason, raw))
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Get the success payload, if any.
    pub fn as_success(&self) -> Option<&Success> {
        match self {
            Outcome::Success(s) => Some(s),
            Outcome::Failure(_) => None,
        }
    }

    /// Get the failure payload, if any.
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(f) => Some(f),
        }
    }

    /// Timestamp of the handled message.
    pub fn timestamp(&self) -> u64 {
        match self {
            Outcome::Success(s) => s.timestamp,
            Outcome::Failure(f) => f.timestamp,
        }
    }
}
