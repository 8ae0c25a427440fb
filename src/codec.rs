//! Fixed-width PITCH record decoding.
//!
//! Every record (framing `S` and line terminator already stripped) starts
//! with the same header:
//!
//! ```text
//! offset  0        8  9            21
//!         |timestamp|T|order id     |payload...
//! ```
//!
//! followed by a type-specific payload:
//!
//! | Kind | Payload fields |
//! |------|----------------|
//! | Add / Trade | side `[21]`, shares `[22,28)`, symbol `[28,34)`, price `[34,44)` |
//! | Execute / Cancel | shares `[21,27)` |
//!
//! All offsets live in [`RecordLayout`] so that a feed variant with a
//! different id width can be handled without touching the handlers.

use std::ops::Range;
use std::str::FromStr;

use crate::base36;
use crate::error::{PitchError, Result};

/// Byte ranges of every field the tracker reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    /// Decimal timestamp
    pub timestamp: Range<usize>,

    /// Single message-type byte
    pub message_type: usize,

    /// Base-36 order id
    pub order_id: Range<usize>,

    /// Shares field of add/trade messages
    pub order_amount: Range<usize>,

    /// Symbol field of add/trade messages
    pub ticker: Range<usize>,

    /// Price field of add/trade messages
    pub price: Range<usize>,

    /// Shares field of execute/cancel messages
    pub reduce_amount: Range<usize>,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            timestamp: 0..8,
            message_type: 8,
            order_id: 9..21,
            order_amount: 22..28,
            ticker: 28..34,
            price: 34..44,
            reduce_amount: 21..27,
        }
    }
}

impl RecordLayout {
    /// Standard CBOE PITCH layout (same as `Default`).
    pub fn pitch() -> Self {
        Self::default()
    }

    /// Set the order-id width, shifting every payload field accordingly.
    pub fn with_order_id_width(mut self, width: usize) -> Self {
        let old_end = self.order_id.end;
        let new_end = self.order_id.start + width;
        let shift = |r: &Range<usize>| {
            if r.start >= old_end {
                (r.start - old_end + new_end)..(r.end - old_end + new_end)
            } else {
                r.clone()
            }
        };
        self.order_amount = shift(&self.order_amount);
        self.ticker = shift(&self.ticker);
        self.price = shift(&self.price);
        self.reduce_amount = shift(&self.reduce_amount);
        self.order_id = self.order_id.start..new_end;
        self
    }

    /// Check that no field is empty and that the header fields do not overlap.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("timestamp", &self.timestamp),
            ("order_id", &self.order_id),
            ("order_amount", &self.order_amount),
            ("ticker", &self.ticker),
            ("price", &self.price),
            ("reduce_amount", &self.reduce_amount),
        ];
        for (name, range) in fields {
            if range.start >= range.end {
                return Err(PitchError::config(format!(
                    "field {name} has empty range {range:?}"
                )));
            }
        }

        if self.timestamp.contains(&self.message_type)
            || self.order_id.contains(&self.message_type)
            || overlaps(&self.timestamp, &self.order_id)
        {
            return Err(PitchError::config("header fields overlap"));
        }

        Ok(())
    }

    /// Minimum record length for add/trade messages.
    pub fn order_record_len(&self) -> usize {
        self.order_amount.end.max(self.ticker.end).max(self.price.end)
    }

    /// Minimum record length for execute/cancel messages.
    pub fn reduce_record_len(&self) -> usize {
        self.reduce_amount.end
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Fields common to every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub timestamp: u64,

    /// Raw message-type byte (may be outside the handled set)
    pub kind: u8,

    /// Decoded order id; `None` when the id field is not base-36
    pub order_id: Option<u64>,
}

/// Payload of add and trade messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPayload {
    pub amount: u32,
    pub ticker: String,
    pub price: u64,
}

/// Slice a field out of a record.
#[inline]
fn field<'a>(record: &'a str, range: &Range<usize>, name: &str) -> Result<&'a str> {
    record.get(range.clone()).ok_or_else(|| {
        PitchError::malformed(
            format!("record too short for {name} at {range:?}"),
            record,
        )
    })
}

#[inline]
fn check_len(record: &str, min: usize, kind: &str) -> Result<()> {
    if record.len() < min {
        return Err(PitchError::malformed(
            format!("{kind} record has {} bytes, needs {min}", record.len()),
            record,
        ));
    }
    Ok(())
}

/// Parse a zero-padded decimal field.
#[inline]
fn decimal<T: FromStr>(record: &str, range: &Range<usize>, name: &str) -> Result<T> {
    let raw = field(record, range, name)?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PitchError::malformed(
            format!("{name} is not decimal: {raw:?}"),
            record,
        ));
    }
    raw.parse()
        .map_err(|_| PitchError::malformed(format!("{name} out of range: {raw}"), record))
}

/// Decode timestamp, message type and order id.
///
/// A record too short for the id or with a non-base-36 id still decodes:
/// the dispatcher decides whether the id is required for the message type.
pub fn decode_header(record: &str, layout: &RecordLayout) -> Result<Header> {
    let timestamp = decimal(record, &layout.timestamp, "timestamp")?;
    let kind = *record.as_bytes().get(layout.message_type).ok_or_else(|| {
        PitchError::malformed("record too short for message type", record)
    })?;
    let order_id = record.get(layout.order_id.clone()).and_then(base36::decode);

    Ok(Header {
        timestamp,
        kind,
        order_id,
    })
}

/// Decode shares, symbol and price of an add or trade message.
pub fn decode_order_payload(record: &str, layout: &RecordLayout) -> Result<OrderPayload> {
    check_len(record, layout.order_record_len(), "add/trade")?;
    let amount = decimal(record, &layout.order_amount, "shares")?;
    let ticker = field(record, &layout.ticker, "symbol")?.to_string();
    let price = decimal(record, &layout.price, "price")?;

    Ok(OrderPayload {
        amount,
        ticker,
        price,
    })
}

/// Decode the share count of an execute or cancel message.
pub fn decode_reduce_amount(record: &str, layout: &RecordLayout) -> Result<u32> {
    check_len(record, layout.reduce_record_len(), "execute/cancel")?;
    decimal(record, &layout.reduce_amount, "shares")
}
