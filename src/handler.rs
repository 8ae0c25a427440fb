//! Per-message-type transitions and the dispatcher.
//!
//! Every handler is a pure function of the previous order record (if any)
//! and the raw message. Business-rule violations come back as
//! [`Outcome::Failure`]; only records that do not decode per the
//! [`RecordLayout`] produce an `Err`.
//!
//! | Kind | Needs open order | Effect | Sale value |
//! |------|------------------|--------|------------|
//! | Add | no | create record | 0 |
//! | Execute | yes | decrease amount | shares x price |
//! | Cancel | yes | decrease amount | 0 |
//! | Trade | ignored | none | shares x price |

use crate::codec::{self, RecordLayout};
use crate::error::{PitchError, Result};
use crate::ledger::OrderLedger;
use crate::types::{MessageKind, OrderState, Outcome, ReduceAction, Rejection};

/// Handle an add message: open a new order.
pub fn handle_add(
    prev: Option<&OrderState>,
    timestamp: u64,
    order_id: u64,
    raw: &str,
    layout: &RecordLayout,
) -> Result<Outcome> {
    if prev.is_some() {
        // never overwrite: price or symbol may differ from the open order
        return Ok(Outcome::failure(
            order_id,
            timestamp,
            Rejection::DuplicateAdd,
            raw,
        ));
    }

    let payload = codec::decode_order_payload(raw, layout)?;
    let record = OrderState::new(
        order_id,
        timestamp,
        payload.ticker.clone(),
        payload.amount,
        payload.price,
    );
    Ok(Outcome::success(timestamp, Some(record), payload.ticker, 0))
}

/// Handle an execute message: fill shares of an open order.
#[inline]
pub fn handle_execute(
    prev: Option<&OrderState>,
    timestamp: u64,
    order_id: u64,
    raw: &str,
    layout: &RecordLayout,
) -> Result<Outcome> {
    reduce_order(prev, timestamp, order_id, raw, layout, ReduceAction::Execute)
}

/// Handle a cancel message: withdraw shares of an open order.
#[inline]
pub fn handle_cancel(
    prev: Option<&OrderState>,
    timestamp: u64,
    order_id: u64,
    raw: &str,
    layout: &RecordLayout,
) -> Result<Outcome> {
    reduce_order(prev, timestamp, order_id, raw, layout, ReduceAction::Cancel)
}

/// Handle a trade message.
///
/// Trades report executions of orders that never appeared in the feed, so
/// the previous record is not consulted.
pub fn handle_trade(
    _prev: Option<&OrderState>,
    timestamp: u64,
    _order_id: u64,
    raw: &str,
    layout: &RecordLayout,
) -> Result<Outcome> {
    let payload = codec::decode_order_payload(raw, layout)?;
    let value = sale_value(payload.amount, payload.price);
    Ok(Outcome::success(timestamp, None, payload.ticker, value))
}

/// Shared decrease for execute and cancel.
///
/// Rejects when no order is open or when more shares are requested than
/// remain; otherwise returns the record with the new amount and timestamp.
fn reduce_order(
    prev: Option<&OrderState>,
    timestamp: u64,
    order_id: u64,
    raw: &str,
    layout: &RecordLayout,
    action: ReduceAction,
) -> Result<Outcome> {
    let Some(prev) = prev else {
        return Ok(Outcome::failure(
            order_id,
            timestamp,
            Rejection::NeverAdded { action },
            raw,
        ));
    };

    let requested = codec::decode_reduce_amount(raw, layout)?;
    if requested > prev.amount {
        return Ok(Outcome::failure(
            order_id,
            timestamp,
            Rejection::Overdraft {
                action,
                requested,
                open: prev.amount,
            },
            raw,
        ));
    }

    let record = prev.updated(timestamp, prev.amount - requested);
    let value = if action.is_sale() {
        sale_value(requested, prev.price)
    } else {
        0
    };
    Ok(Outcome::success(
        timestamp,
        Some(record),
        prev.ticker.clone(),
        value,
    ))
}

/// Shares times price, saturating at `u64::MAX` for wide price fields.
#[inline]
fn sale_value(shares: u32, price: u64) -> u64 {
    u64::from(shares).saturating_mul(price)
}

/// Decode and handle one raw record against the current ledger.
///
/// Checks run in this order:
/// 1. a stored record newer than the message rejects it (any kind);
/// 2. a message type outside `A`/`E`/`X`/`P` is rejected;
/// 3. the handler for the kind runs.
///
/// The ledger is never modified here.
///
/// # Errors
/// `PitchError::MalformedRecord` when a field the message type needs
/// cannot be decoded.
///
/// # Example
/// ```
/// use pitch_sales::{handle_message, OrderLedger, RecordLayout};
///
/// let ledger = OrderLedger::new();
/// let raw = "11111111A000000000007S000001XYZxyz0000000005Y";
/// let outcome = handle_message(&ledger, raw, &RecordLayout::pitch()).unwrap();
///
/// let success = outcome.as_success().unwrap();
/// assert_eq!(success.ticker, "XYZxyz");
/// assert_eq!(success.value, 0);
/// ```
pub fn handle_message(ledger: &OrderLedger, raw: &str, layout: &RecordLayout) -> Result<Outcome> {
    let header = codec::decode_header(raw, layout)?;
    let kind = MessageKind::from_byte(header.kind);

    let order_id = match (header.order_id, kind) {
        (Some(id), _) => id,
        // unknown messages have their own layouts; the id slot may hold anything
        (None, None) => 0,
        (None, Some(_)) => {
            return Err(PitchError::malformed("order id is not base-36", raw));
        }
    };

    let prev = ledger.get(order_id);
    if let Some(prev) = prev {
        if prev.timestamp > header.timestamp {
            return Ok(Outcome::failure(
                order_id,
                header.timestamp,
                Rejection::StaleEvent {
                    kind: header.kind,
                    last_seen: prev.timestamp,
                },
                raw,
            ));
        }
    }

    let Some(kind) = kind else {
        return Ok(Outcome::failure(
            order_id,
            header.timestamp,
            Rejection::UnknownMessageType {
                kind: header.kind,
            },
            raw,
        ));
    };

    let handler = match kind {
        MessageKind::Add => handle_add,
        MessageKind::Execute => handle_execute,
        MessageKind::Cancel => handle_cancel,
        MessageKind::Trade => handle_trade,
    };
    handler(prev, header.timestamp, order_id, raw, layout)
}
