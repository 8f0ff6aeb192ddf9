//! Request checks applied before a unit of work is opened.

use rust_decimal::Decimal;

use super::error::TransferError;
use super::types::{TransferRequest, fits_money_scale};

/// Rejects non-positive amounts, amounts finer than
/// [`MONEY_SCALE`](super::types::MONEY_SCALE), and
/// self-transfers.
///
/// # Errors
///
/// Returns `InvalidAmount` or `SameAccount`.
pub fn validate_transfer(request: &TransferRequest) -> Result<(), TransferError> {
    if request.amount <= Decimal::ZERO || !fits_money_scale(request.amount) {
        return Err(TransferError::InvalidAmount(request.amount));
    }
    if request.from == request.to {
        return Err(TransferError::SameAccount(request.from));
    }
    Ok(())
}
