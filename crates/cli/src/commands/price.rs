//! Price formatting command.

use kanty_core::{CurrencyCode, Price};

use super::CommandError;

/// Print `amount` formatted for display.
///
/// # Errors
///
/// Returns `CommandError::Price` if `amount` is not a valid price.
#[allow(clippy::print_stdout)]
pub fn format(amount: &str, currency: CurrencyCode) -> Result<(), CommandError> {
    let amount = Price::parse_amount(amount)?;
    println!("{}", Price::new(amount, currency));
    Ok(())
}
