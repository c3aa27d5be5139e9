//! VAT arithmetic
//!
//! The derived invoice amounts are always computed here from the amount and
//! VAT percentage. Stored derived values are never read back as input.

use serde::{Deserialize, Serialize};

/// VAT charged on `amount` at `vat_percentage` percent
pub fn vat_amount(amount: f64, vat_percentage: f64) -> f64 {
    amount * vat_percentage / 100.0
}

/// Amount plus VAT
pub fn total(amount: f64, vat_amount: f64) -> f64 {
    amount + vat_amount
}

/// Derived amounts of an invoice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Amounts {
    pub vat_amount: f64,
    pub total: f64,
}

impl Amounts {
    pub fn compute(amount: f64, vat_percentage: f64) -> Self {
        let vat_amount = vat_amount(amount, vat_percentage);
        Self {
            vat_amount,
            total: total(amount, vat_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_amount() {
        assert_eq!(vat_amount(1000.0, 7.5), 75.0);
        assert_eq!(vat_amount(0.0, 50.0), 0.0);
        assert_eq!(vat_amount(250.0, 0.0), 0.0);
        assert_eq!(vat_amount(80.0, 100.0), 80.0);
    }

    #[test]
    fn test_total_is_amount_plus_vat() {
        for (amount, pct) in [(1000.0, 7.5), (19.99, 20.0), (0.0, 0.0), (1234.5, 12.5)] {
            let amounts = Amounts::compute(amount, pct);
            assert_eq!(amounts.vat_amount, amount * pct / 100.0);
            assert_eq!(amounts.total, amount + amounts.vat_amount);
        }
    }
}
