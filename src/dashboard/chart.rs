//! Daily buckets for the "Working Capital" chart

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::format::format_day_label;
use crate::invoice::{Invoice, InvoiceStatus};

/// One point on the chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartBucket {
    pub date: NaiveDate,
    /// Axis label, e.g. `Apr 20`
    pub label: String,
    /// Sum of paid amounts due on this day
    pub income: f64,
    /// Sum of unpaid amounts due on this day
    pub expense: f64,
}

/// Bucket invoices by due date, ordered by date
///
/// With `window_days`, only buckets in the last N days up to and including
/// `today` are kept. A window reaching past the earliest representable date
/// has no lower bound.
pub fn daily_buckets(
    invoices: &[Invoice],
    today: NaiveDate,
    window_days: Option<u32>,
) -> Vec<ChartBucket> {
    let bounded = window_days.is_some();
    let start = window_days.and_then(|days| {
        Duration::try_days(i64::from(days.max(1)) - 1)
            .and_then(|span| today.checked_sub_signed(span))
    });

    let mut buckets: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for inv in invoices {
        if bounded && inv.due_date > today {
            continue;
        }
        if start.is_some_and(|start| inv.due_date < start) {
            continue;
        }
        let entry = buckets.entry(inv.due_date).or_insert((0.0, 0.0));
        match inv.status {
            InvoiceStatus::Paid => entry.0 += inv.amount,
            InvoiceStatus::Unpaid => entry.1 += inv.amount,
            InvoiceStatus::Pending => {}
        }
    }

    buckets
        .into_iter()
        .map(|(date, (income, expense))| ChartBucket {
            date,
            label: format_day_label(date),
            income,
            expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn invoice(amount: f64, due: NaiveDate, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            client_name: "Client".to_string(),
            client_email: "c@example.com".to_string(),
            amount,
            vat_percentage: 0.0,
            vat_amount: 0.0,
            total: amount,
            due_date: due,
            status,
            created_at: None,
            updated_at: None,
            current_user: "u".to_string(),
        }
    }

    #[test]
    fn test_buckets_split_income_and_expense() {
        let list = vec![
            invoice(100.0, date(4, 21), InvoiceStatus::Paid),
            invoice(50.0, date(4, 20), InvoiceStatus::Unpaid),
            invoice(25.0, date(4, 21), InvoiceStatus::Unpaid),
            invoice(10.0, date(4, 21), InvoiceStatus::Paid),
            invoice(999.0, date(4, 21), InvoiceStatus::Pending),
        ];
        let buckets = daily_buckets(&list, date(4, 30), None);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "Apr 20");
        assert_eq!(buckets[0].income, 0.0);
        assert_eq!(buckets[0].expense, 50.0);
        assert_eq!(buckets[1].label, "Apr 21");
        assert_eq!(buckets[1].income, 110.0);
        assert_eq!(buckets[1].expense, 25.0);
    }

    #[test]
    fn test_window_keeps_last_days() {
        let list = vec![
            invoice(1.0, date(4, 13), InvoiceStatus::Paid),
            invoice(2.0, date(4, 14), InvoiceStatus::Paid),
            invoice(3.0, date(4, 20), InvoiceStatus::Paid),
            invoice(4.0, date(4, 21), InvoiceStatus::Paid),
        ];
        let buckets = daily_buckets(&list, date(4, 20), Some(7));
        let dates: Vec<NaiveDate> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(4, 14), date(4, 20)]);
    }

    #[test]
    fn test_huge_window_has_no_lower_bound() {
        let list = vec![
            invoice(1.0, NaiveDate::MIN, InvoiceStatus::Paid),
            invoice(2.0, date(4, 20), InvoiceStatus::Unpaid),
            invoice(3.0, date(4, 21), InvoiceStatus::Paid),
        ];
        let buckets = daily_buckets(&list, date(4, 20), Some(u32::MAX));
        let dates: Vec<NaiveDate> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![NaiveDate::MIN, date(4, 20)]);
    }

    #[test]
    fn test_empty_series() {
        assert!(daily_buckets(&[], date(1, 1), Some(7)).is_empty());
    }
}
