//! Dashboard overview metrics

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::format::format_currency;
use crate::invoice::{Invoice, InvoiceStatus};

/// Default lookahead for "upcoming due" invoices
pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;

/// Aggregated metrics over one user's invoices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_invoices: usize,
    /// Sum of amounts over every invoice regardless of status
    pub total_income: f64,
    pub amount_paid: f64,
    /// VAT collected on paid invoices
    pub total_vat: f64,
    /// Sum of amounts over unpaid invoices
    pub pending_payments: f64,
    /// Unpaid invoices due after today and within the window, soonest first
    pub upcoming_due: Vec<Invoice>,
    /// Unpaid invoices due today or earlier, oldest first
    pub overdue: Vec<Invoice>,
}

impl Overview {
    pub fn compute(invoices: &[Invoice], today: NaiveDate, upcoming_window_days: i64) -> Self {
        let horizon = Duration::try_days(upcoming_window_days.max(0))
            .and_then(|window| today.checked_add_signed(window))
            .unwrap_or(NaiveDate::MAX);
        let mut overview = Overview {
            total_invoices: invoices.len(),
            ..Default::default()
        };

        for inv in invoices {
            overview.total_income += inv.amount;
            match inv.status {
                InvoiceStatus::Paid => {
                    overview.amount_paid += inv.amount;
                    overview.total_vat += inv.vat_amount;
                }
                InvoiceStatus::Unpaid => {
                    overview.pending_payments += inv.amount;
                    if inv.due_date <= today {
                        overview.overdue.push(inv.clone());
                    } else if inv.due_date <= horizon {
                        overview.upcoming_due.push(inv.clone());
                    }
                }
                InvoiceStatus::Pending => {}
            }
        }

        overview.upcoming_due.sort_by_key(|inv| inv.due_date);
        overview.overdue.sort_by_key(|inv| inv.due_date);
        overview
    }

    /// The three summary cards at the top of the dashboard
    pub fn cards(&self, currency_symbol: &str) -> Vec<MetricCard> {
        vec![
            MetricCard {
                title: "Total Income".to_string(),
                value: format_currency(currency_symbol, self.total_income),
                dark: true,
            },
            MetricCard {
                title: "Amount Paid".to_string(),
                value: format_currency(currency_symbol, self.amount_paid),
                dark: false,
            },
            MetricCard {
                title: "Pending Payments".to_string(),
                value: format_currency(currency_symbol, self.pending_payments),
                dark: false,
            },
        ]
    }
}

/// A summary card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    /// Rendered on the dark background
    pub dark: bool,
}

/// The `limit` most recently created invoices, newest first
///
/// Invoices without a creation time sort as oldest; among equal creation
/// times the later list entry comes first.
pub fn recent_invoices(invoices: &[Invoice], limit: usize) -> Vec<Invoice> {
    let mut sorted: Vec<&Invoice> = invoices.iter().collect();
    sorted.sort_by_key(|inv| inv.created_at);
    sorted.into_iter().rev().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(id: &str, amount: f64, vat: f64, due: NaiveDate, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: id.to_string(),
            client_name: format!("Client {}", id),
            client_email: format!("{}@example.com", id),
            amount,
            vat_percentage: vat,
            vat_amount: amount * vat / 100.0,
            total: amount + amount * vat / 100.0,
            due_date: due,
            status,
            created_at: None,
            updated_at: None,
            current_user: "user-1".to_string(),
        }
    }

    #[test]
    fn test_overview_sums() {
        let today = date(2024, 4, 20);
        let list = vec![
            invoice("a", 1000.0, 10.0, date(2024, 4, 1), InvoiceStatus::Paid),
            invoice("b", 500.0, 10.0, date(2024, 4, 10), InvoiceStatus::Unpaid),
            invoice("c", 200.0, 10.0, date(2024, 4, 22), InvoiceStatus::Unpaid),
            invoice("d", 300.0, 10.0, date(2024, 4, 22), InvoiceStatus::Pending),
        ];
        let o = Overview::compute(&list, today, 7);

        assert_eq!(o.total_invoices, 4);
        assert_eq!(o.total_income, 2000.0);
        assert_eq!(o.amount_paid, 1000.0);
        assert_eq!(o.total_vat, 100.0);
        assert_eq!(o.pending_payments, 700.0);
        assert_eq!(o.overdue.len(), 1);
        assert_eq!(o.overdue[0].id, "b");
        assert_eq!(o.upcoming_due.len(), 1);
        assert_eq!(o.upcoming_due[0].id, "c");
    }

    #[test]
    fn test_due_today_is_overdue_not_upcoming() {
        let today = date(2024, 4, 20);
        let list = vec![
            invoice("today", 1.0, 0.0, today, InvoiceStatus::Unpaid),
            invoice("edge", 1.0, 0.0, date(2024, 4, 27), InvoiceStatus::Unpaid),
            invoice("far", 1.0, 0.0, date(2024, 4, 28), InvoiceStatus::Unpaid),
        ];
        let o = Overview::compute(&list, today, 7);
        let ids: Vec<&str> = o.upcoming_due.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["edge"]);
        assert_eq!(o.overdue.len(), 1);
        assert_eq!(o.overdue[0].id, "today");
    }

    #[test]
    fn test_empty_overview() {
        let o = Overview::compute(&[], date(2024, 1, 1), 7);
        assert_eq!(o, Overview::default());
        let cards = o.cards("₦");
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "Total Income");
        assert!(cards[0].dark);
        assert_eq!(cards[2].value, "₦0.00");
    }

    #[test]
    fn test_recent_invoices_newest_first() {
        let due = date(2024, 4, 20);
        let list: Vec<Invoice> = (0..8)
            .map(|i| {
                let mut inv = invoice(&i.to_string(), 1.0, 0.0, due, InvoiceStatus::Paid);
                inv.created_at = Some(Utc.with_ymd_and_hms(2024, 4, 1 + i, 0, 0, 0).unwrap());
                inv
            })
            .collect();
        let ids: Vec<String> = recent_invoices(&list, 5).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["7", "6", "5", "4", "3"]);
        assert_eq!(recent_invoices(&list[..2], 5).len(), 2);
    }
}
