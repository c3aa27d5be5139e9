//! Invoice Model
//!
//! Wire types returned by the Maglo API plus the pure helpers the views need:
//! list filtering, live form totals, realtime merging and formatting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Payment status of an invoice
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Unpaid,
    Pending,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Pending => "pending",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Pending => "Pending",
        }
    }

    /// Menu entry of the row action menu
    pub fn toggle_label(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Mark as Unpaid",
            InvoiceStatus::Unpaid | InvoiceStatus::Pending => "Mark as Paid",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "paid" => InvoiceStatus::Paid,
            "pending" => InvoiceStatus::Pending,
            _ => InvoiceStatus::Unpaid,
        }
    }

    /// Tailwind classes of the status badge
    pub fn badge_class(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "bg-green-100 text-green-700",
            InvoiceStatus::Unpaid => "bg-red-100 text-red-700",
            InvoiceStatus::Pending => "bg-yellow-100 text-yellow-700",
        }
    }
}

/// A stored invoice
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    pub vat_percentage: f64,
    pub vat_amount: f64,
    pub total: f64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_user: String,
}

/// Create / edit form payload
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    pub vat_percentage: f64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

impl InvoiceForm {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            client_name: invoice.client_name.clone(),
            client_email: invoice.client_email.clone(),
            amount: invoice.amount,
            vat_percentage: invoice.vat_percentage,
            due_date: invoice.due_date,
            status: invoice.status,
        }
    }
}

/// VAT and total shown live while the form is edited
pub fn live_totals(amount: f64, vat_percentage: f64) -> (f64, f64) {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let vat_percentage = if vat_percentage.is_finite() { vat_percentage } else { 0.0 };
    let vat = amount * vat_percentage / 100.0;
    (vat, amount + vat)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StatusCounts {
    pub all: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let mut counts = StatusCounts {
            all: invoices.len(),
            ..Default::default()
        };
        for inv in invoices {
            match inv.status {
                InvoiceStatus::Paid => counts.paid += 1,
                InvoiceStatus::Unpaid => counts.unpaid += 1,
                InvoiceStatus::Pending => counts.pending += 1,
            }
        }
        counts
    }
}

/// Status filter of the invoice list dropdown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(InvoiceStatus),
}

impl StatusFilter {
    pub fn from_value(value: &str) -> Self {
        match value {
            "" | "all" => StatusFilter::All,
            other => StatusFilter::Only(InvoiceStatus::from_str_lossy(other)),
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }

    /// Dropdown option text, e.g. `Paid (3)`
    pub fn option_label(self, counts: &StatusCounts) -> String {
        match self {
            StatusFilter::All => format!("All ({})", counts.all),
            StatusFilter::Only(InvoiceStatus::Paid) => format!("Paid ({})", counts.paid),
            StatusFilter::Only(InvoiceStatus::Unpaid) => format!("Unpaid ({})", counts.unpaid),
            StatusFilter::Only(InvoiceStatus::Pending) => format!("Pending ({})", counts.pending),
        }
    }
}

/// Search on client name or email, then filter by status
pub fn visible_invoices(invoices: &[Invoice], search: &str, filter: StatusFilter) -> Vec<Invoice> {
    let needle = search.trim().to_lowercase();
    invoices
        .iter()
        .filter(|inv| {
            needle.is_empty()
                || inv.client_name.to_lowercase().contains(&needle)
                || inv.client_email.to_lowercase().contains(&needle)
        })
        .filter(|inv| match filter {
            StatusFilter::All => true,
            StatusFilter::Only(status) => inv.status == status,
        })
        .cloned()
        .collect()
}

/// Realtime change pushed by the server
#[derive(Clone, Debug, PartialEq)]
pub enum InvoiceChange {
    Upsert(Invoice),
    Deleted(String),
}

/// Patch the list with a realtime change
///
/// Upserts replace the invoice with the same id or append it; deletes remove
/// it. Replaying a change leaves the list as it was.
pub fn apply_change(list: &mut Vec<Invoice>, change: &InvoiceChange) {
    match change {
        InvoiceChange::Upsert(invoice) => match list.iter_mut().find(|inv| inv.id == invoice.id) {
            Some(existing) => *existing = invoice.clone(),
            None => list.push(invoice.clone()),
        },
        InvoiceChange::Deleted(id) => list.retain(|inv| &inv.id != id),
    }
}

/// Aggregated dashboard metrics
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_invoices: usize,
    pub total_income: f64,
    pub amount_paid: f64,
    pub total_vat: f64,
    pub pending_payments: f64,
    #[serde(default)]
    pub upcoming_due: Vec<Invoice>,
    #[serde(default)]
    pub overdue: Vec<Invoice>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub dark: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChartBucket {
    pub date: NaiveDate,
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

/// `₦1,234.56`
pub fn format_currency(symbol: &str, value: f64) -> String {
    if !value.is_finite() {
        return format!("{}0.00", symbol);
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    let len = whole.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}.{}", sign, symbol, grouped, frac)
}

/// `Apr 20, 2022`
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Up to two uppercase initials for the avatar
pub fn client_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(id: &str, name: &str, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: id.to_string(),
            client_name: name.to_string(),
            client_email: format!("{}@example.com", name.to_lowercase()),
            amount: 100.0,
            vat_percentage: 10.0,
            vat_amount: 10.0,
            total: 110.0,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            status,
            created_at: None,
            updated_at: None,
            current_user: "user-1".to_string(),
        }
    }

    #[test]
    fn test_live_totals() {
        assert_eq!(live_totals(200.0, 7.5), (15.0, 215.0));
        assert_eq!(live_totals(f64::NAN, 10.0), (0.0, 0.0));
    }

    #[test]
    fn test_visible_invoices() {
        let list = vec![
            invoice("1", "Ada", InvoiceStatus::Paid),
            invoice("2", "Bola", InvoiceStatus::Unpaid),
            invoice("3", "Adaeze", InvoiceStatus::Unpaid),
        ];

        assert_eq!(visible_invoices(&list, "", StatusFilter::All).len(), 3);
        assert_eq!(visible_invoices(&list, "ada", StatusFilter::All).len(), 2);
        let unpaid_ada = visible_invoices(&list, "ADA", StatusFilter::Only(InvoiceStatus::Unpaid));
        assert_eq!(unpaid_ada.len(), 1);
        assert_eq!(unpaid_ada[0].id, "3");
    }

    #[test]
    fn test_filter_option_labels() {
        let list = vec![
            invoice("1", "Ada", InvoiceStatus::Paid),
            invoice("2", "Bola", InvoiceStatus::Pending),
        ];
        let counts = StatusCounts::from_invoices(&list);

        assert_eq!(StatusFilter::All.option_label(&counts), "All (2)");
        assert_eq!(StatusFilter::from_value("pending").option_label(&counts), "Pending (1)");
        assert_eq!(StatusFilter::from_value("all"), StatusFilter::All);
    }

    #[test]
    fn test_apply_change_is_idempotent() {
        let mut list = vec![invoice("1", "Ada", InvoiceStatus::Unpaid)];

        let paid = InvoiceChange::Upsert(invoice("1", "Ada", InvoiceStatus::Paid));
        apply_change(&mut list, &paid);
        apply_change(&mut list, &paid);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, InvoiceStatus::Paid);

        let added = InvoiceChange::Upsert(invoice("2", "Bola", InvoiceStatus::Unpaid));
        apply_change(&mut list, &added);
        assert_eq!(list.len(), 2);

        let deleted = InvoiceChange::Deleted("1".to_string());
        apply_change(&mut list, &deleted);
        apply_change(&mut list, &deleted);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "2");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_currency("₦", 1234.5), "₦1,234.50");
        assert_eq!(format_currency("$", -2500.0), "-$2,500.00");
        assert_eq!(
            format_due_date(NaiveDate::from_ymd_opt(2022, 4, 20).unwrap()),
            "Apr 20, 2022"
        );
        assert_eq!(client_initials("ada obi eze"), "AO");
        assert_eq!(InvoiceStatus::Pending.toggle_label(), "Mark as Paid");
    }
}
