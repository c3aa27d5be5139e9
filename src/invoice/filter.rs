//! List filtering for the invoice manager

use serde::{Deserialize, Serialize};

use super::error::InvoiceError;
use super::types::{Invoice, InvoiceStatus};

/// Status filter of the invoice list dropdown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Unpaid,
    Pending,
}

impl StatusFilter {
    pub fn matches(self, status: InvoiceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Paid => status == InvoiceStatus::Paid,
            StatusFilter::Unpaid => status == InvoiceStatus::Unpaid,
            StatusFilter::Pending => status == InvoiceStatus::Pending,
        }
    }
}

impl From<InvoiceStatus> for StatusFilter {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Paid => StatusFilter::Paid,
            InvoiceStatus::Unpaid => StatusFilter::Unpaid,
            InvoiceStatus::Pending => StatusFilter::Pending,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            return Ok(StatusFilter::All);
        }
        s.parse::<InvoiceStatus>().map(StatusFilter::from)
    }
}

/// Invoices whose status passes `filter`, in their original order
pub fn filter_invoices(invoices: &[Invoice], filter: StatusFilter) -> Vec<Invoice> {
    invoices
        .iter()
        .filter(|inv| filter.matches(inv.status))
        .cloned()
        .collect()
}

/// Case-insensitive substring match on client name or email
pub fn search_invoices(invoices: &[Invoice], query: &str) -> Vec<Invoice> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return invoices.to_vec();
    }
    invoices
        .iter()
        .filter(|inv| {
            inv.client_name.to_lowercase().contains(&needle)
                || inv.client_email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Per-status counts shown next to the filter options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub all: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        invoices.iter().fold(
            StatusCounts {
                all: invoices.len(),
                ..Default::default()
            },
            |mut counts, inv| {
                match inv.status {
                    InvoiceStatus::Paid => counts.paid += 1,
                    InvoiceStatus::Unpaid => counts.unpaid += 1,
                    InvoiceStatus::Pending => counts.pending += 1,
                }
                counts
            },
        )
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Paid => self.paid,
            StatusFilter::Unpaid => self.unpaid,
            StatusFilter::Pending => self.pending,
        }
    }
}

/// Up to two uppercase initials for the client avatar
pub fn client_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
