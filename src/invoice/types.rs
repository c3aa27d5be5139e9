//! Core invoice types
//!
//! - `Invoice`: a stored invoice as returned by a backend
//! - `InvoiceInput`: what the create/edit form submits
//! - `InvoiceRecord`: a validated input with derived amounts filled in
//! - `InvoiceStatus`: payment state

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::error::{InvoiceError, InvoiceResult};
use super::tax::Amounts;

/// Payment state of an invoice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Unpaid,
    Pending,
}

impl InvoiceStatus {
    pub fn all() -> &'static [InvoiceStatus] {
        &[
            InvoiceStatus::Paid,
            InvoiceStatus::Unpaid,
            InvoiceStatus::Pending,
        ]
    }

    /// Status after a "Mark as Paid" / "Mark as Unpaid" action.
    ///
    /// Pending invoices are marked paid.
    pub fn toggled(self) -> Self {
        match self {
            InvoiceStatus::Paid => InvoiceStatus::Unpaid,
            InvoiceStatus::Unpaid | InvoiceStatus::Pending => InvoiceStatus::Paid,
        }
    }

    /// Label of the row action that toggles this status
    pub fn toggle_label(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Mark as Unpaid",
            _ => "Mark as Paid",
        }
    }

    /// Badge text
    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Unpaid => write!(f, "unpaid"),
            InvoiceStatus::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(InvoiceStatus::Paid),
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "pending" => Ok(InvoiceStatus::Pending),
            other => Err(InvoiceError::InvalidStatus(other.to_string())),
        }
    }
}

/// A stored invoice
///
/// Field names follow the attributes of the remote invoices collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Remote document id or locally generated identifier
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    pub vat_percentage: f64,
    /// Derived: amount * vat_percentage / 100
    pub vat_amount: f64,
    /// Derived: amount + vat_amount
    pub total: f64,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Id of the user this invoice belongs to
    pub current_user: String,
}

impl Invoice {
    /// Build a stored invoice from a validated record
    pub fn from_record(
        id: impl Into<String>,
        owner: impl Into<String>,
        record: &InvoiceRecord,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            client_name: record.client_name.clone(),
            client_email: record.client_email.clone(),
            amount: record.amount,
            vat_percentage: record.vat_percentage,
            vat_amount: record.amounts.vat_amount,
            total: record.amounts.total,
            due_date: record.due_date,
            status: record.status,
            created_at: Some(now),
            updated_at: Some(now),
            current_user: owner.into(),
        }
    }

    /// Overwrite the editable fields from a record, keeping identity and owner
    pub fn apply_record(&mut self, record: &InvoiceRecord, now: DateTime<Utc>) {
        self.client_name = record.client_name.clone();
        self.client_email = record.client_email.clone();
        self.amount = record.amount;
        self.vat_percentage = record.vat_percentage;
        self.vat_amount = record.amounts.vat_amount;
        self.total = record.amounts.total;
        self.due_date = record.due_date;
        self.status = record.status;
        self.updated_at = Some(now);
    }

    /// Recompute the derived amounts from amount and VAT percentage
    pub fn recompute(&mut self) {
        let amounts = Amounts::compute(self.amount, self.vat_percentage);
        self.vat_amount = amounts.vat_amount;
        self.total = amounts.total;
    }

    /// Prefill an edit form from this invoice
    pub fn to_input(&self) -> InvoiceInput {
        InvoiceInput {
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            amount: self.amount,
            vat_percentage: self.vat_percentage,
            due_date: self.due_date,
            status: self.status,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    pub fn is_unpaid(&self) -> bool {
        self.status == InvoiceStatus::Unpaid
    }
}

/// Form submission for creating or editing an invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInput {
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    #[serde(default)]
    pub vat_percentage: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: InvoiceStatus,
}

/// A validated invoice ready to be written
///
/// Only constructed through [`InvoiceInput::validate`], so the derived amounts
/// always match amount and VAT percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    pub vat_percentage: f64,
    pub amounts: Amounts,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

const MAX_CLIENT_NAME_LEN: usize = 200;

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Basic `local@domain.tld` check
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email.trim()))
}

impl InvoiceInput {
    /// Validate the form and compute the derived amounts
    pub fn validate(&self) -> InvoiceResult<InvoiceRecord> {
        let client_name = self.client_name.trim();
        if client_name.is_empty() {
            return Err(InvoiceError::MissingField("clientName"));
        }
        if client_name.chars().count() > MAX_CLIENT_NAME_LEN {
            return Err(InvoiceError::TooLong {
                field: "clientName",
                max: MAX_CLIENT_NAME_LEN,
            });
        }

        let client_email = self.client_email.trim();
        if client_email.is_empty() {
            return Err(InvoiceError::MissingField("clientEmail"));
        }
        if !is_valid_email(client_email) {
            return Err(InvoiceError::InvalidEmail(client_email.to_string()));
        }

        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(InvoiceError::InvalidAmount(self.amount));
        }

        if !self.vat_percentage.is_finite()
            || self.vat_percentage < 0.0
            || self.vat_percentage > 100.0
        {
            return Err(InvoiceError::InvalidVatPercentage(self.vat_percentage));
        }

        Ok(InvoiceRecord {
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
            amount: self.amount,
            vat_percentage: self.vat_percentage,
            amounts: Amounts::compute(self.amount, self.vat_percentage),
            due_date: self.due_date,
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InvoiceInput {
        InvoiceInput {
            client_name: "Ada Obi".to_string(),
            client_email: "ada@example.com".to_string(),
            amount: 1000.0,
            vat_percentage: 7.5,
            due_date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
            status: InvoiceStatus::Unpaid,
        }
    }

    #[test]
    fn test_toggle_twice_is_identity_for_paid_and_unpaid() {
        for status in [InvoiceStatus::Paid, InvoiceStatus::Unpaid] {
            assert_eq!(status.toggled().toggled(), status);
        }
        assert_eq!(InvoiceStatus::Pending.toggled(), InvoiceStatus::Paid);
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("PAID".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
        assert_eq!(" pending ".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Pending);
        assert!("overdue".parse::<InvoiceStatus>().is_err());
        assert_eq!(InvoiceStatus::Unpaid.to_string(), "unpaid");
    }

    #[test]
    fn test_validate_computes_derived_amounts() {
        let record = input().validate().unwrap();
        assert_eq!(record.amounts.vat_amount, 75.0);
        assert_eq!(record.amounts.total, 1075.0);
    }

    #[test]
    fn test_validate_trims_fields() {
        let mut form = input();
        form.client_name = "  Ada Obi ".to_string();
        form.client_email = " ada@example.com ".to_string();
        let record = form.validate().unwrap();
        assert_eq!(record.client_name, "Ada Obi");
        assert_eq!(record.client_email, "ada@example.com");
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let mut form = input();
        form.client_name = "   ".to_string();
        assert!(matches!(form.validate(), Err(InvoiceError::MissingField("clientName"))));

        let mut form = input();
        form.client_email = "not-an-email".to_string();
        assert!(matches!(form.validate(), Err(InvoiceError::InvalidEmail(_))));

        let mut form = input();
        form.amount = -1.0;
        assert!(matches!(form.validate(), Err(InvoiceError::InvalidAmount(_))));

        let mut form = input();
        form.amount = f64::NAN;
        assert!(form.validate().is_err());

        let mut form = input();
        form.vat_percentage = 150.0;
        assert!(matches!(form.validate(), Err(InvoiceError::InvalidVatPercentage(_))));
    }

    #[test]
    fn test_apply_record_keeps_identity() {
        let now = Utc::now();
        let record = input().validate().unwrap();
        let mut invoice = Invoice::from_record("inv-1", "user-1", &record, now);

        let mut edit = input();
        edit.amount = 2000.0;
        edit.vat_percentage = 10.0;
        invoice.apply_record(&edit.validate().unwrap(), now);

        assert_eq!(invoice.id, "inv-1");
        assert_eq!(invoice.current_user, "user-1");
        assert_eq!(invoice.vat_amount, 200.0);
        assert_eq!(invoice.total, 2200.0);
    }

    #[test]
    fn test_invoice_serializes_camel_case() {
        let record = input().validate().unwrap();
        let invoice = Invoice::from_record("inv-1", "user-1", &record, Utc::now());
        let json = serde_json::to_string(&invoice).unwrap();
        assert!(json.contains("\"clientName\":\"Ada Obi\""));
        assert!(json.contains("\"vatPercentage\":7.5"));
        assert!(json.contains("\"dueDate\":\"2024-04-20\""));
        assert!(json.contains("\"status\":\"unpaid\""));
        assert!(json.contains("\"currentUser\":\"user-1\""));
    }

    #[test]
    fn test_input_defaults_status_and_vat() {
        let json = r#"{"clientName":"A","clientEmail":"a@b.co","amount":10,"dueDate":"2024-01-01"}"#;
        let form: InvoiceInput = serde_json::from_str(json).unwrap();
        assert_eq!(form.status, InvoiceStatus::Unpaid);
        assert_eq!(form.vat_percentage, 0.0);
    }
}
