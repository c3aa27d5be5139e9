//! Wire format of the invoices collection

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::error::{BackendError, BackendResult};
use crate::invoice::{Invoice, InvoiceStatus};

/// Error body returned by every Appwrite endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: u16,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// An invoice document as stored in the collection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub system_created_at: Option<String>,
    #[serde(rename = "$updatedAt", default)]
    pub system_updated_at: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    #[serde(default)]
    pub vat_percentage: f64,
    pub due_date: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub current_user: String,
}

/// `documents` list response
#[derive(Debug, Deserialize)]
pub(crate) struct DocumentList {
    pub total: u64,
    pub documents: Vec<InvoiceDocument>,
}

impl InvoiceDocument {
    /// Convert into the domain type, recomputing the derived amounts
    pub fn into_invoice(self) -> BackendResult<Invoice> {
        let due_date = parse_due_date(&self.due_date)?;
        let status = self
            .status
            .parse::<InvoiceStatus>()
            .map_err(|e| BackendError::Serialization(e.to_string()))?;

        let created_at = self
            .created_at
            .as_deref()
            .or(self.system_created_at.as_deref())
            .and_then(parse_timestamp);
        let updated_at = self
            .updated_at
            .as_deref()
            .or(self.system_updated_at.as_deref())
            .and_then(parse_timestamp);

        let mut invoice = Invoice {
            id: self.id,
            client_name: self.client_name,
            client_email: self.client_email,
            amount: self.amount,
            vat_percentage: self.vat_percentage,
            vat_amount: 0.0,
            total: 0.0,
            due_date,
            status,
            created_at,
            updated_at,
            current_user: self.current_user,
        };
        invoice.recompute();
        Ok(invoice)
    }
}

/// Attributes written on create and update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceData {
    pub client_name: String,
    pub client_email: String,
    pub amount: f64,
    pub vat_percentage: f64,
    pub vat_amount: f64,
    pub total: f64,
    pub due_date: String,
    pub status: InvoiceStatus,
    pub current_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub updated_at: String,
}

impl InvoiceData {
    /// Attributes of `invoice`; `createdAt` is only sent when `include_created` is set
    pub fn from_invoice(invoice: &Invoice, include_created: bool) -> Self {
        let now = Utc::now();
        Self {
            client_name: invoice.client_name.clone(),
            client_email: invoice.client_email.clone(),
            amount: invoice.amount,
            vat_percentage: invoice.vat_percentage,
            vat_amount: invoice.vat_amount,
            total: invoice.total,
            due_date: invoice.due_date.to_string(),
            status: invoice.status,
            current_user: invoice.current_user.clone(),
            created_at: include_created
                .then(|| format_timestamp(invoice.created_at.unwrap_or(now))),
            updated_at: format_timestamp(invoice.updated_at.unwrap_or(now)),
        }
    }
}

/// Accept both `2024-04-20` and datetime attributes like `2024-04-20T00:00:00.000+00:00`
fn parse_due_date(raw: &str) -> BackendResult<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| BackendError::Serialization(format!("dueDate '{}': {}", raw, e)))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "$id": "65f0c1",
        "$createdAt": "2024-04-01T10:00:00.000+00:00",
        "$updatedAt": "2024-04-02T10:00:00.000+00:00",
        "$permissions": [],
        "$collectionId": "invoices",
        "$databaseId": "main",
        "clientName": "Ada Obi",
        "clientEmail": "ada@example.com",
        "amount": 1000,
        "vatPercentage": 7.5,
        "vatAmount": 1,
        "total": 1,
        "dueDate": "2024-04-20T00:00:00.000+00:00",
        "status": "unpaid",
        "createdAt": "2024-03-31T09:00:00.000Z",
        "currentUser": "user-1"
    }"#;

    #[test]
    fn test_document_into_invoice_recomputes_amounts() {
        let doc: InvoiceDocument = serde_json::from_str(DOC).unwrap();
        let invoice = doc.into_invoice().unwrap();

        assert_eq!(invoice.id, "65f0c1");
        assert_eq!(invoice.vat_amount, 75.0);
        assert_eq!(invoice.total, 1075.0);
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 4, 20).unwrap());
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(invoice.current_user, "user-1");
        // custom attribute wins over the system timestamp
        assert_eq!(
            invoice.created_at.unwrap().to_rfc3339(),
            "2024-03-31T09:00:00+00:00"
        );
        // falls back to $updatedAt
        assert!(invoice.updated_at.is_some());
    }

    #[test]
    fn test_bad_status_is_serialization_error() {
        let raw = DOC.replace("\"unpaid\"", "\"lost\"");
        let doc: InvoiceDocument = serde_json::from_str(&raw).unwrap();
        assert!(matches!(doc.into_invoice(), Err(BackendError::Serialization(_))));
    }

    #[test]
    fn test_invoice_data_serializes_attributes() {
        let doc: InvoiceDocument = serde_json::from_str(DOC).unwrap();
        let invoice = doc.into_invoice().unwrap();

        let json = serde_json::to_value(InvoiceData::from_invoice(&invoice, false)).unwrap();
        assert_eq!(json["dueDate"], "2024-04-20");
        assert_eq!(json["status"], "unpaid");
        assert_eq!(json["vatAmount"], 75.0);
        assert!(json.get("createdAt").is_none());

        let json = serde_json::to_value(InvoiceData::from_invoice(&invoice, true)).unwrap();
        assert_eq!(json["createdAt"], "2024-03-31T09:00:00.000Z");
    }

    #[test]
    fn test_error_body() {
        let body: AppwriteErrorBody = serde_json::from_str(
            r#"{"message":"Invalid credentials","code":401,"type":"user_invalid_credentials","version":"1.5.7"}"#,
        )
        .unwrap();
        assert_eq!(body.code, 401);
        assert_eq!(body.kind, "user_invalid_credentials");
    }
}
