//! Invoice domain model
//!
//! - **types**: `Invoice`, `InvoiceInput`, `InvoiceRecord`, `InvoiceStatus`
//! - **tax**: VAT and total arithmetic
//! - **filter**: status filter, search, counts and avatar initials
//! - **export**: CSV export
//! - **error**: validation errors
//!
//! ```text
//! InvoiceInput ──validate()──► InvoiceRecord ──InvoiceStore──► Invoice
//!                  (amounts derived here)
//! ```

pub mod error;
pub mod export;
pub mod filter;
pub mod tax;
pub mod types;

pub use error::{InvoiceError, InvoiceResult};
pub use export::to_csv;
pub use filter::{client_initials, filter_invoices, search_invoices, StatusCounts, StatusFilter};
pub use tax::{total, vat_amount, Amounts};
pub use types::{is_valid_email, Invoice, InvoiceInput, InvoiceRecord, InvoiceStatus};
