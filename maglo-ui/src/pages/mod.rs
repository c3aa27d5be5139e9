//! Page Components
//!
//! Top-level pages for each route, plus the tab bodies of the dashboard.

pub mod dashboard;
pub mod invoice_details;
pub mod invoices;
pub mod login;
pub mod settings;
pub mod signup;

pub use dashboard::Dashboard;
pub use invoice_details::InvoiceDetails;
pub use invoices::Invoices;
pub use login::Login;
pub use settings::Settings;
pub use signup::Signup;
