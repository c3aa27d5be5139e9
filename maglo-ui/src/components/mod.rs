//! UI Components
//!
//! Reusable Leptos components for the dashboard.

pub mod chart;
pub mod confirm_dialog;
pub mod invoice_form;
pub mod invoice_table;
pub mod loading;
pub mod metric_card;
pub mod recent_invoices;
pub mod sidebar;
pub mod toast;
pub mod topbar;

pub use chart::Chart;
pub use confirm_dialog::ConfirmDialog;
pub use invoice_form::InvoiceFormDialog;
pub use invoice_table::InvoiceTable;
pub use loading::Loading;
pub use metric_card::MetricCard;
pub use recent_invoices::RecentInvoices;
pub use sidebar::Sidebar;
pub use toast::Toast;
pub use topbar::Topbar;
