//! Dashboard aggregation
//!
//! Pure functions over one user's invoice list:
//!
//! - **overview**: income/paid/VAT/pending sums, upcoming and overdue lists,
//!   summary cards, recent invoices
//! - **chart**: daily income/expense buckets keyed by due date
//! - **format**: currency, date and title formatting

pub mod chart;
pub mod format;
pub mod overview;

pub use chart::{daily_buckets, ChartBucket};
pub use format::{format_currency, format_day_label, format_due_date, tab_title};
pub use overview::{recent_invoices, MetricCard, Overview, DEFAULT_UPCOMING_WINDOW_DAYS};

/// Number of rows in the recent invoices table
pub const DEFAULT_RECENT_LIMIT: usize = 5;
