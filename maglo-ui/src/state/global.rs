//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;

use super::invoice::{apply_change, Invoice, InvoiceChange, User};

/// Symbol used until the overview reports the configured one
pub const DEFAULT_CURRENCY: &str = "₦";

/// Sidebar tabs of the dashboard shell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Dashboard,
    Transactions,
    Invoices,
    Wallets,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Transactions,
        Tab::Invoices,
        Tab::Wallets,
        Tab::Settings,
    ];

    /// Sidebar entry and topbar heading
    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Transactions => "Transactions",
            Tab::Invoices => "Invoices",
            Tab::Wallets => "My Wallets",
            Tab::Settings => "Settings",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tab::Dashboard => "▦",
            Tab::Transactions => "⇄",
            Tab::Invoices => "🧾",
            Tab::Wallets => "👛",
            Tab::Settings => "⚙",
        }
    }
}

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Logged-in user, `None` until the session check succeeds
    pub user: RwSignal<Option<User>>,
    /// Name shown in the topbar
    pub display_name: RwSignal<String>,
    /// Currency symbol reported by the server
    pub currency: RwSignal<String>,
    /// Every invoice of the user; views filter locally
    pub invoices: RwSignal<Vec<Invoice>>,
    /// Selected sidebar tab
    pub active_tab: RwSignal<Tab>,
    /// Bumped to make dashboard widgets refetch
    pub refresh: RwSignal<u32>,
    /// WebSocket connection status
    pub ws_connected: RwSignal<bool>,
    /// Global loading state
    pub loading: RwSignal<bool>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        user: create_rw_signal(None),
        display_name: create_rw_signal(String::new()),
        currency: create_rw_signal(DEFAULT_CURRENCY.to_string()),
        invoices: create_rw_signal(Vec::new()),
        active_tab: create_rw_signal(Tab::default()),
        refresh: create_rw_signal(0),
        ws_connected: create_rw_signal(false),
        loading: create_rw_signal(false),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    /// Store the session owner after login or the session check
    pub fn set_session(&self, user: User, display_name: String) {
        self.display_name.set(display_name);
        self.user.set(Some(user));
    }

    /// Forget everything tied to the session
    pub fn clear_session(&self) {
        self.user.set(None);
        self.display_name.set(String::new());
        self.invoices.set(Vec::new());
        self.active_tab.set(Tab::default());
    }

    /// Merge a realtime or local change into the invoice list
    pub fn apply_invoice_change(&self, change: InvoiceChange) {
        self.invoices.update(|list| apply_change(list, &change));
        self.refresh.update(|n| *n = n.wrapping_add(1));
    }

    /// Find an invoice in the loaded list
    pub fn invoice(&self, id: &str) -> Option<Invoice> {
        self.invoices.with(|list| list.iter().find(|inv| inv.id == id).cloned())
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        }).forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        }).forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_labels() {
        assert_eq!(Tab::default(), Tab::Dashboard);
        assert_eq!(Tab::Wallets.label(), "My Wallets");
        assert_eq!(Tab::ALL.len(), 5);
        assert!(Tab::ALL.iter().all(|tab| !tab.label().is_empty()));
    }
}
