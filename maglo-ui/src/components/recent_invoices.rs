//! Recent Invoices Component
//!
//! The latest invoices in the dashboard side column.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::state::global::{GlobalState, Tab};
use crate::state::invoice::{client_initials, format_currency, format_due_date, Invoice};

/// Recent invoices list
#[component]
pub fn RecentInvoices(
    #[prop(into)]
    currency: Signal<String>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (recent, set_recent) = create_signal(Vec::<Invoice>::new());
    let (loaded, set_loaded) = create_signal(false);

    let state_for_fetch = state.clone();
    create_effect(move |_| {
        let _ = state_for_fetch.refresh.get();
        let state = state_for_fetch.clone();
        spawn_local(async move {
            match api::fetch_recent().await {
                Ok(list) => set_recent.set(list),
                Err(e) => state.show_error(&e),
            }
            set_loaded.set(true);
        });
    });

    let active_tab = state.active_tab;

    view! {
        <section class="bg-white border border-gray-100 rounded-xl p-6">
            <div class="flex items-center justify-between mb-4">
                <h2 class="text-lg font-semibold text-gray-900">"Recent Invoices"</h2>
                <button
                    on:click=move |_| active_tab.set(Tab::Invoices)
                    class="text-sm font-semibold text-green-700 hover:text-green-800"
                >
                    "View All ›"
                </button>
            </div>

            {move || {
                let list = recent.get();
                if !loaded.get() {
                    view! { <super::loading::ListSkeleton count=5 /> }.into_view()
                } else if list.is_empty() {
                    view! {
                        <p class="text-gray-500 text-sm">"No invoices yet"</p>
                    }.into_view()
                } else {
                    list.into_iter().map(|invoice| {
                        let symbol = currency.get();
                        view! { <RecentRow invoice=invoice symbol=symbol /> }
                    }).collect_view()
                }
            }}
        </section>
    }
}

#[component]
fn RecentRow(invoice: Invoice, symbol: String) -> impl IntoView {
    let href = format!("/invoices/{}", invoice.id);

    view! {
        <A href=href class="flex items-center justify-between py-3 border-b border-gray-50 last:border-0 hover:bg-gray-50 rounded">
            <div class="flex items-center space-x-3">
                <div class="w-10 h-10 rounded-full bg-gray-100 flex items-center justify-center font-semibold text-gray-700">
                    {client_initials(&invoice.client_name)}
                </div>
                <div>
                    <div class="font-medium text-gray-900">{invoice.client_name.clone()}</div>
                    <div class="text-xs text-gray-500">{format_due_date(invoice.due_date)}</div>
                </div>
            </div>
            <div class="text-right">
                <div class="font-semibold text-gray-900">{format_currency(&symbol, invoice.total)}</div>
                <span class=format!("text-xs px-2 py-0.5 rounded {}", invoice.status.badge_class())>
                    {invoice.status.label()}
                </span>
            </div>
        </A>
    }
}
