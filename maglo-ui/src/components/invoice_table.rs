//! Invoice Table Component
//!
//! Invoice list with a per-row action menu.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::state::global::GlobalState;
use crate::state::invoice::{
    client_initials, format_currency, format_due_date, Invoice, InvoiceChange,
};

/// Invoice table
#[component]
pub fn InvoiceTable(
    #[prop(into)]
    invoices: Signal<Vec<Invoice>>,
    #[prop(into)]
    currency: Signal<String>,
    #[prop(into)]
    on_edit: Callback<Invoice>,
    #[prop(into)]
    on_delete: Callback<Invoice>,
) -> impl IntoView {
    // Id of the row whose menu is open
    let open_menu = create_rw_signal(None::<String>);

    view! {
        <div class="overflow-x-auto">
            <table class="w-full text-left">
                <thead>
                    <tr class="text-xs uppercase text-gray-400 border-b border-gray-100">
                        <th class="py-3 font-semibold">"Name / Client"</th>
                        <th class="py-3 font-semibold">"Date"</th>
                        <th class="py-3 font-semibold">"VAT"</th>
                        <th class="py-3 font-semibold">"Total"</th>
                        <th class="py-3 font-semibold">"Status"</th>
                        <th class="py-3 font-semibold text-right">"Action"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let list = invoices.get();
                        if list.is_empty() {
                            return view! {
                                <tr>
                                    <td colspan="6" class="py-12 text-center text-gray-500">
                                        "No invoices match"
                                    </td>
                                </tr>
                            }.into_view();
                        }
                        list.into_iter().map(|invoice| view! {
                            <InvoiceRow
                                invoice=invoice
                                symbol=currency.get()
                                open_menu=open_menu
                                on_edit=on_edit
                                on_delete=on_delete
                            />
                        }).collect_view()
                    }}
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn InvoiceRow(
    invoice: Invoice,
    symbol: String,
    open_menu: RwSignal<Option<String>>,
    on_edit: Callback<Invoice>,
    on_delete: Callback<Invoice>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let id = invoice.id.clone();
    let status = invoice.status;
    let menu_id = id.clone();
    let is_open = move || open_menu.get().as_deref() == Some(menu_id.as_str());

    let toggle_id = id.clone();
    let toggle_menu = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        let id = toggle_id.clone();
        open_menu.update(|open| {
            *open = if open.as_deref() == Some(id.as_str()) { None } else { Some(id) };
        });
    };

    let toggle_target = id.clone();
    let toggle_status = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        open_menu.set(None);
        let id = toggle_target.clone();
        let state = state.clone();
        spawn_local(async move {
            match api::toggle_status(&id).await {
                Ok(updated) => {
                    let message = format!("Invoice marked as {}", updated.status.label());
                    state.apply_invoice_change(InvoiceChange::Upsert(updated));
                    state.show_success(&message);
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    let for_edit = invoice.clone();
    let edit = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        open_menu.set(None);
        on_edit.call(for_edit.clone());
    };

    let for_delete = invoice.clone();
    let delete = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
        open_menu.set(None);
        on_delete.call(for_delete.clone());
    };

    let details = format!("/invoices/{}", id);
    let open_details = move |_| navigate(&details, Default::default());

    view! {
        <tr on:click=open_details class="border-b border-gray-50 hover:bg-gray-50 cursor-pointer">
            <td class="py-4">
                <div class="flex items-center space-x-3">
                    <div class="w-10 h-10 rounded-full bg-gray-100 flex items-center justify-center font-semibold text-gray-700">
                        {client_initials(&invoice.client_name)}
                    </div>
                    <div>
                        <div class="font-medium text-gray-900">{invoice.client_name.clone()}</div>
                        <div class="text-xs text-gray-500">{invoice.client_email.clone()}</div>
                    </div>
                </div>
            </td>
            <td class="py-4 text-sm text-gray-600">{format_due_date(invoice.due_date)}</td>
            <td class="py-4 text-sm text-gray-600">
                {format_currency(&symbol, invoice.vat_amount)}
                <span class="text-xs text-gray-400">{format!(" ({}%)", invoice.vat_percentage)}</span>
            </td>
            <td class="py-4 font-semibold text-gray-900">{format_currency(&symbol, invoice.total)}</td>
            <td class="py-4">
                <span class=format!("text-xs font-medium px-3 py-1 rounded {}", status.badge_class())>
                    {status.label()}
                </span>
            </td>
            <td class="py-4 text-right relative">
                <button
                    on:click=toggle_menu
                    class="px-3 py-1 rounded-lg text-gray-500 hover:bg-gray-100"
                    title="Actions"
                >
                    "⋯"
                </button>
                {move || is_open().then(|| view! {
                    <div class="absolute right-0 mt-2 w-40 bg-white border border-gray-100 rounded-lg shadow-lg z-30 text-left">
                        <MenuItem label=status.toggle_label() on_click=toggle_status.clone() />
                        <MenuItem label="Edit" on_click=edit.clone() />
                        <MenuItem label="Delete" danger=true on_click=delete.clone() />
                    </div>
                })}
            </td>
        </tr>
    }
}

#[component]
fn MenuItem<F>(
    label: &'static str,
    on_click: F,
    #[prop(default = false)]
    danger: bool,
) -> impl IntoView
where
    F: Fn(ev::MouseEvent) + 'static,
{
    let color = if danger { "text-red-600" } else { "text-gray-700" };
    view! {
        <button
            on:click=on_click
            class=format!("block w-full px-4 py-2 text-sm hover:bg-gray-50 {}", color)
        >
            {label}
        </button>
    }
}
