//! Invoice Details Page

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::app::use_session_check;
use crate::components::{ConfirmDialog, InvoiceFormDialog, Loading};
use crate::state::global::GlobalState;
use crate::state::invoice::{
    client_initials, format_currency, format_due_date, Invoice, InvoiceChange,
};

/// `/invoices/:id`
#[component]
pub fn InvoiceDetails() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let params = use_params_map();
    let navigate = use_navigate();
    use_session_check();

    let id = move || params.with(|p| p.get("id").cloned().unwrap_or_default());
    let (fetched, set_fetched) = create_signal(None::<Result<Invoice, String>>);
    let (editing, set_editing) = create_signal(false);
    let (confirming, set_confirming) = create_signal(false);
    let (deleting, set_deleting) = create_signal(false);

    create_effect(move |_| {
        let id = id();
        spawn_local(async move {
            set_fetched.set(Some(api::fetch_invoice(&id).await));
        });
    });

    // Realtime and local edits win over the fetched copy
    let invoice = create_memo(move |_| {
        let id = id();
        state.invoice(&id).or_else(|| fetched.get().and_then(Result::ok))
    });

    let toggle = move |_| {
        let id = id();
        spawn_local(async move {
            match api::toggle_status(&id).await {
                Ok(updated) => {
                    set_fetched.set(Some(Ok(updated.clone())));
                    state.apply_invoice_change(InvoiceChange::Upsert(updated));
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    let back = navigate.clone();
    let confirm_delete = Callback::new(move |_: ()| {
        let id = id();
        let navigate = back.clone();
        set_deleting.set(true);
        spawn_local(async move {
            match api::delete_invoice(&id).await {
                Ok(()) => {
                    state.apply_invoice_change(InvoiceChange::Deleted(id));
                    state.show_success("Invoice deleted");
                    navigate("/", Default::default());
                }
                Err(e) => state.show_error(&e),
            }
            set_deleting.set(false);
            set_confirming.set(false);
        });
    });

    let close_edit = Callback::new(move |_: ()| set_editing.set(false));
    let cancel_delete = Callback::new(move |_: ()| set_confirming.set(false));
    let currency = Signal::derive(move || state.currency.get());

    view! {
        <div class="min-h-screen bg-white text-gray-900 px-10 py-8">
            <A href="/" class="text-sm text-gray-500 hover:text-gray-900">"‹ Back to dashboard"</A>

            {move || match (invoice.get(), fetched.get()) {
                (Some(inv), _) => {
                    let symbol = currency.get();
                    let for_edit = inv.clone();
                    view! {
                        <article class="mt-6 max-w-2xl bg-gray-50 rounded-xl p-8 space-y-6">
                            <header class="flex items-center justify-between">
                                <div class="flex items-center space-x-4">
                                    <div class="w-12 h-12 rounded-full bg-gray-900 text-white flex items-center justify-center font-semibold">
                                        {client_initials(&inv.client_name)}
                                    </div>
                                    <div>
                                        <h1 class="text-2xl font-semibold">{inv.client_name.clone()}</h1>
                                        <p class="text-gray-500">{inv.client_email.clone()}</p>
                                    </div>
                                </div>
                                <span class=format!("text-sm font-medium px-3 py-1 rounded {}", inv.status.badge_class())>
                                    {inv.status.label()}
                                </span>
                            </header>

                            <dl class="grid grid-cols-2 gap-4">
                                <Detail label="Amount" value=format_currency(&symbol, inv.amount) />
                                <Detail label="VAT" value=format!("{} ({}%)", format_currency(&symbol, inv.vat_amount), inv.vat_percentage) />
                                <Detail label="Total" value=format_currency(&symbol, inv.total) />
                                <Detail label="Due Date" value=format_due_date(inv.due_date) />
                            </dl>

                            <div class="flex space-x-3">
                                <button
                                    on:click=toggle
                                    class="px-4 py-2 rounded-lg bg-lime-300 hover:bg-lime-400 font-semibold"
                                >
                                    {inv.status.toggle_label()}
                                </button>
                                <button
                                    on:click=move |_| set_editing.set(true)
                                    class="px-4 py-2 rounded-lg bg-gray-200 hover:bg-gray-300 font-medium"
                                >
                                    "Edit"
                                </button>
                                <button
                                    on:click=move |_| set_confirming.set(true)
                                    class="px-4 py-2 rounded-lg bg-red-50 hover:bg-red-100 text-red-600 font-medium"
                                >
                                    "Delete"
                                </button>
                            </div>

                            {move || editing.get().then(|| view! {
                                <InvoiceFormDialog editing=for_edit.clone() currency=currency on_close=close_edit />
                            })}
                        </article>
                    }.into_view()
                }
                (None, Some(Err(e))) => view! {
                    <p class="mt-6 text-red-600">{e}</p>
                }.into_view(),
                (None, _) => view! { <Loading /> }.into_view(),
            }}

            {move || confirming.get().then(|| view! {
                <ConfirmDialog
                    title="Delete invoice"
                    message="This invoice will be removed permanently."
                    on_confirm=confirm_delete
                    on_cancel=cancel_delete
                    busy=deleting
                />
            })}
        </div>
    }
}

#[component]
fn Detail(label: &'static str, #[prop(into)] value: String) -> impl IntoView {
    view! {
        <div>
            <dt class="text-sm text-gray-500">{label}</dt>
            <dd class="text-lg font-semibold">{value}</dd>
        </div>
    }
}
