//! Invoices Tab
//!
//! Search, status filter, CSV export and the create / edit / delete flows.

use leptos::*;

use crate::api;
use crate::components::{ConfirmDialog, InvoiceFormDialog, InvoiceTable};
use crate::state::global::GlobalState;
use crate::state::invoice::{
    visible_invoices, Invoice, InvoiceChange, InvoiceStatus, StatusCounts, StatusFilter,
};

/// Dialog currently shown over the list
#[derive(Clone, Debug, PartialEq)]
enum Dialog {
    Create,
    Edit(Invoice),
    Delete(Invoice),
}

/// Invoices tab component
#[component]
pub fn Invoices() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let search = create_rw_signal(String::new());
    let filter = create_rw_signal(StatusFilter::All);
    let dialog = create_rw_signal(None::<Dialog>);
    let (deleting, set_deleting) = create_signal(false);
    let (exporting, set_exporting) = create_signal(false);

    // Counts ignore the search box; the list applies both
    let counts = create_memo(move |_| state.invoices.with(|list| StatusCounts::from_invoices(list)));
    let visible = Signal::derive(move || {
        state.invoices.with(|list| visible_invoices(list, &search.get(), filter.get()))
    });
    let currency = Signal::derive(move || state.currency.get());

    let on_edit = Callback::new(move |invoice: Invoice| dialog.set(Some(Dialog::Edit(invoice))));
    let on_delete = Callback::new(move |invoice: Invoice| dialog.set(Some(Dialog::Delete(invoice))));
    let close = Callback::new(move |_: ()| dialog.set(None));

    let confirm_delete = Callback::new(move |_: ()| {
        let Some(Dialog::Delete(invoice)) = dialog.get_untracked() else {
            return;
        };
        set_deleting.set(true);
        spawn_local(async move {
            match api::delete_invoice(&invoice.id).await {
                Ok(()) => {
                    state.apply_invoice_change(InvoiceChange::Deleted(invoice.id));
                    state.show_success("Invoice deleted");
                }
                Err(e) => state.show_error(&e),
            }
            set_deleting.set(false);
            dialog.set(None);
        });
    });

    let export = move |_| {
        set_exporting.set(true);
        spawn_local(async move {
            if let Err(e) = api::export_csv().await {
                state.show_error(&e);
            }
            set_exporting.set(false);
        });
    };

    let filters = [
        StatusFilter::All,
        StatusFilter::Only(InvoiceStatus::Paid),
        StatusFilter::Only(InvoiceStatus::Unpaid),
        StatusFilter::Only(InvoiceStatus::Pending),
    ];

    view! {
        <div class="space-y-6">
            <div class="flex flex-wrap items-center justify-between gap-4">
                <input
                    type="search"
                    placeholder="Search invoices"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                    class="w-72 border border-gray-200 rounded-lg px-4 py-2 focus:border-green-500 focus:outline-none"
                />

                <div class="flex items-center space-x-3">
                    <select
                        on:change=move |ev| filter.set(StatusFilter::from_value(&event_target_value(&ev)))
                        prop:value=move || filter.get().value()
                        class="border border-gray-200 rounded-lg px-3 py-2 focus:outline-none"
                    >
                        {move || {
                            let counts = counts.get();
                            filters.into_iter().map(|f| view! {
                                <option value=f.value() selected=move || filter.get() == f>
                                    {f.option_label(&counts)}
                                </option>
                            }).collect_view()
                        }}
                    </select>

                    <button
                        on:click=export
                        disabled=move || exporting.get()
                        class="px-4 py-2 rounded-lg border border-gray-200 hover:bg-gray-50 font-medium"
                    >
                        {move || if exporting.get() { "Exporting..." } else { "Export CSV" }}
                    </button>

                    <button
                        on:click=move |_| dialog.set(Some(Dialog::Create))
                        class="px-4 py-2 rounded-lg bg-lime-300 hover:bg-lime-400 font-semibold text-gray-900"
                    >
                        "+ Create Invoice"
                    </button>
                </div>
            </div>

            {move || {
                if state.loading.get() {
                    view! { <crate::components::loading::ListSkeleton count=5 /> }.into_view()
                } else {
                    view! {
                        <InvoiceTable
                            invoices=visible
                            currency=currency
                            on_edit=on_edit
                            on_delete=on_delete
                        />
                    }.into_view()
                }
            }}

            {move || match dialog.get() {
                Some(Dialog::Create) => view! {
                    <InvoiceFormDialog currency=currency on_close=close />
                }.into_view(),
                Some(Dialog::Edit(invoice)) => view! {
                    <InvoiceFormDialog editing=invoice currency=currency on_close=close />
                }.into_view(),
                Some(Dialog::Delete(invoice)) => view! {
                    <ConfirmDialog
                        title="Delete invoice"
                        message=format!("Delete the invoice for {}? This cannot be undone.", invoice.client_name)
                        on_confirm=confirm_delete
                        on_cancel=close
                        busy=deleting
                    />
                }.into_view(),
                None => view! {}.into_view(),
            }}
        </div>
    }
}
