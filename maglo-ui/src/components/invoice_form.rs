//! Invoice Form Component
//!
//! Create / edit dialog with live VAT and total.

use chrono::NaiveDate;
use leptos::*;

use crate::api;
use crate::state::global::GlobalState;
use crate::state::invoice::{
    format_currency, live_totals, Invoice, InvoiceChange, InvoiceForm, InvoiceStatus,
};

/// Parse the raw form fields; the server repeats the full validation
pub fn build_form(
    client_name: &str,
    client_email: &str,
    amount: &str,
    vat_percentage: &str,
    due_date: &str,
    status: InvoiceStatus,
) -> Result<InvoiceForm, String> {
    let client_name = client_name.trim();
    if client_name.is_empty() {
        return Err("Client name is required".to_string());
    }
    let client_email = client_email.trim();
    if client_email.is_empty() {
        return Err("Client email is required".to_string());
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| "Amount must be a number".to_string())?;
    let vat_percentage: f64 = match vat_percentage.trim() {
        "" => 0.0,
        vat => vat.parse().map_err(|_| "VAT must be a number".to_string())?,
    };
    let due_date = NaiveDate::parse_from_str(due_date.trim(), "%Y-%m-%d")
        .map_err(|_| "Due date is required".to_string())?;

    Ok(InvoiceForm {
        client_name: client_name.to_string(),
        client_email: client_email.to_string(),
        amount,
        vat_percentage,
        due_date,
        status,
    })
}

/// Invoice dialog; `editing` selects update over create
#[component]
pub fn InvoiceFormDialog(
    #[prop(optional)]
    editing: Option<Invoice>,
    #[prop(into)]
    currency: Signal<String>,
    #[prop(into)]
    on_close: Callback<()>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let initial = editing.as_ref().map(InvoiceForm::from_invoice);
    let editing_id = editing.map(|inv| inv.id);
    let is_edit = editing_id.is_some();

    let client_name = create_rw_signal(initial.as_ref().map(|f| f.client_name.clone()).unwrap_or_default());
    let client_email = create_rw_signal(initial.as_ref().map(|f| f.client_email.clone()).unwrap_or_default());
    let amount = create_rw_signal(initial.as_ref().map(|f| f.amount.to_string()).unwrap_or_default());
    let vat = create_rw_signal(initial.as_ref().map(|f| f.vat_percentage.to_string()).unwrap_or_default());
    let due_date = create_rw_signal(
        initial.as_ref().map(|f| f.due_date.format("%Y-%m-%d").to_string()).unwrap_or_default(),
    );
    let status = create_rw_signal(initial.as_ref().map(|f| f.status).unwrap_or_default());
    let (submitting, set_submitting) = create_signal(false);

    let totals = create_memo(move |_| {
        let amount = amount.get().trim().parse().unwrap_or(0.0);
        let vat = vat.get().trim().parse().unwrap_or(0.0);
        live_totals(amount, vat)
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let form = match build_form(
            &client_name.get(),
            &client_email.get(),
            &amount.get(),
            &vat.get(),
            &due_date.get(),
            status.get(),
        ) {
            Ok(form) => form,
            Err(e) => {
                state.show_error(&e);
                return;
            }
        };

        set_submitting.set(true);
        let state = state.clone();
        let editing_id = editing_id.clone();
        spawn_local(async move {
            let result = match &editing_id {
                Some(id) => api::update_invoice(id, &form).await,
                None => api::create_invoice(&form).await,
            };
            match result {
                Ok(invoice) => {
                    state.apply_invoice_change(InvoiceChange::Upsert(invoice));
                    state.show_success(if editing_id.is_some() {
                        "Invoice updated"
                    } else {
                        "Invoice created"
                    });
                    on_close.call(());
                }
                Err(e) => state.show_error(&e),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <div class="fixed inset-0 z-40 bg-black/40 flex items-center justify-center">
            <form on:submit=on_submit class="bg-white rounded-xl shadow-xl w-full max-w-lg p-6 space-y-4">
                <div class="flex items-center justify-between">
                    <h3 class="text-xl font-semibold text-gray-900">
                        {if is_edit { "Edit Invoice" } else { "Create Invoice" }}
                    </h3>
                    <button
                        type="button"
                        on:click=move |_| on_close.call(())
                        class="text-gray-400 hover:text-gray-700 text-xl"
                    >
                        "✕"
                    </button>
                </div>

                <TextField label="Client Name" value=client_name />
                <TextField label="Client Email" value=client_email input_type="email" />

                <div class="grid grid-cols-2 gap-4">
                    <TextField label="Amount" value=amount input_type="number" />
                    <TextField label="VAT (%)" value=vat input_type="number" />
                </div>

                <div class="grid grid-cols-2 gap-4">
                    <TextField label="Due Date" value=due_date input_type="date" />
                    <div>
                        <label class="block text-sm text-gray-600 mb-1">"Status"</label>
                        <select
                            on:change=move |ev| status.set(InvoiceStatus::from_str_lossy(&event_target_value(&ev)))
                            prop:value=move || status.get().as_str()
                            class="w-full border border-gray-200 rounded-lg px-3 py-2 focus:border-green-500 focus:outline-none"
                        >
                            {[InvoiceStatus::Unpaid, InvoiceStatus::Paid, InvoiceStatus::Pending]
                                .into_iter()
                                .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                                .collect_view()}
                        </select>
                    </div>
                </div>

                // Live totals
                <div class="bg-gray-50 rounded-lg p-4 space-y-1 text-sm">
                    <div class="flex justify-between text-gray-600">
                        <span>"VAT"</span>
                        <span>{move || format_currency(&currency.get(), totals.get().0)}</span>
                    </div>
                    <div class="flex justify-between font-semibold text-gray-900">
                        <span>"Total"</span>
                        <span>{move || format_currency(&currency.get(), totals.get().1)}</span>
                    </div>
                </div>

                <div class="flex justify-end space-x-3">
                    <button
                        type="button"
                        on:click=move |_| on_close.call(())
                        class="px-4 py-2 rounded-lg bg-gray-100 hover:bg-gray-200 text-gray-700 font-medium"
                    >
                        "Cancel"
                    </button>
                    <button
                        type="submit"
                        disabled=move || submitting.get()
                        class="px-4 py-2 rounded-lg bg-lime-300 hover:bg-lime-400 disabled:bg-gray-200 text-gray-900 font-semibold"
                    >
                        {move || match (submitting.get(), is_edit) {
                            (true, _) => "Saving...",
                            (false, true) => "Save Changes",
                            (false, false) => "Create Invoice",
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}

#[component]
fn TextField(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(default = "text")]
    input_type: &'static str,
) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm text-gray-600 mb-1">{label}</label>
            <input
                type=input_type
                step=if input_type == "number" { "any" } else { "" }
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                class="w-full border border-gray-200 rounded-lg px-3 py-2 focus:border-green-500 focus:outline-none"
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_form() {
        let form = build_form(" Acme ", "a@acme.test", "200", "7.5", "2024-04-20", InvoiceStatus::Paid)
            .unwrap();
        assert_eq!(form.client_name, "Acme");
        assert_eq!(form.amount, 200.0);
        assert_eq!(form.vat_percentage, 7.5);

        let no_vat = build_form("Acme", "a@acme.test", "200", "", "2024-04-20", InvoiceStatus::Unpaid)
            .unwrap();
        assert_eq!(no_vat.vat_percentage, 0.0);
    }

    #[test]
    fn test_build_form_rejects_bad_fields() {
        assert!(build_form("", "a@acme.test", "1", "0", "2024-04-20", InvoiceStatus::Unpaid).is_err());
        assert!(build_form("Acme", "a@acme.test", "abc", "0", "2024-04-20", InvoiceStatus::Unpaid).is_err());
        assert!(build_form("Acme", "a@acme.test", "1", "0", "", InvoiceStatus::Unpaid).is_err());
    }
}
