//! Confirm Dialog Component

use leptos::*;

/// Modal asking the user to confirm a destructive action
#[component]
pub fn ConfirmDialog(
    #[prop(into)]
    title: String,
    #[prop(into)]
    message: String,
    #[prop(into)]
    on_confirm: Callback<()>,
    #[prop(into)]
    on_cancel: Callback<()>,
    #[prop(into)]
    busy: Signal<bool>,
) -> impl IntoView {
    view! {
        <div class="fixed inset-0 z-40 bg-black/40 flex items-center justify-center">
            <div class="bg-white rounded-xl shadow-xl w-full max-w-sm p-6">
                <h3 class="text-lg font-semibold text-gray-900">{title}</h3>
                <p class="text-gray-600 mt-2">{message}</p>

                <div class="flex justify-end space-x-3 mt-6">
                    <button
                        on:click=move |_| on_cancel.call(())
                        class="px-4 py-2 rounded-lg bg-gray-100 hover:bg-gray-200 text-gray-700 font-medium"
                    >
                        "Cancel"
                    </button>
                    <button
                        on:click=move |_| on_confirm.call(())
                        disabled=move || busy.get()
                        class="px-4 py-2 rounded-lg bg-red-600 hover:bg-red-700 disabled:bg-red-300 text-white font-medium"
                    >
                        {move || if busy.get() { "Deleting..." } else { "Delete" }}
                    </button>
                </div>
            </div>
        </div>
    }
}
