//! Topbar Component

use leptos::*;

use crate::state::global::GlobalState;
use crate::state::invoice::client_initials;

/// Tab title on the left, the logged-in user on the right
#[component]
pub fn Topbar() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let active_tab = state.active_tab;
    let display_name = state.display_name;
    let ws_connected = state.ws_connected;

    view! {
        <header class="flex items-center justify-between mb-8">
            <h1 class="text-2xl font-semibold text-gray-900">
                {move || active_tab.get().label()}
            </h1>

            <div class="flex items-center space-x-4">
                <span
                    class=move || if ws_connected.get() {
                        "w-2 h-2 rounded-full bg-green-500"
                    } else {
                        "w-2 h-2 rounded-full bg-gray-300"
                    }
                    title=move || if ws_connected.get() { "Live" } else { "Offline" }
                />
                <div class="flex items-center space-x-3 bg-gray-50 rounded-full pl-1 pr-4 py-1">
                    <div class="w-9 h-9 rounded-full bg-gray-900 text-white flex items-center justify-center text-sm font-semibold">
                        {move || client_initials(&display_name.get())}
                    </div>
                    <span class="font-medium text-gray-900">{move || display_name.get()}</span>
                </div>
            </div>
        </header>
    }
}
