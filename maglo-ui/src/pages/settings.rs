//! Settings Tab
//!
//! API connection and account details.

use leptos::*;

use crate::api;
use crate::state::global::GlobalState;

/// Settings tab component
#[component]
pub fn Settings() -> impl IntoView {
    view! {
        <div class="space-y-8 max-w-3xl">
            <ApiSettings />
            <AccountSection />
        </div>
    }
}

/// API connection settings
#[component]
fn ApiSettings() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let (api_url, set_api_url) = create_signal(api::get_api_base());
    let (testing, set_testing) = create_signal(false);
    let (test_result, set_test_result) = create_signal(None::<Result<String, String>>);

    let test_connection = move |_| {
        set_testing.set(true);
        set_test_result.set(None);
        api::set_api_base(&api_url.get());

        spawn_local(async move {
            match api::check_health().await {
                Ok(health) => {
                    set_test_result.set(Some(Ok(format!(
                        "{} ({} backend: {}, v{}, up {}s, {} live connections)",
                        health.status,
                        health.backend,
                        health.backend_status,
                        health.version,
                        health.uptime_seconds,
                        health.websocket_connections
                    ))));
                    state.show_success("Connection successful!");
                }
                Err(e) => {
                    set_test_result.set(Some(Err(e.clone())));
                    state.show_error(&format!("Connection failed: {}", e));
                }
            }
            set_testing.set(false);
        });
    };

    let save_url = move |_| {
        api::set_api_base(&api_url.get());
        state.show_success("API URL saved");
    };

    let ws_connected = state.ws_connected;

    view! {
        <section class="bg-gray-50 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"API Connection"</h2>

            <div class="space-y-4">
                <div>
                    <label class="block text-sm text-gray-500 mb-2">"Maglo API URL"</label>
                    <div class="flex space-x-2">
                        <input
                            type="text"
                            prop:value=move || api_url.get()
                            on:input=move |ev| set_api_url.set(event_target_value(&ev))
                            class="flex-1 bg-white rounded-lg px-4 py-3
                                   border border-gray-200 focus:border-green-500 focus:outline-none"
                        />
                        <button
                            on:click=test_connection
                            disabled=move || testing.get()
                            class="px-4 py-3 bg-gray-200 hover:bg-gray-300 disabled:bg-gray-100
                                   rounded-lg font-medium transition-colors"
                        >
                            {move || if testing.get() { "Testing..." } else { "Test" }}
                        </button>
                        <button
                            on:click=save_url
                            class="px-4 py-3 bg-lime-300 hover:bg-lime-400
                                   rounded-lg font-medium transition-colors"
                        >
                            "Save"
                        </button>
                    </div>
                </div>

                // Connection status
                <div class="flex items-center space-x-2">
                    <span class="text-sm text-gray-500">"Status:"</span>
                    {move || {
                        match test_result.get() {
                            Some(Ok(summary)) => view! {
                                <span class="text-green-600">"✓ " {summary}</span>
                            }.into_view(),
                            Some(Err(_)) => view! {
                                <span class="text-red-600">"✕ Failed"</span>
                            }.into_view(),
                            None => view! {
                                <span class="text-gray-400">"Not tested"</span>
                            }.into_view(),
                        }
                    }}
                </div>

                // WebSocket status
                <div class="flex items-center space-x-2">
                    <span class="text-sm text-gray-500">"Live updates:"</span>
                    {move || {
                        if ws_connected.get() {
                            view! { <span class="text-green-600">"Connected"</span> }.into_view()
                        } else {
                            view! { <span class="text-red-600">"Disconnected"</span> }.into_view()
                        }
                    }}
                </div>
            </div>
        </section>
    }
}

/// Logged-in account
#[component]
fn AccountSection() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let user = state.user;

    view! {
        <section class="bg-gray-50 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Account"</h2>
            {move || user.get().map(|user| view! {
                <dl class="grid grid-cols-3 gap-y-2 text-sm">
                    <dt class="text-gray-500">"Name"</dt>
                    <dd class="col-span-2">{user.name}</dd>
                    <dt class="text-gray-500">"Email"</dt>
                    <dd class="col-span-2">{user.email}</dd>
                    <dt class="text-gray-500">"User ID"</dt>
                    <dd class="col-span-2 font-mono text-xs">{user.id}</dd>
                </dl>
            })}
        </section>
    }
}
