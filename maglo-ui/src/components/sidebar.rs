//! Sidebar Component
//!
//! Dashboard navigation: one entry per tab plus logout.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::state::global::{GlobalState, Tab};

/// Sidebar with the Maglo logo and tab entries
#[component]
pub fn Sidebar(
    /// Called after the session ended
    #[prop(into)]
    on_logout: Callback<()>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (leaving, set_leaving) = create_signal(false);

    let logout = move |_| {
        set_leaving.set(true);
        let state = state.clone();
        spawn_local(async move {
            if let Err(e) = api::logout().await {
                web_sys::console::error_1(&format!("Logout failed: {}", e).into());
            }
            state.clear_session();
            set_leaving.set(false);
            on_logout.call(());
        });
    };

    view! {
        <aside class="w-64 min-h-screen bg-gray-50 flex flex-col justify-between px-6 py-8">
            <div>
                <A href="/" class="flex items-center space-x-2 mb-10">
                    <span class="w-8 h-8 rounded-lg bg-gray-900 text-lime-300 flex items-center justify-center font-bold">"M"</span>
                    <span class="text-xl font-bold text-gray-900">"Maglo."</span>
                </A>

                <nav class="space-y-1">
                    {Tab::ALL.into_iter().map(|tab| view! { <SidebarItem tab=tab /> }).collect_view()}
                </nav>
            </div>

            <div class="space-y-1">
                <button
                    on:click=logout
                    disabled=move || leaving.get()
                    class="w-full flex items-center space-x-3 px-4 py-3 rounded-lg text-gray-500 hover:bg-gray-100"
                >
                    <span>"⎋"</span>
                    <span>{move || if leaving.get() { "Logging out..." } else { "Logout" }}</span>
                </button>
            </div>
        </aside>
    }
}

#[component]
fn SidebarItem(tab: Tab) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let active_tab = state.active_tab;
    let navigate = use_navigate();

    let select = move |_| {
        active_tab.set(tab);
        navigate("/", Default::default());
    };

    view! {
        <button
            on:click=select
            class=move || {
                let base = "w-full flex items-center space-x-3 px-4 py-3 rounded-lg font-medium transition-colors";
                if active_tab.get() == tab {
                    format!("{} bg-lime-300 text-gray-900", base)
                } else {
                    format!("{} text-gray-500 hover:bg-gray-100", base)
                }
            }
        >
            <span>{tab.icon()}</span>
            <span>{tab.label()}</span>
        </button>
    }
}
