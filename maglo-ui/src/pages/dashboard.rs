//! Dashboard Page
//!
//! Shell with sidebar and topbar; the body follows the active tab.

use leptos::*;
use leptos_router::*;

use super::{Invoices, Settings};
use crate::api;
use crate::app::use_session_check;
use crate::components::loading::CardSkeleton;
use crate::components::{Chart, Loading, MetricCard, RecentInvoices, Sidebar, Topbar};
use crate::state::global::{GlobalState, Tab};
use crate::state::invoice::MetricCard as Card;

/// Dashboard shell component
#[component]
pub fn Dashboard() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();
    use_session_check();

    let on_logout = Callback::new(move |_: ()| navigate("/login", Default::default()));

    view! {
        <div class="min-h-screen flex bg-white text-gray-900">
            <Sidebar on_logout=on_logout />

            <main class="flex-1 px-10 py-8">
                <Topbar />
                {move || {
                    if state.user.with(|u| u.is_none()) {
                        return view! { <Loading /> }.into_view();
                    }
                    match state.active_tab.get() {
                        Tab::Dashboard => view! { <Overview /> }.into_view(),
                        Tab::Invoices => view! { <Invoices /> }.into_view(),
                        Tab::Settings => view! { <Settings /> }.into_view(),
                        tab @ (Tab::Transactions | Tab::Wallets) => view! {
                            <ComingSoon tab=tab />
                        }.into_view(),
                    }
                }}
            </main>
        </div>
    }
}

/// Dashboard tab: metric cards, working capital chart, recent invoices
#[component]
fn Overview() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (cards, set_cards) = create_signal(None::<Vec<Card>>);

    create_effect(move |_| {
        let _ = state.refresh.get();
        spawn_local(async move {
            match api::fetch_overview().await {
                Ok(response) => {
                    state.currency.set(response.currency_symbol);
                    set_cards.set(Some(response.cards));
                }
                Err(e) => state.show_error(&e),
            }
        });
    });

    let currency = Signal::derive(move || state.currency.get());

    view! {
        <div class="grid grid-cols-1 xl:grid-cols-3 gap-8">
            <div class="xl:col-span-2 space-y-8">
                <div class="grid grid-cols-1 md:grid-cols-3 gap-6">
                    {move || match cards.get() {
                        Some(cards) => cards.into_iter().map(|card| view! {
                            <MetricCard title=card.title value=card.value dark=card.dark />
                        }).collect_view(),
                        None => (0..3).map(|_| view! { <CardSkeleton /> }).collect_view(),
                    }}
                </div>

                <Chart currency=currency />
            </div>

            <RecentInvoices currency=currency />
        </div>
    }
}

#[component]
fn ComingSoon(tab: Tab) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[50vh] text-center">
            <div class="text-5xl mb-4">{tab.icon()}</div>
            <h2 class="text-xl font-semibold">{tab.label()}</h2>
            <p class="text-gray-500 mt-2">"Nothing here yet."</p>
        </div>
    }
}
