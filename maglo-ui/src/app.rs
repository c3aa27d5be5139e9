//! App Root Component
//!
//! Routing, global providers, the session check and the live feed.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::Toast;
use crate::pages::{Dashboard, InvoiceDetails, Login, Signup};
use crate::state::global::{provide_global_state, GlobalState};
use crate::state::websocket::{init_websocket, WebSocketClient};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    // One live feed per logged-in user
    let socket = store_value(None::<WebSocketClient>);
    let user_id = create_memo(move |_| state.user.with(|u| u.as_ref().map(|u| u.id.clone())));
    create_effect(move |_| {
        let logged_in = user_id.get().is_some();
        socket.update_value(|current| {
            if let Some(client) = current.take() {
                client.close();
            }
        });
        state.ws_connected.set(false);
        if let (true, Some(token)) = (logged_in, api::session_token()) {
            let client = init_websocket(state, &api::get_api_base(), &token);
            socket.set_value(Some(client));
        }
    });

    view! {
        <Router>
            <Routes>
                <Route path="/login" view=Login />
                <Route path="/signup" view=Signup />
                <Route path="/" view=Dashboard />
                <Route path="/invoices/:id" view=InvoiceDetails />
                <Route path="/*any" view=NotFound />
            </Routes>

            // Toast notifications
            <Toast />
        </Router>
    }
}

/// Verify the stored session once per page load
///
/// Sends the user to `/login` when there is no token or the server rejects
/// it. On success the user and their invoices are loaded into global state.
pub fn use_session_check() {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    if state.user.get_untracked().is_some() {
        return;
    }

    let navigate = use_navigate();
    spawn_local(async move {
        match api::me().await {
            Ok(me) => {
                state.set_session(me.user, me.display_name);
                load_invoices(state).await;
            }
            Err(e) => {
                web_sys::console::log_1(&format!("Session check failed: {}", e).into());
                navigate("/login", Default::default());
            }
        }
    });
}

/// Fetch the user's invoices into global state
pub async fn load_invoices(state: GlobalState) {
    state.loading.set(true);
    match api::fetch_invoices().await {
        Ok(invoices) => state.invoices.set(invoices),
        Err(e) => state.show_error(&e),
    }
    state.loading.set(false);
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-screen text-center bg-white text-gray-900">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-500 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/"
                class="px-6 py-3 bg-lime-300 hover:bg-lime-400 rounded-lg font-medium transition-colors"
            >
                "Go to Dashboard"
            </A>
        </div>
    }
}
