//! Login Page

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::app::load_invoices;
use crate::state::global::GlobalState;

/// Login form
#[component]
pub fn Login() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error.set(None);
        set_submitting.set(true);

        let navigate = navigate.clone();
        let (email, password) = (email.get(), password.get());
        spawn_local(async move {
            match api::login(email.trim(), &password).await {
                Ok(auth) => {
                    state.set_session(auth.user, auth.display_name);
                    load_invoices(state).await;
                    navigate("/", Default::default());
                }
                Err(e) => set_error.set(Some(e)),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <AuthCard title="Welcome back" subtitle="Welcome back! Please enter your details">
            <form on:submit=on_submit class="space-y-5">
                <AuthField label="Email" input_type="email" value=email />
                <AuthField label="Password" input_type="password" value=password />

                {move || error.get().map(|e| view! {
                    <p class="text-sm text-red-600">{e}</p>
                })}

                <button
                    type="submit"
                    disabled=move || submitting.get()
                    class="w-full py-3 rounded-lg bg-lime-300 hover:bg-lime-400 disabled:bg-gray-200 font-semibold text-gray-900"
                >
                    {move || if submitting.get() { "Signing in..." } else { "Sign in" }}
                </button>

                <p class="text-center text-sm text-gray-500">
                    "Don't have an account? "
                    <A href="/signup" class="font-semibold text-gray-900 underline">"Sign up for free"</A>
                </p>
            </form>
        </AuthCard>
    }
}

/// Shared frame of the login and signup pages
#[component]
pub fn AuthCard(
    title: &'static str,
    subtitle: &'static str,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center bg-white px-4">
            <div class="w-full max-w-md">
                <div class="flex items-center space-x-2 mb-12">
                    <span class="w-8 h-8 rounded-lg bg-gray-900 text-lime-300 flex items-center justify-center font-bold">"M"</span>
                    <span class="text-xl font-bold text-gray-900">"Maglo."</span>
                </div>
                <h1 class="text-3xl font-semibold text-gray-900">{title}</h1>
                <p class="text-gray-500 mt-2 mb-8">{subtitle}</p>
                {children()}
            </div>
        </div>
    }
}

#[component]
pub fn AuthField(
    label: &'static str,
    input_type: &'static str,
    value: RwSignal<String>,
) -> impl IntoView {
    view! {
        <div>
            <label class="block text-sm font-medium text-gray-900 mb-2">{label}</label>
            <input
                type=input_type
                required=true
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
                class="w-full border border-gray-200 rounded-lg px-4 py-3 focus:border-green-500 focus:outline-none"
            />
        </div>
    }
}
