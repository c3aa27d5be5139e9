//! Signup Page

use leptos::*;
use leptos_router::*;

use super::login::{AuthCard, AuthField};
use crate::api;
use crate::state::global::GlobalState;

/// Account creation form; a new account starts with no invoices
#[component]
pub fn Signup() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let navigate = use_navigate();

    let name = create_rw_signal(String::new());
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);
    let (submitting, set_submitting) = create_signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error.set(None);
        set_submitting.set(true);

        let navigate = navigate.clone();
        let (name, email, password) = (name.get(), email.get(), password.get());
        spawn_local(async move {
            match api::signup(name.trim(), email.trim(), &password).await {
                Ok(auth) => {
                    state.set_session(auth.user, auth.display_name);
                    state.invoices.set(Vec::new());
                    navigate("/", Default::default());
                }
                Err(e) => set_error.set(Some(e)),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <AuthCard title="Create new account" subtitle="Welcome! Please enter your details">
            <form on:submit=on_submit class="space-y-5">
                <AuthField label="Full Name" input_type="text" value=name />
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
                    {move || if submitting.get() { "Creating account..." } else { "Create Account" }}
                </button>

                <p class="text-center text-sm text-gray-500">
                    "Already have an account? "
                    <A href="/login" class="font-semibold text-gray-900 underline">"Sign in"</A>
                </p>
            </form>
        </AuthCard>
    }
}
