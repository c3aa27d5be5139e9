//! Toast Notification Component

use leptos::*;

use crate::state::global::GlobalState;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn icon(self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "!",
        }
    }

    fn classes(self) -> &'static str {
        match self {
            ToastKind::Success => "bg-gray-900 text-lime-300",
            ToastKind::Error => "bg-red-600 text-white",
        }
    }
}

/// Bottom-right stack of the current success and error messages
#[component]
pub fn Toast() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (success, error) = (state.success, state.error);

    view! {
        <div class="fixed bottom-6 right-6 z-50 flex flex-col items-end gap-2">
            {move || success.get().map(|text| view! {
                <ToastItem text=text kind=ToastKind::Success on_dismiss=move || success.set(None) />
            })}
            {move || error.get().map(|text| view! {
                <ToastItem text=text kind=ToastKind::Error on_dismiss=move || error.set(None) />
            })}
        </div>
    }
}

#[component]
fn ToastItem<F>(text: String, kind: ToastKind, on_dismiss: F) -> impl IntoView
where
    F: Fn() + 'static,
{
    view! {
        <div
            role="status"
            class=format!("flex items-center gap-3 rounded-xl shadow-lg pl-4 pr-2 py-3 {}", kind.classes())
        >
            <span class="font-bold">{kind.icon()}</span>
            <span class="text-sm">{text}</span>
            <button on:click=move |_| on_dismiss() class="px-2 opacity-70 hover:opacity-100">"×"</button>
        </div>
    }
}
