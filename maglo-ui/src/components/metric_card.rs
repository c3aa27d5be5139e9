//! Metric Card Component
//!
//! One of the summary cards on top of the dashboard.

use leptos::*;

/// Summary card; the first card of the row is drawn dark
#[component]
pub fn MetricCard(
    #[prop(into)]
    title: String,
    #[prop(into)]
    value: String,
    #[prop(default = false)]
    dark: bool,
) -> impl IntoView {
    let (card_class, title_class, value_class, icon_class) = if dark {
        ("bg-gray-800", "text-gray-400", "text-white", "bg-gray-700 text-lime-300")
    } else {
        ("bg-gray-50", "text-gray-500", "text-gray-900", "bg-gray-200 text-gray-800")
    };

    view! {
        <div class=format!("{} rounded-xl px-5 py-6 flex items-center space-x-4", card_class)>
            <div class=format!("w-10 h-10 rounded-full flex items-center justify-center {}", icon_class)>
                "₦"
            </div>
            <div>
                <div class=format!("text-sm {}", title_class)>{title}</div>
                <div class=format!("text-2xl font-bold mt-1 {}", value_class)>{value}</div>
            </div>
        </div>
    }
}
