//! Chart Component
//!
//! "Working Capital" line chart of income and expenses, drawn on an HTML5
//! canvas.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::api;
use crate::state::global::GlobalState;
use crate::state::invoice::{format_currency, ChartBucket};

const INCOME_COLOR: &str = "#29A073";
const EXPENSE_COLOR: &str = "#C8EE44";

/// Window of the "Last 7 days" toggle
const SHORT_WINDOW_DAYS: u32 = 7;

/// Working capital chart component
#[component]
pub fn Chart(
    /// Currency symbol for the y-axis labels
    #[prop(into)]
    currency: Signal<String>,
) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let canvas_ref = create_node_ref::<html::Canvas>();

    let (last_week, set_last_week) = create_signal(true);
    let (buckets, set_buckets) = create_signal(Vec::<ChartBucket>::new());
    let (loading, set_loading) = create_signal(false);

    // Refetch when the window changes or an invoice changes
    let state_for_fetch = state.clone();
    create_effect(move |_| {
        let days = last_week.get().then_some(SHORT_WINDOW_DAYS);
        let _ = state_for_fetch.refresh.get();

        let state = state_for_fetch.clone();
        spawn_local(async move {
            set_loading.set(true);
            match api::fetch_chart(days).await {
                Ok(data) => set_buckets.set(data),
                Err(e) => state.show_error(&e),
            }
            set_loading.set(false);
        });
    });

    // Redraw when data arrives
    create_effect(move |_| {
        let data = buckets.get();
        let symbol = currency.get();
        if let Some(canvas) = canvas_ref.get() {
            draw_chart(&canvas, &data, &symbol);
        }
    });

    view! {
        <section class="bg-white border border-gray-100 rounded-xl p-6">
            <div class="flex items-center justify-between mb-4">
                <h2 class="text-lg font-semibold text-gray-900">"Working Capital"</h2>

                <div class="flex items-center space-x-6">
                    <LegendDot color=INCOME_COLOR label="Income" />
                    <LegendDot color=EXPENSE_COLOR label="Expenses" />

                    <button
                        on:click=move |_| set_last_week.update(|v| *v = !*v)
                        class=move || {
                            let base = "px-3 py-1 rounded-lg text-sm font-medium transition-colors";
                            if last_week.get() {
                                format!("{} bg-gray-900 text-white", base)
                            } else {
                                format!("{} bg-gray-100 text-gray-600 hover:bg-gray-200", base)
                            }
                        }
                    >
                        {move || if last_week.get() { "Last 7 days" } else { "All time" }}
                    </button>
                </div>
            </div>

            <div class="relative">
                <canvas
                    node_ref=canvas_ref
                    width="800"
                    height="300"
                    class="w-full h-64 rounded-lg"
                />
                {move || loading.get().then(|| view! {
                    <div class="absolute inset-0 bg-white/60 flex items-center justify-center">
                        <div class="loading-spinner w-8 h-8" />
                    </div>
                })}
            </div>
        </section>
    }
}

#[component]
fn LegendDot(color: &'static str, label: &'static str) -> impl IntoView {
    view! {
        <div class="flex items-center space-x-2">
            <div class="w-2 h-2 rounded-full" style=format!("background-color: {}", color) />
            <span class="text-sm text-gray-600">{label}</span>
        </div>
    }
}

/// Upper bound of the y-axis
fn y_max(buckets: &[ChartBucket]) -> f64 {
    let max = buckets
        .iter()
        .flat_map(|b| [b.income, b.expense])
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Draw the chart on canvas
fn draw_chart(canvas: &HtmlCanvasElement, buckets: &[ChartBucket], symbol: &str) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    // Margins
    let margin_left = 80.0;
    let margin_right = 20.0;
    let margin_top = 20.0;
    let margin_bottom = 40.0;

    let chart_width = width - margin_left - margin_right;
    let chart_height = height - margin_top - margin_bottom;

    ctx.set_fill_style(&"#ffffff".into());
    ctx.fill_rect(0.0, 0.0, width, height);

    if buckets.is_empty() {
        ctx.set_fill_style(&"#9ca3af".into());
        ctx.set_font("16px sans-serif");
        let _ = ctx.fill_text("No data available", width / 2.0 - 65.0, height / 2.0);
        return;
    }

    let max = y_max(buckets);

    // Horizontal grid lines with y-axis labels
    ctx.set_stroke_style(&"#f3f4f6".into());
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");
    for i in 0..=4 {
        let y = margin_top + (i as f64 / 4.0) * chart_height;
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();

        let value = max - (i as f64 / 4.0) * max;
        ctx.set_fill_style(&"#9ca3af".into());
        let _ = ctx.fill_text(&format_currency(symbol, value), 5.0, y + 4.0);
    }

    let step = if buckets.len() > 1 {
        chart_width / (buckets.len() - 1) as f64
    } else {
        0.0
    };
    let x_at = |i: usize| {
        if buckets.len() > 1 {
            margin_left + i as f64 * step
        } else {
            margin_left + chart_width / 2.0
        }
    };
    let y_at = |value: f64| margin_top + (1.0 - value / max) * chart_height;

    // Income and expense series
    let series: [(&str, fn(&ChartBucket) -> f64); 2] = [
        (INCOME_COLOR, |b| b.income),
        (EXPENSE_COLOR, |b| b.expense),
    ];
    for (color, pick) in series {
        ctx.set_stroke_style(&color.into());
        ctx.set_line_width(3.0);
        ctx.begin_path();
        for (i, bucket) in buckets.iter().enumerate() {
            let (x, y) = (x_at(i), y_at(pick(bucket)));
            if i == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();

        ctx.set_fill_style(&color.into());
        for (i, bucket) in buckets.iter().enumerate() {
            ctx.begin_path();
            let _ = ctx.arc(x_at(i), y_at(pick(bucket)), 3.0, 0.0, std::f64::consts::PI * 2.0);
            ctx.fill();
        }
    }

    // X-axis labels, thinned out for long ranges
    ctx.set_fill_style(&"#6b7280".into());
    let every = (buckets.len() / 8).max(1);
    for (i, bucket) in buckets.iter().enumerate().step_by(every) {
        let _ = ctx.fill_text(&bucket.label, x_at(i) - 18.0, height - 12.0);
    }
}
