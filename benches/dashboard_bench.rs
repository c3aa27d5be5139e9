//! Benchmarks for dashboard aggregation
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use maglo::dashboard::{daily_buckets, recent_invoices, Overview, DEFAULT_UPCOMING_WINDOW_DAYS};
use maglo::invoice::{
    filter_invoices, search_invoices, Invoice, InvoiceInput, InvoiceStatus, StatusCounts,
    StatusFilter,
};

fn create_test_invoices(count: usize) -> Vec<Invoice> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let statuses = InvoiceStatus::all();

    (0..count)
        .map(|i| {
            let record = InvoiceInput {
                client_name: format!("Client {}", i),
                client_email: format!("client{}@example.com", i),
                amount: 100.0 + (i % 50) as f64 * 12.5,
                vat_percentage: 7.5,
                due_date: start + Duration::days((i % 120) as i64),
                status: statuses[i % statuses.len()],
            }
            .validate()
            .unwrap();
            Invoice::from_record(
                format!("inv-{}", i),
                "bench-user",
                &record,
                created + Duration::minutes(i as i64),
            )
        })
        .collect()
}

fn bench_overview(c: &mut Criterion) {
    let mut group = c.benchmark_group("overview");
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    for size in [100, 1000, 5000] {
        let invoices = create_test_invoices(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("compute_{}", size), |b| {
            b.iter(|| Overview::compute(black_box(&invoices), today, DEFAULT_UPCOMING_WINDOW_DAYS))
        });

        group.bench_function(format!("recent_{}", size), |b| {
            b.iter(|| recent_invoices(black_box(&invoices), 5))
        });
    }

    group.finish();
}

fn bench_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart");
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let invoices = create_test_invoices(5000);

    group.bench_function("all_days", |b| {
        b.iter(|| daily_buckets(black_box(&invoices), today, None))
    });

    group.bench_function("last_7_days", |b| {
        b.iter(|| daily_buckets(black_box(&invoices), today, Some(7)))
    });

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoice_list");
    let invoices = create_test_invoices(5000);

    group.bench_function("counts", |b| {
        b.iter(|| StatusCounts::from_invoices(black_box(&invoices)))
    });

    group.bench_function("search_then_filter", |b| {
        b.iter(|| {
            let found = search_invoices(black_box(&invoices), "client 12");
            filter_invoices(&found, StatusFilter::Unpaid)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_overview, bench_chart, bench_list);
criterion_main!(benches);
