use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use plantheon::calendar::build_month_calendar;
use plantheon::db;
use plantheon::import::{import_rows, read_rows, ImportFormat};
use sqlx::sqlite::SqlitePoolOptions;
use std::hint::black_box;
use tokio::runtime::Runtime;

fn month_of_activities(n: usize) -> Vec<(chrono::DateTime<Utc>, String)> {
    let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
    let step = Duration::minutes(30 * 24 * 60 / n.max(1) as i64);
    (0..n).map(|i| (start + step * i as i32, format!("Activity {}", i))).collect()
}

fn disease_csv(rows: usize) -> Vec<u8> {
    let mut out = String::from("name,class_name,type,description,solution,image_links,plant_name\n");
    for i in 0..rows {
        out.push_str(&format!(
            "Disease {i},class_{i},fungal,Spots on leaves,Remove leaves,\"https://img.example.com/{i}a.jpg, https://img.example.com/{i}b.jpg\",Tomato\n"
        ));
    }
    out.into_bytes()
}

fn benchmark_month_calendar(c: &mut Criterion) {
    let mut group = c.benchmark_group("month_calendar");
    for n in [10usize, 1_000, 10_000] {
        let activities = month_of_activities(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &activities, |b, acts| {
            b.iter(|| build_month_calendar(2025, 9, black_box(acts.clone())))
        });
    }
    group.finish();
}

fn benchmark_csv_parse(c: &mut Criterion) {
    let data = disease_csv(1_000);
    c.bench_function("read_rows_csv_1000", |b| {
        b.iter(|| read_rows(ImportFormat::Csv, black_box(&data)).unwrap())
    });
}

fn benchmark_import(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let rows = read_rows(ImportFormat::Csv, &disease_csv(200)).unwrap();

    c.bench_function("import_rows_200", |b| {
        b.iter(|| {
            rt.block_on(async {
                let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
                db::init_db(&pool).await.unwrap();
                let report = import_rows(&pool, black_box(&rows[1..])).await.unwrap();
                assert_eq!(report.success_count, 200);
            })
        })
    });
}

criterion_group!(benches, benchmark_month_calendar, benchmark_csv_parse, benchmark_import);
criterion_main!(benches);
