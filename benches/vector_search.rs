#![allow(clippy::cast_precision_loss)]

//! Criterion benchmark of k-NN lookups against a `vec0` table, comparing the
//! worker-backed `sqlvec::Connection` with a direct `rusqlite` connection on
//! the same dataset.

use std::hint::black_box;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqlvec::{Connection, Value, Vector};
use tempfile::TempDir;
use tokio::runtime::Runtime;

const DIMENSIONS: usize = 64;
const K: i64 = 10;
const KNN_SELECT: &str =
    "SELECT rowid, distance FROM items WHERE embedding MATCH ? AND k = ? ORDER BY distance";

static TOKIO_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("build tokio runtime")
});

/// Deterministic embedding so every run searches the same space.
fn embedding(seed: usize) -> Vec<f32> {
    (0..DIMENSIONS)
        .map(|dim| ((seed * 31 + dim * 7) as f32 * 0.013).sin())
        .collect()
}

fn row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(2000)
}

fn query_count() -> usize {
    std::env::var("BENCH_QUERIES")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(50)
}

/// Populate a fresh on-disk database with `rows` embeddings.
fn prepare_dataset(rows: usize) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("vectors.db");
    let conn = rusqlite::Connection::open(&path).expect("open dataset");
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE items USING vec0(embedding float[{DIMENSIONS}]);"
    ))
    .expect("create vec0 table");
    let tx = conn.unchecked_transaction().expect("begin");
    {
        let mut insert = tx
            .prepare("INSERT INTO items (rowid, embedding) VALUES (?, ?)")
            .expect("prepare insert");
        for id in 1..=rows {
            let blob = Vector::float32(embedding(id)).to_blob();
            insert
                .execute(rusqlite::params![id as i64, blob])
                .expect("insert embedding");
        }
    }
    tx.commit().expect("commit dataset");
    dir
}

fn benchmark_knn(c: &mut Criterion) {
    sqlvec::initialize().expect("register sqlite-vec");
    let rows = row_count();
    let queries: Vec<Vec<f32>> = (0..query_count()).map(|i| embedding(i * 17 + 3)).collect();
    let dataset = prepare_dataset(rows);
    let path = dataset.path().join("vectors.db");

    let mut group = c.benchmark_group("vector_knn");
    group.throughput(Throughput::Elements(queries.len() as u64));

    let direct = rusqlite::Connection::open(&path).expect("open direct connection");
    group.bench_function(BenchmarkId::new("rusqlite", rows), |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::default();
            for _ in 0..iters {
                let start = Instant::now();
                for query in &queries {
                    let blob = Vector::float32(query.clone()).to_blob();
                    let mut stmt = direct.prepare_cached(KNN_SELECT).expect("prepare knn");
                    let hits: Vec<(i64, f64)> = stmt
                        .query_map(rusqlite::params![blob, K], |row| {
                            Ok((row.get(0)?, row.get(1)?))
                        })
                        .expect("run knn")
                        .collect::<rusqlite::Result<_>>()
                        .expect("read knn");
                    black_box(hits);
                }
                total += start.elapsed();
            }
            total
        });
    });

    let runtime = &*TOKIO_RUNTIME;
    let conn = runtime
        .block_on(Connection::open_readonly(sqlvec::Location::path(&path)))
        .expect("open sqlvec connection");
    group.bench_function(BenchmarkId::new("sqlvec", rows), |b| {
        b.to_async(runtime).iter_custom(|iters| {
            let conn = conn.clone();
            let queries = queries.clone();
            async move {
                let mut total = Duration::default();
                for _ in 0..iters {
                    let start = Instant::now();
                    for query in &queries {
                        let params = [Value::from(Vector::float32(query.clone())), Value::Int(K)];
                        let hits = conn.query(KNN_SELECT, &params).await.expect("run knn");
                        black_box(hits);
                    }
                    total += start.elapsed();
                }
                total
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_knn);
criterion_main!(benches);
