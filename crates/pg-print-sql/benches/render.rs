use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pg_print_sql::{CompiledQuery, SqlFormatter, query};

/// Build a query with `n` columns and `n` positional parameters:
/// SELECT col0, col1, ... FROM t WHERE col0 = %s AND col1 = %s ...
fn build_select(n: usize) -> CompiledQuery {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let filters: Vec<String> = (0..n).map(|i| format!("col{i} = %s")).collect();
    let mut q = query(format!(
        "SELECT {} FROM t WHERE {}",
        columns.join(", "),
        filters.join(" AND ")
    ));
    for i in 0..n {
        q = if i % 2 == 0 {
            q.bind(i as i64)
        } else {
            q.bind(format!("value '{i}'"))
        };
    }
    q
}

/// Same shape with `%(colN)s` placeholders.
fn build_named(n: usize) -> CompiledQuery {
    let filters: Vec<String> = (0..n).map(|i| format!("col{i} = %(col{i})s")).collect();
    let mut q = query(format!("SELECT * FROM t WHERE {}", filters.join(" AND ")));
    for i in 0..n {
        q = q.bind_named(format!("col{i}"), i as i64);
    }
    q
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/positional");

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.render()));
        });
    }

    group.finish();
}

fn bench_render_named(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/named");

    for n in [1, 5, 10, 50] {
        let q = build_named(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.render()));
        });
    }

    group.finish();
}

fn bench_to_postgres(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/to_postgres");

    for n in [1, 5, 10, 50, 100] {
        let q = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.to_postgres().map(|(sql, values)| (sql, values.len()))));
        });
    }

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/format");
    let formatter = pg_print_sql::default_formatter();

    for n in [1, 10, 50] {
        let rendered = build_select(n).render().unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rendered, |b, sql| {
            b.iter(|| black_box(formatter.format(sql)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render,
    bench_render_named,
    bench_to_postgres,
    bench_format
);
criterion_main!(benches);
