use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use dashgate_auth::{Permission, Role, check_permission, has_minimum_role, has_permission};

fn typed_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed");
    for role in Role::ALL {
        group.bench_with_input(BenchmarkId::new("has_permission", role), &role, |b, role| {
            b.iter(|| {
                Permission::ALL
                    .iter()
                    .filter(|p| has_permission(black_box(*role), **p))
                    .count()
            })
        });
        group.bench_with_input(BenchmarkId::new("has_minimum_role", role), &role, |b, role| {
            b.iter(|| has_minimum_role(black_box(*role), black_box(Role::Editor)))
        });
    }
    group.finish();
}

fn string_checks(c: &mut Criterion) {
    c.bench_function("check_permission/str", |b| {
        b.iter(|| check_permission(black_box("editor"), black_box("manage_users")))
    });
}

criterion_group!(benches, typed_checks, string_checks);
criterion_main!(benches);
