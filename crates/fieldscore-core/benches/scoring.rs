use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fieldscore_core::{score, Value};

/// A wound-care form with `visits` repeated entries, each a nested object.
fn wound_form(visits: usize, drift: bool) -> Value {
    let visits: Vec<serde_json::Value> = (0..visits)
        .map(|i| {
            serde_json::json!({
                "date": format!("2024-03-{:02}", i % 28 + 1),
                "nurse": if drift && i % 3 == 0 { "ANA" } else { "Ana" },
                "wound": {"size": i, "unit": "mm", "hasPus": i % 2 == 0, "exudate": null},
                "treatment": ["saline", "hydrocolloid"],
            })
        })
        .collect();
    Value::from(serde_json::json!({
        "name": "Maria",
        "age": 90,
        "visits": visits,
    }))
}

fn bench_score(c: &mut Criterion) {
    let expected = wound_form(200, false);
    let generated = wound_form(190, true);

    c.bench_function("score_wound_form_200_visits", |b| {
        b.iter(|| score(black_box(&expected), black_box(&generated)))
    });
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
