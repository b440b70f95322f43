use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use quiniela_terminal::catalog::Catalog;
use quiniela_terminal::entry::{QuinielaEntry, SelectionMode, SelectionValue};
use quiniela_terminal::serialize::{build_payload, whatsapp_url};

fn sample_entries(catalog: &Catalog, count: usize) -> Vec<QuinielaEntry> {
    (0..count)
        .map(|n| {
            let mut entry = QuinielaEntry::empty(catalog, SelectionMode::Multi);
            for (idx, id) in catalog.ids().enumerate() {
                entry.set_selection(id, SelectionValue::ALL[(n + idx) % 3]);
                if (n + idx) % 4 == 0 {
                    entry.set_selection(id, SelectionValue::ALL[(n + idx + 1) % 3]);
                }
            }
            entry
        })
        .collect()
}

fn bench_build_payload(c: &mut Criterion) {
    let catalog = Catalog::embedded().expect("embedded catalog").clone();
    let saved = sample_entries(&catalog, 20);
    let active = QuinielaEntry::empty(&catalog, SelectionMode::Multi);

    c.bench_function("build_payload_20_entries", |b| {
        b.iter(|| {
            let payload = build_payload(
                &catalog,
                black_box("Ana"),
                black_box("5512345678"),
                SelectionMode::Multi,
                black_box(&saved),
                &active,
            )
            .unwrap();
            black_box(payload.lines.len());
        })
    });
}

fn bench_whatsapp_url(c: &mut Criterion) {
    let catalog = Catalog::embedded().expect("embedded catalog").clone();
    let saved = sample_entries(&catalog, 20);
    let active = QuinielaEntry::empty(&catalog, SelectionMode::Multi);
    let payload = build_payload(
        &catalog,
        "Ana",
        "5512345678",
        SelectionMode::Multi,
        &saved,
        &active,
    )
    .expect("payload");
    let message = payload.message();

    c.bench_function("whatsapp_url_encode", |b| {
        b.iter(|| {
            let url = whatsapp_url(black_box("5215512345678"), black_box(&message));
            black_box(url.len());
        })
    });
}

criterion_group!(benches, bench_build_payload, bench_whatsapp_url);
criterion_main!(benches);
