use std::hint::black_box;

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use dispo_core::ReportId;
use dispo_infra::DispositionConfig;
use dispo_infra::bootstrap::bootstrap_with;
use dispo_inventory::ordering::{COMPANY_NAMES, sort_materials};
use dispo_inventory::{
    Allocation, DistributeForCompany, Grade, InventoryCommand, InventoryItem, InventoryKey,
    InventorySubject, Material, SapNr,
};
use dispo_reporting::{ReportInputs, build_report};

const CATEGORIES: [&str; 6] = ["Fz", "Mat", "Ristl", "Geheim Mat", "Funk", "Zelt"];

fn company_names(count: usize) -> Vec<String> {
    let mut names: Vec<String> = (0..count).map(|i| format!("Ristl Kp 17/{i}")).collect();
    names.push("Stab".to_string());
    names.push("Bat".to_string());
    names
}

fn materials(count: usize) -> Vec<Material> {
    (0..count)
        .map(|i| {
            Material::new(
                format!("{}.{:03}", 200 + i % 50, i),
                CATEGORIES[i % CATEGORIES.len()],
                format!("Gerät {i}"),
                "",
            )
        })
        .collect()
}

fn distributed<S: InventorySubject>(subject: S, company: &str) -> InventoryItem<S> {
    let command = InventoryCommand::Distribute(DistributeForCompany {
        distribution: vec![
            Allocation::at("KP Rw", 20, 5, 1),
            Allocation::at("KP Front", 12, 8, 2),
        ],
        occurred_at: Utc::now(),
    });
    InventoryItem::execute(None, InventoryKey::new(subject, company), &command)
        .unwrap()
        .item
}

fn bench_build_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_report");

    for (companies, material_count) in [(5, 50), (10, 200), (20, 500)] {
        let names = company_names(companies);
        let materials = materials(material_count);
        let material_items: Vec<_> = names
            .iter()
            .flat_map(|company| materials.iter().map(move |m| distributed(m.sap_nr.clone(), company)))
            .collect();
        let servant_items: Vec<_> = names
            .iter()
            .flat_map(|company| Grade::ALL.into_iter().map(move |g| distributed(g, company)))
            .collect();

        group.throughput(Throughput::Elements(material_items.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{companies}x{material_count}")),
            &(names, materials, material_items, servant_items),
            |b, (names, materials, material_items, servant_items)| {
                b.iter(|| {
                    build_report(
                        ReportId::new(),
                        Utc::now(),
                        ReportInputs {
                            company_names: black_box(names),
                            materials: black_box(materials),
                            grades: &Grade::ALL,
                            material_items: black_box(material_items),
                            servant_items: black_box(servant_items),
                        },
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");

    let materials = materials(1000);
    group.bench_function("sort_materials_1000", |b| {
        b.iter(|| {
            let mut batch = materials.clone();
            sort_materials(black_box(&mut batch));
            batch
        });
    });

    let names = company_names(100);
    group.bench_function("sort_company_names_100", |b| {
        b.iter(|| {
            let mut batch = names.clone();
            COMPANY_NAMES.sort(black_box(&mut batch));
            batch
        });
    });

    group.finish();
}

fn bench_service_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_service");
    let boot = bootstrap_with(DispositionConfig::default()).unwrap();
    let service = boot.disposition.material_inventory();
    for i in 0..500 {
        service
            .distribute(SapNr::new(format!("{i}")), "Stab", vec![Allocation::at("KP Rw", 10, 0, 0)])
            .unwrap();
    }

    group.bench_function("report_used_among_500_items", |b| {
        b.iter(|| {
            service
                .report_used(SapNr::new("250"), "Stab", "KP Rw", black_box(1))
                .unwrap();
            service
                .report_used(SapNr::new("250"), "Stab", "KP Rw", black_box(-1))
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build_report, bench_ordering, bench_service_roundtrip);
criterion_main!(benches);
