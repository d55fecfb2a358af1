use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lattice_heatbath::prelude::*;

fn bench_sweep(c: &mut Criterion) {
    let geometry = LatticeGeometry::new(&[4, 4, 4, 4]).unwrap();
    let action = WilsonAction::new(5.5, 1.0).unwrap();

    c.bench_function("heatbath_sweep_4x4x4x4", |b| {
        let mut field = GaugeField::cold_start(geometry.clone());
        let mut scheduler = SweepScheduler::new(&geometry, action.clone(), SweepParams::new(1));
        b.iter(|| {
            let plaq = scheduler.sweep(black_box(&mut field)).unwrap();
            black_box(plaq)
        });
    });
}

fn bench_staple(c: &mut Criterion) {
    let geometry = LatticeGeometry::new(&[4, 4, 4, 4]).unwrap();
    let action = WilsonAction::new(5.5, 1.0).unwrap();
    let field = GaugeField::cold_start(geometry);

    c.bench_function("wilson_staple", |b| {
        b.iter(|| black_box(action.staple(&field, black_box(7), black_box(2))))
    });
}

criterion_group!(benches, bench_sweep, bench_staple);
criterion_main!(benches);
