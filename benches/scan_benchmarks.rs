use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cloning_primers::engines::compute::{dimer, hairpin, thermo};
use cloning_primers::{design, AssemblyMethod, DesignConfig, DesignRequest, FragmentInput};

fn random_dna(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
}

fn bench_thermo(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let oligo = random_dna(&mut rng, 25);

    c.bench_function("core_melting_temp_25nt", |b| {
        b.iter(|| thermo::core_melting_temp(black_box(&oligo), 50.0, 500.0))
    });
}

fn bench_scanners(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("scanners");

    for len in [20usize, 60, 200, 1000] {
        let a = random_dna(&mut rng, len);
        let b = random_dna(&mut rng, len);
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("dimer", len), &len, |bench, _| {
            bench.iter(|| dimer::scan(black_box(&a), black_box(&b), dimer::DEFAULT_MIN_OVERLAP))
        });
        group.bench_with_input(BenchmarkId::new("hairpin", len), &len, |bench, _| {
            bench.iter(|| {
                hairpin::scan(black_box(&a), hairpin::DEFAULT_MIN_LOOP, hairpin::DEFAULT_MIN_STEM)
            })
        });
    }

    group.finish();
}

fn bench_design(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1234);
    let fragments: Vec<FragmentInput> = (0..6)
        .map(|i| {
            let sequence = String::from_utf8_lossy(&random_dna(&mut rng, 1500)).into_owned();
            FragmentInput::new(&format!("part{}", i + 1), &sequence)
        })
        .collect();
    let request = DesignRequest {
        fragments,
        vector: None,
        method: AssemblyMethod::gibson(),
        config: DesignConfig::default(),
    };

    c.bench_function("gibson_design_6x1500", |b| b.iter(|| design(black_box(&request))));
}

criterion_group!(benches, bench_thermo, bench_scanners, bench_design);
criterion_main!(benches);
