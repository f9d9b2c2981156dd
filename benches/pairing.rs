use criterion::{criterion_group, criterion_main, Criterion};
use num_bigint::{BigUint, RandBigInt};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use pairing_gadgets::curve::params::curve_params;
use pairing_gadgets::curve::Fq;
use pairing_gadgets::ec::pairing::{miller_loop, pair};
use pairing_gadgets::ec::{G1Affine, G2Affine};
use pairing_gadgets::frontend::hints::default_registry;
use pairing_gadgets::frontend::{Api, WitnessEngine};

fn engine() -> WitnessEngine<Fq> {
    WitnessEngine::new(default_registry())
}

fn bench_scalar_mul(c: &mut Criterion) {
    let cp = curve_params();
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
    let p = cp.g1.mul_biguint(&rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr));

    c.bench_function("g1_var_scalar_mul", |b| {
        b.iter(|| {
            let mut eng = engine();
            let gp = G1Affine::witness(&mut eng, &p);
            let gs = eng.witness(&s);
            let res = gp.var_scalar_mul(&mut eng, gs);
            assert!(eng.is_satisfied());
            res
        })
    });
}

fn bench_miller_loop(c: &mut Criterion) {
    let cp = curve_params();
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let p = cp.g1.mul_biguint(&rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr));
    let q = cp.g2.mul_biguint(&rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr));

    let mut group = c.benchmark_group("miller_loop");
    group.sample_size(10);
    group.bench_function("variable_q", |b| {
        b.iter(|| {
            let mut eng = engine();
            let gp = G1Affine::witness(&mut eng, &p);
            let gq = G2Affine::witness(&mut eng, &q);
            miller_loop(&mut eng, &[gp], &[gq]).unwrap()
        })
    });
    group.bench_function("fixed_q", |b| {
        b.iter(|| {
            let mut eng = engine();
            let gp = G1Affine::witness(&mut eng, &p);
            let gq = G2Affine::new_fixed(&mut eng, &q);
            miller_loop(&mut eng, &[gp], &[gq]).unwrap()
        })
    });
    group.finish();
}

fn bench_pair(c: &mut Criterion) {
    let cp = curve_params();
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let p = cp.g1.mul_biguint(&rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr));
    let q = cp.g2.mul_biguint(&rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr));

    let mut group = c.benchmark_group("pair");
    group.sample_size(10);
    group.bench_function("single", |b| {
        b.iter(|| {
            let mut eng = engine();
            let gp = G1Affine::witness(&mut eng, &p);
            let gq = G2Affine::witness(&mut eng, &q);
            pair(&mut eng, &[gp], &[gq]).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_scalar_mul, bench_miller_loop, bench_pair);
criterion_main!(benches);
