//! GLV lattice precomputation and scalar splitting.
//!
//! For the eigenvalue lambda of the degree-3 endomorphism, finds a short
//! basis of the lattice {(x, y) : x + lambda*y = 0 mod r} by the half-GCD
//! walk, then splits scalars with Babai rounding. Both sub-scalars come out
//! with magnitude around sqrt(r).

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::{Integer, Roots};
use num_traits::{Signed, Zero};

#[derive(Clone, Debug)]
pub struct Lattice {
    pub v1: [BigInt; 2],
    pub v2: [BigInt; 2],
    pub det: BigInt,
}

fn norm2(v: &[BigInt; 2]) -> BigInt {
    &v[0] * &v[0] + &v[1] * &v[1]
}

/// Division rounded to the nearest integer (ties away from zero).
fn rounded_div(num: &BigInt, den: &BigInt) -> BigInt {
    let (q, r) = num.div_rem(den);
    if &r.abs() * 2 >= den.abs() {
        if (num.sign() == Sign::Minus) ^ (den.sign() == Sign::Minus) {
            q - 1u8
        } else {
            q + 1u8
        }
    } else {
        q
    }
}

pub fn precompute_lattice(r: &BigUint, lambda: &BigUint) -> Lattice {
    let r = BigInt::from(r.clone());
    let lambda = BigInt::from(lambda.clone());
    let sqrt_r = r.sqrt();

    // extended Euclid rows (a_i, t_i) with a_i = t_i*lambda mod r
    let (mut a0, mut a1) = (r.clone(), lambda);
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::from(1u8));
    while a1 >= sqrt_r {
        let q = &a0 / &a1;
        let a2 = &a0 - &q * &a1;
        let t2 = &t0 - &q * &t1;
        a0 = std::mem::replace(&mut a1, a2);
        t0 = std::mem::replace(&mut t1, t2);
    }
    // one more row; v2 is the shorter of the neighbours of v1
    let q = &a0 / &a1;
    let a2 = &a0 - &q * &a1;
    let t2 = &t0 - &q * &t1;

    let v1 = [a1.clone(), -t1];
    let u = [a0, -t0];
    let w = [a2, -t2];
    let v2 = if norm2(&u) <= norm2(&w) { u } else { w };

    let det = &v1[0] * &v2[1] - &v1[1] * &v2[0];
    assert!(
        det.abs() == r,
        "degenerate GLV lattice: det != +-r"
    );
    Lattice { v1, v2, det }
}

/// Splits s into (k1, k2) with s = k1 + lambda*k2 mod r.
pub fn split_scalar(s: &BigInt, l: &Lattice) -> [BigInt; 2] {
    let c1 = rounded_div(&(&l.v2[1] * s), &l.det);
    let c2 = rounded_div(&(-(&l.v1[1]) * s), &l.det);
    let k1 = s - &c1 * &l.v1[0] - &c2 * &l.v2[0];
    let k2 = -(&c1 * &l.v1[1]) - &c2 * &l.v2[1];
    [k1, k2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::params::curve_params;
    use num_bigint::RandBigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn split_recomposes_and_is_short() {
        let cp = curve_params();
        let r = BigInt::from(cp.fr.clone());
        let lambda = BigInt::from(cp.lambda.clone());
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        for _ in 0..32 {
            let s = rng.gen_bigint_range(&BigInt::zero(), &r);
            let [k1, k2] = split_scalar(&s, &cp.lattice);
            let lhs = (&k1 + &lambda * &k2).mod_floor(&r);
            assert_eq!(lhs, s);
            assert!(k1.abs().bits() <= 127);
            assert!(k2.abs().bits() <= 127);
        }
    }
}
