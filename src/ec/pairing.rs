//! In-circuit ate pairing.
//!
//! The Miller loop walks the NAF schedule of the loop counter in the same
//! block order as the native [`crate::curve::pairing`] module, so fixed
//! arguments can feed their precomputed line tables straight in. Lines are
//! scaled by 1/y and x/y of the G1 argument, which makes every line fold a
//! sparse multiplication; the first two folds are cheaper still because the
//! accumulator itself is sparse. The final exponentiation runs the
//! cyclotomic-compressed chain instead of a generic exponentiation.

use crate::curve::params::curve_params;
use crate::frontend::{Api, CircuitError};
use crate::tower::{E12, E24, E4};

use super::g2::G2AffP;
use super::{G1Affine, G2Affine};

/// An evaluated line l(P) = 1 + r0*(x/y)*i + r1*(1/y)*i*w, stored before
/// the scaling by the G1 coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    pub r0: E4,
    pub r1: E4,
}

/// Per-iteration line blocks of the Miller loop, tangent and chord lines in
/// consumption order.
#[derive(Clone, Debug)]
pub struct LineEvaluations(pub Vec<Vec<Line>>);

/// Tangent at p; returns (2p, line).
fn double_step(api: &mut impl Api, p: &G2AffP) -> (G2AffP, Line) {
    let xx = p.x.square(api);
    let three_xx = xx.double(api).add(api, &xx);
    let two_y = p.y.double(api);
    let lambda = three_xx.div_unchecked(api, &two_y);

    let xr = lambda.square(api);
    let two_x = p.x.double(api);
    let xr = xr.sub(api, &two_x);
    let yr = p.x.sub(api, &xr);
    let yr = lambda.mul(api, &yr);
    let yr = yr.sub(api, &p.y);

    let r0 = lambda.neg(api);
    let r1 = lambda.mul(api, &p.x);
    let r1 = r1.sub(api, &p.y);
    (G2AffP::new(xr, yr), Line { r0, r1 })
}

/// Chord through p1 and p2; returns (p1+p2, line).
fn add_step(api: &mut impl Api, p1: &G2AffP, p2: &G2AffP) -> (G2AffP, Line) {
    let num = p2.y.sub(api, &p1.y);
    let den = p2.x.sub(api, &p1.x);
    let lambda = num.div_unchecked(api, &den);

    let xr = lambda.square(api);
    let xr = xr.sub(api, &p1.x);
    let xr = xr.sub(api, &p2.x);
    let yr = p1.x.sub(api, &xr);
    let yr = lambda.mul(api, &yr);
    let yr = yr.sub(api, &p1.y);

    let r0 = lambda.neg(api);
    let r1 = lambda.mul(api, &p1.x);
    let r1 = r1.sub(api, &p1.y);
    (G2AffP::new(xr, yr), Line { r0, r1 })
}

/// The chord line through p1 and p2 without advancing the accumulator.
fn line_compute(api: &mut impl Api, p1: &G2AffP, p2: &G2AffP) -> Line {
    let num = p1.y.sub(api, &p2.y);
    let den = p1.x.sub(api, &p2.x);
    let lambda = num.div_unchecked(api, &den);
    let r0 = lambda.neg(api);
    let r1 = lambda.mul(api, &p1.x);
    let r1 = r1.sub(api, &p1.y);
    Line { r0, r1 }
}

/// 2*p1+p2 with both chord lines; the two divisions share x3.
fn double_and_add_step(api: &mut impl Api, p1: &G2AffP, p2: &G2AffP) -> (G2AffP, Line, Line) {
    let num = p1.y.sub(api, &p2.y);
    let den = p1.x.sub(api, &p2.x);
    let l1 = num.div_unchecked(api, &den);
    let x3 = l1.square(api);
    let x3 = x3.sub(api, &p1.x);
    let x3 = x3.sub(api, &p2.x);
    let r0 = l1.neg(api);
    let r1 = l1.mul(api, &p1.x);
    let r1 = r1.sub(api, &p1.y);
    let line1 = Line { r0, r1 };

    let two_y = p1.y.double(api);
    let den = x3.sub(api, &p1.x);
    let l2 = two_y.div_unchecked(api, &den);
    let l2 = l2.add(api, &l1);
    let l2 = l2.neg(api);

    let x4 = l2.square(api);
    let x4 = x4.sub(api, &p1.x);
    let x4 = x4.sub(api, &x3);
    let y4 = p1.x.sub(api, &x4);
    let y4 = l2.mul(api, &y4);
    let y4 = y4.sub(api, &p1.y);

    let r0 = l2.neg(api);
    let r1 = l2.mul(api, &p1.x);
    let r1 = r1.sub(api, &p1.y);
    let line2 = Line { r0, r1 };
    (G2AffP::new(x4, y4), line1, line2)
}

/// Both lines of the last iteration; the resulting point is discarded.
fn lines_compute(api: &mut impl Api, p1: &G2AffP, p2: &G2AffP) -> (Line, Line) {
    let num = p1.y.sub(api, &p2.y);
    let den = p1.x.sub(api, &p2.x);
    let l1 = num.div_unchecked(api, &den);
    let x3 = l1.square(api);
    let x3 = x3.sub(api, &p1.x);
    let x3 = x3.sub(api, &p2.x);
    let r0 = l1.neg(api);
    let r1 = l1.mul(api, &p1.x);
    let r1 = r1.sub(api, &p1.y);
    let line1 = Line { r0, r1 };

    let two_y = p1.y.double(api);
    let den = x3.sub(api, &p1.x);
    let l2 = two_y.div_unchecked(api, &den);
    let l2 = l2.add(api, &l1);
    let l2 = l2.neg(api);
    let r0 = l2.neg(api);
    let r1 = l2.mul(api, &p1.x);
    let r1 = r1.sub(api, &p1.y);
    (line1, Line { r0, r1 })
}

/// In-circuit counterpart of the native line precomputation: same NAF walk,
/// same block shapes.
pub(crate) fn compute_lines(api: &mut impl Api, q: &G2AffP) -> Vec<Vec<Line>> {
    let naf = &curve_params().naf;
    let q_neg = q.neg(api);
    let mut blocks = Vec::with_capacity(naf.len() - 1);

    // top of the loop: a single tangent
    let (mut acc, l) = double_step(api, q);
    blocks.push(vec![l]);

    // second-highest digit is -1, but acc = 2Q so the double-and-add
    // degenerates into a chord towards -Q plus an add through Q
    let l2 = line_compute(api, &acc, &q_neg);
    let (next, l1) = add_step(api, &acc, q);
    acc = next;
    blocks.push(vec![l1, l2]);

    for i in (1..=29).rev() {
        match naf[i] {
            0 => {
                let (next, l) = double_step(api, &acc);
                acc = next;
                blocks.push(vec![l]);
            }
            1 => {
                let (next, l1, l2) = double_and_add_step(api, &acc, q);
                acc = next;
                blocks.push(vec![l1, l2]);
            }
            _ => {
                let (next, l1, l2) = double_and_add_step(api, &acc, &q_neg);
                acc = next;
                blocks.push(vec![l1, l2]);
            }
        }
    }

    let (l1, l2) = lines_compute(api, &acc, &q_neg);
    blocks.push(vec![l1, l2]);
    blocks
}

/// Product of the Miller functions f_{x0,Q[k]}(P[k]).
///
/// Arguments with precomputed lines skip the in-circuit G2 arithmetic. All
/// points are assumed nonzero; lengths must match and be nonempty.
#[tracing::instrument(skip_all)]
pub fn miller_loop(
    api: &mut impl Api,
    p: &[G1Affine],
    q: &[G2Affine],
) -> Result<E24, CircuitError> {
    let n = p.len();
    if n == 0 {
        return Err(CircuitError::InvalidWitness(
            "at least one pair is required".into(),
        ));
    }
    if n != q.len() {
        return Err(CircuitError::InvalidWitness(format!(
            "mismatching pairing inputs: {} G1 points, {} G2 points",
            n,
            q.len()
        )));
    }

    let mut lines = Vec::with_capacity(n);
    for qk in q {
        match &qk.lines {
            Some(l) => lines.push(l.clone()),
            None => lines.push(LineEvaluations(compute_lines(api, &qk.p))),
        }
    }

    let one = api.one();
    let mut y_inv = Vec::with_capacity(n);
    let mut x_over_y = Vec::with_capacity(n);
    for pk in p {
        let inv = api.div_unchecked(one, pk.y);
        y_inv.push(inv);
        x_over_y.push(api.mul(pk.x, inv));
    }

    let n_blocks = lines[0].0.len();
    let mut res = E24::one(api);
    for b in 0..n_blocks {
        if b > 0 {
            res = res.square(api);
        }
        for k in 0..n {
            for l in &lines[k].0[b] {
                let c3 = l.r0.mul_by_fp(api, x_over_y[k]);
                let c4 = l.r1.mul_by_fp(api, y_inv[k]);
                if b == 0 && k == 0 {
                    // res is one: the fold just writes the sparse slots
                    let zero = E4::zero(api);
                    res = E24::new(res.d0, E12::new(c3, c4, zero));
                } else if b == 0 && k == 1 {
                    // res is still a line, multiply line by line
                    res = E24::mul_034_by_034(api, &c3, &c4, &res.d1.c0, &res.d1.c1);
                } else {
                    res = res.mul_by_034(api, &c3, &c4);
                }
            }
        }
    }

    // the loop counter is the magnitude of the negative seed
    Ok(res.conjugate(api))
}

/// f^((p^24-1)/r) through the cyclotomic subgroup: easy part by one inverse
/// and a Frobenius, hard part by the seed-power chain with compressed
/// squarings.
#[tracing::instrument(skip_all)]
pub fn final_exponentiation(api: &mut impl Api, e: &E24) -> E24 {
    // easy part: e^((p^12-1)(p^4+1))
    let t0 = e.conjugate(api);
    let t0 = t0.div_unchecked(api, e);
    let res = t0.frobenius_quad(api);
    let mut res = res.mul(api, &t0);

    // hard part, in terms of x = |seed|
    let mut t0 = res.cyclotomic_square(api);
    let mut t1 = res.expt(api);
    let mut t2 = res.conjugate(api);
    t1 = t1.mul(api, &t2);
    t2 = t1.expt(api);
    t1 = t1.conjugate(api);
    t1 = t1.mul(api, &t2);
    t2 = t1.expt(api);
    t1 = t1.frobenius(api);
    t1 = t1.mul(api, &t2);
    res = res.mul(api, &t0);
    t0 = t1.expt(api);
    t2 = t0.expt(api);
    t0 = t1.frobenius_square(api);
    t2 = t0.mul(api, &t2);
    t1 = t2.expt(api);
    t1 = t1.expt(api);
    t1 = t1.expt(api);
    t1 = t1.expt(api);
    t0 = t2.frobenius_quad(api);
    t0 = t0.mul(api, &t1);
    t2 = t2.conjugate(api);
    t0 = t0.mul(api, &t2);
    res.mul(api, &t0)
}

/// The reduced ate pairing over all input pairs.
pub fn pair(api: &mut impl Api, p: &[G1Affine], q: &[G2Affine]) -> Result<E24, CircuitError> {
    let f = miller_loop(api, p, q)?;
    Ok(final_exponentiation(api, &f))
}

/// Constrains the product of pairings to one.
pub fn pairing_check(
    api: &mut impl Api,
    p: &[G1Affine],
    q: &[G2Affine],
) -> Result<(), CircuitError> {
    let f = pair(api, p, q)?;
    let one = E24::one(api);
    f.assert_is_equal(api, &one);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::pairing as native;
    use crate::curve::params::curve_params;
    use crate::curve::tower::TowerField;
    use crate::tower::test_utils::{engine, read_e24};
    use num_bigint::{BigUint, RandBigInt};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rand_pair(rng: &mut ChaCha20Rng) -> (crate::curve::G1Native, crate::curve::G2Native) {
        let cp = curve_params();
        let a = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let b = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        (cp.g1.mul_biguint(&a), cp.g2.mul_biguint(&b))
    }

    #[test]
    fn miller_loop_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let (p, q) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp = G1Affine::witness(&mut eng, &p);
        let gq = G2Affine::witness(&mut eng, &q);
        let f = miller_loop(&mut eng, &[gp], &[gq]).unwrap();
        assert_eq!(read_e24(&eng, &f), native::miller_loop(&p, &q).unwrap());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn pair_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        let (p, q) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp = G1Affine::witness(&mut eng, &p);
        let gq = G2Affine::witness(&mut eng, &q);
        let f = pair(&mut eng, &[gp], &[gq]).unwrap();
        assert_eq!(read_e24(&eng, &f), native::pair(&p, &q).unwrap());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn multi_pair_matches_the_native_product() {
        let mut rng = ChaCha20Rng::seed_from_u64(23);
        let (p1, q1) = rand_pair(&mut rng);
        let (p2, q2) = rand_pair(&mut rng);
        let (p3, q3) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp1 = G1Affine::witness(&mut eng, &p1);
        let gp2 = G1Affine::witness(&mut eng, &p2);
        let gp3 = G1Affine::witness(&mut eng, &p3);
        let gq1 = G2Affine::witness(&mut eng, &q1);
        let gq2 = G2Affine::witness(&mut eng, &q2);
        let gq3 = G2Affine::witness(&mut eng, &q3);
        let f = pair(&mut eng, &[gp1, gp2, gp3], &[gq1, gq2, gq3]).unwrap();
        let expected = native::pair(&p1, &q1)
            .unwrap()
            .mul(&native::pair(&p2, &q2).unwrap())
            .mul(&native::pair(&p3, &q3).unwrap());
        assert_eq!(read_e24(&eng, &f), expected);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn fixed_argument_agrees_with_variable() {
        let mut rng = ChaCha20Rng::seed_from_u64(24);
        let (p, q) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp = G1Affine::witness(&mut eng, &p);
        let var_q = G2Affine::witness(&mut eng, &q);
        let fixed_q = G2Affine::new_fixed(&mut eng, &q);
        let f_var = miller_loop(&mut eng, &[gp], &[var_q]).unwrap();
        let f_fixed = miller_loop(&mut eng, &[gp], &[fixed_q]).unwrap();
        assert_eq!(read_e24(&eng, &f_var), read_e24(&eng, &f_fixed));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn mixed_fixed_and_variable_pairs() {
        let mut rng = ChaCha20Rng::seed_from_u64(25);
        let (p1, q1) = rand_pair(&mut rng);
        let (p2, q2) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp1 = G1Affine::witness(&mut eng, &p1);
        let gp2 = G1Affine::witness(&mut eng, &p2);
        let fixed_q1 = G2Affine::new_fixed(&mut eng, &q1);
        let var_q2 = G2Affine::witness(&mut eng, &q2);
        let f = miller_loop(&mut eng, &[gp1, gp2], &[fixed_q1, var_q2]).unwrap();
        let expected = native::miller_loop(&p1, &q1)
            .unwrap()
            .mul(&native::miller_loop(&p2, &q2).unwrap());
        assert_eq!(read_e24(&eng, &f), expected);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn pairing_check_accepts_cancelling_pairs() {
        let mut rng = ChaCha20Rng::seed_from_u64(26);
        let (p, q) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp = G1Affine::witness(&mut eng, &p);
        let gp_neg = G1Affine::witness(&mut eng, &p.neg());
        let gq1 = G2Affine::witness(&mut eng, &q);
        let gq2 = G2Affine::witness(&mut eng, &q);
        pairing_check(&mut eng, &[gp, gp_neg], &[gq1, gq2]).unwrap();
        assert!(eng.is_satisfied());
    }

    #[test]
    fn pairing_check_rejects_non_cancelling_pairs() {
        let mut rng = ChaCha20Rng::seed_from_u64(27);
        let (p, q) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp1 = G1Affine::witness(&mut eng, &p);
        let gp2 = G1Affine::witness(&mut eng, &p);
        let gq1 = G2Affine::witness(&mut eng, &q);
        let gq2 = G2Affine::witness(&mut eng, &q);
        pairing_check(&mut eng, &[gp1, gp2], &[gq1, gq2]).unwrap();
        assert!(!eng.is_satisfied());
    }

    #[test]
    fn pairing_is_bilinear_in_the_circuit() {
        let mut rng = ChaCha20Rng::seed_from_u64(28);
        let cp = curve_params();
        let a = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let pa = cp.g1.mul_biguint(&a);
        let qa = cp.g2.mul_biguint(&a);
        let mut eng = engine();
        let gp = G1Affine::witness(&mut eng, &pa);
        let gq = G2Affine::witness(&mut eng, &cp.g2);
        let f = pair(&mut eng, &[gp], &[gq]).unwrap();
        assert_eq!(read_e24(&eng, &f), native::pair(&cp.g1, &qa).unwrap());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn arity_mismatches_are_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(29);
        let (p, q) = rand_pair(&mut rng);
        let mut eng = engine();
        let gp = G1Affine::witness(&mut eng, &p);
        let gq = G2Affine::witness(&mut eng, &q);
        assert!(miller_loop(&mut eng, &[], &[]).is_err());
        assert!(miller_loop(&mut eng, &[gp], &[]).is_err());
        let gq2 = gq.clone();
        assert!(miller_loop(&mut eng, &[gp], &[gq, gq2]).is_err());
    }
}
