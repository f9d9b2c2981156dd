//! High level group and pairing wrappers.
//!
//! Scalars here are emulated Fr elements rather than raw native variables;
//! the wrappers reduce them canonically and repack the limbs into one native
//! variable before handing off to the GLV ladders, which keeps the `s < r`
//! precondition of the decomposition honest. This is also where the n-way
//! multiplexers live.

use num_bigint::BigUint;

use crate::emulated::{Bls24315Fr, Element, Field};
use crate::frontend::{Api, CircuitError, Variable};
use crate::tower::{E24, E4};

use super::g1::decompose_scalar_bits;
use super::pairing;
use super::pairing::{Line, LineEvaluations};
use super::{G1Affine, G2AffP, G2Affine, NativeScalar};

/// An Fr scalar, carried as emulated limbs over the native field.
pub type Scalar = Element<Bls24315Fr>;

/// Group operations on G1 with emulated scalars.
pub struct Curve {
    fr: Field<Bls24315Fr>,
}

/// Returns `inputs[sel]`, constraining `sel` to the input range: exactly one
/// of the indicator bits must fire.
fn mux_vars(api: &mut impl Api, sel: Variable, inputs: &[Variable]) -> Variable {
    let mut acc = api.zero();
    let mut total = api.zero();
    for (i, inp) in inputs.iter().enumerate() {
        let idx = api.constant(&BigUint::from(i));
        let diff = api.sub(sel, idx);
        let b = api.is_zero(diff);
        let picked = api.mul(b, *inp);
        acc = api.add(acc, picked);
        total = api.add(total, b);
    }
    let one = api.one();
    api.assert_is_equal(total, one);
    acc
}

fn mux_e4(api: &mut impl Api, sel: Variable, items: &[E4]) -> E4 {
    let mut out = Vec::with_capacity(4);
    for j in 0..4 {
        let slot: Vec<Variable> = items.iter().map(|e| e.vars()[j]).collect();
        out.push(mux_vars(api, sel, &slot));
    }
    E4::from_vars(&out)
}

impl Curve {
    pub fn new(api: &impl Api) -> Self {
        Self {
            fr: Field::new(api),
        }
    }

    /// Allocates a witness scalar from its integer value.
    pub fn new_scalar(&self, api: &mut impl Api, v: &BigUint) -> Scalar {
        self.fr.new_witness(api, v)
    }

    pub fn constant_scalar(&self, api: &mut impl Api, v: &BigUint) -> Scalar {
        self.fr.constant(api, v)
    }

    /// Recomposes the canonical limbs of `s` into a single native variable.
    /// The strict reduction pins the value below r, which the scalar
    /// multiplication ladders rely on.
    fn pack_scalar(&self, api: &mut impl Api, s: &Scalar) -> Variable {
        let reduced = self.fr.reduce_strict(api, s);
        self.fr.pack(api, &reduced)
    }

    pub fn add(&self, api: &mut impl Api, p: &G1Affine, q: &G1Affine) -> G1Affine {
        p.add(api, q)
    }

    pub fn add_unified(&self, api: &mut impl Api, p: &G1Affine, q: &G1Affine) -> G1Affine {
        p.add_unified(api, q)
    }

    pub fn neg(&self, api: &mut impl Api, p: &G1Affine) -> G1Affine {
        p.neg(api)
    }

    pub fn double(&self, api: &mut impl Api, p: &G1Affine) -> G1Affine {
        p.double(api)
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, p: &G1Affine, q: &G1Affine) {
        p.assert_is_equal(api, q);
    }

    pub fn select(
        &self,
        api: &mut impl Api,
        b: Variable,
        i1: &G1Affine,
        i2: &G1Affine,
    ) -> G1Affine {
        G1Affine::select(api, b, i1, i2)
    }

    pub fn lookup2(
        &self,
        api: &mut impl Api,
        b0: Variable,
        b1: Variable,
        i0: &G1Affine,
        i1: &G1Affine,
        i2: &G1Affine,
        i3: &G1Affine,
    ) -> G1Affine {
        G1Affine::lookup2(api, b0, b1, i0, i1, i2, i3)
    }

    /// [s]P; the scalar must be nonzero and P off (0,0).
    pub fn scalar_mul(&self, api: &mut impl Api, p: &G1Affine, s: &Scalar) -> G1Affine {
        let v = self.pack_scalar(api, s);
        p.scalar_mul(api, &NativeScalar::Witness(v))
    }

    /// [s]P tolerating s = 0 and the (0,0) infinity encoding of P.
    pub fn scalar_mul_complete(&self, api: &mut impl Api, p: &G1Affine, s: &Scalar) -> G1Affine {
        let v = self.pack_scalar(api, s);
        p.var_scalar_mul_complete(api, v)
    }

    /// [s1]P1 + [s2]P2 with the same tolerance, at the cost of two full
    /// ladders.
    pub fn joint_scalar_mul_complete(
        &self,
        api: &mut impl Api,
        p1: &G1Affine,
        p2: &G1Affine,
        s1: &Scalar,
        s2: &Scalar,
    ) -> G1Affine {
        let v1 = self.pack_scalar(api, s1);
        let v2 = self.pack_scalar(api, s2);
        p1.joint_scalar_mul(api, p2, v1, v2)
    }

    pub fn scalar_mul_base(&self, api: &mut impl Api, s: &Scalar) -> G1Affine {
        let v = self.pack_scalar(api, s);
        G1Affine::scalar_mul_base(api, &NativeScalar::Witness(v))
    }

    fn joint_scalar_mul(
        &self,
        api: &mut impl Api,
        p1: &G1Affine,
        p2: &G1Affine,
        s1: &Scalar,
        s2: &Scalar,
    ) -> G1Affine {
        let v1 = self.pack_scalar(api, s1);
        let v2 = self.pack_scalar(api, s2);
        p1.joint_scalar_mul_unsafe(api, p2, v1, v2)
    }

    /// sum of scalars[i]*points[i], pairing the terms through the Shamir
    /// ladder. Points and scalars must be nonzero.
    pub fn multi_scalar_mul(
        &self,
        api: &mut impl Api,
        points: &[G1Affine],
        scalars: &[Scalar],
    ) -> Result<G1Affine, CircuitError> {
        if points.is_empty() {
            let zero = api.zero();
            return Ok(G1Affine::new(zero, zero));
        }
        if points.len() != scalars.len() {
            return Err(CircuitError::InvalidWitness(format!(
                "mismatching lengths: {} points, {} scalars",
                points.len(),
                scalars.len()
            )));
        }
        let n = points.len();
        let mut res = if n % 2 == 1 {
            self.scalar_mul(api, &points[n - 1], &scalars[n - 1])
        } else {
            self.joint_scalar_mul(
                api,
                &points[n - 2],
                &points[n - 1],
                &scalars[n - 2],
                &scalars[n - 1],
            )
        };
        let mut i = 1;
        while i < n - 1 {
            let q = self.joint_scalar_mul(api, &points[i - 1], &points[i], &scalars[i - 1], &scalars[i]);
            res = res.add(api, &q);
            i += 2;
        }
        Ok(res)
    }

    /// Horner evaluation of sum of gamma^i*points[i]: a single scalar
    /// decomposition serves every term, which is what batched openings
    /// want.
    pub fn multi_scalar_mul_folded(
        &self,
        api: &mut impl Api,
        points: &[G1Affine],
        gamma: &Scalar,
    ) -> Result<G1Affine, CircuitError> {
        if points.is_empty() {
            let zero = api.zero();
            return Ok(G1Affine::new(zero, zero));
        }
        let n = points.len();
        if n == 1 {
            return Ok(points[0]);
        }
        let g = self.pack_scalar(api, gamma);
        let (g1_bits, g2_bits) = decompose_scalar_bits(api, g, 127);
        let mut res = points[n - 1].scalar_bits_mul(api, &g1_bits, &g2_bits);
        for i in (1..n - 1).rev() {
            res = points[i].add(api, &res);
            res = res.scalar_bits_mul(api, &g1_bits, &g2_bits);
        }
        Ok(points[0].add(api, &res))
    }

    /// Returns `inputs[sel]`; the selector is range-constrained.
    pub fn mux(
        &self,
        api: &mut impl Api,
        sel: Variable,
        inputs: &[G1Affine],
    ) -> Option<G1Affine> {
        if inputs.is_empty() {
            return None;
        }
        let xs: Vec<Variable> = inputs.iter().map(|p| p.x).collect();
        let ys: Vec<Variable> = inputs.iter().map(|p| p.y).collect();
        let x = mux_vars(api, sel, &xs);
        let y = mux_vars(api, sel, &ys);
        Some(G1Affine::new(x, y))
    }
}

/// Pairing operations and the GT/G2 multiplexers.
#[derive(Default)]
pub struct Pairing;

impl Pairing {
    pub fn new() -> Self {
        Self
    }

    pub fn miller_loop(
        &self,
        api: &mut impl Api,
        p: &[G1Affine],
        q: &[G2Affine],
    ) -> Result<E24, CircuitError> {
        pairing::miller_loop(api, p, q)
    }

    pub fn final_exponentiation(&self, api: &mut impl Api, e: &E24) -> E24 {
        pairing::final_exponentiation(api, e)
    }

    pub fn pair(
        &self,
        api: &mut impl Api,
        p: &[G1Affine],
        q: &[G2Affine],
    ) -> Result<E24, CircuitError> {
        pairing::pair(api, p, q)
    }

    pub fn pairing_check(
        &self,
        api: &mut impl Api,
        p: &[G1Affine],
        q: &[G2Affine],
    ) -> Result<(), CircuitError> {
        pairing::pairing_check(api, p, q)
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, a: &E24, b: &E24) {
        a.assert_is_equal(api, b);
    }

    pub fn is_equal(&self, api: &mut impl Api, a: &E24, b: &E24) -> Variable {
        a.is_equal(api, b)
    }

    /// Returns `inputs[sel]`. Points must either all carry line tables or
    /// none of them; muxing a mixed set is a circuit-construction error.
    pub fn mux_g2(
        &self,
        api: &mut impl Api,
        sel: Variable,
        inputs: &[G2Affine],
    ) -> Option<G2Affine> {
        if inputs.is_empty() {
            return None;
        }
        let with_lines = inputs[0].lines.is_some();
        for q in inputs.iter().skip(1) {
            if q.lines.is_some() != with_lines {
                panic!("muxing points with and without precomputed lines");
            }
        }

        let xs: Vec<E4> = inputs.iter().map(|q| q.p.x).collect();
        let ys: Vec<E4> = inputs.iter().map(|q| q.p.y).collect();
        let p = G2AffP::new(mux_e4(api, sel, &xs), mux_e4(api, sel, &ys));

        if !with_lines {
            return Some(G2Affine { p, lines: None });
        }

        let mut blocks = Vec::new();
        let shape = match &inputs[0].lines {
            Some(l) => &l.0,
            None => unreachable!(),
        };
        for (b, block) in shape.iter().enumerate() {
            let mut out_block = Vec::with_capacity(block.len());
            for j in 0..block.len() {
                let r0s: Vec<E4> = inputs
                    .iter()
                    .filter_map(|q| q.lines.as_ref())
                    .map(|l| l.0[b][j].r0)
                    .collect();
                let r1s: Vec<E4> = inputs
                    .iter()
                    .filter_map(|q| q.lines.as_ref())
                    .map(|l| l.0[b][j].r1)
                    .collect();
                out_block.push(Line {
                    r0: mux_e4(api, sel, &r0s),
                    r1: mux_e4(api, sel, &r1s),
                });
            }
            blocks.push(out_block);
        }
        Some(G2Affine {
            p,
            lines: Some(LineEvaluations(blocks)),
        })
    }

    /// Returns `inputs[sel]` over GT elements.
    pub fn mux_gt(&self, api: &mut impl Api, sel: Variable, inputs: &[E24]) -> Option<E24> {
        if inputs.is_empty() {
            return None;
        }
        let mut out = Vec::with_capacity(24);
        for j in 0..24 {
            let slot: Vec<Variable> = inputs.iter().map(|e| e.vars()[j]).collect();
            out.push(mux_vars(api, sel, &slot));
        }
        Some(E24::from_vars(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::fields::Fq;
    use crate::curve::params::curve_params;
    use crate::curve::point::AffinePoint;
    use crate::curve::pairing as native;
    use crate::curve::G1Native;
    use crate::frontend::WitnessEngine;
    use crate::tower::test_utils::{engine, rand_e24n, read_e24};
    use num_bigint::RandBigInt;
    use num_traits::Zero;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn read_point(eng: &WitnessEngine<Fq>, p: &G1Affine) -> G1Native {
        AffinePoint::new(
            Fq::from(eng.value_biguint(p.x)),
            Fq::from(eng.value_biguint(p.y)),
        )
    }

    fn rand_scalar(rng: &mut ChaCha20Rng) -> BigUint {
        rng.gen_biguint_range(&BigUint::from(1u8), &curve_params().fr)
    }

    #[test]
    fn scalar_mul_with_emulated_scalar() {
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let cp = curve_params();
        let s = rand_scalar(&mut rng);
        let a = cp.g1.mul_biguint(&rand_scalar(&mut rng));
        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gp = G1Affine::witness(&mut eng, &a);
        let gs = curve.new_scalar(&mut eng, &s);
        let res = curve.scalar_mul(&mut eng, &gp, &gs);
        assert_eq!(read_point(&eng, &res), a.mul_biguint(&s));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn scalar_mul_base_with_emulated_scalar() {
        let mut rng = ChaCha20Rng::seed_from_u64(32);
        let cp = curve_params();
        let s = rand_scalar(&mut rng);
        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gs = curve.new_scalar(&mut eng, &s);
        let res = curve.scalar_mul_base(&mut eng, &gs);
        assert_eq!(read_point(&eng, &res), cp.g1.mul_biguint(&s));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn complete_scalar_mul_covers_the_degenerate_cases() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let cp = curve_params();
        let a = cp.g1.mul_biguint(&rand_scalar(&mut rng));
        let b = cp.g1.mul_biguint(&rand_scalar(&mut rng));
        let t = rand_scalar(&mut rng);

        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gp = G1Affine::witness(&mut eng, &a);
        let gzero = curve.new_scalar(&mut eng, &BigUint::zero());
        let res = curve.scalar_mul_complete(&mut eng, &gp, &gzero);
        assert!(eng.value_biguint(res.x).is_zero());
        assert!(eng.value_biguint(res.y).is_zero());
        assert!(eng.is_satisfied());

        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gp = G1Affine::witness(&mut eng, &a);
        let gq = G1Affine::witness(&mut eng, &b);
        let gzero = curve.new_scalar(&mut eng, &BigUint::zero());
        let gt = curve.new_scalar(&mut eng, &t);
        let res = curve.joint_scalar_mul_complete(&mut eng, &gp, &gq, &gzero, &gt);
        assert_eq!(read_point(&eng, &res), b.mul_biguint(&t));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn multi_scalar_mul_matches_the_naive_sum() {
        let mut rng = ChaCha20Rng::seed_from_u64(33);
        let cp = curve_params();
        for n in [2usize, 3] {
            let scalars: Vec<BigUint> = (0..n).map(|_| rand_scalar(&mut rng)).collect();
            let points: Vec<G1Native> = (0..n)
                .map(|_| cp.g1.mul_biguint(&rand_scalar(&mut rng)))
                .collect();
            let mut expected = AffinePoint::zero();
            for (p, s) in points.iter().zip(&scalars) {
                expected = expected.add(&p.mul_biguint(s));
            }

            let mut eng = engine();
            let curve = Curve::new(&eng);
            let gps: Vec<G1Affine> = points
                .iter()
                .map(|p| G1Affine::witness(&mut eng, p))
                .collect();
            let gss: Vec<Scalar> = scalars
                .iter()
                .map(|s| curve.new_scalar(&mut eng, s))
                .collect();
            let res = curve.multi_scalar_mul(&mut eng, &gps, &gss).unwrap();
            assert_eq!(read_point(&eng, &res), expected);
            assert!(eng.is_satisfied());
        }
    }

    #[test]
    fn folded_multi_scalar_mul_matches_powers() {
        let mut rng = ChaCha20Rng::seed_from_u64(34);
        let cp = curve_params();
        let n = 3usize;
        let gamma = rand_scalar(&mut rng);
        let points: Vec<G1Native> = (0..n)
            .map(|_| cp.g1.mul_biguint(&rand_scalar(&mut rng)))
            .collect();
        let mut expected = AffinePoint::zero();
        let mut power = BigUint::from(1u8);
        for p in &points {
            expected = expected.add(&p.mul_biguint(&power));
            power = power * &gamma % &cp.fr;
        }

        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gps: Vec<G1Affine> = points
            .iter()
            .map(|p| G1Affine::witness(&mut eng, p))
            .collect();
        let ggamma = curve.new_scalar(&mut eng, &gamma);
        let res = curve
            .multi_scalar_mul_folded(&mut eng, &gps, &ggamma)
            .unwrap();
        assert_eq!(read_point(&eng, &res), expected);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn msm_length_mismatch_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(35);
        let cp = curve_params();
        let a = cp.g1.mul_biguint(&rand_scalar(&mut rng));
        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gp = G1Affine::witness(&mut eng, &a);
        assert!(curve.multi_scalar_mul(&mut eng, &[gp], &[]).is_err());
        let empty = curve.multi_scalar_mul(&mut eng, &[], &[]).unwrap();
        assert!(eng.value_biguint(empty.x).is_zero());
    }

    #[test]
    fn mux_picks_the_selected_point() {
        let mut rng = ChaCha20Rng::seed_from_u64(36);
        let cp = curve_params();
        let points: Vec<G1Native> = (0..3)
            .map(|_| cp.g1.mul_biguint(&rand_scalar(&mut rng)))
            .collect();
        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gps: Vec<G1Affine> = points
            .iter()
            .map(|p| G1Affine::witness(&mut eng, p))
            .collect();
        let sel = eng.witness(&BigUint::from(2u8));
        let picked = curve.mux(&mut eng, sel, &gps).unwrap();
        assert_eq!(read_point(&eng, &picked), points[2]);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn mux_rejects_out_of_range_selectors() {
        let mut rng = ChaCha20Rng::seed_from_u64(37);
        let cp = curve_params();
        let points: Vec<G1Native> = (0..2)
            .map(|_| cp.g1.mul_biguint(&rand_scalar(&mut rng)))
            .collect();
        let mut eng = engine();
        let curve = Curve::new(&eng);
        let gps: Vec<G1Affine> = points
            .iter()
            .map(|p| G1Affine::witness(&mut eng, p))
            .collect();
        let sel = eng.witness(&BigUint::from(5u8));
        let _ = curve.mux(&mut eng, sel, &gps);
        assert!(!eng.is_satisfied());
    }

    #[test]
    fn pairing_wrapper_checks_cancelling_pairs() {
        let mut rng = ChaCha20Rng::seed_from_u64(38);
        let cp = curve_params();
        let p = cp.g1.mul_biguint(&rand_scalar(&mut rng));
        let q = cp.g2.mul_biguint(&rand_scalar(&mut rng));
        let mut eng = engine();
        let pairing = Pairing::new();
        let gp = G1Affine::witness(&mut eng, &p);
        let gp_neg = G1Affine::witness(&mut eng, &p.neg());
        let gq1 = G2Affine::witness(&mut eng, &q);
        let gq2 = G2Affine::witness(&mut eng, &q);
        pairing
            .pairing_check(&mut eng, &[gp, gp_neg], &[gq1, gq2])
            .unwrap();
        assert!(eng.is_satisfied());
    }

    #[test]
    fn gt_equality_flag() {
        let mut rng = ChaCha20Rng::seed_from_u64(39);
        let a = rand_e24n(&mut rng);
        let b = rand_e24n(&mut rng);
        let mut eng = engine();
        let pairing = Pairing::new();
        let ga = E24::witness(&mut eng, &a);
        let ga2 = E24::witness(&mut eng, &a);
        let gb = E24::witness(&mut eng, &b);
        let eq = pairing.is_equal(&mut eng, &ga, &ga2);
        let ne = pairing.is_equal(&mut eng, &ga, &gb);
        assert_eq!(eng.value_biguint(eq), BigUint::from(1u8));
        assert!(eng.value_biguint(ne).is_zero());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn mux_gt_picks_the_selected_element() {
        let mut rng = ChaCha20Rng::seed_from_u64(40);
        let items = [rand_e24n(&mut rng), rand_e24n(&mut rng)];
        let mut eng = engine();
        let pairing = Pairing::new();
        let gs: Vec<E24> = items.iter().map(|v| E24::witness(&mut eng, v)).collect();
        let sel = eng.witness(&BigUint::from(1u8));
        let picked = pairing.mux_gt(&mut eng, sel, &gs).unwrap();
        assert_eq!(read_e24(&eng, &picked), items[1]);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn mux_g2_switches_points_and_line_tables() {
        let mut rng = ChaCha20Rng::seed_from_u64(41);
        let cp = curve_params();
        let q0 = cp.g2.mul_biguint(&rand_scalar(&mut rng));
        let q1 = cp.g2.mul_biguint(&rand_scalar(&mut rng));
        let p = cp.g1.mul_biguint(&rand_scalar(&mut rng));

        let mut eng = engine();
        let pairing = Pairing::new();
        let f0 = G2Affine::new_fixed(&mut eng, &q0);
        let f1 = G2Affine::new_fixed(&mut eng, &q1);
        let sel = eng.witness(&BigUint::from(1u8));
        let picked = pairing.mux_g2(&mut eng, sel, &[f0, f1]).unwrap();
        assert!(picked.lines.is_some());

        let gp = G1Affine::witness(&mut eng, &p);
        let f = pairing.miller_loop(&mut eng, &[gp], &[picked]).unwrap();
        assert_eq!(read_e24(&eng, &f), native::miller_loop(&p, &q1).unwrap());
        assert!(eng.is_satisfied());
    }
}
