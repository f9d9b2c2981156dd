//! G1 gadget: affine group law and GLV scalar multiplication.
//!
//! Points live in affine coordinates over the native field. The formulas are
//! incomplete; (0,0) conventionally stands for the infinity point and is only
//! handled by [`G1Affine::add_unified`]. Scalar multiplication splits the
//! scalar along the cube-root endomorphism and runs a shared double-and-add
//! ladder over both halves.

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};

use crate::curve::glv::split_scalar;
use crate::curve::params::curve_params;
use crate::curve::G1Native;
use crate::frontend::{run_hint, Api, Variable};

use super::hints;
use super::NativeScalar;

#[derive(Clone, Copy, Debug)]
pub struct G1Affine {
    pub x: Variable,
    pub y: Variable,
}

/// Runs the decomposition hint on `s` and constrains the result:
/// `s1 + lambda*s2 == s + m*r` with `m` boolean and the sub-scalars on
/// `nbits` bits. Sound for any `s < r`; the boolean range on `m` keeps the
/// relation from wrapping the native field.
pub(crate) fn decompose_scalar_bits(
    api: &mut impl Api,
    s: Variable,
    nbits: usize,
) -> (Vec<Variable>, Vec<Variable>) {
    let cp = curve_params();
    let outs = run_hint(api, hints::DECOMPOSE_SCALAR, 3, &[s]);
    let (s1, s2, m) = (outs[0], outs[1], outs[2]);
    let lhs = api.mul_const(s2, &cp.lambda);
    let lhs = api.add(s1, lhs);
    let rhs = api.mul_const(m, &cp.fr);
    let rhs = api.add(s, rhs);
    api.assert_is_equal(lhs, rhs);
    api.assert_is_boolean(m);
    let s1_bits = api.to_binary(s1, nbits);
    let s2_bits = api.to_binary(s2, nbits);
    (s1_bits, s2_bits)
}

impl G1Affine {
    pub fn new(x: Variable, y: Variable) -> Self {
        Self { x, y }
    }

    pub fn constant(api: &mut impl Api, v: &G1Native) -> Self {
        if v.is_zero() {
            let zero = api.zero();
            return Self::new(zero, zero);
        }
        let x = api.constant(&v.x.into());
        let y = api.constant(&v.y.into());
        Self::new(x, y)
    }

    pub fn witness(api: &mut impl Api, v: &G1Native) -> Self {
        if v.is_zero() {
            let x = api.witness(&BigUint::zero());
            let y = api.witness(&BigUint::zero());
            return Self::new(x, y);
        }
        let x = api.witness(&v.x.into());
        let y = api.witness(&v.y.into());
        Self::new(x, y)
    }

    pub fn neg(&self, api: &mut impl Api) -> Self {
        Self::new(self.x, api.neg(self.y))
    }

    pub fn select(api: &mut impl Api, b: Variable, i1: &Self, i2: &Self) -> Self {
        Self::new(api.select(b, i1.x, i2.x), api.select(b, i1.y, i2.y))
    }

    pub fn lookup2(
        api: &mut impl Api,
        b0: Variable,
        b1: Variable,
        i0: &Self,
        i1: &Self,
        i2: &Self,
        i3: &Self,
    ) -> Self {
        Self::new(
            api.lookup2(b0, b1, i0.x, i1.x, i2.x, i3.x),
            api.lookup2(b0, b1, i0.y, i1.y, i2.y, i3.y),
        )
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, other: &Self) {
        api.assert_is_equal(self.x, other.x);
        api.assert_is_equal(self.y, other.y);
    }

    /// Chord addition; unsatisfiable when the x-coordinates collide.
    pub fn add(&self, api: &mut impl Api, other: &Self) -> Self {
        let num = api.sub(other.y, self.y);
        let den = api.sub(other.x, self.x);
        let lambda = api.div(num, den);
        let xr = api.mul(lambda, lambda);
        let xr = api.sub(xr, self.x);
        let xr = api.sub(xr, other.x);
        let yr = api.sub(self.x, xr);
        let yr = api.mul(lambda, yr);
        let yr = api.sub(yr, self.y);
        Self::new(xr, yr)
    }

    pub fn double(&self, api: &mut impl Api) -> Self {
        let xx = api.mul(self.x, self.x);
        let three_xx = api.mul_const(xx, &BigUint::from(3u8));
        let two_y = api.add(self.y, self.y);
        let lambda = api.div(three_xx, two_y);
        let xr = api.mul(lambda, lambda);
        let two_x = api.add(self.x, self.x);
        let xr = api.sub(xr, two_x);
        let yr = api.sub(self.x, xr);
        let yr = api.mul(lambda, yr);
        let yr = api.sub(yr, self.y);
        Self::new(xr, yr)
    }

    /// 2*self + other with a shared inversion, omitting the intermediate
    /// y-coordinate.
    pub fn double_and_add(&self, api: &mut impl Api, other: &Self) -> Self {
        let num = api.sub(self.y, other.y);
        let den = api.sub(self.x, other.x);
        let l1 = api.div_unchecked(num, den);

        let x3 = api.mul(l1, l1);
        let x3 = api.sub(x3, self.x);
        let x3 = api.sub(x3, other.x);

        let two_y = api.add(self.y, self.y);
        let den = api.sub(x3, self.x);
        let l2 = api.div_unchecked(two_y, den);
        let l2 = api.add(l2, l1);

        let x4 = api.mul(l2, l2);
        let x4 = api.sub(x4, self.x);
        let x4 = api.sub(x4, x3);

        let y4 = api.sub(x4, self.x);
        let y4 = api.mul(l2, y4);
        let y4 = api.sub(y4, self.y);
        Self::new(x4, y4)
    }

    /// Branchless unified addition covering doubling, inverses and the (0,0)
    /// infinity encoding, following Brier-Joye.
    pub fn add_unified(&self, api: &mut impl Api, other: &Self) -> Self {
        let zx = api.is_zero(self.x);
        let zy = api.is_zero(self.y);
        let sel1 = api.and(zx, zy);
        let zx = api.is_zero(other.x);
        let zy = api.is_zero(other.y);
        let sel2 = api.and(zx, zy);

        // lambda = ((x1+x2)^2 - x1*x2) / (y1+y2)
        let pxqx = api.mul(self.x, other.x);
        let pxplusqx = api.add(self.x, other.x);
        let num = api.mul(pxplusqx, pxplusqx);
        let num = api.sub(num, pxqx);
        let denum = api.add(self.y, other.y);
        let sel3 = api.is_zero(denum);
        let one = api.one();
        let denum = api.select(sel3, one, denum);
        let lambda = api.div(num, denum);

        let xr = api.mul(lambda, lambda);
        let xr = api.sub(xr, pxplusqx);
        let yr = api.sub(self.x, xr);
        let yr = api.mul(yr, lambda);
        let yr = api.sub(yr, self.y);

        let res = Self::new(xr, yr);
        let res = Self::select(api, sel1, other, &res);
        let res = Self::select(api, sel2, self, &res);
        let zero = api.zero();
        let infinity = Self::new(zero, zero);
        Self::select(api, sel3, &infinity, &res)
    }

    /// The degree-3 endomorphism: (x, y) -> (omega*x, y), eigenvalue lambda.
    pub fn phi1(&self, api: &mut impl Api) -> Self {
        let cp = curve_params();
        Self::new(api.mul_const(self.x, &cp.omega.into()), self.y)
    }

    /// -phi^2: (x, y) -> (omega^2*x, -y), i.e. the point Q + phi(Q).
    pub fn phi2_neg(&self, api: &mut impl Api) -> Self {
        let cp = curve_params();
        let omega2: BigUint = (cp.omega * cp.omega).into();
        Self::new(api.mul_const(self.x, &omega2), api.neg(self.y))
    }

    /// [s]Q for a scalar given by its GLV sub-scalar bit decompositions.
    /// Shared by the variable-scalar path and the folded multi-scalar
    /// multiplication, which reuses one decomposition across points.
    ///
    /// Both bit slices must be 127 bits; the scalar must be nonzero and Q
    /// must not be (0,0).
    pub fn scalar_bits_mul(
        &self,
        api: &mut impl Api,
        s1_bits: &[Variable],
        s2_bits: &[Variable],
    ) -> Self {
        self.glv_ladder(api, s1_bits, s2_bits, false)
    }

    /// The shared GLV double-and-add ladder. With `complete` set, the edge
    /// corrections go through unified additions, so a zero scalar lands on
    /// the (0,0) infinity encoding instead of an unsatisfiable chord.
    fn glv_ladder(
        &self,
        api: &mut impl Api,
        s1_bits: &[Variable],
        s2_bits: &[Variable],
        complete: bool,
    ) -> Self {
        let neg_q = self.neg(api);
        let phi_q = self.phi1(api);
        let neg_phi_q = phi_q.neg(api);

        // the four signed combinations +-Q +- phi(Q); negated pairs share x
        let b1 = self.phi2_neg(api);
        let b2 = b1.neg(api);
        let b3 = self.add(api, &neg_phi_q);
        let b4 = b3.neg(api);

        // Conditioning point: keeps the accumulator clear of the table
        // points so the incomplete formulas never degenerate. The affine
        // doubling of (0,1) is (0,-1) and the loop length is even, so it
        // comes back to (0,1) and is peeled off at the end.
        let zero = api.zero();
        let one = api.one();
        let h = Self::new(zero, one);
        let mut acc = b1.add(api, &h);

        for i in (1..127).rev() {
            let xs = api.xor(s1_bits[i], s2_bits[i]);
            let bx = api.select(xs, b3.x, b2.x);
            let by = api.lookup2(s1_bits[i], s2_bits[i], b2.y, b3.y, b4.y, b1.y);
            let b = Self::new(bx, by);
            acc = acc.double_and_add(api, &b);
        }

        // low bits: the ladder assumed them set, subtract where they are not
        let t = if complete {
            neg_q.add_unified(api, &acc)
        } else {
            neg_q.add(api, &acc)
        };
        acc = Self::select(api, s1_bits[0], &acc, &t);
        let t = if complete {
            neg_phi_q.add_unified(api, &acc)
        } else {
            neg_phi_q.add(api, &acc)
        };
        acc = Self::select(api, s2_bits[0], &acc, &t);

        let minus_one = api.constant_i64(-1);
        let h_back = Self::new(zero, minus_one);
        if complete {
            // a zero scalar leaves acc at exactly (0,1) here, and the
            // unified addition cancels it against (0,-1) into (0,0)
            acc.add_unified(api, &h_back)
        } else {
            acc.add(api, &h_back)
        }
    }

    /// [s]Q for a witness scalar; s must be nonzero and reduced below r.
    #[tracing::instrument(skip_all)]
    pub fn var_scalar_mul(&self, api: &mut impl Api, s: Variable) -> Self {
        let (s1_bits, s2_bits) = decompose_scalar_bits(api, s, 127);
        self.scalar_bits_mul(api, &s1_bits, &s2_bits)
    }

    /// [s]Q accepting s = 0 and the (0,0) infinity encoding of Q. A dummy
    /// point keeps the incomplete ladder formulas away from their poles;
    /// its result is discarded by the final select.
    pub fn var_scalar_mul_complete(&self, api: &mut impl Api, s: Variable) -> Self {
        let zx = api.is_zero(self.x);
        let zy = api.is_zero(self.y);
        let selector = api.and(zx, zy);
        let one = api.one();
        let dummy = Self::new(one, one);
        let q = Self::select(api, selector, &dummy, self);

        let (s1_bits, s2_bits) = decompose_scalar_bits(api, s, 127);
        let acc = q.glv_ladder(api, &s1_bits, &s2_bits, true);

        let zero = api.zero();
        let infinity = Self::new(zero, zero);
        Self::select(api, selector, &infinity, &acc)
    }

    /// [s]Q for a compile-time scalar. The split is done at build time, so
    /// only the point operations reach the circuit.
    pub fn const_scalar_mul(&self, api: &mut impl Api, s: &BigUint) -> Self {
        let cp = curve_params();
        let s = s % &cp.fr;
        if s.is_zero() {
            let zero = api.zero();
            return Self::new(zero, zero);
        }

        let mut q = *self;
        let mut phi_q = self.phi1(api);
        let [k0, k1] = split_scalar(&BigInt::from(s), &cp.lattice);
        if k0.is_negative() {
            q = q.neg(api);
        }
        if k1.is_negative() {
            phi_q = phi_q.neg(api);
        }
        let k0 = k0.abs().to_biguint().unwrap_or_default();
        let k1 = k1.abs().to_biguint().unwrap_or_default();

        let neg_q = q.neg(api);
        let neg_phi_q = phi_q.neg(api);
        let table = [
            neg_q.add(api, &neg_phi_q),
            q.add(api, &neg_phi_q),
            neg_q.add(api, &phi_q),
            q.add(api, &phi_q),
        ];

        let mut nbits = k0.bits().max(k1.bits());
        let mut acc = table[3];
        // peel the top iteration when it would hit Acc == B
        if k0.bit(nbits - 1) && k1.bit(nbits - 1) {
            acc = acc.double(api);
            acc = acc.add(api, &table[3]);
            nbits -= 1;
        }
        for i in (1..nbits).rev() {
            let idx = k0.bit(i) as usize + 2 * k1.bit(i) as usize;
            acc = acc.double_and_add(api, &table[idx]);
        }
        if !k0.bit(0) {
            acc = acc.add(api, &neg_q);
        }
        if !k1.bit(0) {
            acc = acc.add(api, &neg_phi_q);
        }
        acc
    }

    pub fn scalar_mul(&self, api: &mut impl Api, s: &NativeScalar) -> Self {
        match s {
            NativeScalar::Constant(v) => self.const_scalar_mul(api, v),
            NativeScalar::Witness(v) => match api.constant_value(*v) {
                Some(c) => self.const_scalar_mul(api, &c),
                None => self.var_scalar_mul(api, *v),
            },
        }
    }

    /// [s]G for the subgroup generator G.
    pub fn scalar_mul_base(api: &mut impl Api, s: &NativeScalar) -> Self {
        let cp = curve_params();
        let g = Self::constant(api, &cp.g1);
        g.scalar_mul(api, s)
    }

    /// [s]Q + [t]R tolerating zero scalars and (0,0) inputs: two complete
    /// ladders joined by a unified addition. Costlier than the shared
    /// Shamir ladder of [`Self::joint_scalar_mul_unsafe`].
    pub fn joint_scalar_mul(
        &self,
        api: &mut impl Api,
        other: &Self,
        s: Variable,
        t: Variable,
    ) -> Self {
        let a = self.var_scalar_mul_complete(api, s);
        let b = other.var_scalar_mul_complete(api, t);
        a.add_unified(api, &b)
    }

    /// [s]Q + [t]R by a shared Shamir ladder over both GLV splits. Assumes
    /// generic inputs: nonzero scalars, points off (0,0) and no accidental
    /// collisions in the table sums.
    pub fn joint_scalar_mul_unsafe(
        &self,
        api: &mut impl Api,
        other: &Self,
        s: Variable,
        t: Variable,
    ) -> Self {
        let nbits = 128;
        let (s1b, s2b) = decompose_scalar_bits(api, s, nbits);
        let (t1b, t2b) = decompose_scalar_bits(api, t, nbits);

        let neg_q = self.neg(api);
        let phi_q = self.phi1(api);
        let neg_phi_q = phi_q.neg(api);
        let neg_r = other.neg(api);
        let phi_r = other.phi1(api);
        let neg_phi_r = phi_r.neg(api);

        // +-Q +- R and the image of the four sums under phi
        let t0 = neg_q.add(api, &neg_r);
        let t1 = t0.neg(api);
        let t2 = self.add(api, &neg_r);
        let t3 = t2.neg(api);
        let table = [t0, t1, t2, t3];
        let table_phi = [
            table[0].phi1(api),
            table[1].phi1(api),
            table[2].phi1(api),
            table[3].phi1(api),
        ];

        // assume all top bits set: Acc = Q + R + phi(Q+R)
        let mut acc = table[1].phi2_neg(api);

        for i in (1..nbits).rev() {
            let xs = api.xor(s1b[i], t1b[i]);
            let bx = api.select(xs, table[2].x, table[0].x);
            let by = api.lookup2(s1b[i], t1b[i], table[0].y, table[2].y, table[3].y, table[1].y);
            let b = Self::new(bx, by);
            acc = acc.double_and_add(api, &b);

            let xs = api.xor(s2b[i], t2b[i]);
            let bx = api.select(xs, table_phi[2].x, table_phi[0].x);
            let by = api.lookup2(
                s2b[i],
                t2b[i],
                table_phi[0].y,
                table_phi[2].y,
                table_phi[3].y,
                table_phi[1].y,
            );
            let b = Self::new(bx, by);
            acc = acc.add(api, &b);
        }

        let t = neg_q.add(api, &acc);
        acc = Self::select(api, s1b[0], &acc, &t);
        let t = neg_phi_q.add(api, &acc);
        acc = Self::select(api, s2b[0], &acc, &t);
        let t = neg_r.add(api, &acc);
        acc = Self::select(api, t1b[0], &acc, &t);
        let t = neg_phi_r.add(api, &acc);
        Self::select(api, t2b[0], &acc, &t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::fields::Fq;
    use crate::curve::point::AffinePoint;
    use crate::frontend::WitnessEngine;
    use crate::tower::test_utils::engine;
    use num_bigint::RandBigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn read_point(eng: &WitnessEngine<Fq>, p: &G1Affine) -> G1Native {
        AffinePoint::new(
            Fq::from(eng.value_biguint(p.x)),
            Fq::from(eng.value_biguint(p.y)),
        )
    }

    fn rand_point(rng: &mut ChaCha20Rng) -> (G1Native, BigUint) {
        let cp = curve_params();
        let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        (cp.g1.mul_biguint(&s), s)
    }

    #[test]
    fn group_law_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (a, _) = rand_point(&mut rng);
        let (b, _) = rand_point(&mut rng);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let gb = G1Affine::witness(&mut eng, &b);
        let sum = ga.add(&mut eng, &gb);
        let dbl = ga.double(&mut eng);
        let dadd = ga.double_and_add(&mut eng, &gb);
        assert_eq!(read_point(&eng, &sum), a.add(&b));
        assert_eq!(read_point(&eng, &dbl), a.double());
        assert_eq!(read_point(&eng, &dadd), a.double().add(&b));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn unified_addition_handles_the_edge_cases() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (a, _) = rand_point(&mut rng);
        let (b, _) = rand_point(&mut rng);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let gb = G1Affine::witness(&mut eng, &b);
        let zero = G1Affine::witness(&mut eng, &AffinePoint::zero());
        let neg_a = ga.neg(&mut eng);

        let sum = ga.add_unified(&mut eng, &gb);
        assert_eq!(read_point(&eng, &sum), a.add(&b));
        let dbl = ga.add_unified(&mut eng, &ga);
        assert_eq!(read_point(&eng, &dbl), a.double());
        let left = zero.add_unified(&mut eng, &ga);
        assert_eq!(read_point(&eng, &left), a);
        let right = ga.add_unified(&mut eng, &zero);
        assert_eq!(read_point(&eng, &right), a);
        let cancel = ga.add_unified(&mut eng, &neg_a);
        assert_eq!(eng.value_biguint(cancel.x), BigUint::zero());
        assert_eq!(eng.value_biguint(cancel.y), BigUint::zero());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn endomorphism_matches_the_eigenvalue() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let cp = curve_params();
        let (a, _) = rand_point(&mut rng);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let phi = ga.phi1(&mut eng);
        assert_eq!(read_point(&eng, &phi), a.mul_biguint(&cp.lambda));
        let phi2n = ga.phi2_neg(&mut eng);
        let expected = a.add(&a.mul_biguint(&cp.lambda));
        assert_eq!(read_point(&eng, &phi2n), expected);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn var_scalar_mul_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let cp = curve_params();
        for _ in 0..4 {
            let (a, _) = rand_point(&mut rng);
            let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
            let mut eng = engine();
            let ga = G1Affine::witness(&mut eng, &a);
            let gs = eng.witness(&s);
            let res = ga.var_scalar_mul(&mut eng, gs);
            assert_eq!(read_point(&eng, &res), a.mul_biguint(&s));
            assert!(eng.is_satisfied());
        }
    }

    #[test]
    fn var_scalar_mul_accepts_tiny_scalars() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let (a, _) = rand_point(&mut rng);
        for s in 1u8..=4 {
            let s = BigUint::from(s);
            let mut eng = engine();
            let ga = G1Affine::witness(&mut eng, &a);
            let gs = eng.witness(&s);
            let res = ga.var_scalar_mul(&mut eng, gs);
            assert_eq!(read_point(&eng, &res), a.mul_biguint(&s));
            assert!(eng.is_satisfied());
        }
    }

    #[test]
    fn complete_scalar_mul_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let cp = curve_params();
        let (a, _) = rand_point(&mut rng);
        let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let gs = eng.witness(&s);
        let res = ga.var_scalar_mul_complete(&mut eng, gs);
        assert_eq!(read_point(&eng, &res), a.mul_biguint(&s));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn complete_scalar_mul_of_zero_scalar_is_infinity() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let (a, _) = rand_point(&mut rng);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let gs = eng.witness(&BigUint::zero());
        let res = ga.var_scalar_mul_complete(&mut eng, gs);
        assert_eq!(eng.value_biguint(res.x), BigUint::zero());
        assert_eq!(eng.value_biguint(res.y), BigUint::zero());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn complete_scalar_mul_of_infinity_is_infinity() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let cp = curve_params();
        let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let mut eng = engine();
        let gz = G1Affine::witness(&mut eng, &AffinePoint::zero());
        let gs = eng.witness(&s);
        let res = gz.var_scalar_mul_complete(&mut eng, gs);
        assert_eq!(eng.value_biguint(res.x), BigUint::zero());
        assert_eq!(eng.value_biguint(res.y), BigUint::zero());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn const_scalar_mul_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let cp = curve_params();
        let (a, _) = rand_point(&mut rng);
        let mut scalars = vec![
            BigUint::from(1u8),
            BigUint::from(2u8),
            BigUint::from(5u8),
            cp.lambda.clone(),
            &cp.fr - 1u8,
        ];
        scalars.push(rng.gen_biguint_below(&cp.fr));
        for s in scalars {
            let mut eng = engine();
            let ga = G1Affine::witness(&mut eng, &a);
            let res = ga.const_scalar_mul(&mut eng, &s);
            assert_eq!(read_point(&eng, &res), a.mul_biguint(&s));
            assert!(eng.is_satisfied());
        }
    }

    #[test]
    fn const_scalar_mul_of_zero_is_infinity() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let (a, _) = rand_point(&mut rng);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let res = ga.const_scalar_mul(&mut eng, &BigUint::zero());
        assert_eq!(eng.value_biguint(res.x), BigUint::zero());
        assert_eq!(eng.value_biguint(res.y), BigUint::zero());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn scalar_mul_base_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let cp = curve_params();
        let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let mut eng = engine();
        let gs = eng.witness(&s);
        let res = G1Affine::scalar_mul_base(&mut eng, &NativeScalar::Witness(gs));
        assert_eq!(read_point(&eng, &res), cp.g1.mul_biguint(&s));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn joint_scalar_mul_matches_native() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let cp = curve_params();
        let (a, _) = rand_point(&mut rng);
        let (b, _) = rand_point(&mut rng);
        let s = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let t = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let gb = G1Affine::witness(&mut eng, &b);
        let gs = eng.witness(&s);
        let gt = eng.witness(&t);
        let res = ga.joint_scalar_mul_unsafe(&mut eng, &gb, gs, gt);
        let expected = a.mul_biguint(&s).add(&b.mul_biguint(&t));
        assert_eq!(read_point(&eng, &res), expected);
        assert!(eng.is_satisfied());
    }

    #[test]
    fn complete_joint_scalar_mul_tolerates_zero_terms() {
        let mut rng = ChaCha20Rng::seed_from_u64(19);
        let cp = curve_params();
        let (a, _) = rand_point(&mut rng);
        let (b, _) = rand_point(&mut rng);
        let t = rng.gen_biguint_range(&BigUint::from(1u8), &cp.fr);
        let mut eng = engine();
        let ga = G1Affine::witness(&mut eng, &a);
        let gb = G1Affine::witness(&mut eng, &b);
        let gs = eng.witness(&BigUint::zero());
        let gt = eng.witness(&t);
        let res = ga.joint_scalar_mul(&mut eng, &gb, gs, gt);
        assert_eq!(read_point(&eng, &res), b.mul_biguint(&t));
        assert!(eng.is_satisfied());
    }
}
