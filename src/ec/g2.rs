//! G2 gadget: the twist group over Fp4.
//!
//! Mirrors the G1 ladder with every coordinate op lifted to [`E4`]. A point
//! optionally carries precomputed line evaluations for the fixed-argument
//! Miller loop; [`G2Affine::new_fixed`] derives them natively at build time.

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};

use crate::curve::glv::split_scalar;
use crate::curve::pairing::precompute_lines;
use crate::curve::params::curve_params;
use crate::curve::tower::TowerField;
use crate::curve::G2Native;
use crate::frontend::{Api, Variable};
use crate::tower::E4;

use super::g1::decompose_scalar_bits;
use super::pairing::{Line, LineEvaluations};
use super::NativeScalar;

/// Bare affine coordinates of a G2 point.
#[derive(Clone, Copy, Debug)]
pub struct G2AffP {
    pub x: E4,
    pub y: E4,
}

/// A G2 point as the pairing consumes it: coordinates plus, for fixed
/// arguments, the line evaluations of its Miller loop.
#[derive(Clone, Debug)]
pub struct G2Affine {
    pub p: G2AffP,
    pub lines: Option<LineEvaluations>,
}

impl G2AffP {
    pub fn new(x: E4, y: E4) -> Self {
        Self { x, y }
    }

    pub fn constant(api: &mut impl Api, v: &G2Native) -> Self {
        if v.is_zero() {
            let zero = E4::zero(api);
            return Self::new(zero, zero);
        }
        Self::new(E4::constant(api, &v.x), E4::constant(api, &v.y))
    }

    pub fn witness(api: &mut impl Api, v: &G2Native) -> Self {
        if v.is_zero() {
            let zero_n = TowerField::zero();
            let x = E4::witness(api, &zero_n);
            let y = E4::witness(api, &zero_n);
            return Self::new(x, y);
        }
        Self::new(E4::witness(api, &v.x), E4::witness(api, &v.y))
    }

    pub fn neg(&self, api: &mut impl Api) -> Self {
        Self::new(self.x, self.y.neg(api))
    }

    pub fn select(api: &mut impl Api, b: Variable, i1: &Self, i2: &Self) -> Self {
        Self::new(
            E4::select(api, b, &i1.x, &i2.x),
            E4::select(api, b, &i1.y, &i2.y),
        )
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
            E4::lookup2(api, b0, b1, &i0.x, &i1.x, &i2.x, &i3.x),
            E4::lookup2(api, b0, b1, &i0.y, &i1.y, &i2.y, &i3.y),
        )
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, other: &Self) {
        self.x.assert_is_equal(api, &other.x);
        self.y.assert_is_equal(api, &other.y);
    }

    pub fn add(&self, api: &mut impl Api, other: &Self) -> Self {
        let num = other.y.sub(api, &self.y);
        let den = other.x.sub(api, &self.x);
        let lambda = num.div_unchecked(api, &den);
        let xr = lambda.square(api);
        let xr = xr.sub(api, &self.x);
        let xr = xr.sub(api, &other.x);
        let yr = self.x.sub(api, &xr);
        let yr = lambda.mul(api, &yr);
        let yr = yr.sub(api, &self.y);
        Self::new(xr, yr)
    }

    pub fn double(&self, api: &mut impl Api) -> Self {
        let xx = self.x.square(api);
        let three_xx = xx.double(api).add(api, &xx);
        let two_y = self.y.double(api);
        let lambda = three_xx.div_unchecked(api, &two_y);
        let xr = lambda.square(api);
        let two_x = self.x.double(api);
        let xr = xr.sub(api, &two_x);
        let yr = self.x.sub(api, &xr);
        let yr = lambda.mul(api, &yr);
        let yr = yr.sub(api, &self.y);
        Self::new(xr, yr)
    }

    /// 2*self + other, sharing the two inversions of the chained chords.
    pub fn double_and_add(&self, api: &mut impl Api, other: &Self) -> Self {
        let num = self.y.sub(api, &other.y);
        let den = self.x.sub(api, &other.x);
        let l1 = num.div_unchecked(api, &den);

        let x3 = l1.square(api);
        let x3 = x3.sub(api, &self.x);
        let x3 = x3.sub(api, &other.x);

        let two_y = self.y.double(api);
        let den = x3.sub(api, &self.x);
        let l2 = two_y.div_unchecked(api, &den);
        let l2 = l2.add(api, &l1);

        let x4 = l2.square(api);
        let x4 = x4.sub(api, &self.x);
        let x4 = x4.sub(api, &x3);

        let y4 = x4.sub(api, &self.x);
        let y4 = l2.mul(api, &y4);
        let y4 = y4.sub(api, &self.y);
        Self::new(x4, y4)
    }

    /// Unified addition over the twist; same selector structure as on G1.
    pub fn add_unified(&self, api: &mut impl Api, other: &Self) -> Self {
        let zx = self.x.is_zero(api);
        let zy = self.y.is_zero(api);
        let sel1 = api.and(zx, zy);
        let zx = other.x.is_zero(api);
        let zy = other.y.is_zero(api);
        let sel2 = api.and(zx, zy);

        let pxqx = self.x.mul(api, &other.x);
        let pxplusqx = self.x.add(api, &other.x);
        let num = pxplusqx.square(api);
        let num = num.sub(api, &pxqx);
        let denum = self.y.add(api, &other.y);
        let sel3 = denum.is_zero(api);
        let one = E4::one(api);
        let denum = E4::select(api, sel3, &one, &denum);
        let lambda = num.div_unchecked(api, &denum);

        let xr = lambda.square(api);
        let xr = xr.sub(api, &pxplusqx);
        let yr = self.x.sub(api, &xr);
        let yr = yr.mul(api, &lambda);
        let yr = yr.sub(api, &self.y);

        let res = Self::new(xr, yr);
        let res = Self::select(api, sel1, other, &res);
        let res = Self::select(api, sel2, self, &res);
        let zero = E4::zero(api);
        let infinity = Self::new(zero, zero);
        Self::select(api, sel3, &infinity, &res)
    }

    /// The endomorphism with eigenvalue lambda on the twist.
    pub fn phi(&self, api: &mut impl Api) -> Self {
        let cp = curve_params();
        Self::new(self.x.mul_by_fp_const(api, &cp.omega2), self.y)
    }

    /// -phi^2, i.e. Q + phi(Q).
    pub fn phi2_neg(&self, api: &mut impl Api) -> Self {
        let cp = curve_params();
        let omega2_sq = cp.omega2 * cp.omega2;
        Self::new(
            self.x.mul_by_fp_const(api, &omega2_sq),
            self.y.neg(api),
        )
    }

    /// [s]Q from the GLV sub-scalar bits; see the G1 counterpart for the
    /// ladder invariants. Both slices must be 127 bits.
    pub fn scalar_bits_mul(
        &self,
        api: &mut impl Api,
        s1_bits: &[Variable],
        s2_bits: &[Variable],
    ) -> Self {
        self.glv_ladder(api, s1_bits, s2_bits, false)
    }

    /// The shared GLV ladder; see the G1 counterpart. With `complete` set,
    /// the edge corrections go through unified additions so a zero scalar
    /// lands on the (0,0) infinity encoding.
    fn glv_ladder(
        &self,
        api: &mut impl Api,
        s1_bits: &[Variable],
        s2_bits: &[Variable],
        complete: bool,
    ) -> Self {
        let neg_q = self.neg(api);
        let phi_q = self.phi(api);
        let neg_phi_q = phi_q.neg(api);

        let b1 = self.phi2_neg(api);
        let b2 = b1.neg(api);
        let b3 = self.add(api, &neg_phi_q);
        let b4 = b3.neg(api);

        // conditioning point (0, sqrt(b_twist)) on the twist; doubles to
        // its own negation, even loop length
        let cp = curve_params();
        let zero = E4::zero(api);
        let h_y = E4::constant(api, &cp.sqrt_b_twist);
        let h = Self::new(zero, h_y);
        let mut acc = b1.add(api, &h);

        for i in (1..127).rev() {
            let xs = api.xor(s1_bits[i], s2_bits[i]);
            let bx = E4::select(api, xs, &b3.x, &b2.x);
            let by = E4::lookup2(api, s1_bits[i], s2_bits[i], &b2.y, &b3.y, &b4.y, &b1.y);
            let b = Self::new(bx, by);
            acc = acc.double_and_add(api, &b);
        }

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

        let h_y_neg = h_y.neg(api);
        let h_back = Self::new(zero, h_y_neg);
        if complete {
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

    /// [s]Q accepting s = 0 and the (0,0) infinity encoding of Q; the
    /// dummy point keeps the ladder formulas away from their poles and the
    /// final select discards its result.
    pub fn var_scalar_mul_complete(&self, api: &mut impl Api, s: Variable) -> Self {
        let zx = self.x.is_zero(api);
        let zy = self.y.is_zero(api);
        let selector = api.and(zx, zy);
        let one = E4::one(api);
        let dummy = Self::new(one, one);
        let q = Self::select(api, selector, &dummy, self);

        let (s1_bits, s2_bits) = decompose_scalar_bits(api, s, 127);
        let acc = q.glv_ladder(api, &s1_bits, &s2_bits, true);

        let zero = E4::zero(api);
        let infinity = Self::new(zero, zero);
        Self::select(api, selector, &infinity, &acc)
    }

    /// [s]Q for a compile-time scalar.
    pub fn const_scalar_mul(&self, api: &mut impl Api, s: &BigUint) -> Self {
        let cp = curve_params();
        let s = s % &cp.fr;
        if s.is_zero() {
            let zero = E4::zero(api);
            return Self::new(zero, zero);
        }

        let mut q = *self;
        let mut phi_q = self.phi(api);
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

    /// [s]G2 for the subgroup generator.
    pub fn scalar_mul_base(api: &mut impl Api, s: &NativeScalar) -> Self {
        let cp = curve_params();
        let g = Self::constant(api, &cp.g2);
        g.scalar_mul(api, s)
    }
}

impl G2Affine {
    /// A variable pairing argument; its lines are recomputed in-circuit.
    pub fn new(p: G2AffP) -> Self {
        Self { p, lines: None }
    }

    pub fn witness(api: &mut impl Api, v: &G2Native) -> Self {
        Self::new(G2AffP::witness(api, v))
    }

    /// A fixed pairing argument: the point and its full line table enter the
    /// circuit as constants, removing the G2 arithmetic from the Miller
    /// loop. `v` must not be the infinity point.
    pub fn new_fixed(api: &mut impl Api, v: &G2Native) -> Self {
        let lines = precompute_lines(v).map(|blocks| {
            LineEvaluations(
                blocks
                    .iter()
                    .map(|block| {
                        block
                            .iter()
                            .map(|l| Line {
                                r0: E4::constant(api, &l.r0),
                                r1: E4::constant(api, &l.r1),
                            })
                            .collect()
                    })
                    .collect(),
            )
        });
        Self {
            p: G2AffP::constant(api, v),
            lines,
        }
    }

    /// Same shape as [`Self::new_fixed`] with zero witnesses in every slot,
    /// for building a circuit before the fixed point is known.
    pub fn new_fixed_placeholder(api: &mut impl Api) -> Self {
        fn zero_line(api: &mut impl Api) -> Line {
            let zero_n = TowerField::zero();
            Line {
                r0: E4::witness(api, &zero_n),
                r1: E4::witness(api, &zero_n),
            }
        }

        let cp = curve_params();
        let mut blocks = Vec::with_capacity(cp.naf.len() - 1);
        blocks.push(vec![zero_line(api)]);
        blocks.push(vec![zero_line(api), zero_line(api)]);
        for i in (1..=29).rev() {
            if cp.naf[i] == 0 {
                blocks.push(vec![zero_line(api)]);
            } else {
                blocks.push(vec![zero_line(api), zero_line(api)]);
            }
        }
        blocks.push(vec![zero_line(api), zero_line(api)]);

        let zero_n = TowerField::zero();
        let x = E4::witness(api, &zero_n);
        let y = E4::witness(api, &zero_n);
        Self {
            p: G2AffP::new(x, y),
            lines: Some(LineEvaluations(blocks)),
        }
    }
}
