//! Circuit operations on emulated elements.
//!
//! Every operation tracks the worst-case limb overflow and reduces its
//! operands only when the next operation would overflow the native field.
//! Multiplication, reduction, inversion and division are hinted: the solver
//! provides the result out-of-circuit and the gadget constrains it, either
//! through a polynomial identity over the limbs (multiplication) or through
//! a quotient witness and a carry-checked limb equality (reduction).

use std::marker::PhantomData;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::frontend::{run_hint, Api, Variable};

use super::hints;
use super::{Element, FieldParams};

fn bitlen(x: usize) -> usize {
    (usize::BITS - x.leading_zeros()) as usize
}

/// Truncating limb split; callers guarantee the value fits.
fn to_limbs(v: &BigUint, nb_bits: usize, nb_limbs: usize) -> Vec<BigUint> {
    let mask = (BigUint::one() << nb_bits) - BigUint::one();
    let mut rest = v.clone();
    let mut out = Vec::with_capacity(nb_limbs);
    for _ in 0..nb_limbs {
        out.push(&rest & &mask);
        rest >>= nb_bits;
    }
    out
}

pub struct Field<P: FieldParams> {
    /// Largest operand overflow the preconditions allow. Kept well below
    /// the native capacity so the carry decomposition in the limb equality
    /// check still fits the native field.
    max_overflow: usize,
    native_bits: usize,
    _params: PhantomData<P>,
}

impl<P: FieldParams> Field<P> {
    pub fn new<A: Api + ?Sized>(api: &A) -> Self {
        let native_bits = api.native_modulus().bits() as usize;
        let max_overflow = native_bits - P::BITS_PER_LIMB - 10;
        assert!(
            max_overflow > P::BITS_PER_LIMB,
            "native field too small for {} bit limbs",
            P::BITS_PER_LIMB
        );
        Self {
            max_overflow,
            native_bits,
            _params: PhantomData,
        }
    }

    pub fn constant<A: Api + ?Sized>(&self, api: &mut A, value: &BigUint) -> Element<P> {
        let v = value % P::modulus();
        let limbs = to_limbs(&v, P::BITS_PER_LIMB, P::NB_LIMBS)
            .iter()
            .map(|l| api.constant(l))
            .collect();
        Element::new(limbs, 0)
    }

    pub fn zero<A: Api + ?Sized>(&self, api: &mut A) -> Element<P> {
        self.constant(api, &BigUint::zero())
    }

    pub fn one<A: Api + ?Sized>(&self, api: &mut A) -> Element<P> {
        self.constant(api, &BigUint::one())
    }

    /// Allocates a width-checked witness element.
    pub fn new_witness<A: Api + ?Sized>(&self, api: &mut A, value: &BigUint) -> Element<P> {
        let v = value % P::modulus();
        let limbs: Vec<Variable> = to_limbs(&v, P::BITS_PER_LIMB, P::NB_LIMBS)
            .iter()
            .map(|l| api.witness(l))
            .collect();
        let e = Element::new(limbs, 0);
        self.enforce_width(api, &e, true);
        e
    }

    /// Range-checks every limb. With `mod_width` the top limb is checked
    /// against the modulus width instead of a full limb.
    fn enforce_width<A: Api + ?Sized>(&self, api: &mut A, e: &Element<P>, mod_width: bool) {
        let last = e.limbs.len() - 1;
        for (i, limb) in e.limbs.iter().enumerate() {
            let width = if mod_width && i == last {
                (P::modulus().bits() as usize - 1) % P::BITS_PER_LIMB + 1
            } else {
                P::BITS_PER_LIMB
            };
            api.to_binary(*limb, width);
        }
    }

    /// `[bits, nb_p, p limbs]` prefix shared by the modular hints.
    fn mod_hint_inputs<A: Api + ?Sized>(&self, api: &mut A) -> Vec<Variable> {
        let mut inputs = Vec::with_capacity(2 + P::NB_LIMBS);
        inputs.push(api.constant(&BigUint::from(P::BITS_PER_LIMB)));
        inputs.push(api.constant(&BigUint::from(P::NB_LIMBS)));
        for l in to_limbs(P::modulus(), P::BITS_PER_LIMB, P::NB_LIMBS) {
            inputs.push(api.constant(&l));
        }
        inputs
    }

    /// Brings the element back to `NB_LIMBS` overflow-free limbs by
    /// witnessing the remainder and asserting congruence.
    pub fn reduce<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Element<P> {
        if a.overflow == 0 && a.limbs.len() <= P::NB_LIMBS {
            return a.clone();
        }
        let mut inputs = self.mod_hint_inputs(api);
        inputs.extend_from_slice(&a.limbs);
        let limbs = run_hint(api, hints::REM, P::NB_LIMBS, &inputs);
        let r = Element::new(limbs, 0);
        self.enforce_width(api, &r, true);
        self.assert_is_equal(api, a, &r);
        r
    }

    /// Reduces and additionally asserts the value is below the modulus, so
    /// the limbs are the unique canonical representation.
    pub fn reduce_strict<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Element<P> {
        let r = self.canonical(api, a);
        let mut bits = Vec::with_capacity(P::NB_LIMBS * P::BITS_PER_LIMB);
        for l in &r.limbs {
            bits.extend(api.to_binary(*l, P::BITS_PER_LIMB));
        }
        let bound = P::modulus() - BigUint::one();
        self.assert_bits_le_const(api, &bits, &bound);
        r
    }

    /// Reduced and padded to exactly `NB_LIMBS` limbs.
    fn canonical<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Element<P> {
        if a.is_canonical() {
            return a.clone();
        }
        let mut r = self.reduce(api, a);
        while r.limbs.len() < P::NB_LIMBS {
            r.limbs.push(api.zero());
        }
        r
    }

    fn reduce_until<A: Api + ?Sized>(
        &self,
        api: &mut A,
        a: &Element<P>,
        b: &Element<P>,
        precond: impl Fn(&Element<P>, &Element<P>) -> usize,
    ) -> (Element<P>, Element<P>, usize) {
        let mut a = a.clone();
        let mut b = b.clone();
        loop {
            let next = precond(&a, &b);
            if next <= self.max_overflow {
                return (a, b, next);
            }
            debug_assert!(a.overflow > 0 || b.overflow > 0 || a.limbs.len() > P::NB_LIMBS || b.limbs.len() > P::NB_LIMBS);
            if a.overflow < b.overflow {
                b = self.reduce(api, &b);
            } else {
                a = self.reduce(api, &a);
            }
        }
    }

    pub fn add<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) -> Element<P> {
        let (a, b, next) = self.reduce_until(api, a, b, |a, b| a.overflow.max(b.overflow) + 1);
        let n = a.limbs.len().max(b.limbs.len());
        let mut limbs = Vec::with_capacity(n);
        for i in 0..n {
            let l = match (a.limbs.get(i), b.limbs.get(i)) {
                (Some(&x), Some(&y)) => api.add(x, y),
                (Some(&x), None) => x,
                (None, Some(&y)) => y,
                (None, None) => api.zero(),
            };
            limbs.push(l);
        }
        Element::new(limbs, next)
    }

    /// A multiple of the modulus whose limbs each dominate a limb of
    /// overflow `overflow`, so a limb-wise subtraction cannot underflow.
    fn sub_padding(&self, overflow: usize, nb_limbs: usize) -> Vec<BigUint> {
        let bits = P::BITS_PER_LIMB;
        let per = BigUint::one() << (bits + overflow);
        let mut n = BigUint::zero();
        for i in 0..nb_limbs {
            n += &per << (bits * i);
        }
        let m = &n % P::modulus();
        let comp = if m.is_zero() {
            BigUint::zero()
        } else {
            P::modulus() - &m
        };
        let mut pad = to_limbs(&comp, bits, nb_limbs);
        for l in pad.iter_mut() {
            *l += &per;
        }
        pad
    }

    pub fn sub<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) -> Element<P> {
        let (a, b, _) =
            self.reduce_until(api, a, b, |a, b| a.overflow.max(b.overflow + 1) + 1);
        self.sub_raw(api, &a, &b)
    }

    /// Subtraction without the precondition loop; callers must know the
    /// overflows fit. `reduce` relies on this to avoid recursing.
    fn sub_raw<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) -> Element<P> {
        let n = a.limbs.len().max(b.limbs.len()).max(P::NB_LIMBS);
        let pad = self.sub_padding(b.overflow, n);
        let mut limbs = Vec::with_capacity(n);
        for i in 0..n {
            let mut l = api.constant(&pad[i]);
            if let Some(&x) = a.limbs.get(i) {
                l = api.add(l, x);
            }
            if let Some(&y) = b.limbs.get(i) {
                l = api.sub(l, y);
            }
            limbs.push(l);
        }
        Element::new(limbs, a.overflow.max(b.overflow + 1) + 1)
    }

    pub fn neg<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Element<P> {
        let zero = self.zero(api);
        self.sub(api, &zero, a)
    }

    /// Small-constant multiplication, limb by limb.
    pub fn mul_small_const<A: Api + ?Sized>(
        &self,
        api: &mut A,
        a: &Element<P>,
        c: u64,
    ) -> Element<P> {
        if c == 0 {
            return self.zero(api);
        }
        let grow = 64 - c.leading_zeros() as usize;
        let mut a = a.clone();
        while a.overflow + grow > self.max_overflow {
            a = self.reduce(api, &a);
        }
        let c = BigUint::from(c);
        let limbs = a.limbs.iter().map(|&l| api.mul_const(l, &c)).collect();
        Element::new(limbs, a.overflow + grow)
    }

    /// Unreduced product on `la + lb - 1` limbs. The limb convolution comes
    /// from a hint and is verified through the polynomial identity
    /// `a(X) * b(X) = c(X)` sampled at `1..=2m-1`.
    pub fn mul_no_reduce<A: Api + ?Sized>(
        &self,
        api: &mut A,
        a: &Element<P>,
        b: &Element<P>,
    ) -> Element<P> {
        let (a, b, next) = self.reduce_until(api, a, b, |a, b| {
            let nb_res = a.limbs.len() + b.limbs.len() - 1;
            P::BITS_PER_LIMB + bitlen(nb_res) + a.overflow + b.overflow
        });
        let nb_res = a.limbs.len() + b.limbs.len() - 1;

        let mut inputs = Vec::with_capacity(2 + a.limbs.len() + b.limbs.len());
        inputs.push(api.constant(&BigUint::from(P::BITS_PER_LIMB)));
        inputs.push(api.constant(&BigUint::from(a.limbs.len())));
        inputs.extend_from_slice(&a.limbs);
        inputs.extend_from_slice(&b.limbs);
        let res = run_hint(api, hints::MUL, nb_res, &inputs);

        let native = api.native_modulus().clone();
        for c in 1..=nb_res as u64 {
            let cb = BigUint::from(c);
            let l = self.eval_at(api, &a.limbs, &cb, &native);
            let r = self.eval_at(api, &b.limbs, &cb, &native);
            let o = self.eval_at(api, &res, &cb, &native);
            let lr = api.mul(l, r);
            api.assert_is_equal(lr, o);
        }
        Element::new(res, next)
    }

    /// `sum limbs[i] * c^i` over the native field.
    fn eval_at<A: Api + ?Sized>(
        &self,
        api: &mut A,
        limbs: &[Variable],
        c: &BigUint,
        native: &BigUint,
    ) -> Variable {
        let mut acc = limbs[0];
        let mut pow = c.clone();
        for &l in &limbs[1..] {
            let term = api.mul_const(l, &pow);
            acc = api.add(acc, term);
            pow = &pow * c % native;
        }
        acc
    }

    #[tracing::instrument(skip_all)]
    pub fn mul<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) -> Element<P> {
        let wide = self.mul_no_reduce(api, a, b);
        self.reduce(api, &wide)
    }

    /// Asserts congruence modulo the emulated modulus. The difference is
    /// witnessed as `k * p` and the two limb vectors are compared with an
    /// explicit carry chain.
    pub fn assert_is_equal<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) {
        let diff = self.sub_raw(api, b, a);

        // k = diff / p, limb count sized from the bound on diff
        let diff_bits = diff.limbs.len() * P::BITS_PER_LIMB + diff.overflow;
        let p_bits = P::modulus().bits() as usize;
        let quo_bits = diff_bits.saturating_sub(p_bits - 1).max(1);
        let nb_quo = quo_bits.div_ceil(P::BITS_PER_LIMB);
        let mut inputs = self.mod_hint_inputs(api);
        inputs.extend_from_slice(&diff.limbs);
        let k = Element::<P>::new(run_hint(api, hints::QUO, nb_quo, &inputs), 0);
        self.enforce_width(api, &k, false);

        // k * p in-circuit: p is constant so this is a linear combination
        let p_limbs = to_limbs(P::modulus(), P::BITS_PER_LIMB, P::NB_LIMBS);
        let nb_kp = k.limbs.len() + P::NB_LIMBS - 1;
        let mut kp: Vec<Option<Variable>> = vec![None; nb_kp];
        for (i, &ki) in k.limbs.iter().enumerate() {
            for (j, pj) in p_limbs.iter().enumerate() {
                let term = api.mul_const(ki, pj);
                kp[i + j] = Some(match kp[i + j] {
                    Some(acc) => api.add(acc, term),
                    None => term,
                });
            }
        }
        let zero = api.zero();
        let kp: Vec<Variable> = kp.into_iter().map(|v| v.unwrap_or(zero)).collect();
        let kp_overflow = P::BITS_PER_LIMB + bitlen(k.limbs.len().min(P::NB_LIMBS));

        self.assert_limbs_equality(api, &diff.limbs, diff.overflow, &kp, kp_overflow);
    }

    /// Proves two limb vectors recompose to the same integer by pushing a
    /// borrow-free carry through the limbs.
    fn assert_limbs_equality<A: Api + ?Sized>(
        &self,
        api: &mut A,
        l: &[Variable],
        l_overflow: usize,
        r: &[Variable],
        r_overflow: usize,
    ) {
        let nb_bits = P::BITS_PER_LIMB;
        let nb_carry = l_overflow.max(r_overflow) + 1;
        debug_assert!(nb_bits + nb_carry + 1 < self.native_bits);
        let max_value = BigUint::one() << (nb_bits + nb_carry);
        let max_value_shift = BigUint::one() << nb_carry;

        let n = l.len().max(r.len());
        let mut carry = api.zero();
        let zero = api.zero();
        for i in 0..n {
            let mut diff = api.constant(&max_value);
            diff = api.add(diff, carry);
            if let Some(&x) = l.get(i) {
                diff = api.add(diff, x);
            }
            if let Some(&y) = r.get(i) {
                diff = api.sub(diff, y);
            }
            if i > 0 {
                let shift = api.constant(&max_value_shift);
                diff = api.sub(diff, shift);
            }
            let bits = api.to_binary(diff, nb_bits + nb_carry + 1);
            for &b in &bits[..nb_bits] {
                api.assert_is_equal(b, zero);
            }
            carry = api.from_binary(&bits[nb_bits..]);
        }
        let final_shift = api.constant(&max_value_shift);
        api.assert_is_equal(carry, final_shift);
    }

    pub fn assert_is_different<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) {
        let d = self.sub(api, a, b);
        let z = self.is_zero(api, &d);
        let zero = api.zero();
        api.assert_is_equal(z, zero);
    }

    /// Boolean variable set when the value is zero modulo the modulus.
    pub fn is_zero<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Variable {
        let r = self.reduce_strict(api, a);
        let mut acc = api.is_zero(r.limbs[0]);
        for &l in &r.limbs[1..] {
            let z = api.is_zero(l);
            acc = api.and(acc, z);
        }
        acc
    }

    pub fn select<A: Api + ?Sized>(
        &self,
        api: &mut A,
        b: Variable,
        i1: &Element<P>,
        i2: &Element<P>,
    ) -> Element<P> {
        let i1 = self.canonical(api, i1);
        let i2 = self.canonical(api, i2);
        let limbs = i1
            .limbs
            .iter()
            .zip(&i2.limbs)
            .map(|(&x, &y)| api.select(b, x, y))
            .collect();
        Element::new(limbs, 0)
    }

    pub fn lookup2<A: Api + ?Sized>(
        &self,
        api: &mut A,
        b0: Variable,
        b1: Variable,
        i0: &Element<P>,
        i1: &Element<P>,
        i2: &Element<P>,
        i3: &Element<P>,
    ) -> Element<P> {
        let i0 = self.canonical(api, i0);
        let i1 = self.canonical(api, i1);
        let i2 = self.canonical(api, i2);
        let i3 = self.canonical(api, i3);
        let mut limbs = Vec::with_capacity(P::NB_LIMBS);
        for i in 0..P::NB_LIMBS {
            limbs.push(api.lookup2(b0, b1, i0.limbs[i], i1.limbs[i], i2.limbs[i], i3.limbs[i]));
        }
        Element::new(limbs, 0)
    }

    /// Little-endian bits of the reduced representation, `NB_LIMBS *
    /// BITS_PER_LIMB` of them.
    pub fn to_bits<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Vec<Variable> {
        let r = self.canonical(api, a);
        let mut bits = Vec::with_capacity(P::NB_LIMBS * P::BITS_PER_LIMB);
        for l in &r.limbs {
            bits.extend(api.to_binary(*l, P::BITS_PER_LIMB));
        }
        bits
    }

    pub fn from_bits<A: Api + ?Sized>(&self, api: &mut A, bits: &[Variable]) -> Element<P> {
        debug_assert!(bits.len() <= P::NB_LIMBS * P::BITS_PER_LIMB);
        let mut limbs = Vec::with_capacity(P::NB_LIMBS);
        for chunk in bits.chunks(P::BITS_PER_LIMB) {
            limbs.push(api.from_binary(chunk));
        }
        while limbs.len() < P::NB_LIMBS {
            limbs.push(api.zero());
        }
        Element::new(limbs, 0)
    }

    /// `a / b`; unsatisfiable when `b` is not invertible.
    pub fn div<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>, b: &Element<P>) -> Element<P> {
        let a = self.canonical(api, a);
        let b = self.canonical(api, b);
        let mut inputs = self.mod_hint_inputs(api);
        inputs.extend_from_slice(&a.limbs);
        inputs.extend_from_slice(&b.limbs);
        let z = Element::new(run_hint(api, hints::DIV, P::NB_LIMBS, &inputs), 0);
        self.enforce_width(api, &z, true);
        let zb = self.mul_no_reduce(api, &z, &b);
        self.assert_is_equal(api, &zb, &a);
        z
    }

    pub fn inverse<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Element<P> {
        let a = self.canonical(api, a);
        let mut inputs = self.mod_hint_inputs(api);
        inputs.extend_from_slice(&a.limbs);
        let z = Element::new(run_hint(api, hints::INVERSE, P::NB_LIMBS, &inputs), 0);
        self.enforce_width(api, &z, true);
        let za = self.mul_no_reduce(api, &z, &a);
        let one = self.one(api);
        self.assert_is_equal(api, &za, &one);
        z
    }

    /// One of the two square roots; unsatisfiable for a non-residue.
    pub fn sqrt<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Element<P> {
        let a = self.canonical(api, a);
        let mut inputs = self.mod_hint_inputs(api);
        inputs.extend_from_slice(&a.limbs);
        let z = Element::new(run_hint(api, hints::SQRT, P::NB_LIMBS, &inputs), 0);
        self.enforce_width(api, &z, true);
        let zz = self.mul_no_reduce(api, &z, &z);
        self.assert_is_equal(api, &zz, &a);
        z
    }

    /// Recomposes the reduced element into a single native variable. Only
    /// meaningful when the emulated field fits the native one.
    pub fn pack<A: Api + ?Sized>(&self, api: &mut A, a: &Element<P>) -> Variable {
        debug_assert!(P::NB_LIMBS * P::BITS_PER_LIMB < self.native_bits);
        let r = self.canonical(api, a);
        let mut acc = r.limbs[0];
        for (i, &l) in r.limbs.iter().enumerate().skip(1) {
            let w = BigUint::one() << (i * P::BITS_PER_LIMB);
            let term = api.mul_const(l, &w);
            acc = api.add(acc, term);
        }
        acc
    }

    /// Bit-decomposed comparison against a constant bound, `value <= bound`.
    fn assert_bits_le_const<A: Api + ?Sized>(
        &self,
        api: &mut A,
        bits: &[Variable],
        bound: &BigUint,
    ) {
        let one = api.one();
        let zero = api.zero();
        let mut p_run = one;
        for i in (0..bits.len()).rev() {
            if bound.bit(i as u64) {
                p_run = api.mul(p_run, bits[i]);
            } else {
                let t = api.sub(one, p_run);
                let t = api.sub(t, bits[i]);
                let t = api.mul(t, bits[i]);
                api.assert_is_equal(t, zero);
            }
        }
    }
}
