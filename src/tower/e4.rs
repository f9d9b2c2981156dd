//! Degree-4 extension gadget: b0 + b1*v over E2, with v^2 = u.
//!
//! This is the field the twist lives over; line evaluations and the
//! compressed cyclotomic squarings all work on E4 slots.

use crate::curve::fields::Fq;
use crate::curve::tower::E4n;
use crate::frontend::{run_hint, Api, Variable};

use super::hints;
use super::E2;

#[derive(Clone, Copy, Debug)]
pub struct E4 {
    pub b0: E2,
    pub b1: E2,
}

impl E4 {
    pub fn new(b0: E2, b1: E2) -> Self {
        Self { b0, b1 }
    }

    pub fn zero(api: &mut impl Api) -> Self {
        Self::new(E2::zero(api), E2::zero(api))
    }

    pub fn one(api: &mut impl Api) -> Self {
        Self::new(E2::one(api), E2::zero(api))
    }

    pub fn constant(api: &mut impl Api, v: &E4n) -> Self {
        Self::new(E2::constant(api, &v.b0), E2::constant(api, &v.b1))
    }

    pub fn witness(api: &mut impl Api, v: &E4n) -> Self {
        Self::new(E2::witness(api, &v.b0), E2::witness(api, &v.b1))
    }

    pub(crate) fn vars(&self) -> [Variable; 4] {
        let [a, b] = self.b0.vars();
        let [c, d] = self.b1.vars();
        [a, b, c, d]
    }

    pub(crate) fn from_vars(vars: &[Variable]) -> Self {
        Self::new(E2::from_vars(&vars[..2]), E2::from_vars(&vars[2..4]))
    }

    pub fn add(&self, api: &mut impl Api, other: &Self) -> Self {
        Self::new(self.b0.add(api, &other.b0), self.b1.add(api, &other.b1))
    }

    pub fn sub(&self, api: &mut impl Api, other: &Self) -> Self {
        Self::new(self.b0.sub(api, &other.b0), self.b1.sub(api, &other.b1))
    }

    pub fn neg(&self, api: &mut impl Api) -> Self {
        Self::new(self.b0.neg(api), self.b1.neg(api))
    }

    pub fn double(&self, api: &mut impl Api) -> Self {
        Self::new(self.b0.double(api), self.b1.double(api))
    }

    pub fn conjugate(&self, api: &mut impl Api) -> Self {
        Self::new(self.b0, self.b1.neg(api))
    }

    pub fn mul(&self, api: &mut impl Api, other: &Self) -> Self {
        let ac = self.b0.mul(api, &other.b0);
        let bd = self.b1.mul(api, &other.b1);
        let sa = self.b0.add(api, &self.b1);
        let sb = other.b0.add(api, &other.b1);
        let t = sa.mul(api, &sb);
        let t = t.sub(api, &ac);
        let b1 = t.sub(api, &bd);
        let bdnr = bd.mul_by_nonresidue(api);
        let b0 = ac.add(api, &bdnr);
        Self::new(b0, b1)
    }

    pub fn square(&self, api: &mut impl Api) -> Self {
        let t = self.b0.mul(api, &self.b1);
        let s0 = self.b0.add(api, &self.b1);
        let b1nr = self.b1.mul_by_nonresidue(api);
        let s1 = self.b0.add(api, &b1nr);
        let c0 = s0.mul(api, &s1);
        let c0 = c0.sub(api, &t);
        let tnr = t.mul_by_nonresidue(api);
        let c0 = c0.sub(api, &tnr);
        let c1 = t.double(api);
        Self::new(c0, c1)
    }

    pub fn mul_by_fp(&self, api: &mut impl Api, c: Variable) -> Self {
        Self::new(self.b0.mul_by_fp(api, c), self.b1.mul_by_fp(api, c))
    }

    pub fn mul_by_fp_const(&self, api: &mut impl Api, c: &Fq) -> Self {
        Self::new(
            self.b0.mul_by_fp_const(api, c),
            self.b1.mul_by_fp_const(api, c),
        )
    }

    /// Multiplication by v: (b0 + b1*v)*v = u*b1 + b0*v.
    pub fn mul_by_nonresidue(&self, api: &mut impl Api) -> Self {
        Self::new(self.b1.mul_by_nonresidue(api), self.b0)
    }

    pub fn inverse(&self, api: &mut impl Api) -> Self {
        let outs = run_hint(api, hints::INVERSE_E4, 4, &self.vars());
        let inv = Self::from_vars(&outs);
        let check = inv.mul(api, self);
        let one = Self::one(api);
        check.assert_is_equal(api, &one);
        inv
    }

    pub fn div_unchecked(&self, api: &mut impl Api, other: &Self) -> Self {
        let mut ins = self.vars().to_vec();
        ins.extend(other.vars());
        let outs = run_hint(api, hints::DIV_E4, 4, &ins);
        let res = Self::from_vars(&outs);
        let check = res.mul(api, other);
        check.assert_is_equal(api, self);
        res
    }

    pub fn is_zero(&self, api: &mut impl Api) -> Variable {
        let z0 = self.b0.is_zero(api);
        let z1 = self.b1.is_zero(api);
        api.and(z0, z1)
    }

    pub fn select(api: &mut impl Api, b: Variable, i1: &Self, i2: &Self) -> Self {
        Self::new(
            E2::select(api, b, &i1.b0, &i2.b0),
            E2::select(api, b, &i1.b1, &i2.b1),
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
            E2::lookup2(api, b0, b1, &i0.b0, &i1.b0, &i2.b0, &i3.b0),
            E2::lookup2(api, b0, b1, &i0.b1, &i1.b1, &i2.b1, &i3.b1),
        )
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, other: &Self) {
        self.b0.assert_is_equal(api, &other.b0);
        self.b1.assert_is_equal(api, &other.b1);
    }
}
