//! Degree-2 extension gadget: a0 + a1*u with u^2 = 13.

use num_bigint::BigUint;

use crate::curve::fields::Fq;
use crate::curve::tower::E2n;
use crate::frontend::{run_hint, Api, Variable};

use super::hints;

#[derive(Clone, Copy, Debug)]
pub struct E2 {
    pub a0: Variable,
    pub a1: Variable,
}

fn thirteen() -> BigUint {
    BigUint::from(13u8)
}

impl E2 {
    pub fn new(a0: Variable, a1: Variable) -> Self {
        Self { a0, a1 }
    }

    pub fn zero(api: &mut impl Api) -> Self {
        let z = api.zero();
        Self::new(z, z)
    }

    pub fn one(api: &mut impl Api) -> Self {
        let one = api.one();
        let z = api.zero();
        Self::new(one, z)
    }

    pub fn constant(api: &mut impl Api, v: &E2n) -> Self {
        let a0 = api.constant(&v.a0.into());
        let a1 = api.constant(&v.a1.into());
        Self::new(a0, a1)
    }

    pub fn witness(api: &mut impl Api, v: &E2n) -> Self {
        let a0 = api.witness(&v.a0.into());
        let a1 = api.witness(&v.a1.into());
        Self::new(a0, a1)
    }

    pub(crate) fn vars(&self) -> [Variable; 2] {
        [self.a0, self.a1]
    }

    pub(crate) fn from_vars(vars: &[Variable]) -> Self {
        Self::new(vars[0], vars[1])
    }

    pub fn add(&self, api: &mut impl Api, other: &Self) -> Self {
        Self::new(api.add(self.a0, other.a0), api.add(self.a1, other.a1))
    }

    pub fn sub(&self, api: &mut impl Api, other: &Self) -> Self {
        Self::new(api.sub(self.a0, other.a0), api.sub(self.a1, other.a1))
    }

    pub fn neg(&self, api: &mut impl Api) -> Self {
        Self::new(api.neg(self.a0), api.neg(self.a1))
    }

    pub fn double(&self, api: &mut impl Api) -> Self {
        Self::new(api.add(self.a0, self.a0), api.add(self.a1, self.a1))
    }

    pub fn conjugate(&self, api: &mut impl Api) -> Self {
        Self::new(self.a0, api.neg(self.a1))
    }

    /// Karatsuba: 3 native multiplications.
    pub fn mul(&self, api: &mut impl Api, other: &Self) -> Self {
        let ac = api.mul(self.a0, other.a0);
        let bd = api.mul(self.a1, other.a1);
        let sa = api.add(self.a0, self.a1);
        let sb = api.add(other.a0, other.a1);
        let t = api.mul(sa, sb);
        let t = api.sub(t, ac);
        let a1 = api.sub(t, bd);
        let bd13 = api.mul_const(bd, &thirteen());
        let a0 = api.add(ac, bd13);
        Self::new(a0, a1)
    }

    /// (a0 + a1)(a0 + 13*a1) - t - 13*t with t = a0*a1: 2 multiplications.
    pub fn square(&self, api: &mut impl Api) -> Self {
        let t = api.mul(self.a0, self.a1);
        let s0 = api.add(self.a0, self.a1);
        let a1_13 = api.mul_const(self.a1, &thirteen());
        let s1 = api.add(self.a0, a1_13);
        let c0 = api.mul(s0, s1);
        let c0 = api.sub(c0, t);
        let t13 = api.mul_const(t, &thirteen());
        let c0 = api.sub(c0, t13);
        let c1 = api.add(t, t);
        Self::new(c0, c1)
    }

    pub fn mul_by_fp(&self, api: &mut impl Api, c: Variable) -> Self {
        Self::new(api.mul(self.a0, c), api.mul(self.a1, c))
    }

    pub fn mul_by_fp_const(&self, api: &mut impl Api, c: &Fq) -> Self {
        let c: BigUint = (*c).into();
        Self::new(api.mul_const(self.a0, &c), api.mul_const(self.a1, &c))
    }

    /// Multiplication by u: (a0 + a1*u)*u = 13*a1 + a0*u.
    pub fn mul_by_nonresidue(&self, api: &mut impl Api) -> Self {
        Self::new(api.mul_const(self.a1, &thirteen()), self.a0)
    }

    pub fn inverse(&self, api: &mut impl Api) -> Self {
        let outs = run_hint(api, hints::INVERSE_E2, 2, &self.vars());
        let inv = Self::from_vars(&outs);
        let check = inv.mul(api, self);
        let one = Self::one(api);
        check.assert_is_equal(api, &one);
        inv
    }

    /// self / other, verified by res * other == self. 0/0 has no witness
    /// because the hint refuses to invert zero.
    pub fn div_unchecked(&self, api: &mut impl Api, other: &Self) -> Self {
        let mut ins = self.vars().to_vec();
        ins.extend(other.vars());
        let outs = run_hint(api, hints::DIV_E2, 2, &ins);
        let res = Self::from_vars(&outs);
        let check = res.mul(api, other);
        check.assert_is_equal(api, self);
        res
    }

    pub fn is_zero(&self, api: &mut impl Api) -> Variable {
        let z0 = api.is_zero(self.a0);
        let z1 = api.is_zero(self.a1);
        api.and(z0, z1)
    }

    pub fn select(api: &mut impl Api, b: Variable, i1: &Self, i2: &Self) -> Self {
        Self::new(api.select(b, i1.a0, i2.a0), api.select(b, i1.a1, i2.a1))
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
            api.lookup2(b0, b1, i0.a0, i1.a0, i2.a0, i3.a0),
            api.lookup2(b0, b1, i0.a1, i1.a1, i2.a1, i3.a1),
        )
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, other: &Self) {
        api.assert_is_equal(self.a0, other.a0);
        api.assert_is_equal(self.a1, other.a1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tower::TowerField;
    use crate::tower::test_utils::{engine, rand_e2n, read_e2};
    use ark_std::test_rng;

    #[test]
    fn mul_and_square_match_native() {
        let mut rng = test_rng();
        let (a, b) = (rand_e2n(&mut rng), rand_e2n(&mut rng));
        let mut eng = engine();
        let ga = E2::witness(&mut eng, &a);
        let gb = E2::witness(&mut eng, &b);
        let prod = ga.mul(&mut eng, &gb);
        let sq = ga.square(&mut eng);
        assert_eq!(read_e2(&eng, &prod), a.mul(&b));
        assert_eq!(read_e2(&eng, &sq), a.square());
        assert!(eng.is_satisfied());
    }

    #[test]
    fn inverse_and_div_are_verified() {
        let mut rng = test_rng();
        let (a, b) = (rand_e2n(&mut rng), rand_e2n(&mut rng));
        let mut eng = engine();
        let ga = E2::witness(&mut eng, &a);
        let gb = E2::witness(&mut eng, &b);
        let inv = ga.inverse(&mut eng);
        let quo = ga.div_unchecked(&mut eng, &gb);
        assert_eq!(read_e2(&eng, &inv), a.inverse().unwrap());
        assert_eq!(read_e2(&eng, &quo), a.mul(&b.inverse().unwrap()));
        eng.finish().unwrap();
    }

    #[test]
    fn inverse_of_zero_is_unsatisfiable() {
        let mut eng = engine();
        let z = E2::zero(&mut eng);
        let _ = z.inverse(&mut eng);
        assert!(!eng.is_satisfied());
    }

    #[test]
    fn nonresidue_and_conjugate_match_native() {
        let mut rng = test_rng();
        let a = rand_e2n(&mut rng);
        let mut eng = engine();
        let ga = E2::witness(&mut eng, &a);
        let nr = ga.mul_by_nonresidue(&mut eng);
        let conj = ga.conjugate(&mut eng);
        assert_eq!(read_e2(&eng, &nr), a.mul_by_nonresidue());
        assert_eq!(read_e2(&eng, &conj), a.conjugate());
        assert!(eng.is_satisfied());
    }
}
