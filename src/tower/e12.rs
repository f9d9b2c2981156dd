//! Degree-12 extension gadget: c0 + c1*w + c2*w^2 over E4, with w^3 = v.

use crate::frontend::{run_hint, Api, Variable};

use crate::curve::tower::E12n;

use super::hints;
use super::E4;

#[derive(Clone, Copy, Debug)]
pub struct E12 {
    pub c0: E4,
    pub c1: E4,
    pub c2: E4,
}

impl E12 {
    pub fn new(c0: E4, c1: E4, c2: E4) -> Self {
        Self { c0, c1, c2 }
    }

    pub fn zero(api: &mut impl Api) -> Self {
        Self::new(E4::zero(api), E4::zero(api), E4::zero(api))
    }

    pub fn one(api: &mut impl Api) -> Self {
        Self::new(E4::one(api), E4::zero(api), E4::zero(api))
    }

    pub fn constant(api: &mut impl Api, v: &E12n) -> Self {
        Self::new(
            E4::constant(api, &v.c0),
            E4::constant(api, &v.c1),
            E4::constant(api, &v.c2),
        )
    }

    pub fn witness(api: &mut impl Api, v: &E12n) -> Self {
        Self::new(
            E4::witness(api, &v.c0),
            E4::witness(api, &v.c1),
            E4::witness(api, &v.c2),
        )
    }

    pub(crate) fn vars(&self) -> Vec<Variable> {
        let mut out = self.c0.vars().to_vec();
        out.extend(self.c1.vars());
        out.extend(self.c2.vars());
        out
    }

    pub(crate) fn from_vars(vars: &[Variable]) -> Self {
        Self::new(
            E4::from_vars(&vars[..4]),
            E4::from_vars(&vars[4..8]),
            E4::from_vars(&vars[8..12]),
        )
    }

    pub fn add(&self, api: &mut impl Api, other: &Self) -> Self {
        Self::new(
            self.c0.add(api, &other.c0),
            self.c1.add(api, &other.c1),
            self.c2.add(api, &other.c2),
        )
    }

    pub fn sub(&self, api: &mut impl Api, other: &Self) -> Self {
        Self::new(
            self.c0.sub(api, &other.c0),
            self.c1.sub(api, &other.c1),
            self.c2.sub(api, &other.c2),
        )
    }

    pub fn neg(&self, api: &mut impl Api) -> Self {
        Self::new(self.c0.neg(api), self.c1.neg(api), self.c2.neg(api))
    }

    pub fn double(&self, api: &mut impl Api) -> Self {
        Self::new(
            self.c0.double(api),
            self.c1.double(api),
            self.c2.double(api),
        )
    }

    /// Karatsuba over the three coefficients (Chung-Hasan asymmetric
    /// squaring is used in [`Self::square`]).
    pub fn mul(&self, api: &mut impl Api, other: &Self) -> Self {
        let t0 = self.c0.mul(api, &other.c0);
        let t1 = self.c1.mul(api, &other.c1);
        let t2 = self.c2.mul(api, &other.c2);

        let s1 = self.c1.add(api, &self.c2);
        let s2 = other.c1.add(api, &other.c2);
        let c0 = s1.mul(api, &s2);
        let c0 = c0.sub(api, &t1);
        let c0 = c0.sub(api, &t2);
        let c0 = c0.mul_by_nonresidue(api);
        let c0 = c0.add(api, &t0);

        let s1 = self.c0.add(api, &self.c1);
        let s2 = other.c0.add(api, &other.c1);
        let c1 = s1.mul(api, &s2);
        let c1 = c1.sub(api, &t0);
        let c1 = c1.sub(api, &t1);
        let t2nr = t2.mul_by_nonresidue(api);
        let c1 = c1.add(api, &t2nr);

        let s1 = self.c0.add(api, &self.c2);
        let s2 = other.c0.add(api, &other.c2);
        let c2 = s1.mul(api, &s2);
        let c2 = c2.sub(api, &t0);
        let c2 = c2.sub(api, &t2);
        let c2 = c2.add(api, &t1);

        Self::new(c0, c1, c2)
    }

    pub fn square(&self, api: &mut impl Api) -> Self {
        let c4 = self.c0.mul(api, &self.c1);
        let c4 = c4.double(api);
        let c5 = self.c2.square(api);
        let c5nr = c5.mul_by_nonresidue(api);
        let c1 = c5nr.add(api, &c4);
        let c2 = c4.sub(api, &c5);
        let c3 = self.c0.square(api);
        let c4 = self.c0.sub(api, &self.c1);
        let c4 = c4.add(api, &self.c2);
        let c5 = self.c1.mul(api, &self.c2);
        let c5 = c5.double(api);
        let c4 = c4.square(api);
        let c5nr = c5.mul_by_nonresidue(api);
        let c0 = c5nr.add(api, &c3);
        let c2 = c2.add(api, &c4);
        let c2 = c2.add(api, &c5);
        let c2 = c2.sub(api, &c3);
        Self::new(c0, c1, c2)
    }

    /// Multiplication by w: (c0, c1, c2) -> (v*c2, c0, c1).
    pub fn mul_by_nonresidue(&self, api: &mut impl Api) -> Self {
        Self::new(self.c2.mul_by_nonresidue(api), self.c0, self.c1)
    }

    /// Sparse multiplication by b0 + b1*w.
    pub fn mul_by_01(&self, api: &mut impl Api, b0: &E4, b1: &E4) -> Self {
        let a = self.c0.mul(api, b0);
        let b = self.c1.mul(api, b1);

        let t0 = self.c1.add(api, &self.c2);
        let t0 = t0.mul(api, b1);
        let t0 = t0.sub(api, &b);
        let t0 = t0.mul_by_nonresidue(api);
        let t0 = t0.add(api, &a);

        let t2 = self.c2.mul(api, b0);
        let t2 = t2.add(api, &b);

        let s = b0.add(api, b1);
        let t1 = self.c0.add(api, &self.c1);
        let t1 = s.mul(api, &t1);
        let t1 = t1.sub(api, &a);
        let t1 = t1.sub(api, &b);

        Self::new(t0, t1, t2)
    }

    /// (a0)*(b0 + b1*w) for a sparse left operand with only c0 set.
    pub fn mul0_by_01(api: &mut impl Api, a0: &E4, b0: &E4, b1: &E4) -> Self {
        let t0 = a0.mul(api, b0);
        let s = b0.add(api, b1);
        let c1 = s.mul(api, a0);
        let c1 = c1.sub(api, &t0);
        Self::new(t0, c1, E4::zero(api))
    }

    pub fn mul_by_e4(&self, api: &mut impl Api, c: &E4) -> Self {
        Self::new(
            self.c0.mul(api, c),
            self.c1.mul(api, c),
            self.c2.mul(api, c),
        )
    }

    pub fn mul_by_fp(&self, api: &mut impl Api, c: Variable) -> Self {
        Self::new(
            self.c0.mul_by_fp(api, c),
            self.c1.mul_by_fp(api, c),
            self.c2.mul_by_fp(api, c),
        )
    }

    pub fn inverse(&self, api: &mut impl Api) -> Self {
        let outs = run_hint(api, hints::INVERSE_E12, 12, &self.vars());
        let inv = Self::from_vars(&outs);
        let check = inv.mul(api, self);
        let one = Self::one(api);
        check.assert_is_equal(api, &one);
        inv
    }

    pub fn div_unchecked(&self, api: &mut impl Api, other: &Self) -> Self {
        let mut ins = self.vars();
        ins.extend(other.vars());
        let outs = run_hint(api, hints::DIV_E12, 12, &ins);
        let res = Self::from_vars(&outs);
        let check = res.mul(api, other);
        check.assert_is_equal(api, self);
        res
    }

    pub fn select(api: &mut impl Api, b: Variable, i1: &Self, i2: &Self) -> Self {
        Self::new(
            E4::select(api, b, &i1.c0, &i2.c0),
            E4::select(api, b, &i1.c1, &i2.c1),
            E4::select(api, b, &i1.c2, &i2.c2),
        )
    }

    pub fn assert_is_equal(&self, api: &mut impl Api, other: &Self) {
        self.c0.assert_is_equal(api, &other.c0);
        self.c1.assert_is_equal(api, &other.c1);
        self.c2.assert_is_equal(api, &other.c2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tower::TowerField;
    use crate::tower::test_utils::{engine, rand_e12n, rand_e4n, read_e12};
    use ark_std::test_rng;

    #[test]
    fn mul_and_square_match_native() {
        let mut rng = test_rng();
        let (a, b) = (rand_e12n(&mut rng), rand_e12n(&mut rng));
        let mut eng = engine();
        let ga = E12::witness(&mut eng, &a);
        let gb = E12::witness(&mut eng, &b);
        let prod = ga.mul(&mut eng, &gb);
        let sq = ga.square(&mut eng);
        assert_eq!(read_e12(&eng, &prod), a.mul(&b));
        assert_eq!(read_e12(&eng, &sq), a.mul(&a));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn sparse_mul_matches_dense() {
        let mut rng = test_rng();
        let a = rand_e12n(&mut rng);
        let (b0, b1) = (rand_e4n(&mut rng), rand_e4n(&mut rng));
        let mut eng = engine();
        let ga = E12::witness(&mut eng, &a);
        let gb0 = E4::witness(&mut eng, &b0);
        let gb1 = E4::witness(&mut eng, &b1);
        let sparse = ga.mul_by_01(&mut eng, &gb0, &gb1);
        assert_eq!(read_e12(&eng, &sparse), a.mul_by_01(&b0, &b1));

        let dense = E12n::new(b0, b1, TowerField::zero());
        assert_eq!(a.mul_by_01(&b0, &b1), a.mul(&dense));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn mul0_by_01_matches_dense() {
        let mut rng = test_rng();
        let (a0, b0, b1) = (rand_e4n(&mut rng), rand_e4n(&mut rng), rand_e4n(&mut rng));
        let mut eng = engine();
        let ga0 = E4::witness(&mut eng, &a0);
        let gb0 = E4::witness(&mut eng, &b0);
        let gb1 = E4::witness(&mut eng, &b1);
        let res = E12::mul0_by_01(&mut eng, &ga0, &gb0, &gb1);
        let lhs = E12n::new(a0, TowerField::zero(), TowerField::zero());
        let rhs = E12n::new(b0, b1, TowerField::zero());
        assert_eq!(read_e12(&eng, &res), lhs.mul(&rhs));
        assert!(eng.is_satisfied());
    }

    #[test]
    fn inverse_and_div_are_verified() {
        let mut rng = test_rng();
        let (a, b) = (rand_e12n(&mut rng), rand_e12n(&mut rng));
        let mut eng = engine();
        let ga = E12::witness(&mut eng, &a);
        let gb = E12::witness(&mut eng, &b);
        let inv = ga.inverse(&mut eng);
        let quo = ga.div_unchecked(&mut eng, &gb);
        assert_eq!(read_e12(&eng, &inv), a.inverse().unwrap());
        assert_eq!(read_e12(&eng, &quo), a.mul(&b.inverse().unwrap()));
        eng.finish().unwrap();
    }

    #[test]
    fn nonresidue_rotation_matches_native() {
        let mut rng = test_rng();
        let a = rand_e12n(&mut rng);
        let mut eng = engine();
        let ga = E12::witness(&mut eng, &a);
        let nr = ga.mul_by_nonresidue(&mut eng);
        assert_eq!(read_e12(&eng, &nr), a.mul_by_nonresidue());
        assert!(eng.is_satisfied());
    }
}
