//! Native tower: Fp2 = Fp[u]/(u^2-13), Fp4 = Fp2[v]/(v^2-u),
//! Fp12 = Fp4[w]/(w^3-v), Fp24 = Fp12[i]/(i^2-w).
//!
//! Mirrors the in-circuit gadget formulas so hints and tests agree with the
//! circuits coefficient-for-coefficient.

use ark_ff::{Field, One, Zero};
use num_bigint::BigUint;
use num_traits::One as NumOne;

use super::fields::Fq;

/// Non-residue of Fp2 over Fp: u^2 = 13.
pub fn u_square() -> Fq {
    Fq::from(13u64)
}

/// Minimal surface the generic exponentiation and square-root routines
/// need. Implemented by Fq and every tower level.
pub trait TowerField: Copy + Clone + PartialEq + Eq + core::fmt::Debug {
    fn zero() -> Self;
    fn one() -> Self;
    fn is_zero(&self) -> bool;
    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn square(&self) -> Self;
    fn inverse(&self) -> Option<Self>;
    /// Deterministic element stream used to hunt for quadratic
    /// non-residues; must not be constantly zero or one.
    fn sample(n: u64) -> Self;

    fn double(&self) -> Self {
        self.add(self)
    }

    fn pow(&self, exp: &BigUint) -> Self {
        let mut res = Self::one();
        for i in (0..exp.bits()).rev() {
            res = res.square();
            if exp.bit(i) {
                res = res.mul(self);
            }
        }
        res
    }
}

impl TowerField for Fq {
    fn zero() -> Self {
        Zero::zero()
    }
    fn one() -> Self {
        One::one()
    }
    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }
    fn add(&self, other: &Self) -> Self {
        *self + other
    }
    fn sub(&self, other: &Self) -> Self {
        *self - other
    }
    fn neg(&self) -> Self {
        -*self
    }
    fn mul(&self, other: &Self) -> Self {
        *self * other
    }
    fn square(&self) -> Self {
        Field::square(self)
    }
    fn inverse(&self) -> Option<Self> {
        Field::inverse(self)
    }
    fn sample(n: u64) -> Self {
        Fq::from(n)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct E2n {
    pub a0: Fq,
    pub a1: Fq,
}

impl E2n {
    pub fn new(a0: Fq, a1: Fq) -> Self {
        Self { a0, a1 }
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.a0, -self.a1)
    }

    pub fn mul_by_fp(&self, c: &Fq) -> Self {
        Self::new(self.a0 * c, self.a1 * c)
    }

    /// Multiplication by u.
    pub fn mul_by_nonresidue(&self) -> Self {
        Self::new(self.a1 * u_square(), self.a0)
    }

    pub fn coeffs(&self) -> [Fq; 2] {
        [self.a0, self.a1]
    }

    pub fn from_coeffs(c: &[Fq]) -> Self {
        Self::new(c[0], c[1])
    }
}

impl TowerField for E2n {
    fn zero() -> Self {
        Self::new(TowerField::zero(), TowerField::zero())
    }
    fn one() -> Self {
        Self::new(TowerField::one(), TowerField::zero())
    }
    fn is_zero(&self) -> bool {
        Zero::is_zero(&self.a0) && Zero::is_zero(&self.a1)
    }
    fn add(&self, other: &Self) -> Self {
        Self::new(self.a0 + other.a0, self.a1 + other.a1)
    }
    fn sub(&self, other: &Self) -> Self {
        Self::new(self.a0 - other.a0, self.a1 - other.a1)
    }
    fn neg(&self) -> Self {
        Self::new(-self.a0, -self.a1)
    }
    fn mul(&self, other: &Self) -> Self {
        let ac = self.a0 * other.a0;
        let bd = self.a1 * other.a1;
        Self::new(
            ac + bd * u_square(),
            (self.a0 + self.a1) * (other.a0 + other.a1) - ac - bd,
        )
    }
    fn square(&self) -> Self {
        let t = self.a0 * self.a1;
        let c0 = (self.a0 + self.a1) * (self.a0 + self.a1 * u_square()) - t - t * u_square();
        Self::new(c0, t.double())
    }
    fn inverse(&self) -> Option<Self> {
        // norm = a0^2 - 13*a1^2
        let norm = Field::square(&self.a0) - Field::square(&self.a1) * u_square();
        let inv = Field::inverse(&norm)?;
        Some(Self::new(self.a0 * inv, -(self.a1 * inv)))
    }
    fn sample(n: u64) -> Self {
        Self::new(Fq::from(n), <Fq as TowerField>::one())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct E4n {
    pub b0: E2n,
    pub b1: E2n,
}

impl E4n {
    pub fn new(b0: E2n, b1: E2n) -> Self {
        Self { b0, b1 }
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.b0, TowerField::neg(&self.b1))
    }

    pub fn mul_by_fp(&self, c: &Fq) -> Self {
        Self::new(self.b0.mul_by_fp(c), self.b1.mul_by_fp(c))
    }

    /// Multiplication by v.
    pub fn mul_by_nonresidue(&self) -> Self {
        Self::new(self.b1.mul_by_nonresidue(), self.b0)
    }

    pub fn coeffs(&self) -> [Fq; 4] {
        let [a, b] = self.b0.coeffs();
        let [c, d] = self.b1.coeffs();
        [a, b, c, d]
    }

    pub fn from_coeffs(c: &[Fq]) -> Self {
        Self::new(E2n::from_coeffs(&c[..2]), E2n::from_coeffs(&c[2..4]))
    }
}

impl TowerField for E4n {
    fn zero() -> Self {
        Self::new(TowerField::zero(), TowerField::zero())
    }
    fn one() -> Self {
        Self::new(TowerField::one(), TowerField::zero())
    }
    fn is_zero(&self) -> bool {
        TowerField::is_zero(&self.b0) && TowerField::is_zero(&self.b1)
    }
    fn add(&self, other: &Self) -> Self {
        Self::new(self.b0.add(&other.b0), self.b1.add(&other.b1))
    }
    fn sub(&self, other: &Self) -> Self {
        Self::new(self.b0.sub(&other.b0), self.b1.sub(&other.b1))
    }
    fn neg(&self) -> Self {
        Self::new(TowerField::neg(&self.b0), TowerField::neg(&self.b1))
    }
    fn mul(&self, other: &Self) -> Self {
        let ac = self.b0.mul(&other.b0);
        let bd = self.b1.mul(&other.b1);
        Self::new(
            ac.add(&bd.mul_by_nonresidue()),
            self.b0
                .add(&self.b1)
                .mul(&other.b0.add(&other.b1))
                .sub(&ac)
                .sub(&bd),
        )
    }
    fn square(&self) -> Self {
        let t = self.b0.mul(&self.b1);
        let c0 = self
            .b0
            .add(&self.b1)
            .mul(&self.b0.add(&self.b1.mul_by_nonresidue()))
            .sub(&t)
            .sub(&t.mul_by_nonresidue());
        Self::new(c0, t.double())
    }
    fn inverse(&self) -> Option<Self> {
        // norm = b0^2 - u*b1^2
        let norm = self.b0.square().sub(&self.b1.square().mul_by_nonresidue());
        let inv = norm.inverse()?;
        Some(Self::new(
            self.b0.mul(&inv),
            TowerField::neg(&self.b1.mul(&inv)),
        ))
    }
    fn sample(n: u64) -> Self {
        Self::new(E2n::sample(n), TowerField::one())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct E12n {
    pub c0: E4n,
    pub c1: E4n,
    pub c2: E4n,
}

impl E12n {
    pub fn new(c0: E4n, c1: E4n, c2: E4n) -> Self {
        Self { c0, c1, c2 }
    }

    /// Multiplication by w: (c0, c1, c2) -> (v*c2, c0, c1).
    pub fn mul_by_nonresidue(&self) -> Self {
        Self::new(self.c2.mul_by_nonresidue(), self.c0, self.c1)
    }

    /// Sparse multiplication by (c0 + c1*w).
    pub fn mul_by_01(&self, c0: &E4n, c1: &E4n) -> Self {
        let a = self.c0.mul(c0);
        let b = self.c1.mul(c1);
        let t0 = self
            .c1
            .add(&self.c2)
            .mul(c1)
            .sub(&b)
            .mul_by_nonresidue()
            .add(&a);
        let t2 = self.c2.mul(c0).add(&b);
        let t1 = c0
            .add(c1)
            .mul(&self.c0.add(&self.c1))
            .sub(&a)
            .sub(&b);
        Self::new(t0, t1, t2)
    }

    pub fn coeffs(&self) -> [Fq; 12] {
        let mut out = [<Fq as TowerField>::zero(); 12];
        out[..4].copy_from_slice(&self.c0.coeffs());
        out[4..8].copy_from_slice(&self.c1.coeffs());
        out[8..].copy_from_slice(&self.c2.coeffs());
        out
    }

    pub fn from_coeffs(c: &[Fq]) -> Self {
        Self::new(
            E4n::from_coeffs(&c[..4]),
            E4n::from_coeffs(&c[4..8]),
            E4n::from_coeffs(&c[8..12]),
        )
    }
}

impl TowerField for E12n {
    fn zero() -> Self {
        Self::new(
            TowerField::zero(),
            TowerField::zero(),
            TowerField::zero(),
        )
    }
    fn one() -> Self {
        Self::new(TowerField::one(), TowerField::zero(), TowerField::zero())
    }
    fn is_zero(&self) -> bool {
        TowerField::is_zero(&self.c0)
            && TowerField::is_zero(&self.c1)
            && TowerField::is_zero(&self.c2)
    }
    fn add(&self, other: &Self) -> Self {
        Self::new(
            self.c0.add(&other.c0),
            self.c1.add(&other.c1),
            self.c2.add(&other.c2),
        )
    }
    fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.c0.sub(&other.c0),
            self.c1.sub(&other.c1),
            self.c2.sub(&other.c2),
        )
    }
    fn neg(&self) -> Self {
        Self::new(
            TowerField::neg(&self.c0),
            TowerField::neg(&self.c1),
            TowerField::neg(&self.c2),
        )
    }
    fn mul(&self, other: &Self) -> Self {
        let t0 = self.c0.mul(&other.c0);
        let t1 = self.c1.mul(&other.c1);
        let t2 = self.c2.mul(&other.c2);
        let c0 = self
            .c1
            .add(&self.c2)
            .mul(&other.c1.add(&other.c2))
            .sub(&t1)
            .sub(&t2)
            .mul_by_nonresidue()
            .add(&t0);
        let c1 = self
            .c0
            .add(&self.c1)
            .mul(&other.c0.add(&other.c1))
            .sub(&t0)
            .sub(&t1)
            .add(&t2.mul_by_nonresidue());
        let c2 = self
            .c0
            .add(&self.c2)
            .mul(&other.c0.add(&other.c2))
            .sub(&t0)
            .sub(&t2)
            .add(&t1);
        Self::new(c0, c1, c2)
    }
    fn square(&self) -> Self {
        self.mul(self)
    }
    fn inverse(&self) -> Option<Self> {
        let t0 = self.c0.square();
        let t1 = self.c1.square();
        let t2 = self.c2.square();
        let t3 = self.c0.mul(&self.c1);
        let t4 = self.c0.mul(&self.c2);
        let t5 = self.c1.mul(&self.c2);
        let d0 = t0.sub(&t5.mul_by_nonresidue());
        let d1 = t2.mul_by_nonresidue().sub(&t3);
        let d2 = t1.sub(&t4);
        let norm = self
            .c0
            .mul(&d0)
            .add(&self.c2.mul(&d1).add(&self.c1.mul(&d2)).mul_by_nonresidue());
        let inv = norm.inverse()?;
        Some(Self::new(d0.mul(&inv), d1.mul(&inv), d2.mul(&inv)))
    }
    fn sample(n: u64) -> Self {
        Self::new(E4n::sample(n), TowerField::one(), TowerField::zero())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct E24n {
    pub d0: E12n,
    pub d1: E12n,
}

impl E24n {
    pub fn new(d0: E12n, d1: E12n) -> Self {
        Self { d0, d1 }
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.d0, TowerField::neg(&self.d1))
    }

    /// Sparse multiplication by 1 + c3*i + c4*i*w.
    pub fn mul_by_034(&self, c3: &E4n, c4: &E4n) -> Self {
        let bd = self.d1.mul_by_01(c3, c4);
        Self::new(
            self.d0.add(&bd.mul_by_nonresidue()),
            self.d1.add(&self.d0.mul_by_01(c3, c4)),
        )
    }

    pub fn coeffs(&self) -> [Fq; 24] {
        let mut out = [<Fq as TowerField>::zero(); 24];
        out[..12].copy_from_slice(&self.d0.coeffs());
        out[12..].copy_from_slice(&self.d1.coeffs());
        out
    }

    pub fn from_coeffs(c: &[Fq]) -> Self {
        Self::new(E12n::from_coeffs(&c[..12]), E12n::from_coeffs(&c[12..24]))
    }
}

impl TowerField for E24n {
    fn zero() -> Self {
        Self::new(TowerField::zero(), TowerField::zero())
    }
    fn one() -> Self {
        Self::new(TowerField::one(), TowerField::zero())
    }
    fn is_zero(&self) -> bool {
        TowerField::is_zero(&self.d0) && TowerField::is_zero(&self.d1)
    }
    fn add(&self, other: &Self) -> Self {
        Self::new(self.d0.add(&other.d0), self.d1.add(&other.d1))
    }
    fn sub(&self, other: &Self) -> Self {
        Self::new(self.d0.sub(&other.d0), self.d1.sub(&other.d1))
    }
    fn neg(&self) -> Self {
        Self::new(TowerField::neg(&self.d0), TowerField::neg(&self.d1))
    }
    fn mul(&self, other: &Self) -> Self {
        let ac = self.d0.mul(&other.d0);
        let bd = self.d1.mul(&other.d1);
        Self::new(
            ac.add(&bd.mul_by_nonresidue()),
            self.d0
                .add(&self.d1)
                .mul(&other.d0.add(&other.d1))
                .sub(&ac)
                .sub(&bd),
        )
    }
    fn square(&self) -> Self {
        self.mul(self)
    }
    fn inverse(&self) -> Option<Self> {
        // norm = d0^2 - w*d1^2
        let norm = self.d0.square().sub(&self.d1.square().mul_by_nonresidue());
        let inv = norm.inverse()?;
        Some(Self::new(
            self.d0.mul(&inv),
            TowerField::neg(&self.d1.mul(&inv)),
        ))
    }
    fn sample(n: u64) -> Self {
        Self::new(E12n::sample(n), TowerField::one())
    }
}

/// Tonelli-Shanks square root in a field of the given order. The quadratic
/// non-residue is found by scanning the field's deterministic sample
/// stream, so no per-field constant is needed.
pub fn sqrt<F: TowerField>(a: &F, field_order: &BigUint) -> Option<F> {
    if a.is_zero() {
        return Some(F::zero());
    }
    let one = BigUint::one();
    let half = (field_order - &one) >> 1;
    let legendre = a.pow(&half);
    if legendre != F::one() {
        return None;
    }

    // field_order - 1 = t * 2^s with t odd
    let mut s = 0u64;
    let mut t = field_order - &one;
    while !t.bit(0) {
        t >>= 1;
        s += 1;
    }

    let minus_one = TowerField::neg(&F::one());
    let mut z = F::zero();
    for n in 2..10_000u64 {
        let cand = F::sample(n);
        if cand.is_zero() {
            continue;
        }
        if cand.pow(&half) == minus_one {
            z = cand;
            break;
        }
    }
    debug_assert!(!z.is_zero(), "no quadratic non-residue found");

    let mut m = s;
    let mut c = z.pow(&t);
    let mut tt = a.pow(&t);
    let mut r = a.pow(&((&t + &one) >> 1));
    while tt != F::one() {
        let mut i = 0u64;
        let mut t2i = tt;
        while t2i != F::one() {
            t2i = t2i.square();
            i += 1;
        }
        let mut b = c;
        for _ in 0..(m - i - 1) {
            b = b.square();
        }
        m = i;
        c = b.square();
        tt = tt.mul(&c);
        r = r.mul(&b);
    }
    Some(r)
}
