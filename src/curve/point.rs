//! Affine points over any tower level, for curves y^2 = x^3 + b (j = 0).

use num_bigint::BigUint;

use super::tower::TowerField;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePoint<F: TowerField> {
    pub x: F,
    pub y: F,
    pub infinity: bool,
}

impl<F: TowerField> AffinePoint<F> {
    pub fn new(x: F, y: F) -> Self {
        Self {
            x,
            y,
            infinity: false,
        }
    }

    pub fn zero() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
            infinity: true,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.infinity
    }

    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.neg(),
            infinity: self.infinity,
        }
    }

    pub fn is_on_curve(&self, b: &F) -> bool {
        if self.infinity {
            return true;
        }
        self.y.square() == self.x.square().mul(&self.x).add(b)
    }

    pub fn double(&self) -> Self {
        if self.infinity || self.y.is_zero() {
            return Self::zero();
        }
        // lambda = 3x^2 / 2y
        let lambda = match self.y.double().inverse() {
            Some(inv) => self.x.square().mul(&F::one().double().add(&F::one())).mul(&inv),
            None => return Self::zero(),
        };
        let x3 = lambda.square().sub(&self.x.double());
        let y3 = lambda.mul(&self.x.sub(&x3)).sub(&self.y);
        Self::new(x3, y3)
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.infinity {
            return *other;
        }
        if other.infinity {
            return *self;
        }
        if self.x == other.x {
            return if self.y == other.y.neg() {
                Self::zero()
            } else {
                self.double()
            };
        }
        let lambda = match other.x.sub(&self.x).inverse() {
            Some(inv) => other.y.sub(&self.y).mul(&inv),
            None => return Self::zero(),
        };
        let x3 = lambda.square().sub(&self.x).sub(&other.x);
        let y3 = lambda.mul(&self.x.sub(&x3)).sub(&self.y);
        Self::new(x3, y3)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul_biguint(&self, scalar: &BigUint) -> Self {
        let mut acc = Self::zero();
        for i in (0..scalar.bits()).rev() {
            acc = acc.double();
            if scalar.bit(i) {
                acc = acc.add(self);
            }
        }
        acc
    }
}
