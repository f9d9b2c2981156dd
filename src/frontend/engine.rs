//! Witness-evaluation engine.
//!
//! Evaluates a circuit eagerly over a concrete prime field: every variable
//! holds a value, hints execute immediately and assertions are checked on the
//! spot. The first failed check is recorded (not panicked) so tests can
//! assert on satisfiability of deliberately broken witnesses.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::hints::HintRegistry;
use super::{Api, CircuitError, Variable};

pub struct WitnessEngine<F: PrimeField> {
    values: Vec<F>,
    constants: Vec<bool>,
    registry: HintRegistry,
    modulus: BigUint,
    err: Option<CircuitError>,
    n_muls: usize,
}

impl<F: PrimeField> WitnessEngine<F> {
    pub fn new(registry: HintRegistry) -> Self {
        let modulus = BigUint::from_bytes_le(&F::MODULUS.to_bytes_le());
        Self {
            values: Vec::new(),
            constants: Vec::new(),
            registry,
            modulus,
            err: None,
            n_muls: 0,
        }
    }

    fn push(&mut self, v: F, constant: bool) -> Variable {
        let idx = self.values.len() as u32;
        self.values.push(v);
        self.constants.push(constant);
        Variable(idx)
    }

    pub fn value(&self, v: Variable) -> F {
        self.values[v.0 as usize]
    }

    pub fn value_biguint(&self, v: Variable) -> BigUint {
        self.value(v).into()
    }

    fn fail(&mut self, e: CircuitError) {
        if self.err.is_none() {
            tracing::debug!(error = %e, "circuit unsatisfied");
            self.err = Some(e);
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.err.is_none()
    }

    /// Number of field multiplications evaluated, a rough cost proxy.
    pub fn n_muls(&self) -> usize {
        self.n_muls
    }

    pub fn finish(self) -> Result<(), CircuitError> {
        match self.err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    fn bool_value(&mut self, b: Variable) -> bool {
        let v = self.value(b);
        if v.is_one() {
            true
        } else {
            if !v.is_zero() {
                self.fail(CircuitError::InvalidWitness(format!(
                    "selector is not boolean: {v}"
                )));
            }
            false
        }
    }
}

impl<F: PrimeField> Api for WitnessEngine<F> {
    fn constant(&mut self, value: &BigUint) -> Variable {
        let reduced = value % &self.modulus;
        self.push(F::from(reduced), true)
    }

    fn constant_i64(&mut self, value: i64) -> Variable {
        let v = if value >= 0 {
            F::from(value as u64)
        } else {
            -F::from(value.unsigned_abs())
        };
        self.push(v, true)
    }

    fn witness(&mut self, value: &BigUint) -> Variable {
        let reduced = value % &self.modulus;
        self.push(F::from(reduced), false)
    }

    fn add(&mut self, a: Variable, b: Variable) -> Variable {
        let v = self.value(a) + self.value(b);
        self.push(v, false)
    }

    fn sub(&mut self, a: Variable, b: Variable) -> Variable {
        let v = self.value(a) - self.value(b);
        self.push(v, false)
    }

    fn neg(&mut self, a: Variable) -> Variable {
        let v = -self.value(a);
        self.push(v, false)
    }

    fn mul(&mut self, a: Variable, b: Variable) -> Variable {
        self.n_muls += 1;
        let v = self.value(a) * self.value(b);
        self.push(v, false)
    }

    fn mul_const(&mut self, a: Variable, c: &BigUint) -> Variable {
        let c = F::from(c % &self.modulus);
        let v = self.value(a) * c;
        self.push(v, false)
    }

    fn div(&mut self, a: Variable, b: Variable) -> Variable {
        self.n_muls += 1;
        match self.value(b).inverse() {
            Some(inv) => {
                let v = self.value(a) * inv;
                self.push(v, false)
            }
            None => {
                self.fail(CircuitError::DivisionByZero);
                self.push(F::zero(), false)
            }
        }
    }

    fn div_unchecked(&mut self, a: Variable, b: Variable) -> Variable {
        self.n_muls += 1;
        match self.value(b).inverse() {
            Some(inv) => {
                let v = self.value(a) * inv;
                self.push(v, false)
            }
            None => {
                // 0/0 is defined as 0; x/0 with x != 0 has no witness.
                if !self.value(a).is_zero() {
                    self.fail(CircuitError::DivisionByZero);
                }
                self.push(F::zero(), false)
            }
        }
    }

    fn select(&mut self, b: Variable, i1: Variable, i2: Variable) -> Variable {
        let v = if self.bool_value(b) {
            self.value(i1)
        } else {
            self.value(i2)
        };
        self.push(v, false)
    }

    fn lookup2(
        &mut self,
        b0: Variable,
        b1: Variable,
        i0: Variable,
        i1: Variable,
        i2: Variable,
        i3: Variable,
    ) -> Variable {
        let idx = self.bool_value(b0) as usize | (self.bool_value(b1) as usize) << 1;
        let v = self.value([i0, i1, i2, i3][idx]);
        self.push(v, false)
    }

    fn is_zero(&mut self, a: Variable) -> Variable {
        let v = if self.value(a).is_zero() {
            F::one()
        } else {
            F::zero()
        };
        self.push(v, false)
    }

    fn and(&mut self, a: Variable, b: Variable) -> Variable {
        let v = self.bool_value(a) && self.bool_value(b);
        self.push(F::from(v), false)
    }

    fn or(&mut self, a: Variable, b: Variable) -> Variable {
        let v = self.bool_value(a) || self.bool_value(b);
        self.push(F::from(v), false)
    }

    fn xor(&mut self, a: Variable, b: Variable) -> Variable {
        let v = self.bool_value(a) ^ self.bool_value(b);
        self.push(F::from(v), false)
    }

    fn to_binary(&mut self, a: Variable, n: usize) -> Vec<Variable> {
        let value = self.value_biguint(a);
        if value.bits() as usize > n {
            self.fail(CircuitError::ValueTooLarge(n));
        }
        (0..n)
            .map(|i| {
                let bit = value.bit(i as u64);
                self.push(F::from(bit), false)
            })
            .collect()
    }

    fn from_binary(&mut self, bits: &[Variable]) -> Variable {
        let mut acc = BigUint::zero();
        for (i, b) in bits.iter().enumerate() {
            if self.bool_value(*b) {
                acc |= BigUint::one() << i;
            }
        }
        let v = F::from(acc);
        self.push(v, false)
    }

    fn assert_is_equal(&mut self, a: Variable, b: Variable) {
        let (va, vb) = (self.value(a), self.value(b));
        if va != vb {
            self.fail(CircuitError::Unsatisfied(va.to_string(), vb.to_string()));
        }
    }

    fn assert_is_different(&mut self, a: Variable, b: Variable) {
        let (va, vb) = (self.value(a), self.value(b));
        if va == vb {
            self.fail(CircuitError::InvalidWitness(format!(
                "values are equal: {va}"
            )));
        }
    }

    fn assert_is_boolean(&mut self, a: Variable) {
        let v = self.value(a);
        if !v.is_zero() && !v.is_one() {
            self.fail(CircuitError::InvalidWitness(format!("not boolean: {v}")));
        }
    }

    fn new_hint(
        &mut self,
        name: &'static str,
        n_outputs: usize,
        inputs: &[Variable],
    ) -> Result<Vec<Variable>, CircuitError> {
        let ins: Vec<BigUint> = inputs.iter().map(|v| self.value_biguint(*v)).collect();
        let mut outs = vec![BigUint::zero(); n_outputs];
        if let Err(e) = self.registry.run(name, &self.modulus.clone(), &ins, &mut outs) {
            self.fail(e.clone());
            return Err(e);
        }
        Ok(outs
            .iter()
            .map(|o| {
                let reduced = o % &self.modulus;
                self.push(F::from(reduced), false)
            })
            .collect())
    }

    fn native_modulus(&self) -> &BigUint {
        &self.modulus
    }

    fn constant_value(&self, a: Variable) -> Option<BigUint> {
        if self.constants[a.0 as usize] {
            Some(self.value_biguint(a))
        } else {
            None
        }
    }
}
