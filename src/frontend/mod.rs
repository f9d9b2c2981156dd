//! Constraint-builder abstraction the gadgets are written against.
//!
//! Gadget code never touches field values directly. It manipulates opaque
//! [`Variable`] handles through the [`Api`] trait, so the same gadget source
//! drives a real constraint system or the witness-evaluation engine used by
//! the tests. Out-of-circuit computations go through named hints registered
//! in a [`hints::HintRegistry`]; hint outputs are untrusted and must be
//! re-constrained by the caller.

pub mod engine;
pub mod hints;

use num_bigint::BigUint;
use thiserror::Error;

pub use engine::WitnessEngine;
pub use hints::{HintError, HintRegistry};

/// Opaque handle to a native-field value inside a circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variable(pub(crate) u32);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("hint \"{0}\" is not registered")]
    UnknownHint(String),
    #[error("hint \"{name}\" failed: {source}")]
    HintFailure { name: String, source: HintError },
    #[error("assertion failed: {0} != {1}")]
    Unsatisfied(String, String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("value does not fit in {0} bits")]
    ValueTooLarge(usize),
    #[error("invalid witness: {0}")]
    InvalidWitness(String),
}

/// Native-field circuit operations.
///
/// Boolean-valued operations (`is_zero`, `and`, ...) return variables that
/// are guaranteed to hold 0 or 1; `select` and `lookup2` require their
/// selector inputs to be such variables.
pub trait Api {
    /// Injects a constant, reduced modulo the native field.
    fn constant(&mut self, value: &BigUint) -> Variable;
    /// Injects a small signed constant (negative values wrap modulo the
    /// native field).
    fn constant_i64(&mut self, value: i64) -> Variable;
    /// Allocates a witness value. The engine is its own witness source, so
    /// the concrete value is provided directly.
    fn witness(&mut self, value: &BigUint) -> Variable;

    fn add(&mut self, a: Variable, b: Variable) -> Variable;
    fn sub(&mut self, a: Variable, b: Variable) -> Variable;
    fn neg(&mut self, a: Variable) -> Variable;
    fn mul(&mut self, a: Variable, b: Variable) -> Variable;
    /// a * c for a compile-time constant c.
    fn mul_const(&mut self, a: Variable, c: &BigUint) -> Variable;
    /// a / b; the circuit is unsatisfiable when b == 0.
    fn div(&mut self, a: Variable, b: Variable) -> Variable;
    /// a / b with 0/0 defined as 0.
    fn div_unchecked(&mut self, a: Variable, b: Variable) -> Variable;

    /// Returns `i1` when `b` is 1 and `i2` when `b` is 0.
    fn select(&mut self, b: Variable, i1: Variable, i2: Variable) -> Variable;
    /// Two-bit lookup: returns `i0`, `i1`, `i2` or `i3` for (b1,b0) =
    /// (0,0), (0,1), (1,0), (1,1). `b0` is the low bit.
    fn lookup2(
        &mut self,
        b0: Variable,
        b1: Variable,
        i0: Variable,
        i1: Variable,
        i2: Variable,
        i3: Variable,
    ) -> Variable;
    fn is_zero(&mut self, a: Variable) -> Variable;
    fn and(&mut self, a: Variable, b: Variable) -> Variable;
    fn or(&mut self, a: Variable, b: Variable) -> Variable;
    fn xor(&mut self, a: Variable, b: Variable) -> Variable;

    /// Little-endian bit decomposition on `n` bits. Range-checks: the
    /// circuit is unsatisfiable when `a >= 2^n`.
    fn to_binary(&mut self, a: Variable, n: usize) -> Vec<Variable>;
    /// Recomposes little-endian bits into a variable.
    fn from_binary(&mut self, bits: &[Variable]) -> Variable;

    fn assert_is_equal(&mut self, a: Variable, b: Variable);
    fn assert_is_different(&mut self, a: Variable, b: Variable);
    /// Constrains `a` to 0 or 1.
    fn assert_is_boolean(&mut self, a: Variable);

    /// Runs the registered hint `name` on the values of `inputs`, allocating
    /// `n_outputs` unconstrained variables for its outputs.
    fn new_hint(
        &mut self,
        name: &'static str,
        n_outputs: usize,
        inputs: &[Variable],
    ) -> Result<Vec<Variable>, CircuitError>;

    /// Modulus of the native field the circuit is defined over.
    fn native_modulus(&self) -> &BigUint;

    /// Compile-time constant value of a variable, when known. The witness
    /// engine knows every value but only reports ones created through
    /// [`Api::constant`], mirroring what a compiling builder can see.
    fn constant_value(&self, a: Variable) -> Option<BigUint>;

    fn zero(&mut self) -> Variable {
        self.constant_i64(0)
    }
    fn one(&mut self) -> Variable {
        self.constant_i64(1)
    }
}

/// Runs a hint, converting a hint failure into an unsatisfiable circuit
/// instead of bubbling an error through every gadget. A division by zero
/// inside a hint surfaces as an unsatisfied constraint this way.
pub fn run_hint<A: Api + ?Sized>(
    api: &mut A,
    name: &'static str,
    n_outputs: usize,
    inputs: &[Variable],
) -> Vec<Variable> {
    match api.new_hint(name, n_outputs, inputs) {
        Ok(outs) => outs,
        Err(_) => {
            let zero = api.zero();
            let one = api.one();
            api.assert_is_equal(zero, one);
            vec![zero; n_outputs]
        }
    }
}
