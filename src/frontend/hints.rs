//! Hint registry.
//!
//! Hints are out-of-circuit computations keyed by a stable string id. A
//! solver runs them on concrete values and feeds the results back in as
//! unconstrained witnesses; soundness always comes from the in-circuit
//! checks the calling gadget adds on top.

use std::collections::HashMap;

use num_bigint::BigUint;
use thiserror::Error;

use super::CircuitError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HintError {
    #[error("expected {expected} inputs, got {got}")]
    InputLength { expected: usize, got: usize },
    #[error("expected {expected} outputs, got {got}")]
    OutputLength { expected: usize, got: usize },
    #[error("input is not invertible")]
    NotInvertible,
    #[error("input has no square root")]
    NoSquareRoot,
    #[error("{0}")]
    Malformed(String),
}

/// A hint maps input values to output values. The first argument is the
/// native field modulus of the circuit being solved.
pub type HintFn = fn(&BigUint, &[BigUint], &mut [BigUint]) -> Result<(), HintError>;

#[derive(Default)]
pub struct HintRegistry {
    map: HashMap<&'static str, HintFn>,
}

impl HintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` under `name`. Re-registering the same id is fine as
    /// long as callers keep ids unique per function; last one wins.
    pub fn register(&mut self, name: &'static str, f: HintFn) {
        self.map.insert(name, f);
    }

    pub fn run(
        &self,
        name: &str,
        native_modulus: &BigUint,
        inputs: &[BigUint],
        outputs: &mut [BigUint],
    ) -> Result<(), CircuitError> {
        let f = self
            .map
            .get(name)
            .ok_or_else(|| CircuitError::UnknownHint(name.to_string()))?;
        f(native_modulus, inputs, outputs).map_err(|source| CircuitError::HintFailure {
            name: name.to_string(),
            source,
        })
    }
}

/// Registry with every hint of this crate installed.
pub fn default_registry() -> HintRegistry {
    let mut r = HintRegistry::new();
    crate::emulated::hints::register(&mut r);
    crate::tower::hints::register(&mut r);
    crate::ec::hints::register(&mut r);
    r
}
