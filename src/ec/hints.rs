//! Out-of-circuit GLV scalar decomposition.
//!
//! The gadget checks `s1 + lambda*s2 == s + m*r` with `m` boolean and both
//! sub-scalars 127 bits, so the hint must produce a non-negative split. The
//! Babai rounding in [`split_scalar`] gives signed sub-scalars around
//! sqrt(r); adding the lattice vectors (lambda, -1) and (1, lambda+1) lifts
//! them into [0, lambda+2] without leaving the residue class of s mod r.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::curve::glv::split_scalar;
use crate::curve::params::curve_params;
use crate::frontend::{HintError, HintRegistry};

/// Input: the scalar. Outputs: s1, s2 and the carry multiple m.
pub const DECOMPOSE_SCALAR: &str = "ec/decompose_scalar";

pub fn register(registry: &mut HintRegistry) {
    registry.register(DECOMPOSE_SCALAR, decompose_scalar);
}

fn decompose_scalar(
    modulus: &BigUint,
    inputs: &[BigUint],
    outputs: &mut [BigUint],
) -> Result<(), HintError> {
    if inputs.len() != 1 {
        return Err(HintError::InputLength {
            expected: 1,
            got: inputs.len(),
        });
    }
    if outputs.len() != 3 {
        return Err(HintError::OutputLength {
            expected: 3,
            got: outputs.len(),
        });
    }
    let cp = curve_params();
    let r = BigInt::from(cp.fr.clone());
    let lambda = BigInt::from(cp.lambda.clone());
    let s = BigInt::from(inputs[0].clone());

    let [mut k1, mut k2] = split_scalar(&s, &cp.lattice);
    while k1.is_negative() {
        k1 += &lambda;
        k2 -= BigInt::one();
    }
    while k2.is_negative() {
        k1 += BigInt::one();
        k2 += &lambda + BigInt::one();
    }
    if k1.bits() > 127 || k2.bits() > 127 {
        return Err(HintError::Malformed("sub-scalar exceeds 127 bits".into()));
    }

    let (m, rem) = (&k1 + &lambda * &k2 - &s).div_rem(&r);
    if !rem.is_zero() {
        return Err(HintError::Malformed(
            "decomposition leaves the residue class".into(),
        ));
    }

    // k1, k2 are non-negative by construction; m is reduced into the native
    // field so the gadget can treat it as a circuit value.
    outputs[0] = k1.to_biguint().unwrap_or_default();
    outputs[1] = k2.to_biguint().unwrap_or_default();
    outputs[2] = m
        .mod_floor(&BigInt::from(modulus.clone()))
        .to_biguint()
        .unwrap_or_default();
    Ok(())
}
