//! Non-native field arithmetic over limbs.
//!
//! An emulated element is a vector of native variables, each holding one
//! base-2^64 limb of the value. Operations are lazy: additions and
//! multiplications accumulate overflow in the limbs and nothing is reduced
//! until the overflow would no longer fit the native field. Expensive
//! results (products, quotients, inverses) are computed out-of-circuit by
//! hints and verified in-circuit, so the constraint cost is that of the
//! check, not the computation.

pub mod element;
pub mod field;
pub mod hints;

use num_bigint::BigUint;
use once_cell::sync::Lazy;

pub use element::Element;
pub use field::Field;

/// Parameters of an emulated field: limb shape and modulus.
pub trait FieldParams: Clone + Copy + std::fmt::Debug + Default + 'static {
    const NB_LIMBS: usize;
    const BITS_PER_LIMB: usize;
    fn modulus() -> &'static BigUint;
}

static FP_MODULUS: Lazy<BigUint> = Lazy::new(crate::curve::fields::fq_modulus);
static FR_MODULUS: Lazy<BigUint> = Lazy::new(crate::curve::fields::fr_modulus);

/// The 315-bit base field, five 64-bit limbs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bls24315Fp;

impl FieldParams for Bls24315Fp {
    const NB_LIMBS: usize = 5;
    const BITS_PER_LIMB: usize = 64;
    fn modulus() -> &'static BigUint {
        &FP_MODULUS
    }
}

/// The 253-bit scalar field, four 64-bit limbs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bls24315Fr;

impl FieldParams for Bls24315Fr {
    const NB_LIMBS: usize = 4;
    const BITS_PER_LIMB: usize = 64;
    fn modulus() -> &'static BigUint {
        &FR_MODULUS
    }
}
