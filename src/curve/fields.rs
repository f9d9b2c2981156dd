//! The BLS24-315 prime fields.
//!
//! Fq is the 315-bit base field (5 x 64-bit limbs), Fr the 253-bit scalar
//! field (4 x 64-bit limbs). The generator attribute only feeds FFT
//! constants which this crate never uses; square roots go through the
//! generic Tonelli-Shanks in [`super::tower`].

use ark_ff::fields::{Fp256, Fp320, MontBackend, MontConfig};
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

#[derive(MontConfig)]
#[modulus = "39705142709513438335025689890408969744933502416914749335064285505637884093126342347073617133569"]
#[generator = "7"]
pub struct FqConfig;
pub type Fq = Fp320<MontBackend<FqConfig, 5>>;

#[derive(MontConfig)]
#[modulus = "11502027791375260645628074404575422495959608200132055716665986169834464870401"]
#[generator = "7"]
pub struct FrConfig;
pub type Fr = Fp256<MontBackend<FrConfig, 4>>;

pub fn fq_modulus() -> BigUint {
    BigUint::from_bytes_le(&Fq::MODULUS.to_bytes_le())
}

pub fn fr_modulus() -> BigUint {
    BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moduli_have_expected_shape() {
        assert_eq!(fq_modulus().bits(), 315);
        assert_eq!(fr_modulus().bits(), 253);
        // both moduli end in ...00001 in hex, a BLS24 family trait
        assert_eq!(fq_modulus() % 0x100000u32, BigUint::from(1u32));
        assert_eq!(fr_modulus() % 0x100000u32, BigUint::from(1u32));
    }
}
