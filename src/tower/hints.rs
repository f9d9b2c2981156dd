//! Out-of-circuit inverses and quotients for the tower gadgets.
//!
//! Inputs and outputs are raw Fp coefficients in tower order (E2 pairs
//! nested little-endian, exactly the order `vars()` emits). Division hints
//! take the numerator coefficients followed by the denominator's.

use num_bigint::BigUint;

use crate::curve::fields::Fq;
use crate::curve::tower::{E12n, E24n, E2n, E4n, TowerField};
use crate::frontend::{HintError, HintRegistry};

pub const INVERSE_E2: &str = "tower/inverse_e2";
pub const DIV_E2: &str = "tower/div_e2";
pub const INVERSE_E4: &str = "tower/inverse_e4";
pub const DIV_E4: &str = "tower/div_e4";
pub const INVERSE_E12: &str = "tower/inverse_e12";
pub const DIV_E12: &str = "tower/div_e12";
pub const INVERSE_E24: &str = "tower/inverse_e24";
pub const DIV_E24: &str = "tower/div_e24";

pub fn register(registry: &mut HintRegistry) {
    registry.register(INVERSE_E2, inverse_e2);
    registry.register(DIV_E2, div_e2);
    registry.register(INVERSE_E4, inverse_e4);
    registry.register(DIV_E4, div_e4);
    registry.register(INVERSE_E12, inverse_e12);
    registry.register(DIV_E12, div_e12);
    registry.register(INVERSE_E24, inverse_e24);
    registry.register(DIV_E24, div_e24);
}

fn coeffs(values: &[BigUint]) -> Vec<Fq> {
    values.iter().map(|v| Fq::from(v.clone())).collect()
}

fn write(outputs: &mut [BigUint], coeffs: &[Fq]) {
    for (o, c) in outputs.iter_mut().zip(coeffs) {
        *o = (*c).into();
    }
}

fn check_len(got: usize, expected: usize) -> Result<(), HintError> {
    if got != expected {
        return Err(HintError::InputLength { expected, got });
    }
    Ok(())
}

macro_rules! tower_hints {
    ($inv:ident, $div:ident, $ty:ty, $n:expr) => {
        fn $inv(
            _m: &BigUint,
            inputs: &[BigUint],
            outputs: &mut [BigUint],
        ) -> Result<(), HintError> {
            check_len(inputs.len(), $n)?;
            check_len(outputs.len(), $n)?;
            let a = <$ty>::from_coeffs(&coeffs(inputs));
            let inv = a.inverse().ok_or(HintError::NotInvertible)?;
            write(outputs, &inv.coeffs());
            Ok(())
        }

        fn $div(
            _m: &BigUint,
            inputs: &[BigUint],
            outputs: &mut [BigUint],
        ) -> Result<(), HintError> {
            check_len(inputs.len(), 2 * $n)?;
            check_len(outputs.len(), $n)?;
            let c = coeffs(inputs);
            let a = <$ty>::from_coeffs(&c[..$n]);
            let b = <$ty>::from_coeffs(&c[$n..]);
            // 0/0 is 0; the caller's product check rejects x/0 for x != 0.
            let res = match b.inverse() {
                Some(inv) => a.mul(&inv),
                None => TowerField::zero(),
            };
            write(outputs, &res.coeffs());
            Ok(())
        }
    };
}

tower_hints!(inverse_e2, div_e2, E2n, 2);
tower_hints!(inverse_e4, div_e4, E4n, 4);
tower_hints!(inverse_e12, div_e12, E12n, 12);
tower_hints!(inverse_e24, div_e24, E24n, 24);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::fields::fq_modulus;
    use crate::tower::test_utils::rand_e4n;
    use ark_std::test_rng;
    use num_traits::Zero;

    #[test]
    fn e4_inverse_hint_round_trips() {
        let mut rng = test_rng();
        let a = rand_e4n(&mut rng);
        let ins: Vec<BigUint> = a.coeffs().iter().map(|c| (*c).into()).collect();
        let mut outs = vec![BigUint::zero(); 4];
        inverse_e4(&fq_modulus(), &ins, &mut outs).unwrap();
        let inv = E4n::from_coeffs(&coeffs(&outs));
        assert_eq!(a.mul(&inv), TowerField::one());
    }

    #[test]
    fn zero_is_rejected() {
        let ins = vec![BigUint::zero(); 4];
        let mut outs = vec![BigUint::zero(); 4];
        assert_eq!(
            inverse_e4(&fq_modulus(), &ins, &mut outs),
            Err(HintError::NotInvertible)
        );
    }

    #[test]
    fn division_by_zero_yields_zero_coefficients() {
        let mut rng = test_rng();
        let a = rand_e4n(&mut rng);
        let mut ins: Vec<BigUint> = a.coeffs().iter().map(|c| (*c).into()).collect();
        ins.extend(vec![BigUint::zero(); 4]);
        let mut outs = vec![BigUint::from(7u8); 4];
        div_e4(&fq_modulus(), &ins, &mut outs).unwrap();
        assert!(outs.iter().all(|o| o.is_zero()));
    }
}
