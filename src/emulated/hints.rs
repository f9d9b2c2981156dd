//! Out-of-circuit helpers for the emulated field.
//!
//! All hints share one input convention: `[bits_per_limb, meta..., p limbs,
//! operand limbs...]` where `p` is the emulated modulus. Limb values may
//! carry overflow; recomposition always reconstructs the true integer.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::frontend::{HintError, HintRegistry};

pub const MUL: &str = "emulated/mul";
pub const REM: &str = "emulated/rem";
pub const QUO: &str = "emulated/quo";
pub const INVERSE: &str = "emulated/inverse";
pub const DIV: &str = "emulated/div";
pub const SQRT: &str = "emulated/sqrt";

pub fn register(registry: &mut HintRegistry) {
    registry.register(MUL, mul_hint);
    registry.register(REM, rem_hint);
    registry.register(QUO, quo_hint);
    registry.register(INVERSE, inverse_hint);
    registry.register(DIV, div_hint);
    registry.register(SQRT, sqrt_hint);
}

/// Reconstructs the integer from base-2^nb_bits limbs, little-endian.
pub(super) fn recompose(limbs: &[BigUint], nb_bits: usize) -> BigUint {
    let mut acc = BigUint::zero();
    for l in limbs.iter().rev() {
        acc <<= nb_bits;
        acc += l;
    }
    acc
}

/// Splits `v` into `out.len()` limbs of `nb_bits` bits each.
pub(super) fn decompose(
    v: &BigUint,
    nb_bits: usize,
    out: &mut [BigUint],
) -> Result<(), HintError> {
    if v.bits() as usize > nb_bits * out.len() {
        return Err(HintError::Malformed(format!(
            "value of {} bits does not decompose into {} limbs of {} bits",
            v.bits(),
            out.len(),
            nb_bits
        )));
    }
    let mask = (BigUint::one() << nb_bits) - BigUint::one();
    let mut rest = v.clone();
    for limb in out.iter_mut() {
        *limb = &rest & &mask;
        rest >>= nb_bits;
    }
    Ok(())
}

pub(super) fn mod_inverse(x: &BigUint, p: &BigUint) -> Option<BigUint> {
    let (mut r0, mut r1) = (BigInt::from(p.clone()), BigInt::from(x % p));
    let (mut s0, mut s1) = (BigInt::zero(), BigInt::one());
    while !r1.is_zero() {
        let q = &r0 / &r1;
        let r2 = &r0 - &q * &r1;
        let s2 = &s0 - &q * &s1;
        r0 = std::mem::replace(&mut r1, r2);
        s0 = std::mem::replace(&mut s1, s2);
    }
    if !r0.is_one() {
        return None;
    }
    let p = BigInt::from(p.clone());
    let inv = s0.mod_floor(&p);
    Some(inv.to_biguint().unwrap_or_default())
}

/// Tonelli-Shanks for an odd prime modulus. Returns one of the two roots.
pub(super) fn mod_sqrt(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let one = BigUint::one();
    let a = a % p;
    if a.is_zero() {
        return Some(BigUint::zero());
    }
    let pm1 = p - &one;
    let legendre_exp = &pm1 >> 1;
    if a.modpow(&legendre_exp, p) != one {
        return None;
    }
    // p - 1 = q * 2^s with q odd
    let s = pm1.trailing_zeros().unwrap_or(0);
    let q = &pm1 >> s;
    if s == 1 {
        // p = 3 mod 4
        let e = (p + &one) >> 2;
        return Some(a.modpow(&e, p));
    }
    // find a quadratic non-residue
    let mut z = BigUint::from(2u8);
    while z.modpow(&legendre_exp, p) == one {
        z += &one;
    }
    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = a.modpow(&q, p);
    let mut r = a.modpow(&((&q + &one) >> 1), p);
    while !t.is_one() {
        let mut i = 0u64;
        let mut t2i = t.clone();
        while !t2i.is_one() {
            t2i = (&t2i * &t2i) % p;
            i += 1;
            if i == m {
                return None;
            }
        }
        let mut b = c.clone();
        for _ in 0..(m - i - 1) {
            b = (&b * &b) % p;
        }
        m = i;
        c = (&b * &b) % p;
        t = (&t * &c) % p;
        r = (&r * &b) % p;
    }
    Some(r)
}

fn meta(inputs: &[BigUint], n: usize) -> Result<Vec<usize>, HintError> {
    if inputs.len() < n {
        return Err(HintError::InputLength {
            expected: n,
            got: inputs.len(),
        });
    }
    inputs[..n]
        .iter()
        .map(|v| {
            u64::try_from(v)
                .map(|v| v as usize)
                .map_err(|_| HintError::Malformed("meta input overflows u64".into()))
        })
        .collect()
}

/// Limb convolution of the two operands: `out[k] = sum a[i]*b[k-i]`.
/// Inputs: `[bits, nb_a, a..., b...]`; outputs `nb_a + nb_b - 1` limbs.
fn mul_hint(_m: &BigUint, inputs: &[BigUint], outputs: &mut [BigUint]) -> Result<(), HintError> {
    let m = meta(inputs, 2)?;
    let nb_a = m[1];
    let rest = &inputs[2..];
    if rest.len() <= nb_a {
        return Err(HintError::InputLength {
            expected: nb_a + 1,
            got: rest.len(),
        });
    }
    let (a, b) = rest.split_at(nb_a);
    if outputs.len() != a.len() + b.len() - 1 {
        return Err(HintError::OutputLength {
            expected: a.len() + b.len() - 1,
            got: outputs.len(),
        });
    }
    for o in outputs.iter_mut() {
        *o = BigUint::zero();
    }
    for (i, ai) in a.iter().enumerate() {
        for (j, bj) in b.iter().enumerate() {
            outputs[i + j] += ai * bj;
        }
    }
    Ok(())
}

fn split_mod_value(inputs: &[BigUint]) -> Result<(usize, BigUint, &[BigUint]), HintError> {
    let m = meta(inputs, 2)?;
    let (bits, nb_p) = (m[0], m[1]);
    let rest = &inputs[2..];
    if rest.len() < nb_p {
        return Err(HintError::InputLength {
            expected: 2 + nb_p,
            got: inputs.len(),
        });
    }
    let p = recompose(&rest[..nb_p], bits);
    if p.is_zero() {
        return Err(HintError::Malformed("zero modulus".into()));
    }
    Ok((bits, p, &rest[nb_p..]))
}

/// Remainder of the (possibly overflowing) value modulo the emulated
/// modulus. Inputs: `[bits, nb_p, p..., v...]`.
fn rem_hint(_m: &BigUint, inputs: &[BigUint], outputs: &mut [BigUint]) -> Result<(), HintError> {
    let (bits, p, v) = split_mod_value(inputs)?;
    let r = recompose(v, bits) % &p;
    decompose(&r, bits, outputs)
}

/// Integer quotient of the value by the emulated modulus.
fn quo_hint(_m: &BigUint, inputs: &[BigUint], outputs: &mut [BigUint]) -> Result<(), HintError> {
    let (bits, p, v) = split_mod_value(inputs)?;
    let q = recompose(v, bits) / &p;
    decompose(&q, bits, outputs)
}

fn inverse_hint(_m: &BigUint, inputs: &[BigUint], outputs: &mut [BigUint]) -> Result<(), HintError> {
    let (bits, p, x) = split_mod_value(inputs)?;
    let x = recompose(x, bits) % &p;
    let inv = mod_inverse(&x, &p).ok_or(HintError::NotInvertible)?;
    decompose(&inv, bits, outputs)
}

/// Modular division. Inputs: `[bits, nb_p, p..., a(nb_p)..., b(nb_p)...]`.
fn div_hint(_m: &BigUint, inputs: &[BigUint], outputs: &mut [BigUint]) -> Result<(), HintError> {
    let (bits, p, rest) = split_mod_value(inputs)?;
    if rest.len() != 2 * outputs.len() {
        return Err(HintError::InputLength {
            expected: 2 * outputs.len(),
            got: rest.len(),
        });
    }
    let (a, b) = rest.split_at(outputs.len());
    let a = recompose(a, bits) % &p;
    let b = recompose(b, bits) % &p;
    let inv = mod_inverse(&b, &p).ok_or(HintError::NotInvertible)?;
    decompose(&((a * inv) % &p), bits, outputs)
}

fn sqrt_hint(_m: &BigUint, inputs: &[BigUint], outputs: &mut [BigUint]) -> Result<(), HintError> {
    let (bits, p, a) = split_mod_value(inputs)?;
    let a = recompose(a, bits) % &p;
    let root = mod_sqrt(&a, &p).ok_or(HintError::NoSquareRoot)?;
    decompose(&root, bits, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recompose_decompose_roundtrip() {
        let v = BigUint::parse_bytes(b"123456789abcdef0112233445566778899", 16).unwrap();
        let mut limbs = vec![BigUint::zero(); 3];
        decompose(&v, 64, &mut limbs).unwrap();
        assert_eq!(recompose(&limbs, 64), v);
        let mut short = vec![BigUint::zero(); 2];
        assert!(decompose(&v, 64, &mut short).is_err());
    }

    #[test]
    fn inverse_and_sqrt_mod_small_prime() {
        let p = BigUint::from(10007u32);
        for x in [1u32, 2, 5000, 10006] {
            let x = BigUint::from(x);
            let inv = mod_inverse(&x, &p).unwrap();
            assert_eq!((&x * &inv) % &p, BigUint::one());
        }
        assert!(mod_inverse(&BigUint::zero(), &p).is_none());
        let a = BigUint::from(1234u32);
        let sq = (&a * &a) % &p;
        let r = mod_sqrt(&sq, &p).unwrap();
        assert_eq!((&r * &r) % &p, sq);
    }

    #[test]
    fn sqrt_mod_base_field() {
        let p = crate::curve::fields::fq_modulus();
        let a = BigUint::from(7u8);
        let sq = (&a * &a) % &p;
        let r = mod_sqrt(&sq, &p).unwrap();
        assert_eq!((&r * &r) % &p, sq);
    }
}
