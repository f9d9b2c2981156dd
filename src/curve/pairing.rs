//! Native reference pairing.
//!
//! Walks the same NAF schedule as the in-circuit Miller loop so the line
//! tables it produces can be consumed as constants by the fixed-argument
//! circuit, and exponentiates by the full 3*(p^24-1)/r for the final
//! exponentiation. The circuit's optimized exponentiation chain is tested
//! against this.

use num_bigint::BigUint;
use num_traits::One;

use super::fields::Fq;
use super::params::curve_params;
use super::tower::{E24n, E4n, TowerField};
use super::{G1Native, G2Native};

#[derive(Clone, Copy, Debug)]
pub struct LineNative {
    pub r0: E4n,
    pub r1: E4n,
}

/// Tangent line at p; returns (2p, line).
fn double_step(p: (E4n, E4n)) -> Option<((E4n, E4n), LineNative)> {
    let three = Fq::from(3u64);
    let two = Fq::from(2u64);
    let l = p
        .0
        .square()
        .mul_by_fp(&three)
        .mul(&p.1.mul_by_fp(&two).inverse()?);
    let xr = l.square().sub(&p.0).sub(&p.0);
    let yr = p.0.sub(&xr).mul(&l).sub(&p.1);
    let line = LineNative {
        r0: TowerField::neg(&l),
        r1: l.mul(&p.0).sub(&p.1),
    };
    Some(((xr, yr), line))
}

/// Chord through p1 and p2; returns (p1+p2, line).
fn add_step(p1: (E4n, E4n), p2: (E4n, E4n)) -> Option<((E4n, E4n), LineNative)> {
    let l = p2.1.sub(&p1.1).mul(&p2.0.sub(&p1.0).inverse()?);
    let xr = l.square().sub(&p1.0).sub(&p2.0);
    let yr = p1.0.sub(&xr).mul(&l).sub(&p1.1);
    let line = LineNative {
        r0: TowerField::neg(&l),
        r1: l.mul(&p1.0).sub(&p1.1),
    };
    Some(((xr, yr), line))
}

/// Double-and-add with shared denominator; returns (2*p1+p2, line1, line2).
fn double_and_add_step(
    p1: (E4n, E4n),
    p2: (E4n, E4n),
) -> Option<((E4n, E4n), LineNative, LineNative)> {
    let l1 = p1.1.sub(&p2.1).mul(&p1.0.sub(&p2.0).inverse()?);
    let x3 = l1.square().sub(&p1.0).sub(&p2.0);
    let line1 = LineNative {
        r0: TowerField::neg(&l1),
        r1: l1.mul(&p1.0).sub(&p1.1),
    };
    let l2 = TowerField::neg(&p1.1.double().mul(&x3.sub(&p1.0).inverse()?).add(&l1));
    let x4 = l2.square().sub(&p1.0).sub(&x3);
    let y4 = p1.0.sub(&x4).mul(&l2).sub(&p1.1);
    let line2 = LineNative {
        r0: TowerField::neg(&l2),
        r1: l2.mul(&p1.0).sub(&p1.1),
    };
    Some(((x4, y4), line1, line2))
}

/// Lines of the last iteration; the resulting point is never needed.
fn lines_compute(p1: (E4n, E4n), p2: (E4n, E4n)) -> Option<(LineNative, LineNative)> {
    let l1 = p1.1.sub(&p2.1).mul(&p1.0.sub(&p2.0).inverse()?);
    let x3 = l1.square().sub(&p1.0).sub(&p2.0);
    let line1 = LineNative {
        r0: TowerField::neg(&l1),
        r1: l1.mul(&p1.0).sub(&p1.1),
    };
    let l2 = TowerField::neg(&p1.1.double().mul(&x3.sub(&p1.0).inverse()?).add(&l1));
    let line2 = LineNative {
        r0: TowerField::neg(&l2),
        r1: l2.mul(&p1.0).sub(&p1.1),
    };
    Some((line1, line2))
}

/// Per-iteration line blocks of f_{x0,Q}, in the order the Miller loop
/// consumes them. The accumulator is squared before every block except the
/// first. Returns None when Q is at infinity or a degenerate denominator
/// appears, which cannot happen for subgroup points.
pub fn precompute_lines(q: &G2Native) -> Option<Vec<Vec<LineNative>>> {
    if q.is_zero() {
        return None;
    }
    let naf = &curve_params().naf;
    let qq = (q.x, q.y);
    let qneg = (q.x, TowerField::neg(&q.y));
    let mut blocks = Vec::with_capacity(32);

    // top of the loop: a single tangent
    let (mut acc, l) = double_step(qq)?;
    blocks.push(vec![l]);

    // second-highest digit is -1 but acc = 2Q, so the double-and-add
    // degenerates into an add through Q plus a chord towards -Q
    let l2 = {
        let l1 = acc.1.sub(&qneg.1).mul(&acc.0.sub(&qneg.0).inverse()?);
        LineNative {
            r0: TowerField::neg(&l1),
            r1: l1.mul(&acc.0).sub(&acc.1),
        }
    };
    let (next, l1) = add_step(acc, qq)?;
    acc = next;
    blocks.push(vec![l1, l2]);

    for i in (1..=29).rev() {
        match naf[i] {
            0 => {
                let (next, l) = double_step(acc)?;
                acc = next;
                blocks.push(vec![l]);
            }
            1 => {
                let (next, l1, l2) = double_and_add_step(acc, qq)?;
                acc = next;
                blocks.push(vec![l1, l2]);
            }
            _ => {
                let (next, l1, l2) = double_and_add_step(acc, qneg)?;
                acc = next;
                blocks.push(vec![l1, l2]);
            }
        }
    }

    // last digit is -1; only the lines are needed
    let (l1, l2) = lines_compute(acc, qneg)?;
    blocks.push(vec![l1, l2]);

    Some(blocks)
}

/// Evaluates a line at P and folds it into f.
fn fold_line(f: &E24n, l: &LineNative, x_over_y: &Fq, y_inv: &Fq) -> E24n {
    f.mul_by_034(&l.r0.mul_by_fp(x_over_y), &l.r1.mul_by_fp(y_inv))
}

/// f_{x0,Q}(P), conjugated to absorb the negative seed.
pub fn miller_loop(p: &G1Native, q: &G2Native) -> Option<E24n> {
    if p.is_zero() || q.is_zero() {
        return None;
    }
    let blocks = precompute_lines(q)?;
    let y_inv = TowerField::inverse(&p.y)?;
    let x_over_y = <Fq as TowerField>::mul(&p.x, &y_inv);

    let mut f = E24n::one();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            f = f.square();
        }
        for l in block {
            f = fold_line(&f, l, &x_over_y, &y_inv);
        }
    }
    Some(f.conjugate())
}

/// Full-exponent final exponentiation: f^(3*(p^24-1)/r).
pub fn final_exponentiation(f: &E24n) -> E24n {
    let cp = curve_params();
    let exp = (cp.fp.pow(24) - BigUint::one()) / &cp.fr * 3u8;
    f.pow(&exp)
}

/// Reduced ate pairing, native.
pub fn pair(p: &G1Native, q: &G2Native) -> Option<E24n> {
    Some(final_exponentiation(&miller_loop(p, q)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn pairing_is_bilinear() {
        let cp = curve_params();
        let a = BigUint::from(22u64);
        let b = BigUint::from(65u64);
        let pa = cp.g1.mul_biguint(&a);
        let qb = cp.g2.mul_biguint(&b);
        let lhs = pair(&pa, &cp.g2).unwrap();
        let rhs = pair(&cp.g1, &cp.g2).unwrap().pow(&a);
        assert_eq!(lhs, rhs);
        let lhs2 = pair(&cp.g1, &qb).unwrap();
        let rhs2 = pair(&cp.g1, &cp.g2).unwrap().pow(&b);
        assert_eq!(lhs2, rhs2);
    }

    #[test]
    fn pairing_is_non_degenerate() {
        let cp = curve_params();
        let e = pair(&cp.g1, &cp.g2).unwrap();
        assert_ne!(e, E24n::one());
        // e has order r
        assert_eq!(e.pow(&cp.fr), E24n::one());
    }

    #[test]
    fn opposite_points_cancel() {
        let cp = curve_params();
        let e1 = pair(&cp.g1, &cp.g2).unwrap();
        let e2 = pair(&cp.g1.neg(), &cp.g2).unwrap();
        assert_eq!(e1.mul(&e2), E24n::one());
    }
}
