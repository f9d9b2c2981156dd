//! Derived BLS24-315 parameter table.
//!
//! Only the curve identity is taken on trust: the two moduli, the seed
//! magnitude, the tower structure and the Frobenius coefficients. Everything
//! else (curve coefficients, generators, cofactors, GLV constants, the NAF
//! schedule of the ate loop) is derived here and cross-validated; a failed
//! check panics at first use, which indicates corrupted constants rather
//! than a runtime condition.

use num_bigint::{BigInt, BigUint};
use num_integer::{Integer, Roots};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

use super::fields::{fq_modulus, fr_modulus, Fq};
use super::glv::{precompute_lattice, Lattice};
use super::point::AffinePoint;
use super::tower::{sqrt, E2n, E4n, TowerField};
use super::{G1Native, G2Native};

/// Magnitude of the curve seed; also the ate loop counter.
pub const ATE_LOOP: u64 = 3218079743;

const FROB_COEFFS: [&str; 13] = [
    "14265754707630841383590096931465005402246260064523506653409458152869013672931584279153351926943",
    "17432737665785421589107433512831558061649422754130449334965277047994983947893909429238815314776",
    "39705142672498995661671850106945620852186608752525090699191017895721506694646055668218723303426",
    "39705142672498995661671850106945620852186608752525090699191017895721506694646055668218723303427",
    "36538159751358858129508353309042417085530339727307806653508466610511913818164017196988153745736",
    "37719635718874797449167165011304104204868932892052995456614707782168504515295626008356825673023",
    "33342866563749162527758572927163102293238492708847648721152723115703639794013692274261201232097",
    "13266452002786802757645810648664867986567631927642464177452792960815113608167203350720036682455",
    "29019463919452620058839222695754364428302059305947724697987901631588253225470374568267230540725",
    "27033956928813979172980697816649498888237489781085970819538323908118873647639658229550439080179",
    "20076414560962359770112762278498234306670860781205184543699930154888526185846488923541164549642",
    "37014442673353839783463348892746893664389658635873267609916377398480286678854893830142",
    "37014442673353839783463348892746893664389658635873267609916377398480286678854893830143",
];

pub struct CurveParams {
    pub fp: BigUint,
    pub fr: BigUint,
    /// Signed seed x0; the loop counter is its magnitude.
    pub seed: BigInt,
    /// 2-NAF digits of the loop counter, little-endian.
    pub naf: Vec<i8>,
    /// G1 coefficient: y^2 = x^3 + b.
    pub b: Fq,
    /// Twist coefficient: y^2 = x^3 + b_twist over Fp4.
    pub b_twist: E4n,
    /// y-coordinate of the order-3 twist point with x = 0; conditions the
    /// G2 double-and-add ladder the way (0, 1) does on G1.
    pub sqrt_b_twist: E4n,
    /// Cube root of unity acting on G1 x-coordinates with eigenvalue lambda.
    pub omega: Fq,
    /// Cube root of unity acting on G2 x-coordinates with eigenvalue lambda.
    pub omega2: Fq,
    pub lambda: BigUint,
    pub lattice: Lattice,
    pub cofactor_g1: BigUint,
    pub cofactor_g2: BigUint,
    /// Derived subgroup generators (canonical for this crate, not for any
    /// external serialization format).
    pub g1: G1Native,
    pub g2: G2Native,
    /// Frobenius coefficients of the Fp24 tower, in the order the
    /// conjugation maps consume them.
    pub frob: [Fq; 13],
}

static PARAMS: Lazy<CurveParams> = Lazy::new(derive);

pub fn curve_params() -> &'static CurveParams {
    &PARAMS
}

fn parse(s: &str) -> BigUint {
    match BigUint::parse_bytes(s.as_bytes(), 10) {
        Some(v) => v,
        None => panic!("invalid decimal constant"),
    }
}

fn naf_digits(k: u64) -> Vec<i8> {
    let mut out = Vec::new();
    let mut kk = k as i128;
    while kk > 0 {
        let d: i8 = if kk & 1 == 1 {
            let d = (2 - (kk % 4)) as i8;
            kk -= d as i128;
            d
        } else {
            0
        };
        out.push(d);
        kk >>= 1;
    }
    out
}

/// First curve point with x-coordinate in the deterministic sample stream.
fn find_point<F: TowerField>(b: &F, field_order: &BigUint, start: u64) -> (AffinePoint<F>, u64) {
    for ctr in start..start + 10_000 {
        let x = F::sample(ctr);
        let rhs = x.square().mul(&x).add(b);
        if let Some(y) = sqrt(&rhs, field_order) {
            return (AffinePoint::new(x, y), ctr);
        }
    }
    panic!("no curve point found")
}

#[tracing::instrument(name = "derive_curve_params")]
fn derive() -> CurveParams {
    let fp = fq_modulus();
    let fr = fr_modulus();
    let p_int = BigInt::from(fp.clone());
    let r_int = BigInt::from(fr.clone());
    let one = BigInt::one();
    let two = BigInt::from(2u8);
    let three = BigInt::from(3u8);
    let x_abs = BigInt::from(ATE_LOOP);

    // Seed sign: r(x) is even in x, p(x) is not.
    let seed = [x_abs.clone(), -x_abs]
        .into_iter()
        .find(|x| {
            let x4 = x.pow(4);
            let x8 = &x4 * &x4;
            let r = &x8 - &x4 + &one;
            if r != r_int {
                return false;
            }
            let xm1 = x - &one;
            let num = &xm1 * &xm1 * &r;
            num.mod_floor(&three).is_zero() && (&num / &three + x) == p_int
        })
        .unwrap_or_else(|| panic!("seed does not produce the trusted moduli"));
    tracing::debug!(%seed, "seed sign resolved");

    let naf = naf_digits(ATE_LOOP);
    assert_eq!(naf.len(), 33);
    assert_eq!(naf[32], 1);
    assert_eq!(naf[31], 0);
    assert_eq!(naf[0], -1);

    // Trace of Frobenius and G1 order.
    let t = &seed + &one;
    let n1_int = &p_int + &one - &t;
    let n1 = match n1_int.to_biguint() {
        Some(v) => v,
        None => panic!("negative G1 order"),
    };
    assert!((&n1 % &fr).is_zero(), "r does not divide the G1 order");
    let cofactor_g1 = &n1 / &fr;
    // consistency: the BLS24 G1 cofactor is (x-1)^2/3
    let sm1 = &seed - &one;
    assert_eq!(BigInt::from(cofactor_g1.clone()), &sm1 * &sm1 / &three);

    // G1 coefficient: smallest b whose curve has order n1.
    let mut b_found = None;
    'outer: for cand in 1u64..=40 {
        let b = Fq::from(cand);
        let mut ctr = 1;
        for _ in 0..4 {
            let (p, used) = find_point(&b, &fp, ctr);
            ctr = used + 1;
            if !p.mul_biguint(&n1).is_zero() {
                continue 'outer;
            }
        }
        b_found = Some(b);
        break;
    }
    let b = match b_found {
        Some(b) => b,
        None => panic!("no curve coefficient matches the trusted order"),
    };

    // Subgroup generator by cofactor clearing.
    let mut ctr = 1;
    let g1 = loop {
        let (p, used) = find_point(&b, &fp, ctr);
        ctr = used + 1;
        let g = p.mul_biguint(&cofactor_g1);
        if !g.is_zero() {
            break g;
        }
    };
    assert!(g1.mul_biguint(&fr).is_zero());

    // GLV eigenvalue lambda = x^4 - 1 mod r.
    let lambda = {
        let x4 = match seed.pow(4).to_biguint() {
            Some(v) => v,
            None => panic!("x^4 < 0"),
        };
        (x4 - 1u8) % &fr
    };
    assert!(
        ((&lambda * &lambda + &lambda + 1u8) % &fr).is_zero(),
        "lambda is not a cube root of unity mod r"
    );

    // Cube root of unity in Fq paired with lambda on G1.
    let exp = (fp.clone() - 1u8) / 3u8;
    let fq_one = <Fq as TowerField>::one();
    let mut root = fq_one;
    for c in 2u64..100 {
        let cand = TowerField::pow(&Fq::from(c), &exp);
        if cand != fq_one {
            root = cand;
            break;
        }
    }
    assert!(root != fq_one, "no cube root of unity found");
    let lambda_g1 = g1.mul_biguint(&lambda);
    let omega = match [root, TowerField::square(&root)]
        .into_iter()
        .find(|w| AffinePoint::new(g1.x * w, g1.y) == lambda_g1)
    {
        Some(w) => w,
        None => panic!("no cube root matches the GLV eigenvalue on G1"),
    };

    // Sextic twist: order from the Frobenius trace over Fp4.
    let t2 = &t * &t - (&p_int << 1u32);
    let p2 = &p_int * &p_int;
    let t4 = &t2 * &t2 - (&p2 << 1u32);
    let p4 = &p2 * &p2;
    let d = (&p4 << 2u32) - &t4 * &t4;
    let f4 = (&d / &three).sqrt();
    assert_eq!(&f4 * &f4 * &three, d, "4p^4 - t4^2 is not of the form 3f^2");
    let f4_3 = &f4 * &three;
    let n_twist_int = match [&t4 + &f4_3, &t4 - &f4_3]
        .into_iter()
        .filter(|tw| tw.mod_floor(&two).is_zero())
        .map(|tw| &p4 + &one - tw / &two)
        .find(|n| n.mod_floor(&r_int).is_zero())
    {
        Some(n) => n,
        None => panic!("no twist order is divisible by r"),
    };
    let n_twist = match n_twist_int.to_biguint() {
        Some(v) => v,
        None => panic!("negative twist order"),
    };
    let cofactor_g2 = &n_twist / &fr;

    // Twist coefficient is b*v (M-twist) or b/v (D-twist); only one of the
    // two curves has the r-divisible order.
    let p4_order = fp.pow(4);
    let e2_zero = <E2n as TowerField>::zero();
    let bt_m = E4n::new(e2_zero, E2n::new(b, <Fq as TowerField>::zero()));
    let inv13 = match TowerField::inverse(&Fq::from(13u64)) {
        Some(v) => v,
        None => panic!("13 is not invertible mod p"),
    };
    let bt_d = E4n::new(e2_zero, E2n::new(<Fq as TowerField>::zero(), b * inv13));
    let mut twist_found = None;
    'twist: for bt in [bt_m, bt_d] {
        let mut ctr = 1;
        for _ in 0..4 {
            let (p, used) = find_point(&bt, &p4_order, ctr);
            ctr = used + 1;
            if !p.mul_biguint(&n_twist).is_zero() {
                continue 'twist;
            }
        }
        twist_found = Some(bt);
        break;
    }
    let b_twist = match twist_found {
        Some(bt) => bt,
        None => panic!("neither twist matches the r-divisible order"),
    };

    // The twist point (0, sqrt(b_twist)) has order 3: it doubles to its own
    // negation, so an even run of doublings maps it back to itself.
    let sqrt_b_twist = match sqrt(&b_twist, &p4_order) {
        Some(y) => y,
        None => panic!("twist coefficient is not a square"),
    };
    assert!(
        AffinePoint::new(<E4n as TowerField>::zero(), sqrt_b_twist).is_on_curve(&b_twist),
        "sqrt(b_twist) does not give a twist point"
    );

    let mut ctr = 1;
    let g2 = loop {
        let (p, used) = find_point(&b_twist, &p4_order, ctr);
        ctr = used + 1;
        let g = p.mul_biguint(&cofactor_g2);
        if !g.is_zero() {
            break g;
        }
    };
    assert!(g2.mul_biguint(&fr).is_zero());

    // The same cube root acts on the twist; its eigenvalue there is lambda
    // or lambda^2, so pick the power of omega that matches lambda.
    let lambda_g2 = g2.mul_biguint(&lambda);
    let omega2 = match [root, TowerField::square(&root)]
        .into_iter()
        .find(|w| AffinePoint::new(g2.x.mul_by_fp(w), g2.y) == lambda_g2)
    {
        Some(w) => w,
        None => panic!("no cube root matches the GLV eigenvalue on G2"),
    };

    let lattice = precompute_lattice(&fr, &lambda);

    let mut frob = [<Fq as TowerField>::zero(); 13];
    for (i, s) in FROB_COEFFS.iter().enumerate() {
        frob[i] = Fq::from(parse(s));
    }
    tracing::debug!("curve parameter table derived");

    CurveParams {
        fp,
        fr,
        seed,
        naf,
        b,
        b_twist,
        sqrt_b_twist,
        omega,
        omega2,
        lambda,
        lattice,
        cofactor_g1,
        cofactor_g2,
        g1,
        g2,
        frob,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_in_the_subgroups() {
        let cp = curve_params();
        assert!(cp.g1.is_on_curve(&cp.b));
        assert!(cp.g2.is_on_curve(&cp.b_twist));
        assert!(cp.g1.mul_biguint(&cp.fr).is_zero());
        assert!(cp.g2.mul_biguint(&cp.fr).is_zero());
        assert!(!cp.g1.mul_biguint(&BigUint::from(2u8)).is_zero());
    }

    #[test]
    fn endomorphism_matches_eigenvalue() {
        let cp = curve_params();
        let phi = AffinePoint::new(cp.g1.x * cp.omega, cp.g1.y);
        assert_eq!(phi, cp.g1.mul_biguint(&cp.lambda));
        let phi2 = AffinePoint::new(cp.g2.x.mul_by_fp(&cp.omega2), cp.g2.y);
        assert_eq!(phi2, cp.g2.mul_biguint(&cp.lambda));
    }

    #[test]
    fn twist_conditioning_point_has_order_three() {
        let cp = curve_params();
        let h = AffinePoint::new(<E4n as TowerField>::zero(), cp.sqrt_b_twist);
        assert!(h.is_on_curve(&cp.b_twist));
        assert_eq!(h.double(), h.neg());
        assert!(h.add(&h.double()).is_zero());
    }

    #[test]
    fn naf_recomposes_to_the_loop_counter() {
        let cp = curve_params();
        let mut acc: i128 = 0;
        for d in cp.naf.iter().rev() {
            acc = 2 * acc + *d as i128;
        }
        assert_eq!(acc, ATE_LOOP as i128);
    }
}
