//! Native (out-of-circuit) BLS24-315 arithmetic.
//!
//! This layer backs the hints, the fixed-argument line precomputation and
//! the tests: prime fields, the Fp2/Fp4/Fp12/Fp24 tower, affine curve
//! points, the GLV lattice and a reference pairing. Everything here is
//! ordinary field arithmetic; none of it emits constraints.

pub mod fields;
pub mod glv;
pub mod pairing;
pub mod params;
pub mod point;
pub mod tower;

pub use fields::{Fq, Fr};
pub use params::{curve_params, CurveParams};
pub use point::AffinePoint;
pub use tower::{E12n, E24n, E2n, E4n, TowerField};

/// Native G1 point.
pub type G1Native = AffinePoint<Fq>;
/// Native G2 point (on the sextic twist over Fp4).
pub type G2Native = AffinePoint<E4n>;
