//! In-circuit curve gadgets: G1/G2 group law, GLV scalar multiplication,
//! the pairing engine and the high level wrappers with emulated scalars.

pub mod g1;
pub mod g2;
pub mod hints;
pub mod pairing;
pub mod wrapper;

use num_bigint::BigUint;

use crate::frontend::Variable;

pub use g1::G1Affine;
pub use g2::{G2AffP, G2Affine};
pub use pairing::{Line, LineEvaluations};
pub use wrapper::{Curve, Pairing, Scalar};

/// A native scalar operand. Constants take the windowed build-time path,
/// witnesses the hint-backed GLV path.
#[derive(Clone, Debug)]
pub enum NativeScalar {
    Constant(BigUint),
    Witness(Variable),
}
