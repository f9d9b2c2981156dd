//! In-circuit extension field gadgets.
//!
//! The tower mirrors `curve::tower` level for level: Fp2 = Fp[u]/(u^2-13),
//! Fp4 = Fp2[v]/(v^2-u), Fp12 = Fp4[w]/(w^3-v), Fp24 = Fp12[i]/(i^2-w).
//! Every coefficient is a native [`crate::frontend::Variable`]; inverses and
//! quotients come from hints and are verified with one multiplication.

pub mod e12;
pub mod e2;
pub mod e24;
pub mod e4;
pub mod hints;

pub use e12::E12;
pub use e2::E2;
pub use e24::E24;
pub use e4::E4;
