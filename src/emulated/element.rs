//! The limb representation of a non-native element.

use std::marker::PhantomData;

use crate::frontend::Variable;

use super::FieldParams;

/// A non-native field element as a little-endian vector of limb variables.
///
/// `overflow` tracks how far each limb may exceed its nominal width: every
/// limb value is known to be below `2^(BITS_PER_LIMB + overflow)`. Lazy
/// additions grow the overflow and the limb count may exceed
/// `NB_LIMBS` after an unreduced multiplication; [`super::Field`] reduces
/// automatically before any operation that would overflow the native field.
#[derive(Clone, Debug)]
pub struct Element<P: FieldParams> {
    pub limbs: Vec<Variable>,
    pub(super) overflow: usize,
    _params: PhantomData<P>,
}

impl<P: FieldParams> Element<P> {
    pub(super) fn new(limbs: Vec<Variable>, overflow: usize) -> Self {
        Self {
            limbs,
            overflow,
            _params: PhantomData,
        }
    }

    /// Whether the element is in the canonical shape: `NB_LIMBS` limbs with
    /// no overflow. Canonical does not imply the value is below the modulus.
    pub(super) fn is_canonical(&self) -> bool {
        self.overflow == 0 && self.limbs.len() == P::NB_LIMBS
    }

    pub fn overflow(&self) -> usize {
        self.overflow
    }
}
