#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod curve;
pub mod ec;
pub mod emulated;
pub mod frontend;
pub mod tower;
