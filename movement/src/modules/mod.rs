//! Stateless movement calculators.
//!
//! Every function here is pure: inputs in, velocity out. Nothing is stored between calls, so the
//! same arguments always produce the same result.

pub mod acceleration;
pub mod gravity;
pub mod jump;
pub mod slope;
