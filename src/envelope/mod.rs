//! Envelope intersection solver.
//!
//! The prediction interval's lower and upper envelopes are curved (the
//! half-width grows away from the x centroid). Each one is approximated by a
//! straight line fitted with first-order least squares, and those lines are
//! inverted to find where they meet the caller's Ele.Flow limits. The
//! linearization is deliberate and must not be replaced by an exact solve:
//! downstream users rely on these exact numbers.

pub mod solver;

pub use solver::{fit_envelopes, linearize, solve_intersections, BoundIntersection, EnvelopeFit, LinearEnvelope, MIN_ENVELOPE_SLOPE};
