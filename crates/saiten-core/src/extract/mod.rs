//! Per-session metric extraction for each dialect.
//!
//! - [`ai`]: technique counts, DIO/SPR/Bonus score and AI sensitivity
//! - [`dxg`]: four-phase score breakdown and common indicators

pub mod ai;
pub mod dxg;

use tracing::warn;

use crate::session::Session;

/// A session together with the metrics extracted from it
#[derive(Debug, Clone, PartialEq)]
pub struct Performance<'a, M> {
    pub session: Session<'a>,
    pub metrics: M,
}

/// Convert a captured digit run to a fixed-width integer.
///
/// Captures that do not fit are reported and treated as absent rather than
/// clamped, so they never feed into score comparisons.
fn parse_digits<T: std::str::FromStr>(digits: &str, field: &str, line_number: usize) -> Option<T> {
    match digits.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(
                "Line {}: {} value {} is out of range, ignoring",
                line_number, field, digits
            );
            None
        }
    }
}
