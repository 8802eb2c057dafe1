//! One full pass over a device log: reservation index, segmentation and
//! per-dialect extraction.

use tracing::{info, warn};

use crate::dialect::Dialect;
use crate::extract::Performance;
use crate::extract::ai::{self, AiMetrics};
use crate::extract::dxg::{self, DxgMetrics};
use crate::input::{InputEncoding, LogLine};
use crate::reservation::{ReservationIndex, ReservationKey, SongMetadata};
use crate::session::segment;

/// Options for a single analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// None selects the dialect from the log itself
    pub dialect: Option<Dialect>,
    pub encoding: InputEncoding,
}

/// Extracted sessions of whichever dialect the log was written in
#[derive(Debug, Clone, PartialEq)]
pub enum Performances<'a> {
    Ai(Vec<Performance<'a, AiMetrics>>),
    Dxg(Vec<Performance<'a, DxgMetrics>>),
}

impl Performances<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Ai(list) => list.len(),
            Self::Dxg(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of analyzing one log
#[derive(Debug, Clone)]
pub struct LogAnalysis<'a> {
    pub dialect: Dialect,
    pub reservations: ReservationIndex,
    pub performances: Performances<'a>,
}

impl LogAnalysis<'_> {
    /// Song metadata for a session key, if both are known
    pub fn metadata(&self, key: Option<&ReservationKey>) -> Option<&SongMetadata> {
        key.and_then(|key| self.reservations.get(key))
    }

    /// Number of sessions that make it into the report
    pub fn reportable_count(&self) -> usize {
        match &self.performances {
            Performances::Ai(list) => list.iter().filter(|p| p.metrics.is_complete()).count(),
            Performances::Dxg(list) => list.len(),
        }
    }
}

/// Resolve the dialect to use for a log.
///
/// Falls back to Ai when nothing in the log identifies the dialect; such a
/// log yields no sessions either way.
pub fn resolve_dialect(lines: &[LogLine<'_>], requested: Option<Dialect>) -> Dialect {
    if let Some(dialect) = requested {
        return dialect;
    }
    match Dialect::detect(lines) {
        Some(dialect) => {
            info!(
                "Detected {} log ({})",
                dialect.expand_name(),
                dialect.short_name()
            );
            dialect
        }
        None => {
            warn!("No session start marker found, assuming {}", Dialect::Ai.expand_name());
            Dialect::Ai
        }
    }
}

/// Analyze a tokenized log.
pub fn analyze<'a>(lines: &[LogLine<'a>], dialect: Option<Dialect>) -> LogAnalysis<'a> {
    let dialect = resolve_dialect(lines, dialect);
    let reservations = ReservationIndex::from_lines(lines);
    let sessions = segment(lines, dialect);

    let performances = match dialect {
        Dialect::Ai => Performances::Ai(ai::extract_all(sessions)),
        Dialect::Dxg => Performances::Dxg(dxg::extract_all(sessions)),
    };

    let analysis = LogAnalysis {
        dialect,
        reservations,
        performances,
    };
    info!(
        "{} lines, {} reservations, {} sessions ({} reportable)",
        lines.len(),
        analysis.reservations.len(),
        analysis.performances.len(),
        analysis.reportable_count()
    );
    analysis
}
