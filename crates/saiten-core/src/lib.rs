//! # saiten-core
//!
//! Core library for reading karaoke scoring device logs.
//!
//! This crate provides:
//! - Log loading and line tokenization (UTF-8 or Shift_JIS)
//! - Reservation index (request code to song and singer)
//! - Session segmentation between scoring engine open/close events
//! - Metric extraction for the Ai and DX-G log dialects
//! - Plain-text report rendering
//!
//! ## Dialects
//!
//! - `Ai`: technique detections, DIO/SPR/Bonus score, AI sensitivity
//! - `DX-G`: four scoring phases, the highest of which is the final score

pub mod analysis;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod input;
pub mod report;
pub mod reservation;
pub mod session;
pub mod technique;

pub use analysis::{AnalyzeOptions, LogAnalysis, Performances, analyze, resolve_dialect};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use extract::Performance;
pub use extract::ai::{AiMetrics, ScoreTriple, Sensitivity, TechniqueCounts};
pub use extract::dxg::{
    CommonIndicators, DxgMetrics, Phase, ScoreRecord, ScoringResult, correct_timing,
    expected_rhythm, select_winner,
};
pub use input::{InputEncoding, LogLine, load_log, tokenize};
pub use report::{ReportStyle, UNKNOWN_METADATA, render};
pub use reservation::{ReservationIndex, ReservationIndexBuilder, ReservationKey, SongMetadata};
pub use session::{Session, SessionMarkers, SessionSegmenter, segment};
pub use technique::{Technique, UNKNOWN_TECHNIQUE, technique_label};
