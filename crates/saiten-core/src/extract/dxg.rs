//! DX-G dialect extraction.
//!
//! DX-G computes the same performance four times: the base score and three
//! bonus variants (note, vibrato, expression). The highest total is the one
//! shown on screen. Breakdown lines only become meaningful after the scoring
//! section marker, so extraction is gated on it.
//!
//! ```text
//! YSAI -----SAI : SPR Saiten -----
//! YSAI >[0]Total       (0)    8523
//! YSAI  [0] Note       (0)    9120
//! ...
//! YSAI >[0] Timing           4294967291
//! ```

use std::sync::LazyLock;

use regex::Regex;
use strum::{Display, FromRepr, IntoStaticStr};
use tracing::debug;

use super::{Performance, parse_digits};
use crate::reservation::ReservationKey;
use crate::session::Session;

static SONGNUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"songnum\s*:\s*([0-9]{4}-[0-9]{2})").expect("valid songnum regex")
});
static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s([0-9]+)(?:\s|$)").expect("valid value regex"));

/// Marker printed right before the scoring breakdown
pub const SCORING_SECTION_MARKER: &str = "YSAI -----SAI : SPR Saiten -----";

/// Raw timing values at or above this were printed from a negative int32
pub const TIMING_UNSIGNED_THRESHOLD: i64 = 100_000;
const TWO_POW_32: i64 = 1 << 32;

/// Scoring phase
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr, IntoStaticStr, Display,
)]
#[repr(u8)]
pub enum Phase {
    #[strum(serialize = "素点")]
    Base = 0,
    #[strum(serialize = "音程ボーナス")]
    NoteBonus = 1,
    #[strum(serialize = "ビブラートボーナス")]
    VibratoBonus = 2,
    #[strum(serialize = "表現力ボーナス")]
    ExpressionBonus = 3,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Base,
        Phase::NoteBonus,
        Phase::VibratoBonus,
        Phase::ExpressionBonus,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// Breakdown of one scoring phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreRecord {
    pub total: Option<u32>,
    pub note: Option<u32>,
    pub vib: Option<u32>,
    pub exp: Option<u32>,
    pub rythm: Option<u32>,
    pub stability: Option<u32>,
}

/// Indicators logged once per session, independent of the phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonIndicators {
    pub furue: Option<u32>,
    pub vib_rank: Option<u32>,
    pub hibiki: Option<u32>,
    pub emotion: Option<u32>,
    pub emo_injustice: Option<u32>,
    /// Signed timing offset; positive means the singer was ahead
    pub timing: Option<i64>,
    pub longtone: Option<u32>,
    pub scoop: Option<u32>,
    pub kobushi: Option<u32>,
    pub fall: Option<u32>,
}

impl CommonIndicators {
    /// Rhythm value the timing offset predicts
    pub fn expected_rhythm(&self) -> Option<i64> {
        self.timing.map(expected_rhythm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseField {
    Total,
    Note,
    Vib,
    Exp,
    Rythm,
    Stability,
}

impl PhaseField {
    const ALL: [PhaseField; 6] = [
        PhaseField::Total,
        PhaseField::Note,
        PhaseField::Vib,
        PhaseField::Exp,
        PhaseField::Rythm,
        PhaseField::Stability,
    ];

    /// Line label up to the phase index in parentheses
    fn label(&self) -> &'static str {
        match self {
            Self::Total => "YSAI >[0]Total       (",
            Self::Note => "YSAI  [0] Note       (",
            Self::Vib => "YSAI  [0] VibLt      (",
            Self::Exp => "YSAI  [0] Expression (",
            Self::Rythm => "YSAI  [0] Rythm      (",
            Self::Stability => "YSAI  [0] Stability  (",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Note => "note",
            Self::Vib => "vib",
            Self::Exp => "exp",
            Self::Rythm => "rythm",
            Self::Stability => "stability",
        }
    }

    fn slot<'r>(&self, record: &'r mut ScoreRecord) -> &'r mut Option<u32> {
        match self {
            Self::Total => &mut record.total,
            Self::Note => &mut record.note,
            Self::Vib => &mut record.vib,
            Self::Exp => &mut record.exp,
            Self::Rythm => &mut record.rythm,
            Self::Stability => &mut record.stability,
        }
    }

    /// Phase index following the label, e.g. `(2)`
    fn phase_in(&self, line: &str) -> Option<Phase> {
        let label = self.label();
        let start = line.find(label)? + label.len();
        let rest = line[start..].as_bytes();
        match rest {
            [digit @ b'0'..=b'3', b')', ..] => Phase::from_u8(digit - b'0'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndicatorField {
    Furue,
    VibRank,
    Hibiki,
    Emotion,
    EmoInjustice,
    Timing,
    Longtone,
    Scoop,
    Kobushi,
    Fall,
}

impl IndicatorField {
    const ALL: [IndicatorField; 10] = [
        IndicatorField::Furue,
        IndicatorField::VibRank,
        IndicatorField::Hibiki,
        IndicatorField::Emotion,
        IndicatorField::EmoInjustice,
        IndicatorField::Timing,
        IndicatorField::Longtone,
        IndicatorField::Scoop,
        IndicatorField::Kobushi,
        IndicatorField::Fall,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Furue => "YSAI  [0] Furue",
            Self::VibRank => "YSAI  [0] VibRank",
            Self::Hibiki => "YSAI  [0] Hibiki",
            Self::Emotion => "YSAI >[0] Emotion",
            Self::EmoInjustice => "YSAI  [0] EmoInjustice",
            Self::Timing => "YSAI >[0] Timing",
            Self::Longtone => "YSAI  [0] Longtone",
            Self::Scoop => "YSAI  [0] Scoop",
            Self::Kobushi => "YSAI  [0] Kobushi",
            Self::Fall => "YSAI  [0] Fall",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Furue => "furue",
            Self::VibRank => "vibRank",
            Self::Hibiki => "hibiki",
            Self::Emotion => "emotion",
            Self::EmoInjustice => "emoInjustice",
            Self::Timing => "timing",
            Self::Longtone => "longtone",
            Self::Scoop => "scoop",
            Self::Kobushi => "kobushi",
            Self::Fall => "fall",
        }
    }

    fn store(&self, common: &mut CommonIndicators, digits: &str, line_number: usize) {
        let value = || parse_digits::<u32>(digits, self.name(), line_number);
        match self {
            Self::Furue => common.furue = value(),
            Self::VibRank => common.vib_rank = value(),
            Self::Hibiki => common.hibiki = value(),
            Self::Emotion => common.emotion = value(),
            Self::EmoInjustice => common.emo_injustice = value(),
            Self::Timing => {
                common.timing =
                    parse_digits::<i64>(digits, self.name(), line_number).map(correct_timing);
            }
            Self::Longtone => common.longtone = value(),
            Self::Scoop => common.scoop = value(),
            Self::Kobushi => common.kobushi = value(),
            Self::Fall => common.fall = value(),
        }
    }
}

/// Recover the signed timing offset from a value printed as unsigned 32-bit.
pub fn correct_timing(raw: i64) -> i64 {
    if raw >= TIMING_UNSIGNED_THRESHOLD {
        raw - TWO_POW_32
    } else {
        raw
    }
}

/// Rhythm value predicted from a timing offset.
///
/// Lagging behind costs 10 points per unit, rushing 155.56.
pub fn expected_rhythm(timing: i64) -> i64 {
    let expected = if timing < 0 {
        100_000.0 + 10.0 * timing as f64
    } else {
        100_000.0 - 155.56 * timing as f64
    };
    expected.floor() as i64
}

/// First whitespace-delimited run of digits on the line. The end of the
/// line counts as a delimiter, since line terminators are already stripped.
fn first_value(line: &str) -> Option<&str> {
    VALUE_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Final score selection over the four phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringResult {
    pub final_score: u32,
    pub winner: Phase,
    /// Final score minus base total; None when no base total was logged
    pub bonus: Option<i64>,
}

/// Pick the highest total; ties go to the lowest phase index.
pub fn select_winner(totals: [Option<u32>; 4]) -> Option<(Phase, u32)> {
    let max = totals.iter().flatten().copied().max()?;
    let index = totals.iter().position(|total| *total == Some(max))?;
    Phase::from_u8(index as u8).map(|phase| (phase, max))
}

/// Metrics of one DX-G session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DxgMetrics {
    /// Indexed by [`Phase::index`]
    pub phases: [ScoreRecord; 4],
    pub common: CommonIndicators,
    /// Whether the scoring section marker was seen
    pub scoring_section_seen: bool,
}

impl DxgMetrics {
    pub fn phase(&self, phase: Phase) -> &ScoreRecord {
        &self.phases[phase.index()]
    }

    pub fn base(&self) -> &ScoreRecord {
        self.phase(Phase::Base)
    }

    pub fn totals(&self) -> [Option<u32>; 4] {
        self.phases.map(|record| record.total)
    }

    pub fn result(&self) -> Option<ScoringResult> {
        let (winner, final_score) = select_winner(self.totals())?;
        let bonus = self
            .base()
            .total
            .map(|base| i64::from(final_score) - i64::from(base));
        Some(ScoringResult {
            final_score,
            winner,
            bonus,
        })
    }

    /// Breakdown of the winning phase
    pub fn winning_record(&self) -> Option<&ScoreRecord> {
        self.result().map(|result| self.phase(result.winner))
    }

    fn record_line(&mut self, line: &str, line_number: usize) {
        for field in PhaseField::ALL {
            let Some(phase) = field.phase_in(line) else {
                continue;
            };
            let value = first_value(line)
                .and_then(|digits| parse_digits::<u32>(digits, field.name(), line_number));
            *field.slot(&mut self.phases[phase.index()]) = value;
        }

        for field in IndicatorField::ALL {
            if !line.contains(field.label()) {
                continue;
            }
            match first_value(line) {
                Some(digits) => field.store(&mut self.common, digits, line_number),
                None => debug!("Line {}: {} has no value", line_number, field.name()),
            }
        }
    }
}

/// Extract DX-G metrics from a session, recording the song number on it.
pub fn extract(session: &mut Session<'_>) -> DxgMetrics {
    let mut metrics = DxgMetrics::default();

    for line in &session.interior {
        if let Some(caps) = SONGNUM_RE.captures(line.text) {
            session.resolved_key = ReservationKey::parse(&caps[1]);
        }

        if line.text.contains(SCORING_SECTION_MARKER) {
            metrics.scoring_section_seen = true;
            continue;
        }

        if metrics.scoring_section_seen {
            metrics.record_line(line.text, line.number);
        }
    }

    debug!(
        "DX-G session {}: key {:?}, totals {:?}",
        session.ordinal,
        session.resolved_key.as_ref().map(|k| k.as_str()),
        metrics.totals()
    );
    metrics
}

/// Extract every session, keeping first-seen order.
pub fn extract_all<'a>(sessions: Vec<Session<'a>>) -> Vec<Performance<'a, DxgMetrics>> {
    sessions
        .into_iter()
        .map(|mut session| {
            let metrics = extract(&mut session);
            Performance { session, metrics }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::input::tokenize;
    use crate::session::segment;

    const SESSION: &str = "\
[001] YSAI saitenApiOpen()
[002] YSAI saitenApiOpen()..OK(0)
[003] YSAI songnum : 6619-30
[004] YSAI >[0]Total       (0)    1111
[005] YSAI -----SAI : SPR Saiten -----
[006] YSAI >[0]Total       (0)    8000
[007] YSAI >[0]Total       (1)    9500
[008] YSAI >[0]Total       (2)    9500
[009] YSAI >[0]Total       (3)    7000
[010] YSAI  [0] Note       (0)    8100
[011] YSAI  [0] Note       (1)    9200
[012] YSAI  [0] VibLt      (1)    650
[013] YSAI  [0] Expression (1)    720
[014] YSAI  [0] Rythm      (1)    880
[015] YSAI  [0] Stability  (1)    910
[016] YSAI  [0] Furue            42
[017] YSAI  [0] VibRank          3
[018] YSAI  [0] Hibiki           120
[019] YSAI >[0] Emotion          870
[020] YSAI  [0] EmoInjustice     5
[021] YSAI >[0] Timing           4294967291
[022] YSAI  [0] Longtone         77
[023] YSAI  [0] Scoop            14
[024] YSAI  [0] Kobushi          6
[025] YSAI  [0] Fall             2
[026] YSAI saitenApiClose()...OK (0)
";

    fn extract_one(log: &str) -> (Option<ReservationKey>, DxgMetrics) {
        let lines = tokenize(log);
        let mut sessions = segment(&lines, Dialect::Dxg);
        assert_eq!(sessions.len(), 1);
        let metrics = extract(&mut sessions[0]);
        (sessions[0].resolved_key.clone(), metrics)
    }

    #[test]
    fn test_extract_breakdown() {
        let (key, metrics) = extract_one(SESSION);

        assert_eq!(key.unwrap().as_str(), "6619-30");
        assert!(metrics.scoring_section_seen);
        // The total logged before the marker is ignored
        assert_eq!(
            metrics.totals(),
            [Some(8000), Some(9500), Some(9500), Some(7000)]
        );
        assert_eq!(metrics.base().note, Some(8100));

        let note_bonus = metrics.phase(Phase::NoteBonus);
        assert_eq!(note_bonus.note, Some(9200));
        assert_eq!(note_bonus.vib, Some(650));
        assert_eq!(note_bonus.exp, Some(720));
        assert_eq!(note_bonus.rythm, Some(880));
        assert_eq!(note_bonus.stability, Some(910));
        assert_eq!(metrics.phase(Phase::VibratoBonus).note, None);
    }

    #[test]
    fn test_extract_common_indicators() {
        let (_, metrics) = extract_one(SESSION);
        let common = metrics.common;

        assert_eq!(common.furue, Some(42));
        assert_eq!(common.vib_rank, Some(3));
        assert_eq!(common.hibiki, Some(120));
        assert_eq!(common.emotion, Some(870));
        assert_eq!(common.emo_injustice, Some(5));
        assert_eq!(common.timing, Some(-5));
        assert_eq!(common.longtone, Some(77));
        assert_eq!(common.scoop, Some(14));
        assert_eq!(common.kobushi, Some(6));
        assert_eq!(common.fall, Some(2));
        assert_eq!(common.expected_rhythm(), Some(99_950));
    }

    #[test]
    fn test_result_selects_first_maximum() {
        let (_, metrics) = extract_one(SESSION);
        let result = metrics.result().unwrap();

        assert_eq!(result.final_score, 9500);
        assert_eq!(result.winner, Phase::NoteBonus);
        assert_eq!(result.bonus, Some(1500));
        assert_eq!(metrics.winning_record().unwrap().note, Some(9200));
    }

    #[test]
    fn test_select_winner() {
        assert_eq!(
            select_winner([Some(80), Some(95), Some(95), Some(70)]),
            Some((Phase::NoteBonus, 95))
        );
        assert_eq!(
            select_winner([Some(90), Some(90), Some(90), Some(90)]),
            Some((Phase::Base, 90))
        );
        assert_eq!(
            select_winner([None, None, Some(60), Some(61)]),
            Some((Phase::ExpressionBonus, 61))
        );
        assert_eq!(select_winner([None; 4]), None);
    }

    #[test]
    fn test_result_bonus() {
        let mut metrics = DxgMetrics::default();
        for (record, total) in metrics.phases.iter_mut().zip([80, 95, 95, 70]) {
            record.total = Some(total);
        }
        let result = metrics.result().unwrap();
        assert_eq!(result.winner.index(), 1);
        assert_eq!(result.final_score, 95);
        assert_eq!(result.bonus, Some(15));

        metrics.phases[0].total = None;
        assert_eq!(metrics.result().unwrap().bonus, None);
    }

    #[test]
    fn test_correct_timing() {
        assert_eq!(correct_timing(4_294_867_296), -100_000);
        assert_eq!(correct_timing(500), 500);
        assert_eq!(correct_timing(99_999), 99_999);
        assert_eq!(correct_timing(4_294_967_295), -1);
    }

    #[test]
    fn test_expected_rhythm() {
        assert_eq!(expected_rhythm(0), 100_000);
        assert_eq!(expected_rhythm(-5), 99_950);
        assert_eq!(expected_rhythm(10), 98_444);
    }

    #[test]
    fn test_nothing_recorded_before_marker() {
        let log = "\
YSAI saitenApiOpen()
YSAI songnum : 1234-56
YSAI >[0]Total       (0)    8000
YSAI  [0] Furue            42
YSAI saitenApiClose()...OK (0)
";
        let (key, metrics) = extract_one(log);
        assert_eq!(key.unwrap().as_str(), "1234-56");
        assert!(!metrics.scoring_section_seen);
        assert_eq!(metrics, DxgMetrics::default());
        assert_eq!(metrics.result(), None);
    }

    #[test]
    fn test_line_without_delimited_value_leaves_field_absent() {
        let log = "\
YSAI saitenApiOpen()
YSAI -----SAI : SPR Saiten -----
YSAI >[0]Total       (0)    n/a
YSAI  [0] Hibiki
YSAI saitenApiClose()...OK (0)
";
        let (key, metrics) = extract_one(log);
        assert!(key.is_none());
        assert_eq!(metrics.base().total, None);
        assert_eq!(metrics.common.hibiki, None);
    }

    #[test]
    fn test_phase_in() {
        assert_eq!(
            PhaseField::Total.phase_in("YSAI >[0]Total       (3)    1 "),
            Some(Phase::ExpressionBonus)
        );
        assert_eq!(PhaseField::Total.phase_in("YSAI >[0]Total       (4)    1 "), None);
        assert_eq!(PhaseField::Note.phase_in("YSAI >[0]Total       (0)    1 "), None);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::Base.label(), "素点");
        assert_eq!(Phase::ExpressionBonus.to_string(), "表現力ボーナス");
        assert_eq!(Phase::from_u8(2), Some(Phase::VibratoBonus));
        assert_eq!(Phase::from_u8(4), None);
    }
}
