//! Ai dialect extraction.
//!
//! The score summary is sometimes wrapped over two physical lines, so score
//! patterns are matched against a window of the previous and current line
//! joined with a single space.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::{Performance, parse_digits};
use crate::reservation::ReservationKey;
use crate::session::Session;
use crate::technique::{UNKNOWN_TECHNIQUE, technique_label};

static REQUEST_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SEIMITSU RQNO: ([0-9]{4}-[0-9]{2})").expect("valid request code regex")
});
static TECHNIQUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SEIMITSU detected .*? tech ([0-9]+)").expect("valid technique regex")
});
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DIO\s*=\s*([0-9]+), SPR\s*=\s*([0-9]+), Bonus\s*=\s*([0-9]+)")
        .expect("valid score regex")
});
static SENSITIVITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+\.[0-9]+),\s*([0-9]+\.[0-9]+)\]").expect("valid sensitivity regex")
});

/// DIO / SPR / Bonus score triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTriple {
    pub dio: u32,
    pub spr: u32,
    pub bonus: u32,
}

/// AI sensitivity ("Ai感性") pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub first: f64,
    pub second: f64,
}

/// Occurrence count per technique label, in first-detected order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechniqueCounts {
    counts: Vec<(&'static str, u32)>,
}

impl TechniqueCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, label: &'static str) {
        match self.counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label, 1)),
        }
    }

    pub fn get(&self, label: &str) -> u32 {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0, |(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.counts.iter().copied()
    }

    /// Total number of detections
    pub fn total(&self) -> u32 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Metrics of one Ai session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiMetrics {
    pub techniques: TechniqueCounts,
    /// Last score triple seen in the session
    pub score: Option<ScoreTriple>,
    /// Last sensitivity pair seen in the session
    pub sensitivity: Option<Sensitivity>,
}

impl AiMetrics {
    /// Sessions without a score never reached the result screen
    pub fn is_complete(&self) -> bool {
        self.score.is_some()
    }
}

/// Bounded lookback window: the current line and the one before it.
#[derive(Debug, Clone, Copy)]
pub struct LineWindow<'a> {
    pub previous: &'a str,
    pub current: &'a str,
}

impl LineWindow<'_> {
    pub fn joined(&self) -> String {
        format!("{} {}", self.previous, self.current)
    }

    /// Last match that ends on the current line. Matches wholly inside the
    /// previous line were already taken when that line was current.
    fn last_match<'h>(&self, re: &Regex, joined: &'h str) -> Option<Captures<'h>> {
        re.captures_iter(joined)
            .filter(|caps| caps.get(0).is_some_and(|m| m.end() > self.previous.len()))
            .last()
    }

    pub fn score(&self, line_number: usize) -> Option<ScoreTriple> {
        let joined = self.joined();
        let caps = self.last_match(&SCORE_RE, &joined)?;
        Some(ScoreTriple {
            dio: parse_digits(&caps[1], "DIO", line_number)?,
            spr: parse_digits(&caps[2], "SPR", line_number)?,
            bonus: parse_digits(&caps[3], "Bonus", line_number)?,
        })
    }

    pub fn sensitivity(&self) -> Option<Sensitivity> {
        let joined = self.joined();
        let caps = self.last_match(&SENSITIVITY_RE, &joined)?;
        Some(Sensitivity {
            first: caps[1].parse().ok()?,
            second: caps[2].parse().ok()?,
        })
    }
}

/// Extract Ai metrics from a session, recording the request code on it.
pub fn extract(session: &mut Session<'_>) -> AiMetrics {
    let mut metrics = AiMetrics::default();
    let mut previous = "";

    for line in &session.interior {
        if let Some(caps) = REQUEST_CODE_RE.captures(line.text) {
            session.resolved_key = ReservationKey::parse(&caps[1]);
        }

        if let Some(caps) = TECHNIQUE_RE.captures(line.text) {
            let label = caps[1]
                .parse::<u64>()
                .map_or(UNKNOWN_TECHNIQUE, technique_label);
            metrics.techniques.increment(label);
        }

        let window = LineWindow {
            previous,
            current: line.text,
        };
        if let Some(score) = window.score(line.number) {
            metrics.score = Some(score);
        }
        if let Some(sensitivity) = window.sensitivity() {
            metrics.sensitivity = Some(sensitivity);
        }

        previous = line.text;
    }

    debug!(
        "Ai session {}: key {:?}, {} techniques, score {:?}",
        session.ordinal,
        session.resolved_key.as_ref().map(|k| k.as_str()),
        metrics.techniques.total(),
        metrics.score
    );
    metrics
}

/// Extract every session, keeping first-seen order.
pub fn extract_all<'a>(sessions: Vec<Session<'a>>) -> Vec<Performance<'a, AiMetrics>> {
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

    fn extract_one(log: &str) -> (Option<ReservationKey>, AiMetrics) {
        let lines = tokenize(log);
        let mut sessions = segment(&lines, Dialect::Ai);
        assert_eq!(sessions.len(), 1);
        let metrics = extract(&mut sessions[0]);
        (sessions[0].resolved_key.clone(), metrics)
    }

    #[test]
    fn test_extract_full_session() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
SEIMITSU RQNO: 6619-30
SEIMITSU detected at 1200ms tech 0
SEIMITSU detected at 1500ms tech 10
SEIMITSU detected at 2100ms tech 0
SEIMITSU result DIO = 91, SPR = 88, Bonus = 2
SEIMITSU sensitivity [85.123, 90.5]
SEIMITSU CDioKaraokeApp::OnClose
";
        let (key, metrics) = extract_one(log);

        assert_eq!(key.unwrap().as_str(), "6619-30");
        assert_eq!(metrics.techniques.get("しゃくり"), 2);
        assert_eq!(metrics.techniques.get("こぶし(先頭)"), 1);
        assert_eq!(metrics.techniques.total(), 3);
        assert_eq!(
            metrics.score,
            Some(ScoreTriple {
                dio: 91,
                spr: 88,
                bonus: 2
            })
        );
        let sensitivity = metrics.sensitivity.unwrap();
        assert_eq!(sensitivity.first, 85.123);
        assert_eq!(sensitivity.second, 90.5);
        assert!(metrics.is_complete());
    }

    #[test]
    fn test_score_split_over_two_lines() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
SEIMITSU result DIO = 91, SPR = 88,
Bonus = 2
SEIMITSU CDioKaraokeApp::OnClose
";
        let (_, metrics) = extract_one(log);
        assert_eq!(
            metrics.score,
            Some(ScoreTriple {
                dio: 91,
                spr: 88,
                bonus: 2
            })
        );
    }

    #[test]
    fn test_sensitivity_split_over_two_lines() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
AI [12.5,
33.25]
SEIMITSU CDioKaraokeApp::OnClose
";
        let (_, metrics) = extract_one(log);
        let sensitivity = metrics.sensitivity.unwrap();
        assert_eq!(sensitivity.first, 12.5);
        assert_eq!(sensitivity.second, 33.25);
    }

    #[test]
    fn test_last_score_and_key_win() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
SEIMITSU RQNO: 1111-11
DIO = 10, SPR = 20, Bonus = 0
SEIMITSU RQNO: 2222-22
DIO = 90, SPR = 80, Bonus = 1
SEIMITSU CDioKaraokeApp::OnClose
";
        let (key, metrics) = extract_one(log);
        assert_eq!(key.unwrap().as_str(), "2222-22");
        assert_eq!(metrics.score.unwrap().dio, 90);
    }

    #[test]
    fn test_consecutive_results_keep_the_newer_value() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
DIO = 10, SPR = 20, Bonus = 0
DIO = 90, SPR = 80, Bonus = 1
SEIMITSU CDioKaraokeApp::OnClose
";
        let (_, metrics) = extract_one(log);
        assert_eq!(
            metrics.score,
            Some(ScoreTriple {
                dio: 90,
                spr: 80,
                bonus: 1
            })
        );

        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
DIO = 90, SPR = 80, Bonus = 1
AI [1.5, 2.5]
AI [7.5, 8.5]
SEIMITSU CDioKaraokeApp::OnClose
";
        let (_, metrics) = extract_one(log);
        let sensitivity = metrics.sensitivity.unwrap();
        assert_eq!(sensitivity.first, 7.5);
        assert_eq!(sensitivity.second, 8.5);
    }

    #[test]
    fn test_window_ignores_match_on_previous_line() {
        let window = LineWindow {
            previous: "DIO = 10, SPR = 20, Bonus = 0",
            current: "SEIMITSU RQNO: 1111-11",
        };
        assert_eq!(window.score(3), None);
        assert_eq!(window.sensitivity(), None);
    }

    #[test]
    fn test_unknown_technique_is_counted() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
SEIMITSU detected x tech 17
SEIMITSU detected x tech 99999999999999999999999
SEIMITSU CDioKaraokeApp::OnClose
";
        let (_, metrics) = extract_one(log);
        assert_eq!(metrics.techniques.get(UNKNOWN_TECHNIQUE), 2);
        assert_eq!(metrics.techniques.len(), 1);
    }

    #[test]
    fn test_session_without_score_is_incomplete() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
SEIMITSU RQNO: 6619-30
SEIMITSU CDioKaraokeApp::OnClose
";
        let (key, metrics) = extract_one(log);
        assert!(key.is_some());
        assert!(!metrics.is_complete());
        assert!(metrics.sensitivity.is_none());
    }

    #[test]
    fn test_technique_counts_keep_first_seen_order() {
        let mut counts = TechniqueCounts::new();
        counts.increment("フォール");
        counts.increment("しゃくり");
        counts.increment("フォール");

        let collected: Vec<_> = counts.iter().collect();
        assert_eq!(collected, vec![("フォール", 2), ("しゃくり", 1)]);
    }

    #[test]
    fn test_extract_all_is_deterministic() {
        let log = "\
SEIMITSU CDioKaraokeApp::OnOpen
DIO = 1, SPR = 2, Bonus = 3
SEIMITSU CDioKaraokeApp::OnClose
SEIMITSU CDioKaraokeApp::OnOpen
SEIMITSU detected x tech 4
";
        let lines = tokenize(log);
        let first = extract_all(segment(&lines, Dialect::Ai));
        let second = extract_all(segment(&lines, Dialect::Ai));
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[0].metrics.is_complete());
        assert!(!first[1].metrics.is_complete());
    }
}
