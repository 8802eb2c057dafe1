//! Session segmentation.
//!
//! The device log is one flat stream. A performance starts when the scoring
//! engine is opened and ends when it is closed; everything in between is the
//! session interior. Lines seen while no session is open are held as a
//! pending appendix and attached to the next session that gets closed.
//!
//! ```text
//! NoSession --start--> InSession --end--> NoSession
//!                      InSession --start--> InSession (previous one closed)
//! ```

use tracing::debug;

use crate::input::LogLine;
use crate::reservation::ReservationKey;

/// Boundary marker detection for one log dialect
pub trait SessionMarkers {
    /// Line opens a new session
    fn is_start(&self, line: &str) -> bool;

    /// Line closes the current session
    fn is_end(&self, line: &str) -> bool;
}

/// One performance cut out of the log stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session<'a> {
    /// 1-based position in first-seen order
    pub ordinal: usize,
    pub start: LogLine<'a>,
    /// None when the session was cut by another start or by end of input
    pub end: Option<LogLine<'a>>,
    /// Lines strictly between the start and end markers
    pub interior: Vec<LogLine<'a>>,
    /// Lines logged outside any session, flushed onto this one when it closed
    pub appendix: Vec<LogLine<'a>>,
    /// Reservation key found by an extractor. When several lines carry a
    /// key, the last one wins.
    pub resolved_key: Option<ReservationKey>,
}

impl<'a> Session<'a> {
    fn open(ordinal: usize, start: LogLine<'a>) -> Self {
        Self {
            ordinal,
            start,
            end: None,
            interior: Vec::new(),
            appendix: Vec::new(),
            resolved_key: None,
        }
    }
}

#[derive(Debug)]
enum SegmenterState<'a> {
    NoSession,
    InSession(Session<'a>),
}

/// Finite-state machine turning a line stream into sessions
#[derive(Debug)]
pub struct SessionSegmenter<'a, M> {
    markers: M,
    state: SegmenterState<'a>,
    pending_appendix: Vec<LogLine<'a>>,
    sessions: Vec<Session<'a>>,
}

impl<'a, M: SessionMarkers> SessionSegmenter<'a, M> {
    pub fn new(markers: M) -> Self {
        Self {
            markers,
            state: SegmenterState::NoSession,
            pending_appendix: Vec::new(),
            sessions: Vec::new(),
        }
    }

    pub fn feed(&mut self, line: LogLine<'a>) {
        if self.markers.is_start(line.text) {
            if let Some(current) = self.take_current() {
                debug!(
                    "Session {} cut by new start at line {}",
                    current.ordinal, line.number
                );
                self.close(current, None);
            }
            let ordinal = self.sessions.len() + 1;
            self.state = SegmenterState::InSession(Session::open(ordinal, line));
            return;
        }

        if self.is_in_session() && self.markers.is_end(line.text) {
            if let Some(current) = self.take_current() {
                self.close(current, Some(line));
            }
            return;
        }

        match &mut self.state {
            SegmenterState::InSession(current) => current.interior.push(line),
            SegmenterState::NoSession => self.pending_appendix.push(line),
        }
    }

    pub fn is_in_session(&self) -> bool {
        matches!(self.state, SegmenterState::InSession(_))
    }

    fn take_current(&mut self) -> Option<Session<'a>> {
        match std::mem::replace(&mut self.state, SegmenterState::NoSession) {
            SegmenterState::InSession(current) => Some(current),
            SegmenterState::NoSession => None,
        }
    }

    fn close(&mut self, mut session: Session<'a>, end: Option<LogLine<'a>>) {
        session.end = end;
        session.appendix = std::mem::take(&mut self.pending_appendix);
        debug!(
            "Session {} closed: lines {}..{}, {} interior, {} appendix",
            session.ordinal,
            session.start.number,
            end.map_or_else(|| "EOF".to_string(), |l| l.number.to_string()),
            session.interior.len(),
            session.appendix.len()
        );
        self.sessions.push(session);
    }

    /// Finalize at end of input and return sessions in first-seen order.
    ///
    /// An open session is closed without an end marker. Appendix lines left
    /// over after the last close have no session to attach to and are dropped.
    pub fn finish(mut self) -> Vec<Session<'a>> {
        if let Some(current) = self.take_current() {
            self.close(current, None);
        }
        if !self.pending_appendix.is_empty() {
            debug!(
                "Discarding {} trailing lines outside any session",
                self.pending_appendix.len()
            );
        }
        self.sessions
    }
}

/// Segment a whole tokenized log.
pub fn segment<'a, M: SessionMarkers>(lines: &[LogLine<'a>], markers: M) -> Vec<Session<'a>> {
    let mut segmenter = SessionSegmenter::new(markers);
    for &line in lines {
        segmenter.feed(line);
    }
    segmenter.finish()
}
