//! Reservation index: maps a reservation key (e.g. `6619-30`) to the song
//! and singer that were queued under it.
//!
//! The reservation side of the device log looks like
//!
//! ```text
//! Try Reserve 6619-30
//! SongName = 夜に駆ける          rqif.cpp(812)
//! SingerName = YOASOBI          rqif.cpp(813)
//! ```
//!
//! Song and singer names may carry a trailing source location, which is
//! stripped. A key is committed as soon as key, song and singer are all
//! known; a later commit under the same key replaces the earlier one.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::input::LogLine;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("valid reservation key regex"));
static TRY_RESERVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Try Reserve ([0-9]{4}-[0-9]{2})").expect("valid reserve regex")
});
static SONG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SongName = (.+)").expect("valid song name regex"));
static SINGER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SingerName = (.+)").expect("valid singer name regex"));

/// Source location the reservation module appends to name lines
const SOURCE_SUFFIX_MARKER: &str = "rqif.cpp";

/// Request code in `NNNN-NN` form, shared by the reservation log and the
/// scoring session log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReservationKey(String);

impl ReservationKey {
    /// Parse a key, accepting only the exact `NNNN-NN` shape
    pub fn parse(value: &str) -> Option<Self> {
        KEY_RE.is_match(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Song metadata recorded for one reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongMetadata {
    pub song_name: String,
    pub singer_name: String,
}

/// Lookup table from reservation key to song metadata
#[derive(Debug, Clone, Default)]
pub struct ReservationIndex {
    entries: HashMap<ReservationKey, SongMetadata>,
}

impl ReservationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a whole tokenized log
    pub fn from_lines(lines: &[LogLine<'_>]) -> Self {
        let mut builder = ReservationIndexBuilder::new();
        for line in lines {
            builder.feed(line.text);
        }
        builder.finish()
    }

    pub fn get(&self, key: &ReservationKey) -> Option<&SongMetadata> {
        self.entries.get(key)
    }

    /// Insert metadata, replacing (and returning) whatever was stored under
    /// the same key.
    pub fn insert(&mut self, key: ReservationKey, metadata: SongMetadata) -> Option<SongMetadata> {
        self.entries.insert(key, metadata)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Single-pass builder holding the three candidate slots.
#[derive(Debug, Default)]
pub struct ReservationIndexBuilder {
    index: ReservationIndex,
    key: Option<ReservationKey>,
    song_name: Option<String>,
    singer_name: Option<String>,
}

impl ReservationIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: &str) {
        if let Some(caps) = TRY_RESERVE_RE.captures(line) {
            self.key = ReservationKey::parse(&caps[1]);
            self.song_name = None;
            self.singer_name = None;
        }

        if let Some(caps) = SONG_NAME_RE.captures(line) {
            self.song_name = Some(clean_name(&caps[1]));
        }

        if let Some(caps) = SINGER_NAME_RE.captures(line) {
            self.singer_name = Some(clean_name(&caps[1]));
        }

        self.try_commit();
    }

    fn try_commit(&mut self) {
        let (Some(song), Some(singer)) = (&self.song_name, &self.singer_name) else {
            return;
        };
        if song.is_empty() || singer.is_empty() {
            return;
        }
        // Song and singer stay armed for the next key; only the key is consumed.
        let Some(key) = self.key.take() else {
            return;
        };

        debug!("Reservation {}: {} / {}", key, song, singer);
        let metadata = SongMetadata {
            song_name: song.clone(),
            singer_name: singer.clone(),
        };
        if let Some(previous) = self.index.insert(key.clone(), metadata) {
            debug!(
                "Reservation {} replaced earlier entry ({})",
                key, previous.song_name
            );
        }
    }

    pub fn finish(self) -> ReservationIndex {
        self.index
    }
}

fn clean_name(raw: &str) -> String {
    let name = match raw.find(SOURCE_SUFFIX_MARKER) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    name.trim().to_string()
}
