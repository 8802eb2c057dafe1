//! Firmware log dialects and their session boundary markers.

use std::sync::LazyLock;

use regex::Regex;
use strum::{Display, EnumString, IntoStaticStr};

use crate::input::LogLine;
use crate::session::SessionMarkers;

const AI_OPEN: &str = "SEIMITSU CDioKaraokeApp::OnOpen";
const AI_CLOSE: &str = "SEIMITSU CDioKaraokeApp::OnClose";

const DXG_OPEN: &str = "YSAI saitenApiOpen";
/// Same API name, logged when the open call returns; not a session start
const DXG_OPEN_ACK: &str = "YSAI saitenApiOpen()..OK(0)";

static DXG_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"YSAI saitenApiClose.*OK ?\(?0\)?").expect("valid close marker regex")
});

/// Log dialect written by a scoring firmware generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Display)]
#[strum(ascii_case_insensitive)]
pub enum Dialect {
    /// Technique and AI-sensitivity logging (`SEIMITSU` prefix)
    #[strum(serialize = "ai")]
    Ai,
    /// Four-phase scoring breakdown logging (`YSAI` prefix)
    #[strum(to_string = "dxg", serialize = "dx-g")]
    Dxg,
}

impl Dialect {
    pub fn short_name(&self) -> &'static str {
        self.into()
    }

    /// Get the product name of the scoring mode
    pub fn expand_name(&self) -> &'static str {
        match self {
            Self::Ai => "精密採点Ai",
            Self::Dxg => "精密採点DX-G",
        }
    }

    /// Detect the dialect from the first session start marker in the log
    pub fn detect(lines: &[LogLine<'_>]) -> Option<Self> {
        lines.iter().find_map(|line| {
            [Self::Ai, Self::Dxg]
                .into_iter()
                .find(|dialect| dialect.is_start(line.text))
        })
    }
}

impl SessionMarkers for Dialect {
    fn is_start(&self, line: &str) -> bool {
        match self {
            Self::Ai => line.contains(AI_OPEN),
            Self::Dxg => line.contains(DXG_OPEN) && !line.contains(DXG_OPEN_ACK),
        }
    }

    fn is_end(&self, line: &str) -> bool {
        match self {
            Self::Ai => line.contains(AI_CLOSE),
            Self::Dxg => DXG_CLOSE_RE.is_match(line),
        }
    }
}
