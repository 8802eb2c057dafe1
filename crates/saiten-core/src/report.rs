//! Plain-text report rendering.
//!
//! One block per session, in first-seen session order. Labels follow the
//! karaoke machine's own result screen.

use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::analysis::{LogAnalysis, Performances};
use crate::extract::Performance;
use crate::extract::ai::AiMetrics;
use crate::extract::dxg::{CommonIndicators, DxgMetrics, ScoreRecord};
use crate::reservation::SongMetadata;

/// Shown in place of song or singer when the reservation is not known
pub const UNKNOWN_METADATA: &str = "(unknown)";

/// Shown in place of a value that was never logged
const MISSING_VALUE: &str = "-";

/// Report styling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStyle {
    /// Emit ANSI colours for headings
    pub color: bool,
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn highlight(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}

fn value<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), |v| v.to_string())
}

fn song_lines(metadata: Option<&SongMetadata>) -> [String; 2] {
    let (song, singer) = metadata.map_or((UNKNOWN_METADATA, UNKNOWN_METADATA), |m| {
        (m.song_name.as_str(), m.singer_name.as_str())
    });
    [format!("Song: {}", song), format!("Singer: {}", singer)]
}

/// Render the whole report. Ai sessions without a score are left out.
pub fn render(analysis: &LogAnalysis<'_>, style: ReportStyle) -> String {
    let blocks: Vec<String> = match &analysis.performances {
        Performances::Ai(list) => list
            .iter()
            .filter(|p| p.metrics.is_complete())
            .map(|p| render_ai(analysis, p, style))
            .collect(),
        Performances::Dxg(list) => list
            .iter()
            .map(|p| render_dxg(analysis, p, style))
            .collect(),
    };

    let mut output = blocks.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Render one Ai session block
pub fn render_ai(
    analysis: &LogAnalysis<'_>,
    performance: &Performance<'_, AiMetrics>,
    style: ReportStyle,
) -> String {
    let metrics = &performance.metrics;
    let mut lines = vec![style.heading(&format!("Session {}", performance.session.ordinal))];
    lines.extend(song_lines(
        analysis.metadata(performance.session.resolved_key.as_ref()),
    ));

    let score = metrics.score;
    lines.push(format!(
        "DIO: {}, SPR: {}, Bonus: {}",
        value(score.map(|s| s.dio)),
        value(score.map(|s| s.spr)),
        value(score.map(|s| s.bonus))
    ));
    lines.push(match metrics.sensitivity {
        Some(s) => format!("Ai感性: {}, {}", s.first, s.second),
        None => format!("Ai感性: {}", MISSING_VALUE),
    });

    if metrics.techniques.is_empty() {
        lines.push("技: なし".to_string());
    } else {
        lines.push("技:".to_string());
        lines.extend(
            metrics
                .techniques
                .iter()
                .map(|(label, count)| format!("  {}: {}", label, count)),
        );
    }
    lines.push("---".to_string());

    lines.join("\n")
}

fn breakdown_lines(record: &ScoreRecord) -> [String; 5] {
    [
        format!("音程:{}", value(record.note)),
        format!("VL:{}", value(record.vib)),
        format!("表現力:{}", value(record.exp)),
        format!("リズム:{}", value(record.rythm)),
        format!("安定性:{}", value(record.stability)),
    ]
}

fn indicator_lines(common: &CommonIndicators) -> [String; 11] {
    [
        format!("ビブ:{}", value(common.vib_rank)),
        format!("ロング:{}", value(common.longtone)),
        format!("Timing(+は走り):{}", value(common.timing)),
        format!("Timingから推定されるリズム値:{}", value(common.expected_rhythm())),
        format!("抑揚(1000満点):{}", value(common.emotion)),
        format!("hibiki(裏加点):{}", value(common.hibiki)),
        format!("hurue(安定性の親の値):{}", value(common.furue)),
        format!("抑揚不正:{}", value(common.emo_injustice)),
        format!("しゃくり:{}", value(common.scoop)),
        format!("こぶし:{}", value(common.kobushi)),
        format!("フォール:{}", value(common.fall)),
    ]
}

/// Render one DX-G session block
pub fn render_dxg(
    analysis: &LogAnalysis<'_>,
    performance: &Performance<'_, DxgMetrics>,
    style: ReportStyle,
) -> String {
    let metrics = &performance.metrics;
    let result = metrics.result();
    let base = metrics.base();

    let mut lines = vec![
        "-------".to_string(),
        style.heading(&format!("Session {}", performance.session.ordinal)),
    ];
    // Without a song number there is nothing to look up; the lines are left out.
    if let Some(key) = performance.session.resolved_key.as_ref() {
        lines.extend(song_lines(analysis.metadata(Some(key))));
    }

    lines.push(format!("総合: {}", value(result.map(|r| r.final_score))));
    lines.push(format!("素点: {}", value(base.total)));
    lines.push(format!("ボーナス: {}", value(result.and_then(|r| r.bonus))));
    if let Some(result) = result {
        lines.push(style.highlight(result.winner.label()));
    }

    lines.push(String::new());
    let winning = metrics.winning_record().copied().unwrap_or_default();
    lines.extend(breakdown_lines(&winning));

    lines.push(String::new());
    lines.push(style.heading("純正のチャート"));
    lines.extend(breakdown_lines(base));

    lines.push(String::new());
    lines.extend(indicator_lines(&metrics.common));

    lines.join("\n")
}
