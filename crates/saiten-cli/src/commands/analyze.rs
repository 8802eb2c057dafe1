//! Analyze command: load a device log and render the session report.

use std::path::Path;

use anyhow::{Context, Result};
use saiten_core::{AnalyzeOptions, ReportStyle, analyze, load_log, render, tokenize};
use tracing::info;

/// Analyze a log file and return the rendered report
pub fn run(path: &Path, options: AnalyzeOptions, style: ReportStyle) -> Result<String> {
    info!("Reading {} as {}", path.display(), options.encoding);
    let text = load_log(path, options.encoding)
        .with_context(|| format!("Cannot analyze {}", path.display()))?;

    let lines = tokenize(&text);
    let analysis = analyze(&lines, options.dialect);

    if analysis.reportable_count() == 0 {
        info!("No reportable sessions in {}", path.display());
    }

    Ok(render(&analysis, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_renders_report() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "Try Reserve 6619-30\n\
             SongName = 夜に駆ける\n\
             SingerName = YOASOBI\n\
             SEIMITSU CDioKaraokeApp::OnOpen\n\
             SEIMITSU RQNO: 6619-30\n\
             DIO = 91, SPR = 88, Bonus = 2\n\
             SEIMITSU CDioKaraokeApp::OnClose\n"
        )
        .unwrap();

        let report = run(file.path(), AnalyzeOptions::default(), ReportStyle::plain()).unwrap();
        assert!(report.starts_with("Session 1\nSong: 夜に駆ける\nSinger: YOASOBI\n"));
        assert!(report.contains("DIO: 91, SPR: 88, Bonus: 2"));
    }

    #[test]
    fn test_run_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.log");

        let err = run(&path, AnalyzeOptions::default(), ReportStyle::plain()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("absent.log"));
        assert!(err.downcast_ref::<saiten_core::Error>().is_some_and(|e| e.is_not_found()));
    }
}
