//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use saiten_core::{AnalyzeOptions, Dialect, InputEncoding, ReportStyle};
use strum::{Display, EnumString};

/// Which dialect to parse the log as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum DialectArg {
    #[default]
    #[strum(serialize = "auto")]
    Auto,
    #[strum(serialize = "ai")]
    Ai,
    #[strum(to_string = "dxg", serialize = "dx-g")]
    Dxg,
}

impl DialectArg {
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            Self::Auto => None,
            Self::Ai => Some(Dialect::Ai),
            Self::Dxg => Some(Dialect::Dxg),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "saiten")]
#[command(version, about = "Karaoke scoring log analyzer")]
pub struct Args {
    /// Device log file to analyze
    #[arg(value_name = "LOG_FILE")]
    pub log_file: PathBuf,

    /// Log dialect: auto, ai or dxg
    #[arg(short, long, value_name = "DIALECT", default_value = "auto")]
    pub dialect: DialectArg,

    /// Text encoding of the log file: utf-8 or shift-jis
    #[arg(short, long, value_name = "ENCODING", default_value = "utf-8")]
    pub encoding: InputEncoding,

    /// Colour headings with ANSI escapes
    #[arg(long)]
    pub color: bool,

    /// Increase diagnostic output on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            dialect: self.dialect.dialect(),
            encoding: self.encoding,
        }
    }

    pub fn report_style(&self) -> ReportStyle {
        ReportStyle {
            color: self.color,
        }
    }

    /// Default log directive for the requested verbosity
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "saiten=warn",
            1 => "saiten=info",
            _ => "saiten=debug",
        }
    }
}
