//! Log input: file loading and line tokenization.
//!
//! Scoring devices write their diagnostic log either as UTF-8 or as
//! Shift_JIS (older firmware). The whole file is decoded up front and then
//! split into [`LogLine`]s which every later stage borrows from.

use std::fs;
use std::path::Path;

use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One line of the device log together with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> LogLine<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }
}

/// Split raw log text into ordered lines.
///
/// Both `\n` and `\r\n` terminators are accepted and a missing terminator on
/// the last line is fine. Line content is otherwise left untouched.
pub fn tokenize(text: &str) -> Vec<LogLine<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| LogLine::new(i + 1, line))
        .collect()
}

/// Text encoding of the input log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr, Display)]
#[strum(ascii_case_insensitive)]
pub enum InputEncoding {
    #[default]
    #[strum(to_string = "utf-8", serialize = "utf8")]
    Utf8,
    #[strum(to_string = "shift-jis", serialize = "shift_jis", serialize = "sjis")]
    ShiftJis,
}

impl InputEncoding {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Read a whole log file and decode it.
pub fn load_log<P: AsRef<Path>>(path: P, encoding: InputEncoding) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    decode(path, bytes, encoding)
}

fn decode(path: &Path, bytes: Vec<u8>, encoding: InputEncoding) -> Result<String> {
    match encoding {
        InputEncoding::Utf8 => {
            let text = String::from_utf8(bytes).map_err(|_| Error::InvalidEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-8",
            })?;
            Ok(match text.strip_prefix('\u{feff}') {
                Some(stripped) => stripped.to_string(),
                None => text,
            })
        }
        InputEncoding::ShiftJis => {
            let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
            if had_errors {
                warn!(
                    "{} contains bytes that are not valid Shift_JIS; they were replaced",
                    path.display()
                );
            }
            Ok(text.into_owned())
        }
    }
}
