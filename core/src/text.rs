use std::path::Path;

use crate::error::UnreadableFile;

const UTF8_BOM: &str = "\u{feff}";

/// Reads `path` as UTF-8 text and splits it into lines.
///
/// Line terminators (`\n`, `\r\n` or a lone `\r`) are not part of the
/// returned lines. A trailing terminator does not produce an empty last line.
pub fn read_lines(path: &Path) -> Result<Vec<String>, UnreadableFile> {
    let bytes = std::fs::read(path).map_err(|source| UnreadableFile::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8(bytes).map_err(|err| UnreadableFile::Decode {
        path: path.to_path_buf(),
        offset: err.utf8_error().valid_up_to(),
    })?;

    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);
    Ok(split_lines(text))
}

pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(['\n', '\r']) {
            Some(idx) => {
                lines.push(rest[..idx].to_string());
                let after = &rest[idx..];
                rest = if after.starts_with("\r\n") {
                    &after[2..]
                } else {
                    &after[1..]
                };
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }

    lines
}
