/// Registry of JSON files embedded verbatim into the script
use crate::constants::{JSONS_NAMESPACE, JSONS_SECTION};
use crate::error::ExportError;
use crate::registry::Registry;
use crate::script::{ObjectLiteral, ScriptWriter};
use crate::warnings::WarningSink;
use std::fs;
use std::io::{ErrorKind, Write};

/// JSON documents keyed by path. Two paths with identical content stay distinct.
#[derive(Debug, Clone, Default)]
pub struct JsonRegistry {
    paths: Registry<String>,
}

impl JsonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_path(&mut self, path: impl Into<String>) -> usize {
        self.paths.intern(path.into())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.paths.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Reads every file in index order and writes `jsons[i] = {data:'...'}`.
    /// Unreadable or non UTF-8 files produce `{data:null}` and a warning.
    pub fn write<W: Write>(
        self,
        out: &mut ScriptWriter<W>,
        warnings: &mut dyn WarningSink,
    ) -> Result<usize, ExportError> {
        if self.paths.is_empty() {
            return Ok(0);
        }

        out.section(JSONS_SECTION)?;
        let count = self.paths.len();
        for (index, path) in self.paths.into_items().into_iter().enumerate() {
            let record = match fs::read(&path) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => ObjectLiteral::new().single_quoted("data", &escape(&text)),
                    Err(e) => {
                        warnings.warn(format!("JSON file is not valid UTF-8: {}: {}", path, e));
                        ObjectLiteral::new().null("data")
                    }
                },
                Err(e) => {
                    if e.kind() == ErrorKind::NotFound {
                        warnings.warn(format!("JSON file not found: {}", path));
                    } else {
                        warnings.warn(format!("JSON file could not be read: {}: {}", path, e));
                    }
                    ObjectLiteral::new().null("data")
                }
            };
            out.assign(JSONS_NAMESPACE, index, &record)?;
        }

        Ok(count)
    }
}

/// Escapes text for a single-quoted string literal.
/// Backslashes go first so later substitutions are not doubled.
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

/// Inverse of `escape`. Unknown escape sequences are kept as written.
pub fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('n') => result.push('\n'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
