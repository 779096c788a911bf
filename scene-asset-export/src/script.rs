/// Statement writer producing the viewer's object-literal script
use crate::settings::ExportSettings;
use std::fmt;
use std::io::{self, Write};

/// Sparse object literal with unquoted keys, e.g. `{width:64,height:64,data:"..."}`.
/// Fields keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectLiteral {
    fields: Vec<(&'static str, String)>,
}

impl ObjectLiteral {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field whose value is emitted verbatim.
    pub fn raw(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    pub fn int(self, key: &'static str, value: impl Into<i64>) -> Self {
        let value: i64 = value.into();
        self.raw(key, value.to_string())
    }

    /// Adds a registry handle.
    pub fn handle(self, key: &'static str, index: usize) -> Self {
        self.raw(key, index.to_string())
    }

    pub fn number(self, key: &'static str, value: f64) -> Self {
        self.raw(key, value.to_string())
    }

    /// Adds a double-quoted, JSON-escaped string.
    pub fn string(self, key: &'static str, value: &str) -> Self {
        let quoted = serde_json::Value::from(value).to_string();
        self.raw(key, quoted)
    }

    /// Adds a single-quoted string. The caller supplies already escaped text.
    pub fn single_quoted(self, key: &'static str, escaped: &str) -> Self {
        self.raw(key, format!("'{}'", escaped))
    }

    pub fn null(self, key: &'static str) -> Self {
        self.raw(key, "null")
    }

    /// Adds `key:1` only when the flag is set.
    pub fn flag(self, key: &'static str, value: bool) -> Self {
        if value { self.raw(key, "1") } else { self }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ObjectLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", key, value)?;
        }
        f.write_str("}")
    }
}

/// Appends assignment statements to a shared output stream.
pub struct ScriptWriter<W: Write> {
    inner: W,
    namespace_prefix: Option<String>,
    section_comments: bool,
    statements: usize,
}

impl<W: Write> ScriptWriter<W> {
    /// Creates a writer with bare namespaces and section comments enabled.
    pub fn new(inner: W) -> Self {
        Self::with_settings(inner, &ExportSettings::default())
    }

    pub fn with_settings(inner: W, settings: &ExportSettings) -> Self {
        Self {
            inner,
            namespace_prefix: settings.namespace_prefix.clone(),
            section_comments: settings.section_comments,
            statements: 0,
        }
    }

    /// Writes a `// title` header when section comments are enabled.
    pub fn section(&mut self, title: &str) -> io::Result<()> {
        if self.section_comments {
            write!(self.inner, "\n// {}\n", title)?;
        }
        Ok(())
    }

    /// Writes `namespace[index] = value;`.
    pub fn assign(
        &mut self,
        namespace: &str,
        index: usize,
        value: &ObjectLiteral,
    ) -> io::Result<()> {
        match &self.namespace_prefix {
            Some(prefix) => {
                writeln!(self.inner, "{}.{}[{}] = {};", prefix, namespace, index, value)?
            }
            None => writeln!(self.inner, "{}[{}] = {};", namespace, index, value)?,
        }
        self.statements += 1;
        Ok(())
    }

    /// Number of assignment statements written so far.
    pub fn statements(&self) -> usize {
        self.statements
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
