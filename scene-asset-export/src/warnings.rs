/// Non-fatal diagnostics raised while writing registries

/// Receives warnings that must not abort the export.
pub trait WarningSink {
    fn warn(&mut self, message: String);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWarnings;

impl WarningSink for LogWarnings {
    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
    }
}

/// Keeps warnings in memory so callers can inspect them afterwards.
#[derive(Debug, Default, Clone)]
pub struct CollectedWarnings {
    messages: Vec<String>,
}

impl CollectedWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl WarningSink for CollectedWarnings {
    fn warn(&mut self, message: String) {
        self.messages.push(message);
    }
}
