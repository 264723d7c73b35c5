use tracing::debug;

/// Ordered audit trail of one turn.
///
/// Entries are plain strings so callers can diff them against golden files.
/// Each entry is mirrored to `tracing` at debug level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnLog {
    entries: Vec<String>,
}

impl TurnLog {
    pub fn new() -> Self {
        TurnLog::default()
    }

    pub fn record(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!(target: "turnwright::turn", "{}", entry);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// `+3`, `-2`, `0`.
pub(crate) fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_insertion_order() {
        let mut log = TurnLog::new();
        log.record("first");
        log.record(String::from("second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries(), ["first", "second"]);
        assert_eq!(log.into_entries(), vec!["first", "second"]);
    }

    #[test]
    fn signed_formats_deltas() {
        assert_eq!(signed(3), "+3");
        assert_eq!(signed(-2), "-2");
        assert_eq!(signed(0), "0");
    }
}
