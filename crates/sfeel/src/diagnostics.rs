//! Per-call diagnostics collector.

use crate::error::SFeelError;

/// Ordered list of diagnostic messages gathered during one call.
///
/// Lexical messages come first, then syntax errors, then anything the
/// evaluator reports. The collector is created empty at the start of every
/// call and handed back to the caller at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Appends the diagnostic text of an error.
    pub fn report(&mut self, error: &impl std::fmt::Display) {
        self.messages.push(error.to_string());
    }

    /// Appends every message from `other`, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Returns true if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Iterates over the messages in report order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Returns true if any message equals `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|m| m == message)
    }

    /// Consumes the collector, returning the messages.
    pub fn into_vec(self) -> Vec<String> {
        self.messages
    }
}

impl From<&SFeelError> for Diagnostics {
    fn from(error: &SFeelError) -> Self {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(error);
        diagnostics
    }
}

impl IntoIterator for Diagnostics {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(&SFeelError::IllegalCharacter { position: 0, ch: '#' });
        diagnostics.push("Undefined name 'x'");
        assert_eq!(
            diagnostics.into_vec(),
            vec!["Illegal character '#'".to_string(), "Undefined name 'x'".to_string()]
        );
    }

    #[test]
    fn test_extend_and_clear() {
        let mut first = Diagnostics::new();
        first.push("a");
        let mut second = Diagnostics::new();
        second.push("b");
        first.extend(second);
        assert_eq!(first.len(), 2);
        assert!(first.contains("b"));
        first.clear();
        assert!(first.is_empty());
    }
}
