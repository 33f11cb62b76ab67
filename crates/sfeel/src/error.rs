//! Error types for S-FEEL lexing and parsing.
//!
//! The `Display` text of each variant is exactly the diagnostic message a
//! caller sees.

use thiserror::Error;

/// Errors that can occur while lexing or parsing S-FEEL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SFeelError {
    /// A token that the grammar cannot accept at this point.
    #[error("Syntax error at token '{token}'")]
    Syntax {
        /// Byte offset of the offending token.
        position: usize,
        /// Source text of the offending token.
        token: String,
    },

    /// The input ended while an expression was still open.
    #[error("Syntax error at EOF")]
    UnexpectedEof,

    /// A character that starts no token.
    #[error("Illegal character '{ch}'")]
    IllegalCharacter {
        /// Byte offset of the character.
        position: usize,
        /// The character itself.
        ch: char,
    },

    /// Empty or whitespace-only input.
    #[error("empty S-FEEL expression")]
    EmptyExpression,
}

/// Result type for S-FEEL parsing operations.
pub type SFeelResult<T> = std::result::Result<T, SFeelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_syntax() {
        let err = SFeelError::Syntax {
            position: 4,
            token: "+".to_string(),
        };
        assert_eq!(err.to_string(), "Syntax error at token '+'");
    }

    #[test]
    fn test_error_display_eof() {
        assert_eq!(SFeelError::UnexpectedEof.to_string(), "Syntax error at EOF");
    }

    #[test]
    fn test_error_display_illegal_character() {
        let err = SFeelError::IllegalCharacter { position: 0, ch: '$' };
        assert_eq!(err.to_string(), "Illegal character '$'");
    }
}
