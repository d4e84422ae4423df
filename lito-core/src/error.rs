use thiserror::Error;

/// Scanning failure. Every variant aborts the compilation; the lexer
/// does not resynchronize.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("invalid character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("expected {expected} at byte {position}")]
    ExpectedCharacter {
        expected: &'static str,
        position: usize,
        #[source]
        source: Box<LexError>,
    },
    #[error("unterminated string literal starting at byte {position}")]
    UnterminatedString { position: usize },
    #[error("unknown token {character:?} at byte {position}")]
    UnknownToken { character: char, position: usize },
}

impl LexError {
    /// Wraps an invalid-character cause into the "expected ..." shape
    /// used for malformed two-character operators and decimals.
    pub(crate) fn expected(expected: &'static str, character: char, position: usize) -> Self {
        LexError::ExpectedCharacter {
            expected,
            position,
            source: Box::new(LexError::InvalidCharacter {
                character,
                position,
            }),
        }
    }
}

/// Parsing or semantic failure. The expectation variant chains the
/// offending token as its source so diagnostics show both the unmet
/// expectation and what was actually found.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("invalid token {text:?} at byte {position}")]
    InvalidToken { text: String, position: usize },
    #[error("expected {expected}")]
    ExpectedToken {
        expected: String,
        #[source]
        source: Box<ParseError>,
    },
    #[error("undefined variable `{name}` at byte {position}")]
    UndefinedVariable { name: String, position: usize },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to write generated code: {0}")]
    EmitIo(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
