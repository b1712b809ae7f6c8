use thiserror::Error;

/// A pattern rejected by the transpiler, with the offending construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A `(` without a matching `)`, or a stray `)`.
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    /// A `\` at the very end of the pattern.
    #[error("lone backslash at end of pattern")]
    LoneBackslash,
    /// `\x` or `\u` not followed by the required hex digits.
    #[error("invalid hexadecimal escape")]
    InvalidHexEscape,
    /// A quantifier with nothing to repeat.
    #[error("quantifier without a preceding token")]
    UnexpectedQuantifier,
    /// A `{n,m}` quantifier with `m < n`.
    #[error("invalid numeric quantifier bounds")]
    InvalidNumericQuantifier,
    /// A `(?` group prefix the dialect does not define.
    #[error("illegal (? group prefix")]
    IllegalGroupPrefix,
    /// A named group whose name is empty or contains an illegal character.
    #[error("invalid group name")]
    InvalidGroupName,
    /// Two named groups with the same name.
    #[error("duplicate group name: {0}")]
    DuplicateGroupName(String),
    /// A named group whose name is not closed with `>`.
    #[error("unterminated group name")]
    UnterminatedGroupName,
    /// More than 999 capturing groups.
    #[error("capturing group limit (999) exceeded")]
    GroupLimitExceeded,
    /// A `[` without a closing `]`.
    #[error("unterminated character set")]
    UnterminatedCharSet,
    /// A character set with no members.
    #[error("empty character set")]
    EmptyCharSet,
    /// A character-set range whose low end is above its high end.
    #[error("reverse range in character set")]
    ReverseRange,
    /// A `\k<name>` naming no group in the pattern.
    #[error("invalid named backreference: {0}")]
    InvalidNamedBackreference(String),
}

/// Result type for transpilation.
pub type Result<T> = std::result::Result<T, Error>;
