//! Token types produced by the lexer

use std::fmt;

/// Kind of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_]*` that is not a keyword
    Identifier,
    /// A digit followed by digits and dots
    Number,
    /// Single- or double-quoted text, quotes included
    String,

    // Keywords
    /// `node`
    Node,
    /// `workspace`
    Workspace,
    /// `connections`
    Connections,
    /// `inputs`
    Inputs,
    /// `outputs`
    Outputs,
    /// `parameters`
    Parameters,

    // Punctuation
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=`
    Equals,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `->`
    Arrow,

    /// `//` to end of line
    Comment,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Match a word against the reserved set (case-sensitive)
    pub fn keyword(word: &str) -> Option<Self> {
        match word {
            "node" => Some(TokenKind::Node),
            "workspace" => Some(TokenKind::Workspace),
            "connections" => Some(TokenKind::Connections),
            "inputs" => Some(TokenKind::Inputs),
            "outputs" => Some(TokenKind::Outputs),
            "parameters" => Some(TokenKind::Parameters),
            _ => None,
        }
    }

    /// Whether this kind is one of the reserved words
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Node
                | TokenKind::Workspace
                | TokenKind::Connections
                | TokenKind::Inputs
                | TokenKind::Outputs
                | TokenKind::Parameters
        )
    }
}

/// A lexical token with the 1-based position of its first character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind
    pub kind: TokenKind,
    /// Source text of the token (empty for EOF)
    pub text: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

impl Token {
    /// Create a token
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// Whether the token is of the given kind
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Content of a string token with its quotes removed.
    ///
    /// An unterminated string has no closing quote to strip.
    pub fn unquoted(&self) -> &str {
        let mut chars = self.text.chars();
        let Some(quote) = chars.next() else {
            return "";
        };
        let body = &self.text[quote.len_utf8()..];
        if body.ends_with(quote) {
            &body[..body.len() - quote.len_utf8()]
        } else {
            body
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::String => write!(f, "string {}", self.text),
            TokenKind::Comment => f.write_str("comment"),
            kind if kind.is_keyword() => write!(f, "keyword '{}'", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
