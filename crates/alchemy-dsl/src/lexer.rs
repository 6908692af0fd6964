//! Lexer for workflow source text.
//!
//! Converts source text into a stream of [`Token`]s. The lexer never fails:
//! characters that start no token are dropped, and an unterminated string runs
//! to the end of input. Comments are emitted as tokens and left for the parser
//! to skip.

use crate::token::{Token, TokenKind};

/// Tokenize a source string. The result always ends with an EOF token.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

/// Single-pass scanner over the characters of a source string
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    /// Create a lexer positioned at line 1, column 1
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Scan the whole input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
                break;
            }

            let token = match self.peek() {
                '/' if self.peek_next() == Some('/') => self.lex_comment(),
                '-' if self.peek_next() == Some('>') => {
                    let (line, col) = (self.line, self.col);
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::Arrow, "->", line, col)
                }
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                '{' => self.single_char(TokenKind::LBrace),
                '}' => self.single_char(TokenKind::RBrace),
                '=' => self.single_char(TokenKind::Equals),
                ',' => self.single_char(TokenKind::Comma),
                ':' => self.single_char(TokenKind::Colon),
                ';' => self.single_char(TokenKind::Semicolon),
                '.' => self.single_char(TokenKind::Dot),
                quote @ ('"' | '\'') => self.lex_string(quote),
                '0'..='9' => self.lex_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.lex_ident_or_keyword(),
                other => {
                    tracing::trace!(
                        "Skipping unexpected character {:?} at {}:{}",
                        other,
                        self.line,
                        self.col
                    );
                    self.advance();
                    continue;
                }
            };

            tokens.push(token);
        }

        tokens
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    /// Consume characters while `pred` holds, returning them
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while !self.is_at_end() && pred(self.peek()) {
            text.push(self.advance());
        }
        text
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let (line, col) = (self.line, self.col);
        let ch = self.advance();
        Token::new(kind, ch.to_string(), line, col)
    }

    fn lex_comment(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let text = self.take_while(|c| c != '\n');
        Token::new(TokenKind::Comment, text, line, col)
    }

    fn lex_string(&mut self, quote: char) -> Token {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        text.push(self.advance());

        while !self.is_at_end() {
            let ch = self.advance();
            text.push(ch);
            if ch == quote {
                break;
            }
        }

        Token::new(TokenKind::String, text, line, col)
    }

    fn lex_number(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
        Token::new(TokenKind::Number, text, line, col)
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, col)
    }
}
