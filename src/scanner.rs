use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::token::{keyword_kind, Position, Token, TokenKind};

/// Pull-based tokenizer. Each call to `scan_next_token` advances the
/// cursor past whitespace and comments and returns exactly one token;
/// past end of input it returns `Eof` any number of times.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    row: usize,
    column: usize,
    in_block_comment: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            row: 1,
            column: 1,
            in_block_comment: false,
        }
    }

    pub fn scan_next_token(&mut self) -> Token {
        loop {
            if self.in_block_comment {
                if !self.close_block_comment() {
                    return self.eof_token();
                }
                continue;
            }

            match self.peek_char() {
                None => return self.eof_token(),
                Some(c) if c.is_whitespace() => {
                    self.advance();
                    continue;
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    self.skip_line_comment();
                    continue;
                }
                Some('/') if self.peek_next_char() == Some('*') => {
                    self.advance();
                    self.advance();
                    self.in_block_comment = true;
                    continue;
                }
                _ => break,
            }
        }

        let position = self.position();
        let c = self.advance().expect("a token start character to exist after the lookahead above");

        match c {
            '(' => Token::new(TokenKind::LParen, "(", position),
            ')' => Token::new(TokenKind::RParen, ")", position),
            '+' => Token::new(TokenKind::Plus, "+", position),
            '-' => Token::new(TokenKind::Minus, "-", position),
            '*' => Token::new(TokenKind::Star, "*", position),
            '/' => Token::new(TokenKind::Slash, "/", position),
            '<' => Token::new(TokenKind::Less, "<", position),
            '&' => Token::new(TokenKind::Ampersand, "&", position),
            '!' => Token::new(TokenKind::Bang, "!", position),
            ';' => Token::new(TokenKind::Semicolon, ";", position),
            '=' => Token::new(TokenKind::Equal, "=", position),
            ':' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::ColonEqual, ":=", position)
                } else {
                    Token::new(TokenKind::Colon, ":", position)
                }
            }
            '.' => {
                if self.peek_char() == Some('.') {
                    self.advance();
                    Token::new(TokenKind::DotDot, "..", position)
                } else {
                    Token::new(TokenKind::Error, "illegal character '.'", position)
                }
            }
            '"' => self.scan_string(position),
            d if d.is_ascii_digit() => self.scan_integer(d, position),
            a if a.is_ascii_alphabetic() => self.scan_identifier(a, position),
            other => Token::new(
                TokenKind::Error,
                format!("illegal character '{other}'"),
                position,
            ),
        }
    }

    fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    fn eof_token(&self) -> Token {
        Token::new(TokenKind::Eof, "EOF", self.position())
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source.next()?;
        if c == '\n' {
            self.row += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.source.peek().copied()
    }

    fn peek_next_char(&mut self) -> Option<char> {
        self.source.peek_next().copied()
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Consumes up to and including the closing `*/`. Returns `false` if
    /// end of input is reached first, leaving block-comment mode set so
    /// the caller can report `Eof` instead of looping.
    fn close_block_comment(&mut self) -> bool {
        loop {
            match self.peek_char() {
                None => return false,
                Some('*') if self.peek_next_char() == Some('/') => {
                    self.advance();
                    self.advance();
                    self.in_block_comment = false;
                    return true;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_string(&mut self, position: Position) -> Token {
        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Token::new(TokenKind::Error, "unterminated string", position);
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => {
                            self.advance();
                            value.push('\n');
                        }
                        Some('"') => {
                            self.advance();
                            value.push('"');
                        }
                        Some(other) => {
                            self.advance();
                            value.push('\\');
                            value.push(other);
                        }
                        None => {
                            return Token::new(TokenKind::Error, "unterminated string", position);
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        Token::new(TokenKind::StringLiteral, value, position)
    }

    fn scan_integer(&mut self, first: char, position: Position) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::IntLiteral, lexeme, position)
    }

    fn scan_identifier(&mut self, first: char, position: Position) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match keyword_kind(&lexeme) {
            Some(kind) => Token::new(kind, lexeme, position),
            None => Token::new(TokenKind::Identifier, lexeme, position),
        }
    }
}
