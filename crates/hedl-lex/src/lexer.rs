//! The tokenizer proper.
//!
//! Indentation is only meaningful while the lexer is at bracket depth zero
//! (outside any `[...]` / `{...}` flow form); inside brackets, newlines are
//! insignificant layout and commas separate elements, matching the flow-form
//! half of the document grammar.

use crate::cursor::Cursor;
use crate::error::{LexError, LexResult};
use crate::token::{Directive, Token, TokenKind};
use hedl_util::symbol::Interner;
use hedl_util::{FileId, Span};

const INDENT_WIDTH: u32 = 4;

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file: FileId,
    interner: &'a mut Interner,
    indent_stack: Vec<u32>,
    bracket_depth: u32,
    at_line_start: bool,
    pending: std::collections::VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: FileId, interner: &'a mut Interner) -> Self {
        Self {
            cursor: Cursor::new(source),
            file,
            interner,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            pending: std::collections::VecDeque::new(),
        }
    }

    /// Tokenize the entire source, stopping at the first hard error.
    ///
    /// Any indentation still open when the source ends is closed with a
    /// synthesized `Dedent` before the final `Eof`, so the parser never has
    /// to special-case end-of-input while unwinding block maps.
    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if matches!(tok.kind, TokenKind::Eof) {
                if self.indent_stack.len() > 1 {
                    let levels = (self.indent_stack.len() - 1) as u32;
                    self.indent_stack.truncate(1);
                    tokens.push(Token::new(TokenKind::Dedent(levels), tok.span));
                }
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn span(&self, start: usize, end: usize, line: u32, column: u32) -> Span {
        Span::with_file(start as u32, end as u32, line, column, self.file)
    }

    fn next_token(&mut self) -> LexResult<Token> {
        if let Some(tok) = self.pending.pop_front() {
            return Ok(tok);
        }

        if self.at_line_start && self.bracket_depth == 0 {
            if let Some(tok) = self.handle_indentation()? {
                return Ok(tok);
            }
        }
        self.at_line_start = false;

        self.skip_inline_whitespace_and_comments();

        let start = self.cursor.position();
        let (line, column) = (self.cursor.line(), self.cursor.column());

        if self.cursor.is_at_end() {
            return Ok(Token::new(
                TokenKind::Eof,
                self.span(start, start, line, column),
            ));
        }

        let c = self.cursor.current_char();

        if c == '\n' {
            self.cursor.advance();
            self.at_line_start = true;
            if self.bracket_depth > 0 {
                return self.next_token();
            }
            return Ok(Token::new(
                TokenKind::Newline,
                self.span(start, self.cursor.position(), line, column),
            ));
        }

        match c {
            '%' => self.lex_directive(start, line, column),
            '@' => self.lex_reference(start, line, column),
            '"' => self.lex_string(start, line, column),
            ':' => self.single(TokenKind::Colon, start, line, column),
            ',' => self.single(TokenKind::Comma, start, line, column),
            '=' => self.single(TokenKind::Equals, start, line, column),
            '.' => self.single(TokenKind::Dot, start, line, column),
            '?' => self.single(TokenKind::Question, start, line, column),
            '{' => {
                self.bracket_depth += 1;
                self.single(TokenKind::LBrace, start, line, column)
            }
            '}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                self.single(TokenKind::RBrace, start, line, column)
            }
            '[' => {
                self.bracket_depth += 1;
                self.single(TokenKind::LBracket, start, line, column)
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                self.single(TokenKind::RBracket, start, line, column)
            }
            '-' if self.cursor.peek_char(1) == '-' && self.cursor.peek_char(2) == '-' => {
                self.lex_separator(start, line, column)
            }
            c if c == '-' || c.is_ascii_digit() => self.lex_number(start, line, column),
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_bareword(start, line, column),
            c => {
                let span = self.span(start, start + c.len_utf8(), line, column);
                self.cursor.advance();
                Err(LexError::UnexpectedCharacter { found: c, span })
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize, line: u32, column: u32) -> LexResult<Token> {
        self.cursor.advance();
        Ok(Token::new(kind, self.span(start, self.cursor.position(), line, column)))
    }

    /// Skip spaces/tabs and `#`-comments within a line (not newlines).
    fn skip_inline_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' => self.cursor.advance(),
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// At the start of a line (bracket depth zero): measure indentation and
    /// emit INDENT/DEDENT tokens against the indent stack. Returns `Ok(None)`
    /// once indentation has been consumed and ordinary lexing should resume
    /// on this line.
    fn handle_indentation(&mut self) -> LexResult<Option<Token>> {
        let line_start = self.cursor.position();
        let (line, _) = (self.cursor.line(), self.cursor.column());
        let mut width = 0u32;
        let mut saw_space = false;
        let mut saw_tab = false;
        loop {
            match self.cursor.current_char() {
                ' ' => {
                    saw_space = true;
                    width += 1;
                    self.cursor.advance();
                }
                '\t' => {
                    saw_tab = true;
                    width += INDENT_WIDTH;
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        if saw_space && saw_tab {
            let span = self.span(line_start, self.cursor.position(), line, 1);
            return Err(LexError::MixedIndent { span });
        }

        // Blank line or comment-only line: indentation doesn't count, fold
        // straight through to the newline/EOF handling below.
        if self.cursor.is_at_end() || self.cursor.current_char() == '\n' || self.cursor.current_char() == '#' {
            self.at_line_start = false;
            return Ok(None);
        }

        self.at_line_start = false;
        let current = *self.indent_stack.last().unwrap();
        if width > current {
            self.indent_stack.push(width);
            return Ok(Some(Token::new(
                TokenKind::Indent,
                self.span(line_start, self.cursor.position(), line, 1),
            )));
        }
        if width < current {
            let mut levels = 0;
            while *self.indent_stack.last().unwrap() > width {
                self.indent_stack.pop();
                levels += 1;
            }
            return Ok(Some(Token::new(
                TokenKind::Dedent(levels),
                self.span(line_start, self.cursor.position(), line, 1),
            )));
        }
        Ok(None)
    }

    fn lex_directive(&mut self, start: usize, line: u32, column: u32) -> LexResult<Token> {
        self.cursor.advance(); // '%'
        let word_start = self.cursor.position();
        while self.cursor.current_char().is_ascii_alphabetic() {
            self.cursor.advance();
        }
        let word = self.cursor.slice_from(word_start);
        let directive = match word {
            "VERSION" => Directive::Version,
            "ALIAS" => Directive::Alias,
            "SCHEMA" => Directive::Schema,
            "IMPORT" => Directive::Import,
            other => {
                let span = self.span(start, self.cursor.position(), line, column);
                return Err(LexError::UnknownDirective { found: other.to_string(), span });
            }
        };
        Ok(Token::new(
            TokenKind::Directive(directive),
            self.span(start, self.cursor.position(), line, column),
        ))
    }

    fn lex_separator(&mut self, start: usize, line: u32, column: u32) -> LexResult<Token> {
        self.cursor.advance_n(3);
        Ok(Token::new(
            TokenKind::Separator,
            self.span(start, self.cursor.position(), line, column),
        ))
    }

    fn lex_reference(&mut self, start: usize, line: u32, column: u32) -> LexResult<Token> {
        self.cursor.advance(); // '@'
        let path_start = self.cursor.position();
        if !is_ident_start(self.cursor.current_char()) {
            let span = self.span(start, self.cursor.position(), line, column);
            return Err(LexError::UnterminatedReference { span });
        }
        while is_ident_continue(self.cursor.current_char()) || self.cursor.current_char() == '.' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(path_start);
        if text.is_empty() || text.ends_with('.') {
            let span = self.span(start, self.cursor.position(), line, column);
            return Err(LexError::UnterminatedReference { span });
        }
        let sym = self.interner.intern(text);
        Ok(Token::new(
            TokenKind::Reference(sym),
            self.span(start, self.cursor.position(), line, column),
        ))
    }

    fn lex_bareword(&mut self, start: usize, line: u32, column: u32) -> LexResult<Token> {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let sym = self.interner.intern(text);
        Ok(Token::new(
            TokenKind::Bareword(sym),
            self.span(start, self.cursor.position(), line, column),
        ))
    }

    fn lex_number(&mut self, start: usize, line: u32, column: u32) -> LexResult<Token> {
        if self.cursor.current_char() == '-' {
            self.cursor.advance();
        }
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let mut is_float = false;
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        if matches!(self.cursor.current_char(), 'e' | 'E') {
            let save = self.cursor.snapshot();
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
            }
            if self.cursor.current_char().is_ascii_digit() {
                is_float = true;
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
            } else {
                self.cursor.restore(save);
            }
        }

        let text = self.cursor.slice_from(start);
        let span = self.span(start, self.cursor.position(), line, column);
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| LexError::NumericOutOfRange { span })?;
            Ok(Token::new(TokenKind::Float(value), span))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| LexError::NumericOutOfRange { span })?;
            Ok(Token::new(TokenKind::Integer(value), span))
        }
    }

    fn lex_string(&mut self, start: usize, line: u32, column: u32) -> LexResult<Token> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                let span = self.span(start, self.cursor.position(), line, column);
                return Err(LexError::UnterminatedString { span });
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\n' => {
                    let span = self.span(start, self.cursor.position(), line, column);
                    return Err(LexError::UnterminatedString { span });
                }
                '\\' => {
                    let escape_start = self.cursor.position();
                    self.cursor.advance();
                    match self.cursor.current_char() {
                        'n' => {
                            value.push('\n');
                            self.cursor.advance();
                        }
                        't' => {
                            value.push('\t');
                            self.cursor.advance();
                        }
                        'r' => {
                            value.push('\r');
                            self.cursor.advance();
                        }
                        '\\' => {
                            value.push('\\');
                            self.cursor.advance();
                        }
                        '"' => {
                            value.push('"');
                            self.cursor.advance();
                        }
                        'u' => {
                            self.cursor.advance();
                            let code = self.lex_unicode_escape(escape_start, line, column)?;
                            value.push(code);
                        }
                        other => {
                            let span = self.span(escape_start, self.cursor.position() + 1, line, column);
                            return Err(LexError::InvalidEscape { found: other, span });
                        }
                    }
                }
                c => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        let sym = self.interner.intern(&value);
        Ok(Token::new(
            TokenKind::String(sym),
            self.span(start, self.cursor.position(), line, column),
        ))
    }

    fn lex_unicode_escape(&mut self, escape_start: usize, line: u32, column: u32) -> LexResult<char> {
        let digits_start = self.cursor.position();
        for _ in 0..4 {
            if !self.cursor.current_char().is_ascii_hexdigit() {
                let span = self.span(escape_start, self.cursor.position(), line, column);
                return Err(LexError::MalformedUnicodeEscape { span });
            }
            self.cursor.advance();
        }
        let hex = self.cursor.slice_from(digits_start);
        let code = u32::from_str_radix(hex, 16).unwrap();
        char::from_u32(code).ok_or_else(|| LexError::MalformedUnicodeEscape {
            span: self.span(escape_start, self.cursor.position(), line, column),
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_util::FileId;

    fn lex(src: &str) -> Vec<Token> {
        let mut interner = Interner::new();
        Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap()
    }

    #[test]
    fn lexes_version_directive() {
        let tokens = lex("%VERSION: 1.0\n---\n");
        assert!(matches!(tokens[0].kind, TokenKind::Directive(Directive::Version)));
    }

    #[test]
    fn lexes_separator() {
        let tokens = lex("---\n");
        assert!(matches!(tokens[0].kind, TokenKind::Separator));
    }

    #[test]
    fn lexes_negative_integer_and_float() {
        let tokens = lex("-5 3.25\n");
        assert!(matches!(tokens[0].kind, TokenKind::Integer(-5)));
        assert!(matches!(tokens[1].kind, TokenKind::Float(f) if (f - 3.25).abs() < f64::EPSILON));
    }

    #[test]
    fn lexes_reference_with_dotted_path() {
        let tokens = lex("@schema.field\n");
        match &tokens[0].kind {
            TokenKind::Reference(_) => {}
            other => panic!("expected reference, got {other:?}"),
        }
    }

    #[test]
    fn string_escapes_are_resolved() {
        let mut interner = Interner::new();
        let tokens = Lexer::new(r#""a\nb""#, FileId::DUMMY, &mut interner)
            .tokenize()
            .unwrap();
        match tokens[0].kind {
            TokenKind::String(sym) => assert_eq!(interner.resolve(sym), "a\nb"),
            _ => panic!("expected string token"),
        }
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut interner = Interner::new();
        let err = Lexer::new("\"abc", FileId::DUMMY, &mut interner).tokenize();
        assert!(matches!(err, Err(LexError::UnterminatedString { .. })));
    }

    #[test]
    fn indent_then_dedent_round_trips() {
        let tokens = lex("a:\n  b: 1\nc: 2\n");
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::Indent)));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::Dedent(1))));
    }

    #[test]
    fn mixed_tabs_and_spaces_is_an_error() {
        let mut interner = Interner::new();
        let err = Lexer::new("a:\n \tb: 1\n", FileId::DUMMY, &mut interner).tokenize();
        assert!(matches!(err, Err(LexError::MixedIndent { .. })));
    }

    #[test]
    fn newlines_are_insignificant_inside_brackets() {
        let tokens = lex("[\n1,\n2\n]\n");
        let newline_count = tokens.iter().filter(|t| matches!(t.kind, TokenKind::Newline)).count();
        assert_eq!(newline_count, 1);
    }
}
