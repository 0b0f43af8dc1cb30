//! hedl-par - Recursive-descent parser from tokens to an unresolved syntax
//! tree.
//!
//! The grammar is hand-written rather than generated: each production has
//! its own `parse_*` method, matching the style of a recursive-descent
//! front end. The parser never looks at raw source bytes except to recover
//! the literal `MAJOR.MINOR` text of a version number, since the lexer
//! folds that into a single numeric token.

pub mod ast;
pub mod error;

use ast::*;
use error::{ParseError, ParseResult};
use hedl_lex::{Directive, Token, TokenKind};
use hedl_model::NodeIdGen;
use hedl_util::symbol::Interner;
use hedl_util::{Span, Symbol};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    interner: &'a Interner,
    node_ids: NodeIdGen,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str, interner: &'a Interner) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            node_ids: NodeIdGen::new(),
        }
    }

    /// Parse the whole document, stopping at the first unrecoverable
    /// violation in strict mode.
    pub fn parse(&mut self) -> ParseResult<Ast> {
        self.skip_newlines();
        let mut version = None;
        let mut schemas = Vec::new();
        let mut aliases = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::Directive(Directive::Version) => {
                    let decl = self.parse_version_decl()?;
                    if version.is_some() {
                        return Err(ParseError::MultipleVersions { span: decl.span });
                    }
                    version = Some(decl);
                    self.skip_newlines();
                }
                TokenKind::Directive(Directive::Alias) => {
                    aliases.push(self.parse_alias_decl()?);
                    self.skip_newlines();
                }
                TokenKind::Directive(Directive::Schema) => {
                    schemas.push(self.parse_schema_decl()?);
                    self.skip_newlines();
                }
                TokenKind::Directive(Directive::Import) => {
                    self.skip_to_newline();
                    self.skip_newlines();
                }
                TokenKind::Separator => break,
                TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: self.peek_span() }),
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "a directive or '---'".to_string(),
                        span: self.peek_span(),
                    })
                }
            }
        }

        self.expect(TokenKind::Separator)?;
        self.skip_newlines();

        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek_kind(), TokenKind::Eof) {
                break;
            }
            body.push(self.parse_root_entry()?);
            self.skip_newlines();
        }

        Ok(Ast { version, schemas, aliases, body })
    }

    /// Parse the document, recovering at statement boundaries instead of
    /// stopping at the first error (lenient mode); every recoverable error
    /// is collected instead of raised.
    pub fn parse_lenient(&mut self) -> (Ast, Vec<ParseError>) {
        let mut errors = Vec::new();
        let mut version = None;
        let mut schemas = Vec::new();
        let mut aliases = Vec::new();

        self.skip_newlines();
        loop {
            match self.peek_kind() {
                TokenKind::Directive(Directive::Version) => match self.parse_version_decl() {
                    Ok(decl) => version = version.or(Some(decl)),
                    Err(e) => {
                        errors.push(e);
                        self.skip_to_newline();
                    }
                },
                TokenKind::Directive(Directive::Alias) => match self.parse_alias_decl() {
                    Ok(decl) => aliases.push(decl),
                    Err(e) => {
                        errors.push(e);
                        self.skip_to_newline();
                    }
                },
                TokenKind::Directive(Directive::Schema) => match self.parse_schema_decl() {
                    Ok(decl) => schemas.push(decl),
                    Err(e) => {
                        errors.push(e);
                        self.skip_to_newline();
                    }
                },
                TokenKind::Directive(Directive::Import) => self.skip_to_newline(),
                TokenKind::Separator => break,
                TokenKind::Eof => break,
                _ => {
                    errors.push(ParseError::UnexpectedToken {
                        expected: "a directive or '---'".to_string(),
                        span: self.peek_span(),
                    });
                    self.skip_to_newline();
                }
            }
            self.skip_newlines();
        }

        if matches!(self.peek_kind(), TokenKind::Separator) {
            self.advance();
        }
        self.skip_newlines();

        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek_kind(), TokenKind::Eof) {
                break;
            }
            match self.parse_root_entry() {
                Ok(entry) => body.push(entry),
                Err(e) => {
                    errors.push(e);
                    self.skip_to_newline();
                }
            }
        }

        (Ast { version, schemas, aliases, body }, errors)
    }

    fn parse_root_entry(&mut self) -> ParseResult<RootEntry> {
        let start = self.peek_span();
        let key = self.expect_bareword()?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_value()?;
        let span = start.merge(value.span);
        Ok(RootEntry { key, value, span })
    }

    fn parse_version_decl(&mut self) -> ParseResult<VersionDecl> {
        let start = self.peek_span();
        self.advance(); // %VERSION
        self.expect(TokenKind::Colon)?;
        let tok = self.advance();
        let text = self.text_of(tok.span);
        let (major, minor) = parse_major_minor(text).ok_or(ParseError::InvalidVersion { span: tok.span })?;
        Ok(VersionDecl { major, minor, span: start.merge(tok.span) })
    }

    fn parse_alias_decl(&mut self) -> ParseResult<AliasDecl> {
        let start = self.peek_span();
        self.advance(); // %ALIAS
        self.expect(TokenKind::Colon)?;
        let name = self.expect_bareword()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_value()?;
        let span = start.merge(value.span);
        Ok(AliasDecl { name, value, span })
    }

    fn parse_schema_decl(&mut self) -> ParseResult<SchemaDecl> {
        let start = self.peek_span();
        self.advance(); // %SCHEMA
        self.expect(TokenKind::Colon)?;
        let name = self.expect_bareword()?;
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            fields.push(self.parse_field_decl()?);
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            }
        }
        let end = self.peek_span();
        self.expect(TokenKind::RBrace)?;
        Ok(SchemaDecl { name, fields, span: start.merge(end) })
    }

    fn parse_field_decl(&mut self) -> ParseResult<RawFieldDecl> {
        let start = self.peek_span();
        let name = self.expect_bareword()?;
        let optional = if matches!(self.peek_kind(), TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_raw_type()?;
        let default = if matches!(self.peek_kind(), TokenKind::Equals) {
            self.advance();
            Some(self.parse_value()?)
        } else {
            None
        };
        let span = start.merge(self.prev_span());
        Ok(RawFieldDecl { name, ty, optional, default, span })
    }

    fn parse_raw_type(&mut self) -> ParseResult<RawType> {
        let sym = self.expect_bareword()?;
        Ok(match self.interner.resolve(sym) {
            "bool" => RawType::Bool,
            "int" => RawType::Integer,
            "float" => RawType::Float,
            "string" => RawType::String,
            "ref" => RawType::Reference,
            _ => RawType::Schema(sym),
        })
    }

    fn parse_value(&mut self) -> ParseResult<RawValue> {
        let span = self.peek_span();
        let id = self.node_ids.next();
        match self.peek_kind().clone() {
            TokenKind::Integer(v) => {
                self.advance();
                Ok(RawValue { kind: RawValueKind::Integer(v), span, id })
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(RawValue { kind: RawValueKind::Float(v), span, id })
            }
            TokenKind::String(sym) => {
                self.advance();
                Ok(RawValue { kind: RawValueKind::String(sym), span, id })
            }
            TokenKind::Reference(sym) => {
                self.advance();
                Ok(RawValue { kind: RawValueKind::Reference(sym), span, id })
            }
            TokenKind::LBracket => self.parse_list(id),
            TokenKind::LBrace => {
                let entries = self.parse_brace_entries()?;
                Ok(RawValue { kind: RawValueKind::Map(entries), span: span.merge(self.prev_span()), id })
            }
            TokenKind::Newline => self.parse_block_map(id),
            TokenKind::Bareword(sym) => {
                if matches!(self.peek_kind_at(1), TokenKind::LBrace) {
                    self.advance(); // schema name
                    let fields = self.parse_brace_entries()?;
                    return Ok(RawValue {
                        kind: RawValueKind::Record { schema: sym, fields },
                        span: span.merge(self.prev_span()),
                        id,
                    });
                }
                self.advance();
                let kind = match self.interner.resolve(sym) {
                    "true" => RawValueKind::Bool(true),
                    "false" => RawValueKind::Bool(false),
                    "null" => RawValueKind::Null,
                    _ => RawValueKind::String(sym),
                };
                Ok(RawValue { kind, span, id })
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "a value".to_string(),
                span,
            }),
        }
    }

    /// `key:` with nothing inline, followed by an indented block -- the
    /// `INDENT (key: value NEWLINE)* DEDENT` half of the `map` production.
    fn parse_block_map(&mut self, id: hedl_model::NodeId) -> ParseResult<RawValue> {
        let start = self.peek_span();
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek_kind(), TokenKind::Dedent(_) | TokenKind::Eof) {
                break;
            }
            let key = self.expect_bareword()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_newlines();
        }
        let end = self.peek_span();
        self.consume_dedent_level();
        Ok(RawValue { kind: RawValueKind::Map(entries), span: start.merge(end), id })
    }

    fn parse_brace_entries(&mut self) -> ParseResult<Vec<(Symbol, RawValue)>> {
        self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            let key = self.expect_bareword()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            entries.push((key, value));
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(entries)
    }

    fn parse_list(&mut self, id: hedl_model::NodeId) -> ParseResult<RawValue> {
        let start = self.peek_span();
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBracket) {
            items.push(self.parse_value()?);
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            }
        }
        let end = self.peek_span();
        self.expect(TokenKind::RBracket)?;
        let span = start.merge(end);

        let matrix_schema = classify_matrix(&items);
        let kind = match matrix_schema {
            Some(schema) => {
                let rows = items
                    .into_iter()
                    .map(|v| match v.kind {
                        RawValueKind::Record { fields, .. } => fields,
                        _ => unreachable!("classify_matrix only admits records"),
                    })
                    .collect();
                RawValueKind::List(RawList::Matrix(rows, schema))
            }
            None => RawValueKind::List(RawList::Flat(items)),
        };
        Ok(RawValue { kind, span, id })
    }

    // --- token-stream plumbing -----------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn peek_span(&self) -> Span {
        self.peek().span
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1).min(self.tokens.len() - 1)].span
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(&kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{kind:?}"),
                span: self.peek_span(),
            })
        }
    }

    fn expect_bareword(&mut self) -> ParseResult<Symbol> {
        match self.peek_kind().clone() {
            TokenKind::Bareword(sym) => {
                self.advance();
                Ok(sym)
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "an identifier".to_string(),
                span: self.peek_span(),
            }),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_to_newline(&mut self) {
        while !matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Eof) {
            self.advance();
        }
        if matches!(self.peek_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// Consume one level of a `Dedent(n)` token, leaving `n - 1` behind for
    /// the enclosing block map to consume in turn.
    fn consume_dedent_level(&mut self) {
        if let TokenKind::Dedent(n) = *self.peek_kind() {
            if n > 1 {
                let span = self.peek_span();
                self.tokens[self.pos] = Token::new(TokenKind::Dedent(n - 1), span);
            } else {
                self.advance();
            }
        }
    }

    fn text_of(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }
}

fn parse_major_minor(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.splitn(2, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// A list of records is a matrix when every element shares one schema name
/// and an identical field ordering.
fn classify_matrix(items: &[RawValue]) -> Option<Symbol> {
    if items.is_empty() {
        return None;
    }
    let mut schema = None;
    let mut order: Option<Vec<Symbol>> = None;
    for item in items {
        match &item.kind {
            RawValueKind::Record { schema: s, fields } => {
                if let Some(expected) = schema {
                    if expected != *s {
                        return None;
                    }
                } else {
                    schema = Some(*s);
                }
                let field_order: Vec<Symbol> = fields.iter().map(|(k, _)| *k).collect();
                match &order {
                    Some(o) if *o != field_order => return None,
                    None => order = Some(field_order),
                    _ => {}
                }
            }
            _ => return None,
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_lex::Lexer;
    use hedl_util::FileId;

    fn parse(src: &str) -> Ast {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        Parser::new(tokens, src, &interner).parse().unwrap()
    }

    #[test]
    fn parses_version_and_flat_body() {
        let ast = parse("%VERSION: 1.0\n---\nname: Alice\nage: 30\n");
        let v = ast.version.unwrap();
        assert_eq!((v.major, v.minor), (1, 0));
        assert_eq!(ast.body.len(), 2);
    }

    #[test]
    fn parses_alias_and_reference() {
        let ast = parse("%VERSION: 1.0\n%ALIAS: prod = production\n---\nenvironment: @prod\n");
        assert_eq!(ast.aliases.len(), 1);
        assert!(matches!(ast.body[0].value.kind, RawValueKind::Reference(_)));
    }

    #[test]
    fn parses_schema_with_optional_field() {
        let ast = parse("%VERSION: 1.0\n%SCHEMA: Point { x: int, y?: int = 0 }\n---\nk: 1\n");
        let schema = &ast.schemas[0];
        assert!(!schema.fields[0].optional);
        assert!(schema.fields[1].optional);
    }

    #[test]
    fn classifies_matrix_list() {
        let ast = parse(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\n",
        );
        match &ast.body[0].value.kind {
            RawValueKind::List(RawList::Matrix(rows, _)) => assert_eq!(rows.len(), 2),
            other => panic!("expected matrix, got {other:?}"),
        }
    }

    #[test]
    fn parses_block_map() {
        let ast = parse("%VERSION: 1.0\n---\nparent:\n  child: 1\n");
        match &ast.body[0].value.kind {
            RawValueKind::Map(entries) => assert_eq!(entries.len(), 1),
            other => panic!("expected map, got {other:?}"),
        }
    }
}
