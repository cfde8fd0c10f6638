//! Import declaration scanner for Go source files.
//!
//! Only the file header is lexed: the package clause followed by any number
//! of import declarations. Scanning stops at the first other top-level
//! declaration, which is where Go requires imports to end.

use std::collections::VecDeque;
use std::ops::Range;

/// One import path literal found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// The import path as written between the quotes (escapes are not decoded).
    pub path: String,
    /// Byte range of the path inside the source, excluding the quotes.
    pub span: Range<usize>,
}

/// Scans the package clause and import declarations of `src`.
pub fn scan_imports(src: &str) -> Result<Vec<ImportSpec>, String> {
    let mut tokens = TokenStream::new(src);
    let mut imports = Vec::new();

    loop {
        match tokens.next()? {
            Token::Semicolon => continue,
            Token::Ident("package") => break,
            other => return Err(format!("expected package clause, found {other:?}")),
        }
    }
    match tokens.next()? {
        Token::Ident(_) => {}
        other => return Err(format!("expected package name, found {other:?}")),
    }

    loop {
        match tokens.next()? {
            Token::Semicolon => continue,
            Token::Ident("import") => {}
            _ => break,
        }

        match tokens.next()? {
            Token::Punct('(') => loop {
                match tokens.next()? {
                    Token::Semicolon => continue,
                    Token::Punct(')') => break,
                    Token::Eof => return Err("unterminated import group".to_string()),
                    first => imports.push(import_spec(first, &mut tokens)?),
                }
            },
            first => imports.push(import_spec(first, &mut tokens)?),
        }
    }

    Ok(imports)
}

fn import_spec<'a>(first: Token<'a>, tokens: &mut TokenStream<'a>) -> Result<ImportSpec, String> {
    let literal = match first {
        Token::Ident(_) | Token::Punct('.') => tokens.next()?,
        other => other,
    };

    match literal {
        Token::Str { value, span } => Ok(ImportSpec {
            path: value.to_string(),
            span,
        }),
        other => Err(format!("expected import path, found {other:?}")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Str { value: &'a str, span: Range<usize> },
    Punct(char),
    Semicolon,
    Eof,
}

impl Token<'_> {
    /// Whether a newline after this token terminates the statement.
    fn ends_statement(&self) -> bool {
        matches!(
            self,
            Token::Ident(_) | Token::Str { .. } | Token::Punct(')')
        )
    }
}

/// Go tools skip a leading BOM before lexing.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Token stream with Go's automatic semicolon insertion.
struct TokenStream<'a> {
    lexer: Lexer<'a>,
    pending: VecDeque<Token<'a>>,
    prev_ends_statement: bool,
}

impl<'a> TokenStream<'a> {
    fn new(src: &'a str) -> Self {
        let pos = if src.starts_with(BYTE_ORDER_MARK) {
            BYTE_ORDER_MARK.len_utf8()
        } else {
            0
        };
        Self {
            lexer: Lexer { src, pos },
            pending: VecDeque::new(),
            prev_ends_statement: false,
        }
    }

    fn next(&mut self) -> Result<Token<'a>, String> {
        if let Some(token) = self.pending.pop_front() {
            self.prev_ends_statement = token.ends_statement();
            return Ok(token);
        }

        let (token, newline) = self.lexer.next_token()?;
        if newline && self.prev_ends_statement {
            self.pending.push_back(token);
            self.prev_ends_statement = false;
            return Ok(Token::Semicolon);
        }

        self.prev_ends_statement = token.ends_statement();
        Ok(token)
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Skips whitespace and comments, reporting whether a line break was
    /// crossed (including one inside a block comment).
    fn skip_trivia(&mut self) -> Result<bool, String> {
        let bytes = self.src.as_bytes();
        let mut newline = false;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' => {
                    newline = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if bytes.get(self.pos + 1) == Some(&b'*') => {
                    let rest = &self.src[self.pos + 2..];
                    let end = rest
                        .find("*/")
                        .ok_or_else(|| "unterminated block comment".to_string())?;
                    newline |= rest[..end].contains('\n');
                    self.pos += end + 4;
                }
                _ => break,
            }
        }

        Ok(newline)
    }

    fn next_token(&mut self) -> Result<(Token<'a>, bool), String> {
        let newline = self.skip_trivia()?;
        let src = self.src;
        let start = self.pos;
        let rest = &src[start..];

        let Some(c) = rest.chars().next() else {
            return Ok((Token::Eof, newline));
        };

        let token = match c {
            ';' => {
                self.pos += 1;
                Token::Semicolon
            }
            '"' => self.interpreted_string(start)?,
            '`' => {
                let end = rest[1..]
                    .find('`')
                    .ok_or_else(|| "unterminated raw string".to_string())?;
                self.pos = start + end + 2;
                Token::Str {
                    value: &rest[1..end + 1],
                    span: start + 1..start + 1 + end,
                }
            }
            c if c == '_' || c.is_alphabetic() => {
                let len = rest
                    .char_indices()
                    .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                self.pos = start + len;
                Token::Ident(&rest[..len])
            }
            c => {
                self.pos += c.len_utf8();
                Token::Punct(c)
            }
        };

        Ok((token, newline))
    }

    fn interpreted_string(&mut self, start: usize) -> Result<Token<'a>, String> {
        let src = self.src;
        let bytes = src.as_bytes();
        let mut i = start + 1;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    return Ok(Token::Str {
                        value: &src[start + 1..i],
                        span: start + 1..i,
                    });
                }
                b'\n' => break,
                _ => i += 1,
            }
        }

        Err("unterminated string literal".to_string())
    }
}
