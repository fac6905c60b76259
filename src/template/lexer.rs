//! Tokenizer for template text.
//!
//! Text outside `{{ }}` becomes a single `Text` token; the inside of each
//! action is split into operand and punctuation tokens. Trim markers and
//! comments are resolved here so the parser never sees them.

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Text(String),
    Open,
    Close,
    Dot,
    /// `.A.B` without the leading dots.
    Field(Vec<String>),
    /// `$x.A.B`; the name keeps its `$` (`"$"` is the root variable).
    Variable(String, Vec<String>),
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Pipe,
    LParen,
    RParen,
    Comma,
    Declare,
    Assign,
}

impl Token {
    /// Short description used in error messages.
    pub(super) fn describe(&self) -> String {
        match self {
            Token::Text(_) => "text".to_string(),
            Token::Open => "{{".to_string(),
            Token::Close => "}}".to_string(),
            Token::Dot => "<.>".to_string(),
            Token::Field(chain) => format!("<.{}>", chain.join(".")),
            Token::Variable(name, chain) if chain.is_empty() => format!("<{}>", name),
            Token::Variable(name, chain) => format!("<{}.{}>", name, chain.join(".")),
            Token::Ident(name) => format!("<{}>", name),
            Token::Str(s) => format!("{:?}", s),
            Token::Int(n) => n.to_string(),
            Token::Float(n) => n.to_string(),
            Token::Pipe => "<|>".to_string(),
            Token::LParen => "<(>".to_string(),
            Token::RParen => "<)>".to_string(),
            Token::Comma => "<,>".to_string(),
            Token::Declare => "<:=>".to_string(),
            Token::Assign => "<=>".to_string(),
        }
    }
}

/// A token with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Spanned {
    pub token: Token,
    pub line: usize,
}

type LexResult<T> = Result<T, (usize, String)>;

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Spanned>,
    text: String,
    text_line: usize,
    trim_next_text: bool,
}

/// Split template text into tokens.
pub(super) fn lex(input: &str) -> LexResult<Vec<Spanned>> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        pos: 0,
        line: 1,
        tokens: Vec::new(),
        text: String::new(),
        text_line: 1,
        trim_next_text: false,
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer {
    fn run(&mut self) -> LexResult<()> {
        while self.pos < self.chars.len() {
            if self.starts_with("{{") {
                self.lex_action()?;
            } else {
                let c = self.chars[self.pos];
                if self.text.is_empty() {
                    self.text_line = self.line;
                }
                self.text.push(c);
                if c == '\n' {
                    self.line += 1;
                }
                self.pos += 1;
            }
        }
        self.flush_text(false);
        Ok(())
    }

    fn starts_with(&self, s: &str) -> bool {
        starts_with_at(&self.chars, self.pos, s)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn flush_text(&mut self, trim_end: bool) {
        let mut text = std::mem::take(&mut self.text);
        if self.trim_next_text {
            text = text.trim_start().to_string();
            self.trim_next_text = false;
        }
        if trim_end {
            text.truncate(text.trim_end().len());
        }
        if !text.is_empty() {
            self.tokens.push(Spanned {
                token: Token::Text(text),
                line: self.text_line,
            });
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(Spanned {
            token,
            line: self.line,
        });
    }

    fn lex_action(&mut self) -> LexResult<()> {
        let open_line = self.line;
        self.pos += 2;

        let trim_left = self.peek_at(0) == Some('-') && self.peek_at(1).is_some_and(is_space);
        if trim_left {
            self.pos += 1;
        }
        self.flush_text(trim_left);

        self.skip_whitespace_inline();
        if self.starts_with("/*") {
            return self.lex_comment(open_line);
        }

        self.push(Token::Open);
        loop {
            // Right trim marker is " -}}": whitespace, dash, delimiter.
            if let Some(c) = self.peek_at(0)
                && is_space(c)
                && starts_with_at(&self.chars, self.pos + 1, "-}}")
            {
                self.advance_whitespace(c);
                self.pos += 3;
                self.push(Token::Close);
                self.trim_next_text = true;
                return Ok(());
            }
            if self.starts_with("}}") {
                self.pos += 2;
                self.push(Token::Close);
                return Ok(());
            }

            let Some(c) = self.peek_at(0) else {
                return Err((open_line, "unclosed action".to_string()));
            };

            match c {
                c if is_space(c) => self.advance_whitespace(c),
                '|' => self.single(Token::Pipe),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                ',' => self.single(Token::Comma),
                '=' => self.single(Token::Assign),
                ':' => {
                    if self.peek_at(1) == Some('=') {
                        self.pos += 2;
                        self.push(Token::Declare);
                    } else {
                        return Err((self.line, "expected :=".to_string()));
                    }
                }
                '"' => self.lex_quoted()?,
                '`' => self.lex_raw()?,
                '.' => {
                    if self.peek_at(1).is_some_and(is_ident_start) {
                        let chain = self.lex_chain();
                        self.push(Token::Field(chain));
                    } else {
                        self.single(Token::Dot);
                    }
                }
                '$' => {
                    self.pos += 1;
                    let name = format!("${}", self.lex_ident());
                    let chain = self.lex_chain();
                    self.push(Token::Variable(name, chain));
                }
                '-' | '+' | '0'..='9' => self.lex_number()?,
                c if is_ident_start(c) => {
                    let ident = self.lex_ident();
                    self.push(Token::Ident(ident));
                }
                other => {
                    return Err((self.line, format!("unexpected {:?} in command", other)));
                }
            }
        }
    }

    fn lex_comment(&mut self, open_line: usize) -> LexResult<()> {
        self.pos += 2;
        loop {
            if self.pos >= self.chars.len() {
                return Err((open_line, "unclosed comment".to_string()));
            }
            if self.starts_with("*/") {
                self.pos += 2;
                break;
            }
            if self.chars[self.pos] == '\n' {
                self.line += 1;
            }
            self.pos += 1;
        }

        if self.starts_with(" -}}") {
            self.pos += 4;
            self.trim_next_text = true;
            Ok(())
        } else if self.starts_with("}}") {
            self.pos += 2;
            Ok(())
        } else {
            Err((self.line, "comment ends before closing delimiter".to_string()))
        }
    }

    fn single(&mut self, token: Token) {
        self.pos += 1;
        self.push(token);
    }

    fn advance_whitespace(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn skip_whitespace_inline(&mut self) {
        // Only used to detect "{{ /*"; a comment must follow the delimiter closely.
        if self.peek_at(0) == Some(' ') && starts_with_at(&self.chars, self.pos + 1, "/*") {
            self.pos += 1;
        }
    }

    fn lex_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek_at(0) {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        ident
    }

    fn lex_chain(&mut self) -> Vec<String> {
        let mut chain = Vec::new();
        while self.peek_at(0) == Some('.') && self.peek_at(1).is_some_and(is_ident_start) {
            self.pos += 1;
            chain.push(self.lex_ident());
        }
        chain
    }

    fn lex_quoted(&mut self) -> LexResult<()> {
        let start_line = self.line;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.peek_at(0) else {
                return Err((start_line, "unterminated quoted string".to_string()));
            };
            self.pos += 1;
            match c {
                '"' => break,
                '\n' => return Err((start_line, "unterminated quoted string".to_string())),
                '\\' => {
                    let Some(escaped) = self.peek_at(0) else {
                        return Err((start_line, "unterminated quoted string".to_string()));
                    };
                    self.pos += 1;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        other => {
                            return Err((
                                start_line,
                                format!("invalid escape sequence \\{} in string", other),
                            ));
                        }
                    });
                }
                other => value.push(other),
            }
        }
        self.tokens.push(Spanned {
            token: Token::Str(value),
            line: start_line,
        });
        Ok(())
    }

    fn lex_raw(&mut self) -> LexResult<()> {
        let start_line = self.line;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.peek_at(0) else {
                return Err((start_line, "unterminated raw quoted string".to_string()));
            };
            self.pos += 1;
            if c == '`' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            value.push(c);
        }
        self.tokens.push(Spanned {
            token: Token::Str(value),
            line: start_line,
        });
        Ok(())
    }

    fn lex_number(&mut self) -> LexResult<()> {
        let mut literal = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek_at(0) {
            literal.push(sign);
            self.pos += 1;
        }
        if !self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            return Err((self.line, format!("bad number syntax: {:?}", literal)));
        }

        if self.peek_at(0) == Some('0')
            && let Some(radix) = self.peek_at(1).and_then(radix_of)
        {
            return self.lex_radix_number(literal, radix);
        }

        let mut is_float = false;
        while let Some(c) = self.peek_at(0) {
            let exponent_sign = matches!(c, '-' | '+')
                && literal.ends_with(['e', 'E']);
            if c.is_ascii_digit() || c == '_' || exponent_sign {
                literal.push(c);
            } else if c == '.' && !is_float && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
                is_float = true;
                literal.push(c);
            } else if matches!(c, 'e' | 'E') {
                is_float = true;
                literal.push(c);
            } else {
                break;
            }
            self.pos += 1;
        }
        if self.peek_at(0).is_some_and(is_alphanumeric) {
            self.take_alphanumeric(&mut literal);
            return Err((self.line, format!("bad number syntax: {:?}", literal)));
        }

        let digits = literal.replace('_', "");
        let token = if is_float {
            digits
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| (self.line, format!("bad number syntax: {:?}", literal)))?
        } else {
            digits
                .parse::<i64>()
                .map(Token::Int)
                .map_err(|_| (self.line, format!("bad number syntax: {:?}", literal)))?
        };
        self.push(token);
        Ok(())
    }

    /// `0x1F`, `0o17`, `0b101`; underscores between digits are allowed.
    fn lex_radix_number(&mut self, mut literal: String, radix: u32) -> LexResult<()> {
        let prefix_len = literal.len() + 2;
        self.take_alphanumeric(&mut literal);
        let bad = |literal: &str| (self.line, format!("bad number syntax: {:?}", literal));

        let digits = literal[prefix_len..].replace('_', "");
        if digits.is_empty() {
            return Err(bad(&literal));
        }
        let signed = if literal.starts_with('-') {
            format!("-{}", digits)
        } else {
            digits
        };
        let value = i64::from_str_radix(&signed, radix).map_err(|_| bad(&literal))?;
        self.push(Token::Int(value));
        Ok(())
    }

    fn take_alphanumeric(&mut self, literal: &mut String) {
        while let Some(c) = self.peek_at(0).filter(|c| is_alphanumeric(*c)) {
            literal.push(c);
            self.pos += 1;
        }
    }
}

fn radix_of(c: char) -> Option<u32> {
    match c {
        'x' | 'X' => Some(16),
        'o' | 'O' => Some(8),
        'b' | 'B' => Some(2),
        _ => None,
    }
}

fn is_alphanumeric(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_with_at(chars: &[char], pos: usize, s: &str) -> bool {
    let mut i = pos;
    for expected in s.chars() {
        if chars.get(i) != Some(&expected) {
            return false;
        }
        i += 1;
    }
    true
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
