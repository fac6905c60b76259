//! Recursive-descent parser turning tokens into a node tree.

use super::funcs;
use super::lexer::{Spanned, Token};

/// A node of the parsed template.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Node {
    Text(String),
    Action {
        line: usize,
        pipe: Pipeline,
    },
    If {
        line: usize,
        pipe: Pipeline,
        list: Vec<Node>,
        else_list: Option<Vec<Node>>,
    },
    Range {
        line: usize,
        pipe: Pipeline,
        list: Vec<Node>,
        else_list: Option<Vec<Node>>,
    },
    With {
        line: usize,
        pipe: Pipeline,
        list: Vec<Node>,
        else_list: Option<Vec<Node>>,
    },
}

/// Commands joined by `|`, optionally declaring or assigning variables.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Pipeline {
    pub decl: Vec<String>,
    pub is_assign: bool,
    pub cmds: Vec<Command>,
}

/// One command: a function call with arguments, or a single operand.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Command {
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Operand {
    Dot,
    Field(Vec<String>),
    Variable(String, Vec<String>),
    Function(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
    Pipe(Box<Pipeline>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    If,
    Range,
    With,
}

impl Control {
    fn keyword(self) -> &'static str {
        match self {
            Control::If => "if",
            Control::Range => "range",
            Control::With => "with",
        }
    }
}

/// What ended a list of nodes.
#[derive(Debug, PartialEq, Eq)]
enum Stop {
    Eof,
    End,
    Else,
}

type ParseResult<T> = Result<T, (usize, String)>;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Variables visible at the current point; `$` is always defined.
    vars: Vec<String>,
}

/// Parse a token stream into the top-level node list.
pub(super) fn parse(tokens: Vec<Spanned>) -> ParseResult<Vec<Node>> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        vars: vec!["$".to_string()],
    };
    let (nodes, stop) = parser.parse_list()?;
    match stop {
        Stop::Eof => Ok(nodes),
        Stop::End => Err((parser.line(), "unexpected {{end}}".to_string())),
        Stop::Else => Err((parser.line(), "unexpected {{else}}".to_string())),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|s| &s.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    fn expect_close(&mut self, context: &str) -> ParseResult<()> {
        let line = self.line();
        match self.next() {
            Some(Token::Close) => Ok(()),
            Some(other) => Err((line, format!("unexpected {} in {}", other.describe(), context))),
            None => Err((line, format!("unclosed action in {}", context))),
        }
    }

    fn parse_list(&mut self) -> ParseResult<(Vec<Node>, Stop)> {
        let mut nodes = Vec::new();
        loop {
            let line = self.line();
            match self.next() {
                None => return Ok((nodes, Stop::Eof)),
                Some(Token::Text(text)) => nodes.push(Node::Text(text)),
                Some(Token::Open) => {
                    if self.is_keyword("end") {
                        self.pos += 1;
                        self.expect_close("end")?;
                        return Ok((nodes, Stop::End));
                    }
                    if self.is_keyword("else") {
                        self.pos += 1;
                        return Ok((nodes, Stop::Else));
                    }
                    if self.is_keyword("if") {
                        self.pos += 1;
                        nodes.push(self.parse_control(Control::If, line)?);
                    } else if self.is_keyword("range") {
                        self.pos += 1;
                        nodes.push(self.parse_control(Control::Range, line)?);
                    } else if self.is_keyword("with") {
                        self.pos += 1;
                        nodes.push(self.parse_control(Control::With, line)?);
                    } else if let Some(Token::Ident(keyword)) = self.peek()
                        && matches!(
                            keyword.as_str(),
                            "define" | "template" | "block" | "break" | "continue"
                        )
                    {
                        return Err((line, format!("{{{{{}}}}} is not supported", keyword)));
                    } else {
                        let pipe = self.parse_pipeline("command", true)?;
                        self.expect_close("command")?;
                        nodes.push(Node::Action { line, pipe });
                    }
                }
                Some(other) => {
                    return Err((line, format!("unexpected {}", other.describe())));
                }
            }
        }
    }

    fn parse_control(&mut self, control: Control, line: usize) -> ParseResult<Node> {
        let mark = self.vars.len();
        let pipe = self.parse_pipeline(control.keyword(), true)?;
        if control != Control::Range && pipe.decl.len() > 1 {
            return Err((line, "too many declarations in command".to_string()));
        }
        self.expect_close(control.keyword())?;

        let (list, stop) = self.parse_list()?;
        let else_list = match stop {
            Stop::End => None,
            Stop::Eof => {
                return Err((
                    self.line(),
                    format!("unexpected EOF in {{{{{}}}}}", control.keyword()),
                ));
            }
            Stop::Else => {
                if control == Control::If && self.is_keyword("if") {
                    // {{else if ...}} nests an if that consumes the shared {{end}}.
                    let else_line = self.line();
                    self.pos += 1;
                    Some(vec![self.parse_control(Control::If, else_line)?])
                } else {
                    self.expect_close("else")?;
                    let (else_nodes, else_stop) = self.parse_list()?;
                    if else_stop != Stop::End {
                        return Err((
                            self.line(),
                            format!("expected {{{{end}}}} to close {{{{{}}}}}", control.keyword()),
                        ));
                    }
                    Some(else_nodes)
                }
            }
        };
        self.vars.truncate(mark);

        Ok(match control {
            Control::If => Node::If {
                line,
                pipe,
                list,
                else_list,
            },
            Control::Range => Node::Range {
                line,
                pipe,
                list,
                else_list,
            },
            Control::With => Node::With {
                line,
                pipe,
                list,
                else_list,
            },
        })
    }

    fn parse_pipeline(&mut self, context: &str, allow_decl: bool) -> ParseResult<Pipeline> {
        let line = self.line();
        let mut decl = Vec::new();
        let mut is_assign = false;

        if allow_decl && let Some(Token::Variable(first, chain)) = self.peek() {
            let first = first.clone();
            let simple = chain.is_empty();
            let shape = match (self.peek_nth(1), self.peek_nth(2), self.peek_nth(3)) {
                (Some(op @ (Token::Declare | Token::Assign)), _, _) if simple => {
                    Some((vec![first], *op == Token::Assign, 2))
                }
                (
                    Some(Token::Comma),
                    Some(Token::Variable(second, second_chain)),
                    Some(op @ (Token::Declare | Token::Assign)),
                ) if simple && second_chain.is_empty() => {
                    Some((vec![first, second.clone()], *op == Token::Assign, 4))
                }
                _ => None,
            };
            if let Some((names, assign, consumed)) = shape {
                decl = names;
                is_assign = assign;
                self.pos += consumed;
            }
        }

        if is_assign {
            for name in &decl {
                if !self.vars.contains(name) {
                    return Err((line, format!("undefined variable {:?}", name)));
                }
            }
        }

        let mut cmds = Vec::new();
        loop {
            let cmd = self.parse_command()?;
            if cmd.args.is_empty() {
                let found = self
                    .peek()
                    .map(Token::describe)
                    .unwrap_or_else(|| "EOF".to_string());
                return Err((line, format!("missing value for {} (found {})", context, found)));
            }
            cmds.push(cmd);
            if self.peek() == Some(&Token::Pipe) {
                self.pos += 1;
            } else {
                break;
            }
        }

        if !is_assign {
            self.vars.extend(decl.iter().cloned());
        }

        Ok(Pipeline {
            decl,
            is_assign,
            cmds,
        })
    }

    fn parse_command(&mut self) -> ParseResult<Command> {
        let mut args = Vec::new();
        loop {
            let line = self.line();
            let operand = match self.peek() {
                None | Some(Token::Close | Token::Pipe | Token::RParen) => break,
                Some(_) => match self.next() {
                    Some(Token::Dot) => Operand::Dot,
                    Some(Token::Field(chain)) => Operand::Field(chain),
                    Some(Token::Variable(name, chain)) => {
                        if !self.vars.contains(&name) {
                            return Err((line, format!("undefined variable {:?}", name)));
                        }
                        Operand::Variable(name, chain)
                    }
                    Some(Token::Ident(name)) => match name.as_str() {
                        "true" => Operand::Bool(true),
                        "false" => Operand::Bool(false),
                        "nil" => Operand::Nil,
                        _ if funcs::exists(&name) => Operand::Function(name),
                        _ => return Err((line, format!("function {:?} not defined", name))),
                    },
                    Some(Token::Str(s)) => Operand::Str(s),
                    Some(Token::Int(n)) => Operand::Int(n),
                    Some(Token::Float(n)) => Operand::Float(n),
                    Some(Token::LParen) => {
                        let inner = self.parse_pipeline("parenthesized pipeline", true)?;
                        match self.next() {
                            Some(Token::RParen) => Operand::Pipe(Box::new(inner)),
                            _ => return Err((line, "unclosed left paren".to_string())),
                        }
                    }
                    Some(other) => {
                        return Err((line, format!("unexpected {} in operand", other.describe())));
                    }
                    None => break,
                },
            };

            if !args.is_empty() && !matches!(args[0], Operand::Function(_)) {
                return Err((line, format!("unexpected {} in operand", describe(&operand))));
            }
            args.push(operand);
        }
        Ok(Command { args })
    }
}

fn describe(operand: &Operand) -> String {
    match operand {
        Operand::Dot => "<.>".to_string(),
        Operand::Field(chain) => format!("<.{}>", chain.join(".")),
        Operand::Variable(name, _) => format!("<{}>", name),
        Operand::Function(name) => format!("<{}>", name),
        Operand::Str(s) => format!("{:?}", s),
        Operand::Int(n) => n.to_string(),
        Operand::Float(n) => n.to_string(),
        Operand::Bool(b) => b.to_string(),
        Operand::Nil => "nil".to_string(),
        Operand::Pipe(_) => "<(...)>".to_string(),
    }
}
