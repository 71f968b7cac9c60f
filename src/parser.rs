// File: src/parser.rs
//
// Recursive descent parser for the Fun language.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// The parser uses a single-token lookahead (two for assignment and calls) and
// supports:
// - Function definitions (fun / function)
// - Variable declarations with optional initializer
// - while loops and if/else (else if is sugar for a nested if)
// - Assignments, returns and expression statements
// - Binary expressions with the usual precedence, all left-associative
//
// Statements may be separated by optional semicolons. The parser never
// validates names or declarations; that is left to the interpreter.
//
// Nesting is bounded: blocks, parentheses and call arguments may nest at most
// MAX_NESTING_DEPTH levels, and no expression tree may be taller than
// MAX_EXPR_DEPTH. Deeper input is a ParseError, so every tree that reaches the
// interpreter can be walked and dropped without exhausting the native stack.

use crate::ast::{BinaryOp, Block, Expr, File, Function, Identifier, Stmt};
use crate::errors::{ParseError, SourceLocation};
use crate::lexer::{self, Token, TokenKind};
use log::debug;

/// Operator precedence levels, lowest first
const PRECEDENCE: &[&[&str]] = &[
    &["||"],
    &["&&"],
    &["==", "!="],
    &["<", ">", "<=", ">="],
    &["+", "-"],
    &["*", "/", "%"],
];

/// Deepest nesting of blocks, parentheses and argument lists
pub const MAX_NESTING_DEPTH: usize = 128;

/// Tallest expression tree; a chain `a + b + c` is as tall as it is long
pub const MAX_EXPR_DEPTH: usize = 2048;

/// Tokenizes and parses a complete source file
pub fn parse_source(source: &str) -> Result<File, ParseError> {
    let tokens = lexer::tokenize(source)?;
    debug!("lexed {} tokens", tokens.len());
    let file = Parser::new(tokens).parse()?;
    debug!("parsed {} top-level statements", file.body.statements.len());
    Ok(file)
}

/// Parser maintains position in token stream and provides methods to parse
/// statements and expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    /// Creates a new parser from a vector of tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    fn token(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).or_else(|| self.tokens.last())
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> &TokenKind {
        self.token(0).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn peek_second(&self) -> &TokenKind {
        self.token(1).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Consume the current token and advance; `Eof` is never consumed
    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if kind != TokenKind::Eof {
            self.pos += 1;
        }
        kind
    }

    fn location(&self) -> SourceLocation {
        self.token(0)
            .map(Token::location)
            .unwrap_or(SourceLocation::new(1, 1))
    }

    fn error(&self, expected: &str) -> ParseError {
        let found = self.peek().clone();
        let location = self.location();
        if found == TokenKind::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                location,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.describe(),
                location,
            }
        }
    }

    fn is_punct(&self, c: char) -> bool {
        matches!(self.peek(), TokenKind::Punctuation(p) if *p == c)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if k == keyword)
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        if self.is_punct(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", c)))
        }
    }

    fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        match self.peek() {
            TokenKind::Identifier(name) => {
                let ident = Identifier::new(name.clone());
                self.advance();
                Ok(ident)
            }
            _ => Err(self.error("identifier")),
        }
    }

    /// Enters one level of blocks, parentheses or arguments
    fn enter_nested(&mut self) -> Result<(), ParseError> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                location: self.location(),
            });
        }
        self.nesting += 1;
        Ok(())
    }

    fn leave_nested(&mut self) {
        self.nesting -= 1;
    }

    fn skip_semicolons(&mut self) {
        while self.is_punct(';') {
            self.advance();
        }
    }

    /// Parse the entire token stream into a `File`
    pub fn parse(&mut self) -> Result<File, ParseError> {
        let mut statements = Vec::new();
        self.skip_semicolons();
        while *self.peek() != TokenKind::Eof {
            statements.push(self.parse_stmt()?);
            self.skip_semicolons();
        }
        Ok(File::new(Block::new(statements)))
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::Keyword(k) if k == "fun" || k == "function" => self.parse_function(),
            TokenKind::Keyword(k) if k == "var" => self.parse_variable(),
            TokenKind::Keyword(k) if k == "while" => self.parse_while(),
            TokenKind::Keyword(k) if k == "if" => self.parse_if(),
            TokenKind::Keyword(k) if k == "return" => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::Return { value })
            }
            TokenKind::Identifier(_)
                if matches!(self.peek_second(), TokenKind::Operator(op) if op == "=") =>
            {
                let target = self.expect_identifier()?;
                self.advance(); // =
                let value = self.parse_expr()?;
                Ok(Stmt::Assignment { target, value })
            }
            _ => Ok(Stmt::Expr {
                expr: self.parse_expr()?,
            }),
        }
    }

    fn parse_function(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // fun
        let name = self.expect_identifier()?;
        self.expect_punct('(')?;
        let mut parameters = Vec::new();
        if !self.is_punct(')') {
            loop {
                parameters.push(self.expect_identifier()?);
                if self.is_punct(',') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_punct(')')?;
        let body = self.parse_braced_block()?;
        Ok(Stmt::Function(Function {
            name,
            parameters,
            body,
        }))
    }

    fn parse_variable(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // var
        let name = self.expect_identifier()?;
        let initializer = if matches!(self.peek(), TokenKind::Operator(op) if op == "=") {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Stmt::Variable { name, initializer })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // while
        let condition = self.parse_condition()?;
        let body = self.parse_braced_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // if
        let condition = self.parse_condition()?;
        let then_body = self.parse_braced_block()?;
        let else_body = if self.is_keyword("else") {
            self.advance();
            if self.is_keyword("if") {
                Some(Block::new(vec![self.parse_if()?]))
            } else {
                Some(self.parse_braced_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.expect_punct('(')?;
        let condition = self.parse_expr()?;
        self.expect_punct(')')?;
        Ok(condition)
    }

    fn parse_braced_block(&mut self) -> Result<Block, ParseError> {
        self.expect_punct('{')?;
        self.enter_nested()?;
        let mut statements = Vec::new();
        self.skip_semicolons();
        while !self.is_punct('}') {
            if *self.peek() == TokenKind::Eof {
                return Err(self.error("'}'"));
            }
            statements.push(self.parse_stmt()?);
            self.skip_semicolons();
        }
        self.advance(); // }
        self.leave_nested();
        Ok(Block::new(statements))
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(0).map(|(expr, _)| expr)
    }

    /// Parses one precedence level, returning the expression and its height
    fn parse_binary(&mut self, level: usize) -> Result<(Expr, usize), ParseError> {
        if level == PRECEDENCE.len() {
            return self.parse_primary();
        }

        let (mut left, mut height) = self.parse_binary(level + 1)?;
        loop {
            let op = match self.peek() {
                TokenKind::Operator(op) if PRECEDENCE[level].contains(&op.as_str()) => {
                    BinaryOp::from_symbol(op)
                }
                _ => None,
            };
            let Some(op) = op else { break };
            let location = self.location();
            self.advance();
            let (right, right_height) = self.parse_binary(level + 1)?;
            height = 1 + height.max(right_height);
            if height > MAX_EXPR_DEPTH {
                return Err(ParseError::NestingTooDeep {
                    limit: MAX_EXPR_DEPTH,
                    location,
                });
            }
            left = Expr::binary(left, op, right);
        }
        Ok((left, height))
    }

    fn parse_primary(&mut self) -> Result<(Expr, usize), ParseError> {
        match self.peek().clone() {
            TokenKind::Number(text) => {
                self.advance();
                Ok((Expr::Literal { text }, 1))
            }
            TokenKind::Operator(op)
                if op == "-" && matches!(self.peek_second(), TokenKind::Number(_)) =>
            {
                self.advance(); // -
                match self.advance() {
                    TokenKind::Number(text) => {
                        let text = format!("-{}", text);
                        Ok((Expr::Literal { text }, 1))
                    }
                    _ => Err(self.error("number")),
                }
            }
            TokenKind::Identifier(name) => {
                let location = self.location();
                self.advance();
                if !self.is_punct('(') {
                    return Ok((Expr::ident(&name), 1));
                }
                self.advance();
                self.enter_nested()?;
                let (arguments, tallest) = self.parse_arguments()?;
                self.leave_nested();
                if tallest >= MAX_EXPR_DEPTH {
                    return Err(ParseError::NestingTooDeep {
                        limit: MAX_EXPR_DEPTH,
                        location,
                    });
                }
                let callee = Identifier::new(name);
                Ok((Expr::Call { callee, arguments }, tallest + 1))
            }
            TokenKind::Punctuation('(') => {
                self.advance();
                self.enter_nested()?;
                let inner = self.parse_binary(0)?;
                self.expect_punct(')')?;
                self.leave_nested();
                Ok(inner)
            }
            _ => Err(self.error("expression")),
        }
    }

    /// Parses call arguments after the opening parenthesis, with the tallest height
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, usize), ParseError> {
        let mut arguments = Vec::new();
        let mut tallest = 0;
        if self.is_punct(')') {
            self.advance();
            return Ok((arguments, tallest));
        }
        loop {
            let (argument, height) = self.parse_binary(0)?;
            tallest = tallest.max(height);
            arguments.push(argument);
            if self.is_punct(',') {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_punct(')')?;
        Ok((arguments, tallest))
    }
}
