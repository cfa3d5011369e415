//! Tokenizer and recursive descent parser for equation text.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! equation := expr '=' expr
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/') unary)*
//! unary    := ('-' | '+') unary | power
//! power    := primary (('^' | '**') unary)?
//! primary  := number | function '(' expr ')' | identifier | '(' expr ')'
//! ```
//!
//! Positions in errors are 1-based character columns.

use super::{BinaryOp, Equation, Expr, Function};
use crate::errors::{FormulaError, FormulaResult};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Column of the first character (1-indexed)
    pub column: usize,
}

/// Token types in equation text.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    OpenParen,
    CloseParen,
    Equals,
    Eof,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Number(v) => format!("number {}", v),
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::OpenParen => "'('".to_string(),
            TokenKind::CloseParen => "')'".to_string(),
            TokenKind::Equals => "'='".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// Lexer for tokenizing equation text.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn error(&self, column: usize, reason: impl Into<String>) -> FormulaError {
        FormulaError::parse(self.input, column, reason)
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> FormulaResult<Token> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }

        let column = self.pos + 1;
        let ch = match self.peek() {
            Some(ch) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    column,
                })
            }
        };

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' if self.peek_at(1) == Some('*') => {
                self.pos += 1;
                TokenKind::Caret
            }
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '=' => TokenKind::Equals,
            c if c.is_ascii_digit() || c == '.' => {
                let value = self.read_number(column)?;
                return Ok(Token {
                    kind: TokenKind::Number(value),
                    column,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.read_identifier();
                return Ok(Token {
                    kind: TokenKind::Identifier(name),
                    column,
                });
            }
            other => return Err(self.error(column, format!("unexpected character '{}'", other))),
        };
        self.pos += 1;
        Ok(Token { kind, column })
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        text
    }

    fn read_number(&mut self, column: usize) -> FormulaResult<f64> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }

        // Exponent only if digits follow, so `2*e` style input is untouched
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if matches!(self.peek_at(digit_at), Some(c) if c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(ch) = self.peek() {
                        text.push(ch);
                    }
                    self.pos += 1;
                }
                while let Some(ch) = self.peek() {
                    if ch.is_ascii_digit() {
                        text.push(ch);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        text.parse::<f64>()
            .map_err(|_| self.error(column, format!("invalid number '{}'", text)))
    }
}

/// Parser over a token stream.
pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> FormulaResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { input, tokens, pos: 0 })
    }

    fn current(&self) -> &Token {
        // tokenize() always ends with Eof and advance() never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, reason: impl Into<String>) -> FormulaError {
        FormulaError::parse(self.input, self.current().column, reason)
    }

    fn expect(&mut self, kind: TokenKind) -> FormulaResult<()> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.current().kind.describe()
            )))
        }
    }

    /// Parse `lhs = rhs` and require end of input.
    pub fn parse_equation(&mut self) -> FormulaResult<Equation> {
        let lhs = self.parse_expr()?;
        if self.current().kind != TokenKind::Equals {
            return Err(self.error_here(format!(
                "expected '=', found {}",
                self.current().kind.describe()
            )));
        }
        self.advance();
        let rhs = self.parse_expr()?;
        self.expect(TokenKind::Eof)?;
        Ok(Equation::new(lhs, rhs))
    }

    /// Parse a full expression and require end of input.
    pub fn parse_standalone(&mut self) -> FormulaResult<Expr> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    fn parse_expr(&mut self) -> FormulaResult<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> FormulaResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        match self.current().kind {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let base = self.parse_primary()?;
        if self.current().kind == TokenKind::Caret {
            self.advance();
            // Right associative: the exponent may itself contain '^'
            let exponent = self.parse_unary()?;
            return Ok(base.pow(exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(v) => Ok(Expr::Number(v)),
            TokenKind::Identifier(name) => {
                if self.current().kind != TokenKind::OpenParen {
                    return Ok(Expr::Variable(name));
                }
                let function = Function::from_name(&name).ok_or_else(|| {
                    FormulaError::parse(self.input, token.column, format!("unknown function '{}'", name))
                })?;
                self.advance();
                let arg = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(Expr::call(function, arg))
            }
            TokenKind::OpenParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            other => Err(FormulaError::parse(
                self.input,
                token.column,
                format!("expected a value, found {}", other.describe()),
            )),
        }
    }
}

/// Parse `lhs = rhs`.
pub fn parse_equation(input: &str) -> FormulaResult<Equation> {
    Parser::new(input)?.parse_equation()
}

/// Parse an expression without `=`.
pub fn parse_expression(input: &str) -> FormulaResult<Expr> {
    Parser::new(input)?.parse_standalone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::CompiledExpr;

    fn eval(text: &str) -> f64 {
        let expr = parse_expression(text).unwrap();
        CompiledExpr::compile(&expr, &[]).unwrap().eval(&[])
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = Lexer::new("a**2 = b").tokenize().unwrap();
        let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Caret,
                TokenKind::Number(2.0),
                TokenKind::Equals,
                TokenKind::Identifier("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(eval("1.5e3"), 1500.0);
        assert_eq!(eval("2E-2"), 0.02);
        assert_eq!(eval(".5"), 0.5);
    }

    #[test]
    fn test_exponent_letter_not_swallowed() {
        // "2e" is not a number with an exponent; it fails on the stray identifier
        let err = parse_expression("2e").unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("-2 ^ 2"), -4.0);
        assert_eq!(eval("2 ^ -1"), 0.5);
        assert_eq!(eval("8 / 2 / 2"), 2.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
    }

    #[test]
    fn test_functions() {
        assert!((eval("sqrt(16) + ln(1)") - 4.0).abs() < 1e-12);
        assert!((eval("log10(1000)") - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_equation_requires_single_equals() {
        assert!(parse_equation("P * V = n * R * T").is_ok());
        assert!(parse_equation("P * V").is_err());
        assert!(parse_equation("a = b = c").is_err());
    }

    #[test]
    fn test_error_positions() {
        match parse_equation("a = b $ c").unwrap_err() {
            FormulaError::ParseError { position, .. } => assert_eq!(position, 7),
            other => panic!("unexpected error {:?}", other),
        }
        match parse_equation("a = foo(b)").unwrap_err() {
            FormulaError::ParseError { position, reason, .. } => {
                assert_eq!(position, 5);
                assert!(reason.contains("foo"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(parse_expression("(a + b").is_err());
        assert!(parse_expression("a + b)").is_err());
    }
}
