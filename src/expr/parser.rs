use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{EngineError, Result};
use crate::expr::ast::{ArithmeticOp, CompareOp, LogicalOp, Node, VariableSlot};
use crate::lexer::{Token, TokenKind, Tokenizer};
use crate::value::Value;

/// The result of parsing an expression: the AST root plus the ordered,
/// de-duplicated list of Variable leaves encountered (first-occurrence order).
pub struct ParsedExpr {
    pub root: Node,
    pub variables: Vec<Rc<RefCell<VariableSlot>>>,
}

/// Recursive-descent parser over the grammar:
///
/// ```text
/// logical      := or_expr
/// or_expr      := and_expr ( 'or' and_expr )*
/// and_expr     := comparison ( 'and' comparison )*
/// comparison   := arithmetic ( ('=' | '<>' | '<' | '<=' | '>' | '>=') arithmetic )?
/// arithmetic   := term ( ('+' | '-') term )*
/// term         := factor ( ('*' | '/') factor )*
/// factor       := '-' factor | primary
/// primary      := number | string | identifier | '(' logical ')'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    variables: Vec<Rc<RefCell<VariableSlot>>>,
    variable_index: HashMap<String, usize>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            variables: Vec::new(),
            variable_index: HashMap::new(),
        }
    }

    pub fn parse_arithmetic(input: &str) -> Result<ParsedExpr> {
        let tokens = Tokenizer::new(input).tokenize()?;
        let mut parser = Self::new(tokens);
        let root = parser.arithmetic()?;
        parser.expect_eof()?;
        Ok(ParsedExpr {
            root,
            variables: parser.variables,
        })
    }

    pub fn parse_logical(input: &str) -> Result<ParsedExpr> {
        let tokens = Tokenizer::new(input).tokenize()?;
        let mut parser = Self::new(tokens);
        let root = parser.logical()?;
        parser.expect_eof()?;
        Ok(ParsedExpr {
            root,
            variables: parser.variables,
        })
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn expect_eof(&self) -> Result<()> {
        match self.peek() {
            TokenKind::Eof => Ok(()),
            other => Err(EngineError::Parsing(format!(
                "unexpected trailing token `{other:?}`"
            ))),
        }
    }

    fn logical(&mut self) -> Result<Node> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Node> {
        let mut left = self.and_expr()?;
        while matches!(self.peek(), TokenKind::Or) {
            self.advance();
            let right = self.and_expr()?;
            left = Node::Logical(LogicalOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Node> {
        let mut left = self.comparison()?;
        while matches!(self.peek(), TokenKind::And) {
            self.advance();
            let right = self.comparison()?;
            left = Node::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Node> {
        let left = self.arithmetic()?;
        let op = match self.peek() {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Ge => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.arithmetic()?;
        Ok(Node::Comparison(op, Box::new(left), Box::new(right)))
    }

    pub(crate) fn arithmetic(&mut self) -> Result<Node> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => ArithmeticOp::Add,
                TokenKind::Minus => ArithmeticOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            left = Node::Arithmetic(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Node> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => ArithmeticOp::Mul,
                TokenKind::Slash => ArithmeticOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            left = Node::Arithmetic(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Node> {
        if matches!(self.peek(), TokenKind::Minus) {
            self.advance();
            let child = self.factor()?;
            return Ok(Node::Negate(Box::new(child)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node> {
        match self.advance() {
            TokenKind::Number(v) => Ok(Node::Constant(v)),
            TokenKind::String(s) => Ok(Node::Constant(Value::Text(s))),
            TokenKind::Identifier(name) => Ok(Node::Variable(self.variable_slot(&name))),
            TokenKind::LParen => {
                let inner = self.logical()?;
                match self.advance() {
                    TokenKind::RParen => Ok(inner),
                    other => Err(EngineError::Parsing(format!(
                        "expected `)`, found `{other:?}`"
                    ))),
                }
            }
            other => Err(EngineError::Parsing(format!(
                "unexpected token `{other:?}`"
            ))),
        }
    }

    fn variable_slot(&mut self, name: &str) -> Rc<RefCell<VariableSlot>> {
        if let Some(&idx) = self.variable_index.get(name) {
            return self.variables[idx].clone();
        }
        let slot = VariableSlot::new(name);
        self.variable_index.insert(name.to_string(), self.variables.len());
        self.variables.push(slot.clone());
        slot
    }
}
