//! AST and recursive-descent parser.
//!
//! The grammar, loosest first: assignment, `&&`/`||`, `!`/comparisons,
//! additive, multiplicative, unary minus, `^` (right-associative), call
//! chains, atoms. Blocks are `{ … }` with `;`/newline-separated statements;
//! a block's value is its last statement's value.

use std::rc::Rc;

use crate::{
    error::SyntaxError,
    lexer::{Keyword, Span, Token, TokenKind},
};

/// Maximum expression nesting before the parser gives up. Guards against
/// stack overflow on input like `((((((…))))))`.
const MAX_NESTING_DEPTH: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug)]
pub(crate) struct IfCase {
    pub condition: Node,
    pub body: Node,
}

#[derive(Debug)]
pub(crate) enum Node {
    Number {
        value: f64,
        span: Span,
    },
    Str {
        value: Rc<str>,
        span: Span,
    },
    List {
        elements: Vec<Node>,
        span: Span,
    },
    /// `{ … }` body or the whole program; evaluates to its last statement.
    Block {
        statements: Vec<Node>,
        span: Span,
    },
    VarAccess {
        name: Rc<str>,
        span: Span,
    },
    VarAssign {
        name: Rc<str>,
        value: Box<Node>,
        span: Span,
    },
    BinOp {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
        span: Span,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
        span: Span,
    },
    If {
        cases: Vec<IfCase>,
        otherwise: Option<Box<Node>>,
        span: Span,
    },
    For {
        var: Rc<str>,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
        span: Span,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
        span: Span,
    },
    /// The body is reference-counted so function values can outlive the
    /// tree they were parsed from (REPL lines drop their AST).
    FuncDef {
        name: Option<Rc<str>>,
        params: Vec<Rc<str>>,
        body: Rc<Node>,
        span: Span,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },
    Return {
        value: Option<Box<Node>>,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Self::Number { span, .. }
            | Self::Str { span, .. }
            | Self::List { span, .. }
            | Self::Block { span, .. }
            | Self::VarAccess { span, .. }
            | Self::VarAssign { span, .. }
            | Self::BinOp { span, .. }
            | Self::UnaryOp { span, .. }
            | Self::If { span, .. }
            | Self::For { span, .. }
            | Self::While { span, .. }
            | Self::FuncDef { span, .. }
            | Self::Call { span, .. }
            | Self::Return { span, .. }
            | Self::Break { span }
            | Self::Continue { span } => *span,
        }
    }
}

/// Parses a token stream (as produced by `lexer::lex`) into a program block.
pub(crate) fn parse(tokens: &[Token]) -> Result<Node, SyntaxError> {
    let mut parser = Parser {
        tokens,
        index: 0,
        depth: 0,
    };
    let start = parser.current_span();
    let statements = parser.statements()?;
    if !matches!(parser.current_kind(), TokenKind::Eof) {
        return Err(parser.unexpected("a statement"));
    }
    let span = start.to(parser.current_span());
    Ok(Node::Block { statements, span })
}

struct Parser<'t> {
    tokens: &'t [Token],
    index: usize,
    depth: u16,
}

impl Parser<'_> {
    fn current(&self) -> &Token {
        // the token vector always ends with Eof, which is never consumed
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.current_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, SyntaxError> {
        if self.current_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::new(
            format!("Expected {}, found {}", expected, self.current_kind().describe()),
            self.current_span(),
        )
    }

    fn skip_newlines(&mut self) {
        while matches!(self.current_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// True when the token after any run of newlines is the given keyword;
    /// consumes the newlines only in that case.
    fn newlines_then_keyword(&mut self, keyword: Keyword) -> bool {
        let mut lookahead = self.index;
        while matches!(self.tokens[lookahead].kind, TokenKind::Newline) {
            lookahead += 1;
        }
        if matches!(self.tokens[lookahead].kind, TokenKind::Keyword(k) if k == keyword) {
            self.index = lookahead;
            true
        } else {
            false
        }
    }

    fn at_statements_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof | TokenKind::RBrace)
    }

    fn statements(&mut self) -> Result<Vec<Node>, SyntaxError> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.at_statements_end() {
            statements.push(self.statement()?);
            let mut separated = false;
            while matches!(self.current_kind(), TokenKind::Newline) {
                self.advance();
                separated = true;
            }
            if self.at_statements_end() {
                break;
            }
            if !separated {
                return Err(self.unexpected("';' or a new line"));
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Node, SyntaxError> {
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Return) => {
                let keyword = self.advance();
                if matches!(
                    self.current_kind(),
                    TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof
                ) {
                    Ok(Node::Return {
                        value: None,
                        span: keyword.span,
                    })
                } else {
                    let value = self.expr()?;
                    let span = keyword.span.to(value.span());
                    Ok(Node::Return {
                        value: Some(Box::new(value)),
                        span,
                    })
                }
            }
            TokenKind::Keyword(Keyword::Continue) => {
                let keyword = self.advance();
                Ok(Node::Continue { span: keyword.span })
            }
            TokenKind::Keyword(Keyword::Break) => {
                let keyword = self.advance();
                Ok(Node::Break { span: keyword.span })
            }
            _ => self.expr(),
        }
    }

    fn expr(&mut self) -> Result<Node, SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(SyntaxError::new("Expression nesting too deep", self.current_span()));
        }
        let result = self.assignment();
        self.depth -= 1;
        result
    }

    fn assignment(&mut self) -> Result<Node, SyntaxError> {
        if let TokenKind::Ident(name) = self.current_kind()
            && matches!(self.tokens[self.index + 1].kind, TokenKind::Assign)
        {
            let name = Rc::clone(name);
            let ident = self.advance();
            self.advance(); // '='
            let value = self.expr()?;
            let span = ident.span.to(value.span());
            return Ok(Node::VarAssign {
                name,
                value: Box::new(value),
                span,
            });
        }
        self.logic()
    }

    fn logic(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.comparison()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                _ => break,
            };
            self.advance();
            let rhs = self.comparison()?;
            let span = lhs.span().to(rhs.span());
            lhs = Node::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Node, SyntaxError> {
        if matches!(self.current_kind(), TokenKind::Not) {
            let not = self.advance();
            let operand = self.comparison()?;
            let span = not.span.to(operand.span());
            return Ok(Node::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        let mut lhs = self.arithmetic()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Ee => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lte => BinOp::Lte,
                TokenKind::Gte => BinOp::Gte,
                _ => break,
            };
            self.advance();
            let rhs = self.arithmetic()?;
            let span = lhs.span().to(rhs.span());
            lhs = Node::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn arithmetic(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            let span = lhs.span().to(rhs.span());
            lhs = Node::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Mul => BinOp::Mul,
                TokenKind::Div => BinOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.factor()?;
            let span = lhs.span().to(rhs.span());
            lhs = Node::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Node, SyntaxError> {
        if matches!(self.current_kind(), TokenKind::Minus) {
            let minus = self.advance();
            let operand = self.factor()?;
            let span = minus.span.to(operand.span());
            return Ok(Node::UnaryOp {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                span,
            });
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node, SyntaxError> {
        let lhs = self.call()?;
        if matches!(self.current_kind(), TokenKind::Pow) {
            self.advance();
            // right-associative: 2 ^ 3 ^ 2 is 2 ^ (3 ^ 2)
            let rhs = self.factor()?;
            let span = lhs.span().to(rhs.span());
            return Ok(Node::BinOp {
                op: BinOp::Pow,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn call(&mut self) -> Result<Node, SyntaxError> {
        let mut callee = self.atom()?;
        while matches!(self.current_kind(), TokenKind::LParen) {
            self.advance();
            let mut args = Vec::new();
            if !matches!(self.current_kind(), TokenKind::RParen) {
                args.push(self.expr()?);
                while self.eat(&TokenKind::Comma) {
                    args.push(self.expr()?);
                }
            }
            let rparen = self.expect(&TokenKind::RParen)?;
            let span = callee.span().to(rparen.span);
            callee = Node::Call {
                callee: Box::new(callee),
                args,
                span,
            };
        }
        Ok(callee)
    }

    fn atom(&mut self) -> Result<Node, SyntaxError> {
        match self.current_kind() {
            TokenKind::Number(value) => {
                let value = *value;
                let token = self.advance();
                Ok(Node::Number { value, span: token.span })
            }
            TokenKind::Str(value) => {
                let value = Rc::clone(value);
                let token = self.advance();
                Ok(Node::Str { value, span: token.span })
            }
            TokenKind::Ident(name) => {
                let name = Rc::clone(name);
                let token = self.advance();
                Ok(Node::VarAccess { name, span: token.span })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.list(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            TokenKind::Keyword(Keyword::Func) => self.func_def(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn list(&mut self) -> Result<Node, SyntaxError> {
        let open = self.expect(&TokenKind::LBracket)?;
        let mut elements = Vec::new();
        if !matches!(self.current_kind(), TokenKind::RBracket) {
            elements.push(self.expr()?);
            while self.eat(&TokenKind::Comma) {
                elements.push(self.expr()?);
            }
        }
        let close = self.expect(&TokenKind::RBracket)?;
        Ok(Node::List {
            elements,
            span: open.span.to(close.span),
        })
    }

    fn block(&mut self) -> Result<Node, SyntaxError> {
        let open = self.expect(&TokenKind::LBrace)?;
        let statements = self.statements()?;
        let close = self.expect(&TokenKind::RBrace)?;
        Ok(Node::Block {
            statements,
            span: open.span.to(close.span),
        })
    }

    fn if_expr(&mut self) -> Result<Node, SyntaxError> {
        let kama = self.expect(&TokenKind::Keyword(Keyword::If))?;
        let mut cases = Vec::new();
        let condition = self.expr()?;
        let body = self.block()?;
        let mut end = body.span();
        cases.push(IfCase { condition, body });
        while self.newlines_then_keyword(Keyword::Elif) {
            self.advance(); // 'au'
            let condition = self.expr()?;
            let body = self.block()?;
            end = body.span();
            cases.push(IfCase { condition, body });
        }
        let otherwise = if self.newlines_then_keyword(Keyword::Else) {
            self.advance(); // 'sivyo'
            let body = self.block()?;
            end = body.span();
            Some(Box::new(body))
        } else {
            None
        };
        Ok(Node::If {
            cases,
            otherwise,
            span: kama.span.to(end),
        })
    }

    fn for_expr(&mut self) -> Result<Node, SyntaxError> {
        let kwa = self.expect(&TokenKind::Keyword(Keyword::For))?;
        let var = self.ident("a loop variable")?;
        self.expect(&TokenKind::Assign)?;
        let start = self.expr()?;
        self.expect(&TokenKind::Keyword(Keyword::Until))?;
        let end = self.expr()?;
        let step = if self.eat(&TokenKind::Keyword(Keyword::Step)) {
            Some(Box::new(self.expr()?))
        } else {
            None
        };
        let body = self.block()?;
        let span = kwa.span.to(body.span());
        Ok(Node::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            span,
        })
    }

    fn while_expr(&mut self) -> Result<Node, SyntaxError> {
        let wakati = self.expect(&TokenKind::Keyword(Keyword::While))?;
        let condition = self.expr()?;
        let body = self.block()?;
        let span = wakati.span.to(body.span());
        Ok(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
            span,
        })
    }

    fn func_def(&mut self) -> Result<Node, SyntaxError> {
        let shughuli = self.expect(&TokenKind::Keyword(Keyword::Func))?;
        let name = if matches!(self.current_kind(), TokenKind::Ident(_)) {
            Some(self.ident("a function name")?)
        } else {
            None
        };
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !matches!(self.current_kind(), TokenKind::RParen) {
            params.push(self.ident("a parameter name")?);
            while self.eat(&TokenKind::Comma) {
                params.push(self.ident("a parameter name")?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.block()?;
        let span = shughuli.span.to(body.span());
        Ok(Node::FuncDef {
            name,
            params,
            body: Rc::new(body),
            span,
        })
    }

    fn ident(&mut self, what: &str) -> Result<Rc<str>, SyntaxError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = Rc::clone(name);
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected(what))
        }
    }
}
