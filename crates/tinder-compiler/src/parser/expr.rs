//! Expression parsing: precedence-climbing with `or` lowest,
//! membership (`in`/`at`/`from`) between comparison and additive, and
//! `primary` highest.

use tinder_bytecode::expr::{BinOp, InterpFragment, UnOp};
use tinder_bytecode::Expr;

use super::Parser;
use crate::error::ParseError;
use crate::lexer::{StrFragment, TokenKind};

fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8, BinOp)> {
    use TokenKind::*;
    Some(match kind {
        KwOr => (1, 2, BinOp::Or),
        KwAnd => (3, 4, BinOp::And),
        EqEq => (5, 6, BinOp::Eq),
        NotEq => (5, 6, BinOp::Ne),
        Lt => (7, 8, BinOp::Lt),
        LtEq => (7, 8, BinOp::Le),
        Gt => (7, 8, BinOp::Gt),
        GtEq => (7, 8, BinOp::Ge),
        KwIn => (9, 10, BinOp::In),
        KwAt => (9, 10, BinOp::At),
        KwFrom => (9, 10, BinOp::From),
        Plus => (11, 12, BinOp::Add),
        Minus => (11, 12, BinOp::Sub),
        Star => (13, 14, BinOp::Mul),
        Slash => (13, 14, BinOp::Div),
        Percent => (13, 14, BinOp::Mod),
        _ => return None,
    })
}

impl<'t, 'x> Parser<'t, 'x> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.enter_recursion()?;
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((lbp, rbp, op)) = infix_binding_power(&self.current().kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.bump();
            let rhs = self.parse_expr_bp(rbp)?;
            lhs = Expr::BinOp(op, Box::new(lhs), Box::new(rhs));
        }
        self.exit_recursion();
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::Minus => {
                self.bump();
                Ok(Expr::UnOp(UnOp::Neg, Box::new(self.parse_unary()?)))
            }
            TokenKind::KwNot => {
                self.bump();
                Ok(Expr::UnOp(UnOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Parses a primary expression followed by any `.field` chain. A
    /// dotted chain off a plain identifier immediately followed by
    /// `(` is a call through that dotted name (`math.sqrt(16)`)
    /// rather than field access — the whole dotted path is interned
    /// as the callable's name, matching how `tinder-vm` dispatches
    /// `Expr::Call` by flat name against the library catalog.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if self.current().kind != TokenKind::Dot {
            return Ok(base);
        }

        let mut path = match &base {
            Expr::Identifier(sym) => vec![self.interner.resolve(*sym).to_string()],
            _ => Vec::new(),
        };
        let mut segments = Vec::new();
        while self.current().kind == TokenKind::Dot {
            self.bump();
            let name = self.expect_ident()?;
            path.push(name.clone());
            segments.push(self.interner.intern(&name));
        }

        if matches!(base, Expr::Identifier(_)) && self.current().kind == TokenKind::LParen {
            let full_name = self.interner.intern(&path.join("."));
            let args = self.parse_call_args()?;
            return Ok(Expr::Call(full_name, args));
        }

        Ok(Expr::DotChain(Box::new(base), segments))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.bump();
        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Const(self.const_number(n))),
            TokenKind::Str(s) => Ok(Expr::Const(self.const_string(s))),
            TokenKind::KwNone => Ok(Expr::Const(self.const_none())),
            TokenKind::KwTrue => Ok(Expr::Const(self.const_bool(true))),
            TokenKind::KwFalse => Ok(Expr::Const(self.const_bool(false))),
            TokenKind::InterpStr(fragments) => {
                let lowered = fragments
                    .into_iter()
                    .map(|f| match f {
                        StrFragment::Literal(s) => InterpFragment::Literal(s),
                        StrFragment::Lookup(name) => InterpFragment::Lookup(self.interner.intern(&name)),
                    })
                    .collect();
                Ok(Expr::Interpolation(lowered))
            }
            TokenKind::At => {
                let inner = self.parse_unary()?;
                Ok(Expr::Indirect(Box::new(inner)))
            }
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Group(Box::new(inner)))
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                self.skip_newlines();
                if self.current().kind != TokenKind::RBracket {
                    loop {
                        items.push(self.parse_expr()?);
                        self.skip_newlines();
                        if self.current().kind == TokenKind::Comma {
                            self.bump();
                            self.skip_newlines();
                        } else {
                            break;
                        }
                    }
                }
                self.skip_newlines();
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::Sequence(items))
            }
            TokenKind::LBrace => {
                let mut entries = Vec::new();
                self.skip_newlines();
                if self.current().kind != TokenKind::RBrace {
                    loop {
                        let key = self.parse_expr()?;
                        self.expect(TokenKind::Colon)?;
                        let value = self.parse_expr()?;
                        entries.push((key, value));
                        self.skip_newlines();
                        if self.current().kind == TokenKind::Comma {
                            self.bump();
                            self.skip_newlines();
                        } else {
                            break;
                        }
                    }
                }
                self.skip_newlines();
                self.expect(TokenKind::RBrace)?;
                Ok(Expr::Mapping(entries))
            }
            TokenKind::Ident(name) => {
                if self.current().kind == TokenKind::LParen {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call(self.interner.intern(&name), args))
                } else {
                    Ok(Expr::Identifier(self.interner.intern(&name)))
                }
            }
            _ => Err(ParseError::Unexpected {
                line: tok.line,
                message: format!("unexpected token {:?} in expression", tok.kind),
            }),
        }
    }

    fn const_number(&mut self, n: f64) -> tinder_bytecode::constant::Const {
        use tinder_core::Value;
        self.consts.intern(Value::Number(n))
    }

    fn const_string(&mut self, s: String) -> tinder_bytecode::constant::Const {
        use tinder_core::Value;
        self.consts.intern(Value::String(s))
    }

    fn const_none(&mut self) -> tinder_bytecode::constant::Const {
        use tinder_core::Value;
        self.consts.intern(Value::None)
    }

    fn const_bool(&mut self, b: bool) -> tinder_bytecode::constant::Const {
        use tinder_core::Value;
        self.consts.intern(Value::Boolean(b))
    }
}
