//! Recursive-descent parser producing an [`crate::ast::Script`].

mod expr;

use tinder_bytecode::constant::ConstPool;
use tinder_bytecode::instruction::PutPosition;
use tinder_bytecode::Expr;
use tinder_core::Interner;

use crate::ast::{JumpSpec, Script, SetRhs, Stmt};
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

/// Recursion depth past which the parser gives up rather than blow the
/// native call stack on a pathologically nested `if`.
const MAX_RECURSION: usize = 256;

pub struct Parser<'t, 'x> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    interner: &'x mut Interner,
    consts: &'x mut ConstPool,
}

/// Parses `tokens`, interning every identifier and string/number
/// literal it encounters into the shared `interner`/`consts` tables
/// the rest of the compilation pipeline uses.
pub fn parse_script(
    tokens: &[Token],
    interner: &mut Interner,
    consts: &mut ConstPool,
) -> Result<Script, ParseError> {
    let mut parser = Parser { tokens, pos: 0, depth: 0, interner, consts };
    let script = parser.parse_block(&[])?;
    parser.skip_newlines();
    if !parser.at_eof() {
        return Err(parser.error("expected end of input"));
    }
    Ok(script)
}

impl<'t, 'x> Parser<'t, 'x> {
    fn enter_recursion(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_RECURSION {
            return Err(self.error("expression nesting too deep"));
        }
        Ok(())
    }

    fn exit_recursion(&mut self) {
        self.depth -= 1;
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_line(&self) -> u32 {
        self.current().line
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline) {
            self.bump();
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::Unexpected {
            line: self.current_line(),
            message: message.to_string(),
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.bump().kind {
            TokenKind::Ident(name) => Ok(name),
            _ => Err(self.error("expected identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.bump().kind {
            TokenKind::Str(s) => Ok(s),
            _ => Err(self.error("expected a string literal")),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.current().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected {kind:?}")))
        }
    }

    /// `=` and `to` are interchangeable assignment markers throughout
    /// (`set X = v` and `set X to v` both parse the same way).
    fn expect_assign(&mut self) -> Result<(), ParseError> {
        match self.current().kind {
            TokenKind::Eq | TokenKind::KwTo => {
                self.bump();
                Ok(())
            }
            _ => Err(self.error("expected '=' or 'to'")),
        }
    }

    /// Parses statements until EOF or one of `terminators` is seen as
    /// the next keyword (terminators are not consumed).
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, ParseError> {
        self.enter_recursion()?;
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if self.at_eof() || terminators.contains(&self.current().kind) {
                break;
            }
            stmts.push(self.parse_stmt()?);
        }
        self.exit_recursion();
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let stmt = self.parse_stmt_inner()?;
        if self.current().kind == TokenKind::KwIf
            && !matches!(stmt, Stmt::If { .. } | Stmt::For { .. } | Stmt::Foreach { .. } | Stmt::Label { .. })
        {
            self.bump();
            let condition = self.parse_expr()?;
            return Ok(Stmt::Guarded { stmt: Box::new(stmt), condition });
        }
        Ok(stmt)
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        match self.current().kind.clone() {
            TokenKind::KwSet => {
                self.bump();
                let mut names = vec![self.expect_ident()?];
                while self.current().kind == TokenKind::Comma {
                    self.bump();
                    names.push(self.expect_ident()?);
                }
                let rhs = if self.current().kind == TokenKind::KwFrom {
                    self.bump();
                    SetRhs::From(self.parse_expr()?)
                } else {
                    self.expect_assign()?;
                    let mut values = vec![self.parse_expr()?];
                    while self.current().kind == TokenKind::Comma {
                        self.bump();
                        values.push(self.parse_expr()?);
                    }
                    SetRhs::Values(values)
                };
                Ok(Stmt::Set { names, rhs, line })
            }
            TokenKind::KwConst => {
                self.bump();
                let name = self.expect_ident()?;
                self.expect_assign()?;
                let value = self.parse_expr()?;
                Ok(Stmt::Const { name, value, line })
            }
            TokenKind::KwInc => {
                self.bump();
                Ok(Stmt::Inc { name: self.expect_ident()?, line })
            }
            TokenKind::KwDec => {
                self.bump();
                Ok(Stmt::Dec { name: self.expect_ident()?, line })
            }
            TokenKind::KwPut => {
                self.bump();
                let value = self.parse_expr()?;
                let position = match self.current().kind {
                    TokenKind::KwBefore => PutPosition::Before,
                    TokenKind::KwAfter => PutPosition::After,
                    _ => return Err(self.error("expected 'before' or 'after'")),
                };
                self.bump();
                let name = self.expect_ident()?;
                Ok(Stmt::Put { name, value, position, line })
            }
            TokenKind::KwSwap => {
                self.bump();
                let a = self.expect_ident()?;
                self.expect(TokenKind::Comma)?;
                let b = self.expect_ident()?;
                Ok(Stmt::Swap { a, b, line })
            }
            TokenKind::KwWrite => {
                self.bump();
                Ok(Stmt::Write { value: self.parse_expr()?, line })
            }
            TokenKind::KwCall => {
                self.bump();
                let name = self.expect_ident()?;
                let args = self.parse_call_args()?;
                Ok(Stmt::Call { name, args, line })
            }
            TokenKind::KwInput => {
                self.bump();
                Ok(Stmt::Input { name: self.expect_ident()?, line })
            }
            TokenKind::KwYield => {
                self.bump();
                let value = if self.starts_expr() { Some(self.parse_expr()?) } else { None };
                Ok(Stmt::Yield { value, line })
            }
            TokenKind::KwStop => {
                self.bump();
                Ok(Stmt::Stop { line })
            }
            TokenKind::KwBreak => {
                self.bump();
                Ok(Stmt::Break { line })
            }
            TokenKind::KwContinue => {
                self.bump();
                Ok(Stmt::Continue { line })
            }
            TokenKind::KwReturn => {
                self.bump();
                Ok(Stmt::Return { line })
            }
            TokenKind::KwFrom => {
                self.bump();
                let library = self.expect_ident()?;
                self.expect(TokenKind::KwImport)?;
                let mut symbols = vec![self.expect_ident()?];
                while self.current().kind == TokenKind::Comma {
                    self.bump();
                    symbols.push(self.expect_ident()?);
                }
                Ok(Stmt::Import { library, alias: None, symbols: Some(symbols), line })
            }
            TokenKind::KwImport => {
                self.bump();
                let library = self.expect_ident()?;
                let alias = if self.current().kind == TokenKind::KwAs {
                    self.bump();
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                Ok(Stmt::Import { library, alias, symbols: None, line })
            }
            TokenKind::KwCatch => {
                self.bump();
                let error_class = self.expect_string()?;
                self.expect(TokenKind::KwAt)?;
                let target = self.expect_ident()?;
                Ok(Stmt::Catch { error_class, target, line })
            }
            TokenKind::Str(_) | TokenKind::InterpStr(_) => {
                // A bare string literal at line start is an implicit
                // write to the default output variable.
                Ok(Stmt::Write { value: self.parse_expr()?, line })
            }
            TokenKind::Hash => {
                self.bump();
                let name = self.expect_ident()?;
                let or_target = if self.current().kind == TokenKind::KwOr {
                    self.bump();
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                Ok(Stmt::Label { name, or_target, line })
            }
            TokenKind::KwJump => {
                self.bump();
                let target = self.parse_jump_spec()?;
                Ok(Stmt::Jump { target, line })
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwForeach => self.parse_foreach(),
            _ => Err(self.error("expected a statement")),
        }
    }

    fn starts_expr(&self) -> bool {
        !matches!(self.current().kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        if self.current().kind != TokenKind::LParen {
            return Ok(Vec::new());
        }
        self.bump();
        let mut args = Vec::new();
        if self.current().kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expr()?);
                if self.current().kind == TokenKind::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_jump_spec(&mut self) -> Result<JumpSpec, ParseError> {
        if self.current().kind == TokenKind::Hash {
            self.bump();
            let primary = self.expect_ident()?;
            if self.current().kind == TokenKind::KwOr {
                self.bump();
                self.expect(TokenKind::Hash)?;
                let fallback = self.expect_ident()?;
                return Ok(JumpSpec::OrLabel { primary, fallback });
            }
            return Ok(JumpSpec::Label(primary));
        }
        let key = self.parse_expr()?;
        if self.current().kind == TokenKind::KwFrom {
            self.bump();
            // `@E from {...}` dispatches on E's own value against the
            // case map; the `@` here only marks "this jump's target is
            // computed", it isn't a second indirect lookup the way a
            // bare `jump @E` is (there the resolved value is itself
            // looked up again in the Crucible before being used as a
            // target). So a leading `@` is unwrapped to its operand
            // rather than carried into the Keyed key.
            let key = match key {
                Expr::Indirect(inner) => *inner,
                other => other,
            };
            self.expect(TokenKind::LBrace)?;
            let mut cases = Vec::new();
            let mut default = None;
            loop {
                self.skip_newlines();
                if self.current().kind == TokenKind::RBrace {
                    break;
                }
                if let TokenKind::Ident(name) = self.current().kind.clone() {
                    if name == "_" {
                        self.bump();
                        self.expect(TokenKind::Colon)?;
                        self.expect(TokenKind::Hash)?;
                        default = Some(self.expect_ident()?);
                        self.skip_newlines();
                        if self.current().kind == TokenKind::Comma {
                            self.bump();
                        }
                        continue;
                    }
                }
                let case_key = self.parse_expr()?;
                self.expect(TokenKind::Colon)?;
                self.expect(TokenKind::Hash)?;
                let target = self.expect_ident()?;
                cases.push((case_key, target));
                self.skip_newlines();
                if self.current().kind == TokenKind::Comma {
                    self.bump();
                }
            }
            self.skip_newlines();
            self.expect(TokenKind::RBrace)?;
            return Ok(JumpSpec::Keyed { key, cases, default });
        }
        Ok(JumpSpec::Indirect(key))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        self.bump(); // if
        let mut branches = Vec::new();
        let cond = self.parse_expr()?;
        let body = self.parse_block(&[TokenKind::KwElseif, TokenKind::KwElse, TokenKind::KwEndif])?;
        branches.push((cond, body));
        loop {
            match self.current().kind {
                TokenKind::KwElseif => {
                    self.bump();
                    let cond = self.parse_expr()?;
                    let body = self.parse_block(&[TokenKind::KwElseif, TokenKind::KwElse, TokenKind::KwEndif])?;
                    branches.push((cond, body));
                }
                _ => break,
            }
        }
        let else_branch = if self.current().kind == TokenKind::KwElse {
            self.bump();
            Some(self.parse_block(&[TokenKind::KwEndif])?)
        } else {
            None
        };
        if self.current().kind != TokenKind::KwEndif {
            return Err(ParseError::UnterminatedBlock { line, expected: "endif" });
        }
        self.bump();
        Ok(Stmt::If { branches, else_branch, line })
    }

    /// Whether the token at the cursor can start a `for` init/step
    /// statement, distinguishing the three-part `for init; cond; step`
    /// form from the while-style `for cond` form.
    fn starts_for_clause(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::KwSet | TokenKind::KwInc | TokenKind::KwDec | TokenKind::KwSwap | TokenKind::KwPut | TokenKind::KwCall
        )
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        self.bump(); // for
        let (init, cond, step) = if self.starts_for_clause() {
            let init = Box::new(self.parse_stmt()?);
            self.expect(TokenKind::Semicolon)?;
            let cond = self.parse_expr()?;
            self.expect(TokenKind::Semicolon)?;
            let step = Box::new(self.parse_stmt()?);
            (Some(init), cond, Some(step))
        } else {
            (None, self.parse_expr()?, None)
        };
        let body = self.parse_block(&[TokenKind::KwEndfor])?;
        if self.current().kind != TokenKind::KwEndfor {
            return Err(ParseError::UnterminatedBlock { line, expected: "endfor" });
        }
        self.bump();
        Ok(Stmt::For { init, cond, step, body, line })
    }

    fn parse_foreach(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        self.bump(); // foreach
        let mut vars = vec![self.expect_ident()?];
        if self.current().kind == TokenKind::Comma {
            self.bump();
            vars.push(self.expect_ident()?);
        }
        self.expect(TokenKind::KwIn)?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block(&[TokenKind::KwEndfor])?;
        if self.current().kind != TokenKind::KwEndfor {
            return Err(ParseError::UnterminatedBlock { line, expected: "endfor" });
        }
        self.bump();
        Ok(Stmt::Foreach { vars, iterable, body, line })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
