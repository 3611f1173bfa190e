//! The parser's output: a nested-block AST, not yet desugared.
//!
//! Expressions already have their precedence resolved by the parser
//! (see `parser::expr`), so the AST reuses `tinder_bytecode::Expr`
//! directly rather than defining a second expression type that would
//! just be flattened into the same shape later.

use tinder_bytecode::instruction::PutPosition;
use tinder_bytecode::Expr;

pub type Script = Vec<Stmt>;

/// The right-hand side of a `set` statement: either a comma-separated
/// value list (zipped against the name list, replicating the last
/// value over any extra names) or a `from` unpack of a sequence or
/// mapping (missing slots become `none`).
#[derive(Debug, Clone)]
pub enum SetRhs {
    Values(Vec<Expr>),
    From(Expr),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Set { names: Vec<String>, rhs: SetRhs, line: u32 },
    Const { name: String, value: Expr, line: u32 },
    Inc { name: String, line: u32 },
    Dec { name: String, line: u32 },
    Put { name: String, value: Expr, position: PutPosition, line: u32 },
    Swap { a: String, b: String, line: u32 },
    /// Either an explicit `write <expr>` or a bare string literal at
    /// line start (implicit write to the default output variable).
    Write { value: Expr, line: u32 },
    Call { name: String, args: Vec<Expr>, line: u32 },
    Input { name: String, line: u32 },
    Yield { value: Option<Expr>, line: u32 },
    Stop { line: u32 },
    Break { line: u32 },
    Continue { line: u32 },
    Label { name: String, or_target: Option<String>, line: u32 },
    Jump { target: JumpSpec, line: u32 },
    Return { line: u32 },
    Import { library: String, alias: Option<String>, symbols: Option<Vec<String>>, line: u32 },
    Catch { error_class: String, target: String, line: u32 },
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
        line: u32,
    },
    /// `for init; cond; step / endfor` when `init`/`step` are present,
    /// or the while-style `for cond / endfor` when they are `None`.
    For {
        init: Option<Box<Stmt>>,
        cond: Expr,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        line: u32,
    },
    /// `foreach x in coll / endfor` (one binding) or
    /// `foreach k, v in coll / endfor` (key+value binding).
    Foreach {
        vars: Vec<String>,
        iterable: Expr,
        body: Vec<Stmt>,
        line: u32,
    },
    /// A trailing `if <expr>` modifier on an otherwise unconditional
    /// statement (`write "hi" if x`), distinct from the `if` block.
    Guarded { stmt: Box<Stmt>, condition: Expr },
}

#[derive(Debug, Clone)]
pub enum JumpSpec {
    Label(String),
    Indirect(Expr),
    Keyed {
        key: Expr,
        cases: Vec<(Expr, String)>,
        default: Option<String>,
    },
    OrLabel { primary: String, fallback: String },
}
