//! Block desugaring: walks the parsed [`Script`] and emits the flat
//! `Line` sequence plus a resolved [`LabelTable`].
//!
//! `if/elseif/else/endif` becomes a chain of guarded jumps to a shared
//! end label; `for`/`foreach` become a header label, a guarded exit
//! jump, the body, and a jump back to the header; `break`/`continue`
//! resolve against a stack of in-flight loop targets.

use indexmap::IndexMap;
use tinder_bytecode::constant::ConstPool;
use tinder_bytecode::instruction::{Instruction, JumpTarget, Line};
use tinder_bytecode::label::Label;
use tinder_bytecode::module::LabelTable;
use tinder_core::{Interner, Symbol, Value};

use crate::ast::{JumpSpec, Script, SetRhs, Stmt};
use crate::error::CompileError;

struct LoopCtx {
    break_label: Label,
    continue_label: Label,
}

pub struct Lowerer<'x> {
    interner: &'x mut Interner,
    consts: &'x mut ConstPool,
    labels: LabelTable,
    next_label: u32,
    lines: Vec<Line>,
    source_map: Vec<u32>,
    loop_stack: Vec<LoopCtx>,
    label_names: IndexMap<Label, Symbol>,
    first_use: IndexMap<Label, u32>,
    pending_condition: Option<tinder_bytecode::Expr>,
}

pub struct Lowered {
    pub lines: Vec<Line>,
    pub source_map: Vec<u32>,
    pub labels: LabelTable,
}

pub fn lower(script: &Script, interner: &mut Interner, consts: &mut ConstPool) -> Result<Lowered, CompileError> {
    let mut lowerer = Lowerer {
        interner,
        consts,
        labels: LabelTable::new(),
        next_label: 0,
        lines: Vec::new(),
        source_map: Vec::new(),
        loop_stack: Vec::new(),
        label_names: IndexMap::new(),
        first_use: IndexMap::new(),
        pending_condition: None,
    };
    for stmt in script {
        lowerer.lower_stmt(stmt)?;
    }
    lowerer.check_totality()?;
    Ok(Lowered { lines: lowerer.lines, source_map: lowerer.source_map, labels: lowerer.labels })
}

impl<'x> Lowerer<'x> {
    fn fresh_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Returns the `Label` bound to `name`, allocating one on first
    /// reference (the label statement itself may come later).
    fn label_for_name(&mut self, name: &str, line: u32) -> Label {
        let sym = self.interner.intern(name);
        if let Some(label) = self.labels.label_for_name(sym) {
            return label;
        }
        let label = self.fresh_label();
        self.labels.declare(sym, label);
        self.label_names.insert(label, sym);
        self.first_use.insert(label, line);
        label
    }

    fn push_line(&mut self, instruction: Instruction, line: u32) -> u32 {
        let idx = self.lines.len() as u32;
        let condition = self.pending_condition.take();
        self.lines.push(Line { instruction, condition, source_line: line });
        self.source_map.push(line);
        idx
    }

    /// Resolves `label` (and `fallback`, for `#A or B` labels) to the
    /// current line index and emits its `LabelHit` marker.
    fn place_label(&mut self, label: Label, fallback: Option<Label>, line: u32) -> Result<(), CompileError> {
        if self.labels.line_for_label(label).is_some() {
            let name = self.label_names.get(&label).map(|s| self.interner.resolve(*s).to_string());
            return Err(CompileError::DuplicateLabel(name.unwrap_or_default()));
        }
        let idx = self.lines.len() as u32;
        self.labels.resolve(label, idx);
        self.push_line(Instruction::LabelHit(label, fallback), line);
        Ok(())
    }

    fn check_totality(&self) -> Result<(), CompileError> {
        for (label, line) in &self.first_use {
            if self.labels.line_for_label(*label).is_none() {
                let name = self
                    .label_names
                    .get(label)
                    .map(|s| self.interner.resolve(*s).to_string())
                    .unwrap_or_default();
                return Err(CompileError::UndefinedLabel { name, line: *line });
            }
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Guarded { stmt, condition } => {
                self.pending_condition = Some(condition.clone());
                self.lower_stmt(stmt)
            }
            Stmt::Set { names, rhs, line } => {
                // The common single-name case reuses the plain `Set`
                // instruction every other lowering path (dunders,
                // foreach cursors) already emits; only a genuine
                // multi-name or `from` assignment needs `SetMulti`.
                if let (1, SetRhs::Values(values)) = (names.len(), rhs) {
                    if values.len() == 1 {
                        let sym = self.interner.intern(&names[0]);
                        self.push_line(Instruction::Set(sym, values[0].clone()), *line);
                        return Ok(());
                    }
                }
                let syms = names.iter().map(|n| self.interner.intern(n)).collect();
                let bc_rhs = match rhs {
                    SetRhs::Values(values) => tinder_bytecode::instruction::SetRhs::Values(values.clone()),
                    SetRhs::From(expr) => tinder_bytecode::instruction::SetRhs::From(expr.clone()),
                };
                self.push_line(Instruction::SetMulti { names: syms, rhs: bc_rhs }, *line);
                Ok(())
            }
            Stmt::Const { name, value, line } => {
                let sym = self.interner.intern(name);
                self.push_line(Instruction::Const(sym, value.clone()), *line);
                Ok(())
            }
            Stmt::Inc { name, line } => {
                let sym = self.interner.intern(name);
                self.push_line(Instruction::Inc(sym), *line);
                Ok(())
            }
            Stmt::Dec { name, line } => {
                let sym = self.interner.intern(name);
                self.push_line(Instruction::Dec(sym), *line);
                Ok(())
            }
            Stmt::Put { name, value, position, line } => {
                let sym = self.interner.intern(name);
                self.push_line(Instruction::Put(sym, value.clone(), *position), *line);
                Ok(())
            }
            Stmt::Swap { a, b, line } => {
                let sa = self.interner.intern(a);
                let sb = self.interner.intern(b);
                self.push_line(Instruction::Swap(sa, sb), *line);
                Ok(())
            }
            Stmt::Write { value, line } => {
                self.push_line(Instruction::Write(value.clone()), *line);
                Ok(())
            }
            Stmt::Call { name, args, line } => {
                let sym = self.interner.intern(name);
                self.push_line(Instruction::Call(sym, args.clone()), *line);
                Ok(())
            }
            Stmt::Input { name, line } => {
                let sym = self.interner.intern(name);
                self.push_line(Instruction::Input(sym), *line);
                Ok(())
            }
            Stmt::Yield { value, line } => {
                self.push_line(Instruction::Yield(value.clone()), *line);
                Ok(())
            }
            Stmt::Stop { line } => {
                self.push_line(Instruction::Stop, *line);
                Ok(())
            }
            Stmt::Return { line } => {
                self.push_line(Instruction::Return, *line);
                Ok(())
            }
            Stmt::Import { library, alias, symbols, line } => {
                let target = tinder_bytecode::instruction::ImportTarget {
                    library: self.interner.intern(library),
                    alias: alias.as_ref().map(|a| self.interner.intern(a)),
                    symbols: symbols
                        .as_ref()
                        .map(|names| names.iter().map(|n| self.interner.intern(n)).collect()),
                };
                self.push_line(Instruction::Import(target), *line);
                Ok(())
            }
            Stmt::Catch { error_class, target, line } => {
                let class = self.interner.intern(error_class);
                let label = self.label_for_name(target, *line);
                self.push_line(Instruction::Catch { error_class: class, target: label }, *line);
                Ok(())
            }
            Stmt::Label { name, or_target, line } => {
                let label = self.label_for_name(name, *line);
                let fallback = or_target.as_ref().map(|n| self.label_for_name(n, *line));
                self.place_label(label, fallback, *line)
            }
            Stmt::Jump { target, line } => self.lower_jump(target, *line),
            Stmt::Break { line } => {
                let Some(ctx) = self.loop_stack.last() else {
                    return Err(CompileError::BreakOutsideLoop { line: *line });
                };
                let target = ctx.break_label;
                self.push_line(Instruction::Jump(JumpTarget::Direct(target)), *line);
                Ok(())
            }
            Stmt::Continue { line } => {
                let Some(ctx) = self.loop_stack.last() else {
                    return Err(CompileError::ContinueOutsideLoop { line: *line });
                };
                let target = ctx.continue_label;
                self.push_line(Instruction::Jump(JumpTarget::Direct(target)), *line);
                Ok(())
            }
            Stmt::If { branches, else_branch, line } => self.lower_if(branches, else_branch, *line),
            Stmt::For { init, cond, step, body, line } => self.lower_for(init, cond, step, body, *line),
            Stmt::Foreach { vars, iterable, body, line } => self.lower_foreach(vars, iterable, body, *line),
        }
    }

    fn lower_jump(&mut self, target: &JumpSpec, line: u32) -> Result<(), CompileError> {
        let jump_target = match target {
            JumpSpec::Label(name) => JumpTarget::Direct(self.label_for_name(name, line)),
            JumpSpec::Indirect(expr) => JumpTarget::Indirect(expr.clone()),
            JumpSpec::Keyed { key, cases, default } => JumpTarget::Keyed {
                key: key.clone(),
                cases: cases.iter().map(|(k, name)| (k.clone(), self.label_for_name(name, line))).collect(),
                default: default.as_ref().map(|n| self.label_for_name(n, line)),
            },
            JumpSpec::OrLabel { primary, fallback } => JumpTarget::OrLabel {
                primary: self.label_for_name(primary, line),
                fallback: self.label_for_name(fallback, line),
            },
        };
        self.push_line(Instruction::Jump(jump_target), line);
        Ok(())
    }

    fn lower_if(
        &mut self,
        branches: &[(tinder_bytecode::Expr, Vec<Stmt>)],
        else_branch: &Option<Vec<Stmt>>,
        line: u32,
    ) -> Result<(), CompileError> {
        let end_label = self.fresh_label();
        for (cond, body) in branches {
            let next_label = self.fresh_label();
            // Skip this branch's body when the guard is false.
            self.pending_condition = Some(negate(cond.clone()));
            self.push_line(Instruction::Jump(JumpTarget::Direct(next_label)), line);
            for stmt in body {
                self.lower_stmt(stmt)?;
            }
            self.push_line(Instruction::Jump(JumpTarget::Direct(end_label)), line);
            self.place_label(next_label, None, line)?;
        }
        if let Some(body) = else_branch {
            for stmt in body {
                self.lower_stmt(stmt)?;
            }
        }
        self.place_label(end_label, None, line)
    }

    fn lower_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        cond: &tinder_bytecode::Expr,
        step: &Option<Box<Stmt>>,
        body: &[Stmt],
        line: u32,
    ) -> Result<(), CompileError> {
        if let Some(init) = init {
            self.lower_stmt(init)?;
        }
        let header = self.fresh_label();
        let continue_label = self.fresh_label();
        let end_label = self.fresh_label();
        self.place_label(header, None, line)?;
        self.pending_condition = Some(negate(cond.clone()));
        self.push_line(Instruction::Jump(JumpTarget::Direct(end_label)), line);

        self.loop_stack.push(LoopCtx { break_label: end_label, continue_label });
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        self.loop_stack.pop();

        self.place_label(continue_label, None, line)?;
        if let Some(step) = step {
            self.lower_stmt(step)?;
        }
        self.push_line(Instruction::Jump(JumpTarget::Direct(header)), line);
        self.place_label(end_label, None, line)
    }

    /// `foreach var[, var2] in iterable ... endfor` desugars around the
    /// `__ITER__`/`__INDEX__`/`__LENGTH__` cursor dunders: the header
    /// sets up the cursor once, each pass through checks `__INDEX__ <
    /// __LENGTH__`, binds the loop variable(s) via one of the VM's
    /// `__iter_*` position intrinsics, and increments `__INDEX__`
    /// before looping back. Only reaching `end_label` — by exhaustion
    /// or `break` — counts as finalizing the cursor; a raw `jump`
    /// elsewhere leaves it live, per the loop-cursor caveat.
    ///
    /// Single-variable form binds the element for a sequence but the
    /// *key* for a mapping, so iterating a mapping yields every key
    /// exactly once; the
    /// two-variable form always binds key then value. Which of these
    /// applies is a runtime fact (the iterable's type), so the bind
    /// expression dispatches through a VM intrinsic rather than being
    /// resolved here.
    fn lower_foreach(
        &mut self,
        vars: &[String],
        iterable: &tinder_bytecode::Expr,
        body: &[Stmt],
        line: u32,
    ) -> Result<(), CompileError> {
        use tinder_bytecode::expr::BinOp;
        use tinder_bytecode::Expr;

        let iter_sym = self.interner.intern("__ITER__");
        let index_sym = self.interner.intern("__INDEX__");
        let length_sym = self.interner.intern("__LENGTH__");

        let zero = self.consts.intern(Value::Number(0.0));
        self.push_line(Instruction::Set(iter_sym, iterable.clone()), line);
        self.push_line(Instruction::Set(index_sym, Expr::Const(zero)), line);
        self.push_line(
            Instruction::Set(length_sym, Expr::Call(self.interner.intern("len"), vec![Expr::Identifier(iter_sym)])),
            line,
        );

        let header = self.fresh_label();
        let continue_label = self.fresh_label();
        let end_label = self.fresh_label();
        self.place_label(header, None, line)?;

        let exhausted = Expr::BinOp(
            BinOp::Ge,
            Box::new(Expr::Identifier(index_sym)),
            Box::new(Expr::Identifier(length_sym)),
        );
        self.pending_condition = Some(exhausted);
        self.push_line(Instruction::Jump(JumpTarget::Direct(end_label)), line);

        match vars {
            [single] => {
                let var_sym = self.interner.intern(single);
                let call = self.interner.intern("__iter_single");
                self.push_line(
                    Instruction::Set(
                        var_sym,
                        Expr::Call(call, vec![Expr::Identifier(iter_sym), Expr::Identifier(index_sym)]),
                    ),
                    line,
                );
            }
            [k, v] => {
                let k_sym = self.interner.intern(k);
                let v_sym = self.interner.intern(v);
                let key_call = self.interner.intern("__iter_key");
                let value_call = self.interner.intern("__iter_value");
                self.push_line(
                    Instruction::Set(
                        k_sym,
                        Expr::Call(key_call, vec![Expr::Identifier(iter_sym), Expr::Identifier(index_sym)]),
                    ),
                    line,
                );
                self.push_line(
                    Instruction::Set(
                        v_sym,
                        Expr::Call(value_call, vec![Expr::Identifier(iter_sym), Expr::Identifier(index_sym)]),
                    ),
                    line,
                );
            }
            _ => unreachable!("parser only produces one or two foreach bindings"),
        }

        self.loop_stack.push(LoopCtx { break_label: end_label, continue_label });
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        self.loop_stack.pop();

        self.place_label(continue_label, None, line)?;
        self.push_line(Instruction::Inc(index_sym), line);
        self.push_line(Instruction::Jump(JumpTarget::Direct(header)), line);
        self.place_label(end_label, None, line)
    }
}

fn negate(expr: tinder_bytecode::Expr) -> tinder_bytecode::Expr {
    tinder_bytecode::Expr::UnOp(tinder_bytecode::expr::UnOp::Not, Box::new(expr))
}
