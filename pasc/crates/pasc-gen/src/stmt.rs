//! Statement lowering.
//!
//! Control flow lowers to the label skeletons of the dialect
//! (`L<n>IF`-family names, one counter value per construct). `case` lowers
//! to an equality chain over the scrutinee, since the opcode set has no
//! stack duplication; source expressions are effect-free, so re-lowering the
//! scrutinee per arm is sound.

use pasc_par::{Expr, ForDirection, Stmt};

use crate::error::{GenError, Result};
use crate::{CodeGenerator, Slot};

impl CodeGenerator {
    /// Lowers one statement.
    pub(crate) fn gen_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => self.gen_assign(target, value),
            Stmt::Call { name, args } => self.gen_call(*name, args),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let i = self.next_label();
                let else_label = format!("L{i}ELSE");
                let end_label = format!("L{i}ENDIF");

                self.gen_expr(cond)?;
                self.emit(format!("JZ {else_label}"));
                self.gen_stmt(then_branch)?;
                self.emit(format!("JUMP {end_label}"));
                self.emit(format!("{else_label}:"));
                if let Some(else_branch) = else_branch {
                    self.gen_stmt(else_branch)?;
                }
                self.emit(format!("{end_label}:"));
                Ok(())
            },
            Stmt::While { cond, body } => {
                let i = self.next_label();
                let start_label = format!("L{i}WHILE");
                let end_label = format!("L{i}ENDWHILE");

                self.emit(format!("{start_label}:"));
                self.gen_expr(cond)?;
                self.emit(format!("JZ {end_label}"));
                self.gen_stmt(body)?;
                self.emit(format!("JUMP {start_label}"));
                self.emit(format!("{end_label}:"));
                Ok(())
            },
            Stmt::Repeat { body, cond } => {
                let i = self.next_label();
                let start_label = format!("L{i}REPEAT");

                self.emit(format!("{start_label}:"));
                for stmt in body {
                    self.gen_stmt(stmt)?;
                }
                // Loop back while the exit condition is still false.
                self.gen_expr(cond)?;
                self.emit(format!("JZ {start_label}"));
                Ok(())
            },
            Stmt::For {
                var,
                from,
                to,
                direction,
                body,
            } => self.gen_for(*var, from, to, *direction, body),
            Stmt::Case { scrutinee, arms } => self.gen_case(scrutinee, arms),
            Stmt::Goto(label) => {
                self.emit(format!("JUMP LABEL{label}"));
                Ok(())
            },
            Stmt::Labeled { label, stmt } => {
                self.emit(format!("LABEL{label}:"));
                self.gen_stmt(stmt)
            },
            Stmt::Compound(stmts) => {
                for stmt in stmts {
                    self.gen_stmt(stmt)?;
                }
                Ok(())
            },
            Stmt::With { .. } => Err(GenError::WithUnsupported),
        }
    }

    fn gen_assign(&mut self, target: &Expr, value: &Expr) -> Result<()> {
        match target {
            Expr::Index { base, indices } => {
                self.gen_array_address(base, indices)?;
                self.gen_expr(value)?;
                self.emit("STOREN");
                Ok(())
            },
            Expr::Var(name) => match self.slot(*name) {
                Some(Slot::Global { offset, .. }) => {
                    self.gen_expr(value)?;
                    self.emit(format!("STOREG {offset}"));
                    Ok(())
                },
                Some(Slot::Local { offset, .. }) => {
                    self.gen_expr(value)?;
                    self.emit(format!("STOREL {offset}"));
                    Ok(())
                },
                _ => Err(GenError::InvalidAssign { name: *name }),
            },
            Expr::Field { .. } => Err(GenError::RecordUnsupported),
            _ => Err(GenError::InvalidAssignTarget),
        }
    }

    /// `for` skeleton: initialize, test against the end value with
    /// `INFEQ`/`SUPEQ`, step by `ADD`/`SUB`, loop.
    fn gen_for(
        &mut self,
        var: pasc_util::Symbol,
        from: &Expr,
        to: &Expr,
        direction: ForDirection,
        body: &Stmt,
    ) -> Result<()> {
        let (push, store, offset) = match self.slot(var) {
            Some(Slot::Global { offset, .. }) => ("PUSHG", "STOREG", offset),
            Some(Slot::Local { offset, .. }) => ("PUSHL", "STOREL", offset),
            _ => return Err(GenError::VariableMisuse { name: var }),
        };

        let i = self.next_label();
        let start_label = format!("L{i}FOR");
        let end_label = format!("L{i}ENDFOR");

        self.gen_expr(from)?;
        self.emit(format!("{store} {offset}"));
        self.emit(format!("{start_label}:"));
        self.emit(format!("{push} {offset}"));
        self.gen_expr(to)?;
        self.emit(match direction {
            ForDirection::To => "INFEQ",
            ForDirection::Downto => "SUPEQ",
        });
        self.emit(format!("JZ {end_label}"));
        self.gen_stmt(body)?;
        self.emit(format!("{push} {offset}"));
        self.emit("PUSHI 1");
        self.emit(match direction {
            ForDirection::To => "ADD",
            ForDirection::Downto => "SUB",
        });
        self.emit(format!("{store} {offset}"));
        self.emit(format!("JUMP {start_label}"));
        self.emit(format!("{end_label}:"));
        Ok(())
    }

    /// `case` as an equality chain: each arm re-lowers the scrutinee per
    /// constant, ORs the comparisons, and falls through to the next arm on
    /// failure.
    fn gen_case(&mut self, scrutinee: &Expr, arms: &[pasc_par::CaseArm]) -> Result<()> {
        let i = self.next_label();
        let end_label = format!("L{i}ENDCASE");

        for (j, arm) in arms.iter().enumerate() {
            if j > 0 {
                self.emit(format!("L{i}CASE{j}:"));
            }

            for (k, label) in arm.labels.iter().enumerate() {
                self.gen_expr(scrutinee)?;
                self.gen_expr(&Expr::Const(label.clone()))?;
                self.emit("EQUAL");
                if k > 0 {
                    self.emit("OR");
                }
            }

            let miss_label = if j + 1 < arms.len() {
                format!("L{i}CASE{}", j + 1)
            } else {
                end_label.clone()
            };
            self.emit(format!("JZ {miss_label}"));

            for stmt in &arm.body {
                self.gen_stmt(stmt)?;
            }
            self.emit(format!("JUMP {end_label}"));
        }

        self.emit(format!("{end_label}:"));
        Ok(())
    }
}
