//! Expression lowering.

use pasc_par::{BinOp, Expr, Lit};
use pasc_util::Symbol;

use crate::error::{GenError, Result};
use crate::{CodeGenerator, Slot};

/// True when the subtree is a real literal. The float opcode family is
/// selected when either operand of a binary operation is one.
fn is_real_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(Lit::Real(_)))
}

impl CodeGenerator {
    /// Lowers an expression, leaving its value on the stack.
    pub(crate) fn gen_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Const(lit) => self.gen_lit(lit),
            Expr::Var(name) => self.gen_var(*name),
            Expr::Index { base, indices } => {
                self.gen_array_address(base, indices)?;
                self.emit("LOADN");
                Ok(())
            },
            Expr::Binary { op, lhs, rhs } => self.gen_binop(*op, lhs, rhs),
            Expr::Not(operand) => {
                self.gen_expr(operand)?;
                self.emit("NOT");
                Ok(())
            },
            Expr::Call { name, args } => self.gen_call(*name, args),
            Expr::Format { expr, .. } => {
                // Width and precision have no VM representation.
                self.gen_expr(expr)
            },
            Expr::Field { .. } => Err(GenError::RecordUnsupported),
            Expr::SetLit(_) => Err(GenError::SetUnsupported),
        }
    }

    fn gen_lit(&mut self, lit: &Lit) -> Result<()> {
        match lit {
            Lit::Int(value) => self.emit(format!("PUSHI {value}")),
            Lit::Real(value) => self.emit(format!("PUSHF {value:?}")),
            Lit::Bool(value) => self.emit(format!("PUSHI {}", i32::from(*value))),
            Lit::Char(c) => self.emit(format!("PUSHI {}", *c as u32)),
            Lit::Str(s) => {
                let escaped = s.as_str().replace('"', "\"\"");
                self.emit(format!("PUSHS \"{escaped}\""));
            },
            Lit::Nil => return Err(GenError::NilUnsupported),
        }
        Ok(())
    }

    fn gen_var(&mut self, name: Symbol) -> Result<()> {
        match self.slot(name) {
            Some(Slot::Global { offset, .. }) => {
                self.emit(format!("PUSHG {offset}"));
                Ok(())
            },
            Some(Slot::Local { offset, .. }) => {
                self.emit(format!("PUSHL {offset}"));
                Ok(())
            },
            Some(Slot::Const(expr)) => self.gen_expr(&expr),
            _ => Err(GenError::VariableMisuse { name }),
        }
    }

    /// Looks up the array slot behind an index base expression.
    pub(crate) fn array_entry(&self, base: &Expr) -> Result<(usize, i64, i64, bool)> {
        let Expr::Var(name) = base else {
            return Err(GenError::MultiDimArray);
        };
        match self.slot(*name) {
            Some(Slot::Array {
                offset,
                low,
                size,
                char_elem,
            }) => Ok((offset, low, size, char_elem)),
            _ => Err(GenError::NotAnArray { name: *name }),
        }
    }

    /// Emits the address of an array element: base pointer, index, low-bound
    /// adjustment, and the bounds check. Leaves `(base, index)` on the stack
    /// ready for `LOADN`/`STOREN`.
    ///
    /// Returns whether the element type is `char`.
    pub(crate) fn gen_array_address(&mut self, base: &Expr, indices: &[Expr]) -> Result<bool> {
        let (offset, low, size, char_elem) = self.array_entry(base)?;
        if indices.len() != 1 {
            return Err(GenError::MultiDimArray);
        }

        self.emit(format!("PUSHG {offset}"));
        self.gen_expr(&indices[0])?;
        if low != 0 {
            self.emit(format!("PUSHI {low}"));
            self.emit("SUB");
        }
        self.emit(format!("CHECK 0,{}", size - 1));
        Ok(char_elem)
    }

    fn gen_binop(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<()> {
        // `<>` has no direct opcode: equality then negation.
        if op == BinOp::Ne {
            self.gen_expr(lhs)?;
            self.gen_expr(rhs)?;
            self.emit("EQUAL");
            self.emit("NOT");
            return Ok(());
        }

        self.gen_expr(lhs)?;
        self.gen_expr(rhs)?;

        let float = is_real_literal(lhs) || is_real_literal(rhs);
        let instr = match op {
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Eq => "EQUAL",
            BinOp::Add => {
                if float {
                    "FADD"
                } else {
                    "ADD"
                }
            },
            BinOp::Sub => {
                if float {
                    "FSUB"
                } else {
                    "SUB"
                }
            },
            BinOp::Mul => {
                if float {
                    "FMUL"
                } else {
                    "MUL"
                }
            },
            BinOp::Divide => {
                if float {
                    "FDIV"
                } else {
                    "DIV"
                }
            },
            BinOp::Div => "DIV",
            BinOp::Mod => "MOD",
            BinOp::Lt => {
                if float {
                    "FINF"
                } else {
                    "INF"
                }
            },
            BinOp::Le => {
                if float {
                    "FINFEQ"
                } else {
                    "INFEQ"
                }
            },
            BinOp::Gt => {
                if float {
                    "FSUP"
                } else {
                    "SUP"
                }
            },
            BinOp::Ge => {
                if float {
                    "FSUPEQ"
                } else {
                    "SUPEQ"
                }
            },
            BinOp::In => return Err(GenError::SetUnsupported),
            BinOp::Ne => unreachable!("handled above"),
        };
        self.emit(instr);
        Ok(())
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Lowers a call: cast built-ins, array introspection built-ins, I/O
    /// built-ins, or a user subroutine through the calling convention.
    pub(crate) fn gen_call(&mut self, name: Symbol, args: &[Expr]) -> Result<()> {
        match name.as_str() {
            "real" => {
                self.expect_one_arg(name, args)?;
                self.gen_expr(&args[0])?;
                self.emit("ITOF");
                Ok(())
            },
            "integer" => {
                self.expect_one_arg(name, args)?;
                self.gen_expr(&args[0])?;
                self.emit("FTOI");
                Ok(())
            },
            // Chars are ordinals on the VM already.
            "chr" => {
                self.expect_one_arg(name, args)?;
                self.gen_expr(&args[0])
            },
            "length" => {
                self.expect_one_arg(name, args)?;
                let (_, _, size, _) = self.array_entry(&args[0])?;
                self.emit(format!("PUSHI {size}"));
                Ok(())
            },
            "high" => {
                self.expect_one_arg(name, args)?;
                let (_, low, size, _) = self.array_entry(&args[0])?;
                self.emit(format!("PUSHI {}", low + size - 1));
                Ok(())
            },
            "write" | "writeln" => {
                for arg in args {
                    self.gen_write_arg(arg)?;
                }
                if name.as_str() == "writeln" {
                    self.emit("WRITELN");
                }
                Ok(())
            },
            "read" | "readln" => {
                for arg in args {
                    self.gen_read_target(name, arg)?;
                }
                Ok(())
            },
            // File plumbing has no instructions in this dialect; the calls
            // are accepted and drop out of the emitted program.
            "rewrite" | "assign" | "close" => Ok(()),
            _ => self.gen_user_call(name, args),
        }
    }

    fn expect_one_arg(&self, name: Symbol, args: &[Expr]) -> Result<()> {
        if args.len() == 1 {
            Ok(())
        } else {
            Err(GenError::CastArity { name })
        }
    }

    /// One `write`/`writeln` argument: text constants via `WRITES`,
    /// everything else as an integer value.
    fn gen_write_arg(&mut self, arg: &Expr) -> Result<()> {
        if matches!(arg, Expr::Const(Lit::Str(_))) {
            self.gen_expr(arg)?;
            self.emit("WRITES");
        } else {
            self.gen_expr(arg)?;
            self.emit("WRITEI");
        }
        Ok(())
    }

    /// One `read`/`readln` destination: `READ`, the conversion (`CHARAT`
    /// for char destinations, `ATOI` otherwise), then the store.
    fn gen_read_target(&mut self, callee: Symbol, arg: &Expr) -> Result<()> {
        match arg {
            Expr::Var(name) => {
                let (store, offset, is_char) = match self.slot(*name) {
                    Some(Slot::Global { offset, is_char }) => ("STOREG", offset, is_char),
                    Some(Slot::Local { offset, is_char }) => ("STOREL", offset, is_char),
                    _ => return Err(GenError::UnknownVariable { name: *name }),
                };
                self.emit("READ");
                self.emit(if is_char { "CHARAT" } else { "ATOI" });
                self.emit(format!("{store} {offset}"));
                Ok(())
            },
            Expr::Index { base, indices } => {
                let char_elem = self.gen_array_address(base, indices)?;
                self.emit("READ");
                self.emit(if char_elem { "CHARAT" } else { "ATOI" });
                self.emit("STOREN");
                Ok(())
            },
            _ => Err(GenError::ReadTarget { name: callee }),
        }
    }

    /// User subroutine call: zero return slot, arguments in declaration
    /// order, subroutine address, `CALL`.
    fn gen_user_call(&mut self, name: Symbol, args: &[Expr]) -> Result<()> {
        let sub = self
            .subroutine(name)
            .ok_or(GenError::UnknownCallee { name })?;
        if args.len() != sub.nargs {
            return Err(GenError::CallArity {
                name,
                expected: sub.nargs,
                got: args.len(),
            });
        }

        self.emit("PUSHI 0");
        for arg in args {
            self.gen_expr(arg)?;
        }
        self.emit(format!("PUSHA {}", sub.label));
        self.emit("CALL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pasc_util::Handler;

    use crate::CodeGenerator;

    fn generate(source: &str) -> Vec<String> {
        let mut handler = Handler::new();
        let program = pasc_par::parse_source(source, &mut handler).expect("parse failed");
        CodeGenerator::new().generate(&program).expect("generation failed")
    }

    fn body_slice(code: &[String]) -> &[String] {
        let start = code.iter().position(|l| l == "START").unwrap();
        let stop = code.iter().position(|l| l == "STOP").unwrap();
        &code[start + 1..stop]
    }

    #[test]
    fn test_integer_literal() {
        let code = generate("program p; var x: integer; begin x := 42 end.");
        assert_eq!(body_slice(&code), ["PUSHI 42", "STOREG 0"]);
    }

    #[test]
    fn test_real_literal_uses_pushf() {
        let code = generate("program p; var x: real; begin x := 2.5 end.");
        assert_eq!(body_slice(&code), ["PUSHF 2.5", "STOREG 0"]);
    }

    #[test]
    fn test_whole_real_keeps_decimal_point() {
        let code = generate("program p; var x: real; begin x := 10.0 end.");
        assert_eq!(body_slice(&code), ["PUSHF 10.0", "STOREG 0"]);
    }

    #[test]
    fn test_boolean_and_char_literals_are_ordinals() {
        let code = generate(
            "program p; var b: boolean; c: char; begin b := true; c := 'A' end.",
        );
        assert_eq!(
            body_slice(&code),
            ["PUSHI 1", "STOREG 0", "PUSHI 65", "STOREG 1"]
        );
    }

    #[test]
    fn test_string_literal_doubles_quotes() {
        let code = generate("program p; begin write('di\"z') end.");
        assert_eq!(body_slice(&code), ["PUSHS \"di\"\"z\"", "WRITES"]);
    }

    #[test]
    fn test_named_constant_lowered_inline() {
        let code = generate(
            "program p; const n = 7; var x: integer; begin x := n + 1 end.",
        );
        assert_eq!(body_slice(&code), ["PUSHI 7", "PUSHI 1", "ADD", "STOREG 0"]);
    }

    #[test]
    fn test_ne_lowered_as_equal_not() {
        let code = generate(
            "program p; var a: integer; b: boolean; begin b := a <> 3 end.",
        );
        assert_eq!(
            body_slice(&code),
            ["PUSHG 0", "PUSHI 3", "EQUAL", "NOT", "STOREG 1"]
        );
    }

    #[test]
    fn test_float_opcodes_selected_by_real_literal() {
        let code = generate("program p; var x: real; begin x := x + 1.5 end.");
        assert_eq!(
            body_slice(&code),
            ["PUSHG 0", "PUSHF 1.5", "FADD", "STOREG 0"]
        );

        let code = generate("program p; var b: boolean; begin b := 1.5 < 2.0 end.");
        assert_eq!(
            body_slice(&code),
            ["PUSHF 1.5", "PUSHF 2.0", "FINF", "STOREG 0"]
        );
    }

    #[test]
    fn test_integer_comparisons() {
        let code = generate(
            "program p; var a, b: integer; r: boolean;
             begin r := a < b; r := a <= b; r := a > b; r := a >= b end.",
        );
        let body = body_slice(&code);
        let ops: Vec<&String> = body
            .iter()
            .filter(|l| ["INF", "INFEQ", "SUP", "SUPEQ"].contains(&l.as_str()))
            .collect();
        assert_eq!(ops, ["INF", "INFEQ", "SUP", "SUPEQ"]);
    }

    #[test]
    fn test_casts() {
        let code = generate(
            "program p; var x: real; n: integer; begin x := real(n); n := integer(x) end.",
        );
        assert_eq!(
            body_slice(&code),
            ["PUSHG 1", "ITOF", "STOREG 0", "PUSHG 0", "FTOI", "STOREG 1"]
        );
    }

    #[test]
    fn test_length_and_high_fold_to_constants() {
        let code = generate(
            "program p; var v: array[2..5] of integer; n: integer;
             begin n := length(v); n := high(v) end.",
        );
        assert_eq!(
            body_slice(&code),
            ["PUSHI 4", "STOREG 1", "PUSHI 5", "STOREG 1"]
        );
    }

    #[test]
    fn test_read_char_destination_uses_charat() {
        let code = generate("program p; var c: char; begin read(c) end.");
        assert_eq!(body_slice(&code), ["READ", "CHARAT", "STOREG 0"]);
    }

    #[test]
    fn test_read_into_array_element() {
        let code = generate(
            "program p; var v: array[1..3] of integer; begin read(v[2]) end.",
        );
        assert_eq!(
            body_slice(&code),
            ["PUSHG 0", "PUSHI 2", "PUSHI 1", "SUB", "CHECK 0,2", "READ", "ATOI", "STOREN"]
        );
    }

    #[test]
    fn test_format_lowers_inner_expression() {
        let code = generate("program p; var x: real; begin writeln(x : 8 : 2) end.");
        assert_eq!(body_slice(&code), ["PUSHG 0", "WRITEI", "WRITELN"]);
    }

    #[test]
    fn test_write_mixes_strings_and_values() {
        let code = generate(
            "program p; var n: integer; begin write('n=', n) end.",
        );
        assert_eq!(
            body_slice(&code),
            ["PUSHS \"n=\"", "WRITES", "PUSHG 0", "WRITEI"]
        );
    }
}
