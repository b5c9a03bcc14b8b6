//! AST-to-source printing.
//!
//! Renders an accepted AST back to lexable source text. The printer is the
//! inverse of the parser up to token spelling: reparsing printed output must
//! produce a structurally equal AST. Operands of compound expressions are
//! always parenthesized, which is neutral (the AST has no parenthesis node)
//! and sidesteps precedence reconstruction.

use std::fmt::{self, Write};

use crate::ast::*;

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "program {};", self.name)?;
        write_block(f, &self.block)?;
        write!(f, ".")
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, block: &Block) -> fmt::Result {
    for decl in &block.decls {
        write_decl(f, decl)?;
    }
    writeln!(f, "begin")?;
    write_stmt_list(f, &block.body)?;
    write!(f, "end")
}

fn write_decl(f: &mut fmt::Formatter<'_>, decl: &Decl) -> fmt::Result {
    match decl {
        Decl::Consts(defs) => {
            writeln!(f, "const")?;
            for def in defs {
                writeln!(f, "{} = {};", def.name, def.value)?;
            }
            Ok(())
        },
        Decl::Types(defs) => {
            writeln!(f, "type")?;
            for def in defs {
                writeln!(f, "{} = {};", def.name, def.ty)?;
            }
            Ok(())
        },
        Decl::Labels(labels) => {
            let rendered: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
            writeln!(f, "label {};", rendered.join(", "))
        },
        Decl::Vars(groups) => {
            writeln!(f, "var")?;
            for group in groups {
                writeln!(f, "{};", render_var_group(group))?;
            }
            Ok(())
        },
        Decl::Function(func) => {
            writeln!(
                f,
                "function {}({}): {};",
                func.name,
                render_params(&func.params),
                func.return_type
            )?;
            write_block(f, &func.block)?;
            writeln!(f, ";")
        },
        Decl::Procedure(proc) => {
            writeln!(
                f,
                "procedure {}({});",
                proc.name,
                render_params(&proc.params)
            )?;
            write_block(f, &proc.block)?;
            writeln!(f, ";")
        },
    }
}

fn render_params(params: &[Param]) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|param| {
            let mode = match param.mode {
                ParamMode::Value => "",
                ParamMode::Var => "var ",
                ParamMode::Const => "const ",
            };
            format!("{}{}", mode, render_var_group_like(&param.names, &param.ty))
        })
        .collect();
    rendered.join("; ")
}

fn render_var_group(group: &VarGroup) -> String {
    render_var_group_like(&group.names, &group.ty)
}

fn render_var_group_like(names: &[pasc_util::Symbol], ty: &TypeExpr) -> String {
    let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
    format!("{}: {}", names.join(", "), ty)
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Simple(simple) => write!(f, "{simple}"),
            TypeExpr::Named(name) => write!(f, "{name}"),
            TypeExpr::Array { ranges, elem } => {
                let rendered: Vec<String> = ranges
                    .iter()
                    .map(|(lo, hi)| format!("{lo}..{hi}"))
                    .collect();
                write!(f, "array [{}] of {elem}", rendered.join(", "))
            },
            TypeExpr::OpenArray(elem) => write!(f, "array of {elem}"),
            TypeExpr::Enum(names) => {
                let rendered: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
                write!(f, "({})", rendered.join(", "))
            },
            TypeExpr::Subrange(lo, hi) => write!(f, "{lo}..{hi}"),
            TypeExpr::Packed(inner) => write!(f, "packed {inner}"),
            TypeExpr::ShortString { base, len } => write!(f, "{base}[{len}]"),
            TypeExpr::Set(elem) => write!(f, "set of {elem}"),
            TypeExpr::File(elem) => write!(f, "file of {elem}"),
            TypeExpr::Record { fields, variant } => {
                write!(f, "record ")?;
                for field in fields {
                    write!(f, "{}; ", render_var_group(field))?;
                }
                if let Some(variant) = variant {
                    write!(f, "case {}: {} of ", variant.tag, variant.tag_type)?;
                    for arm in &variant.arms {
                        write!(f, "{}: (", arm.label)?;
                        for field in &arm.fields {
                            write!(f, "{}; ", render_var_group(field))?;
                        }
                        write!(f, "); ")?;
                    }
                }
                write!(f, "end")
            },
        }
    }
}

fn write_stmt_list(f: &mut fmt::Formatter<'_>, stmts: &[Stmt]) -> fmt::Result {
    for (i, stmt) in stmts.iter().enumerate() {
        if i + 1 < stmts.len() {
            writeln!(f, "{stmt};")?;
        } else {
            writeln!(f, "{stmt}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { target, value } => write!(f, "{target} := {value}"),
            Stmt::Call { name, args } => {
                if args.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{name}({})", render_exprs(args))
                }
            },
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(f, "if {cond} then {then_branch}")?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else {else_branch}")?;
                }
                Ok(())
            },
            Stmt::While { cond, body } => write!(f, "while {cond} do {body}"),
            Stmt::Repeat { body, cond } => {
                let rendered: Vec<String> = body.iter().map(|s| s.to_string()).collect();
                write!(f, "repeat {} until {cond}", rendered.join("; "))
            },
            Stmt::For {
                var,
                from,
                to,
                direction,
                body,
            } => {
                let keyword = match direction {
                    ForDirection::To => "to",
                    ForDirection::Downto => "downto",
                };
                write!(f, "for {var} := {from} {keyword} {to} do {body}")
            },
            Stmt::Case { scrutinee, arms } => {
                write!(f, "case {scrutinee} of ")?;
                for arm in arms {
                    let labels: Vec<String> =
                        arm.labels.iter().map(|l| l.to_string()).collect();
                    let body: Vec<String> = arm.body.iter().map(|s| s.to_string()).collect();
                    write!(f, "{}: {}; ", labels.join(", "), body.join("; "))?;
                }
                write!(f, "end")
            },
            Stmt::With { vars, body } => {
                write!(f, "with {} do {body}", render_exprs(vars))
            },
            Stmt::Goto(label) => write!(f, "goto {label}"),
            Stmt::Labeled { label, stmt } => write!(f, "{label}: {stmt}"),
            Stmt::Compound(stmts) => {
                let rendered: Vec<String> = stmts.iter().map(|s| s.to_string()).collect();
                write!(f, "begin {} end", rendered.join("; "))
            },
        }
    }
}

fn render_exprs(exprs: &[Expr]) -> String {
    let rendered: Vec<String> = exprs.iter().map(|e| e.to_string()).collect();
    rendered.join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(lit) => write!(f, "{lit}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Index { base, indices } => {
                write!(f, "{base}[{}]", render_exprs(indices))
            },
            Expr::Field { base, name } => write!(f, "{base}.{name}"),
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "({lhs} {} {rhs})", op.lexeme())
            },
            Expr::Not(operand) => write!(f, "(not {operand})"),
            Expr::Call { name, args } => write!(f, "{name}({})", render_exprs(args)),
            Expr::SetLit(elems) => write!(f, "[{}]", render_exprs(elems)),
            Expr::Format {
                expr,
                width,
                precision,
            } => {
                write!(f, "({expr} : {width}")?;
                if let Some(precision) = precision {
                    write!(f, " : {precision}")?;
                }
                write!(f, ")")
            },
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Int(value) => write!(f, "{value}"),
            Lit::Real(value) => f.write_str(&render_real(*value)),
            Lit::Bool(true) => f.write_str("true"),
            Lit::Bool(false) => f.write_str("false"),
            Lit::Char(c) => {
                if *c == '\'' {
                    f.write_str("''''")
                } else {
                    write!(f, "'{c}'")
                }
            },
            Lit::Str(s) => {
                let escaped = s.as_str().replace('\'', "''");
                write!(f, "'{escaped}'")
            },
            Lit::Nil => f.write_str("nil"),
        }
    }
}

/// Renders a real so that it lexes back as a real literal: the output always
/// contains a decimal point (`digits.digits`), even for whole values and
/// exponent notation.
fn render_real(value: f64) -> String {
    let mut rendered = format!("{value:?}");
    if !rendered.contains('.') {
        if let Some(pos) = rendered.find(['e', 'E']) {
            rendered.insert_str(pos, ".0");
        } else {
            rendered.push_str(".0");
        }
    }
    rendered
}

/// Renders a program as source text.
pub fn to_source(program: &Program) -> String {
    let mut out = String::new();
    write!(out, "{program}").expect("formatting into a String cannot fail");
    out
}
