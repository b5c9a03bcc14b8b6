//! Whole-pipeline tests over `compile_source`.
//!
//! These establish the output-shape invariants of the emitted assembly:
//! every jump lands on a defined label, every global offset stays inside the
//! reserved range, every array access is bounds-checked, and compilation is
//! invariant under case folding of the source.

use std::collections::HashSet;

use pasc_drv::compile_source;

fn compile(source: &str) -> Vec<String> {
    compile_source(source).expect("compilation failed")
}

/// All labels defined in the output (lines of the form `NAME:`).
fn defined_labels(code: &[String]) -> HashSet<&str> {
    code.iter()
        .filter_map(|line| line.strip_suffix(':'))
        .collect()
}

/// All `JUMP`/`JZ` targets.
fn jump_targets(code: &[String]) -> Vec<&str> {
    code.iter()
        .filter_map(|line| {
            line.strip_prefix("JUMP ")
                .or_else(|| line.strip_prefix("JZ "))
        })
        .collect()
}

const PROGRAM_WITH_EVERYTHING: &str = "
program completo;
const n = 3;
var v: array[1..n] of integer;
    i, total: integer;
    x: real;

function dobro(k: integer): integer;
begin
  dobro := k * 2
end;

procedure mostra(valor: integer);
begin
  writeln('valor: ', valor)
end;

begin
  total := 0;
  for i := 1 to n do v[i] := dobro(i);
  while total < 10 do total := total + v[1];
  repeat total := total - 1 until total = 0;
  if total = 0 then mostra(total) else writeln(total);
  case total of
    0: writeln('zero');
    1, 2: writeln('pequeno');
  end;
  x := real(total) / 2.0;
  writeln(x : 6 : 2)
end.
";

#[test]
fn every_jump_target_is_a_defined_label() {
    let code = compile(PROGRAM_WITH_EVERYTHING);
    let labels = defined_labels(&code);
    for target in jump_targets(&code) {
        assert!(labels.contains(target), "undefined jump target '{target}'");
    }
}

#[test]
fn every_pusha_names_a_subprogram_label() {
    let code = compile(PROGRAM_WITH_EVERYTHING);
    let labels = defined_labels(&code);
    let pusha_targets: Vec<&str> = code
        .iter()
        .filter_map(|line| line.strip_prefix("PUSHA "))
        .collect();
    assert!(!pusha_targets.is_empty());
    for target in pusha_targets {
        assert!(labels.contains(target), "undefined subprogram '{target}'");
        assert_eq!(target, target.to_uppercase());
    }
}

#[test]
fn global_offsets_stay_inside_reserved_range() {
    // Four globals are declared: v, i, total, x.
    let code = compile(PROGRAM_WITH_EVERYTHING);
    let reserved = 4;
    for line in &code {
        let offset = line
            .strip_prefix("STOREG ")
            .or_else(|| line.strip_prefix("PUSHG "));
        if let Some(offset) = offset {
            let offset: usize = offset.parse().expect("numeric offset");
            assert!(offset < reserved, "offset {offset} out of range in '{line}'");
        }
    }
}

#[test]
fn array_accesses_are_bounds_checked() {
    let code = compile(
        "program a; var v: array[1..3] of integer; i: integer;
         begin for i := 1 to 3 do v[i] := i; writeln(v[2]); read(v[1]) end.",
    );

    let mut last_check: Option<&str> = None;
    let mut accesses = 0;
    for line in &code {
        if let Some(bounds) = line.strip_prefix("CHECK ") {
            last_check = Some(bounds);
        }
        if line == "LOADN" || line == "STOREN" {
            accesses += 1;
            assert_eq!(
                last_check.take(),
                Some("0,2"),
                "array access without a preceding CHECK 0,2"
            );
        }
    }
    assert_eq!(accesses, 3);
}

#[test]
fn compilation_is_invariant_under_case_folding() {
    let shouty = "
PROGRAM L;
VAR I, N: INTEGER;
BEGIN
  N := 0;
  FOR I := 1 TO 10 DO N := N + I;
  WRITELN(N)
END.
";
    let lower = shouty.to_lowercase();
    assert_eq!(compile(shouty), compile(&lower));
}

#[test]
fn rejected_iff_lowercased_form_rejected() {
    let bad = "PROGRAM E; VAR B: BOOLEAN; BEGIN B := 1 END.";
    let upper_err = compile_source(bad).unwrap_err().to_string();
    let lower_err = compile_source(&bad.to_lowercase()).unwrap_err().to_string();
    assert_eq!(upper_err, lower_err);
}

#[test]
fn scenario_s2_sum() {
    let code = compile(
        "program s; var a, b, s: integer; begin read(a); read(b); s := a + b; writeln(s) end.",
    );
    let reads = code.iter().filter(|l| *l == "READ").count();
    assert_eq!(reads, 2);
    assert!(code.contains(&"ADD".to_string()));
    assert!(code.contains(&"WRITEI".to_string()));
}

#[test]
fn scenario_s3_for_loop_uses_infeq() {
    let code = compile(
        "program l; var i, n: integer; begin n := 0; for i := 1 to 10 do n := n + i; writeln(n) end.",
    );
    assert!(code.contains(&"INFEQ".to_string()));
    assert!(code.contains(&"L0FOR:".to_string()));
    assert!(code.contains(&"L0ENDFOR:".to_string()));
}

#[test]
fn scenario_s5_function_call() {
    let code = compile(
        "program f; function sq(x: integer): integer; begin sq := x * x end;
         var y: integer; begin y := sq(7); writeln(y) end.",
    );
    let call_window: Vec<&str> = code.iter().map(String::as_str).collect();
    let pusha = call_window
        .iter()
        .position(|l| *l == "PUSHA SQ")
        .expect("PUSHA SQ missing");
    assert_eq!(call_window[pusha + 1], "CALL");
    // The zero return slot and the argument precede the address push.
    assert_eq!(&call_window[pusha - 2..pusha], ["PUSHI 0", "PUSHI 7"]);
}

#[test]
fn scenario_s6_type_error_rejected() {
    let err = compile_source("program e; var b: boolean; begin b := 1 end.").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Tipos incompatíveis: variável é BOOLEAN, mas expressão é INTEGER."
    );
}

#[test]
fn coercion_points_accept_integer_into_real() {
    compile("program p; var x: real; begin x := 1 end.");
    compile(
        "program p; function metade(x: real): real; begin metade := x / 2 end;
         var y: real; begin y := metade(5) end.",
    );
}
