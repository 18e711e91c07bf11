use std::collections::BTreeSet;
use std::fmt::Write;

use crate::bytecode::{Instruction, OpCode, OperandKind, Program};

/// Print disassembly of a bytecode program
pub fn print_bc(program: &Program) {
    print!("{}", disassemble(program));
}

/// Return disassembly as a String
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    out.push_str("════════════════════════════════════════\n");
    out.push_str(" main\n");
    let _ = writeln!(out, " {} instructions", program.instructions.len());
    out.push_str("════════════════════════════════════════\n");

    let jump_targets = collect_jump_targets(&program.instructions);

    for (ip, ins) in program.instructions.iter().enumerate() {
        if jump_targets.contains(&ip) {
            out.push_str("      ┌──────────────────────────────────\n");
        }

        let marker = if jump_targets.contains(&ip) { "► " } else { "  " };
        let line = match program.line_at(ip) {
            Some(line) => format!("{:>4}", line),
            None => "   |".to_string(),
        };
        let _ = writeln!(
            out,
            "{:04} {}{} {}",
            ip,
            marker,
            line,
            format_instruction(program, ip, ins)
        );
    }

    if !program.constants.is_empty() {
        out.push_str("\nconstants:\n");
        for (i, value) in program.constants.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", i, value);
        }
    }
    if !program.names.is_empty() {
        out.push_str("\nnames:\n");
        for (i, name) in program.names.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", i, name);
        }
    }

    out
}

fn collect_jump_targets(instructions: &[Instruction]) -> BTreeSet<usize> {
    instructions
        .iter()
        .filter(|ins| ins.op.operand_kind() == OperandKind::Target)
        .map(|ins| ins.operand as usize)
        .collect()
}

fn format_instruction(program: &Program, ip: usize, ins: &Instruction) -> String {
    let name = ins.op.mnemonic();
    match ins.op.operand_kind() {
        OperandKind::None => name.to_string(),
        OperandKind::Constant => match program.constant(ins.operand) {
            Some(value) => format!("{:<14} {:<4} ; {}", name, ins.operand, value),
            None => format!("{:<14} {:<4} ; <bad constant>", name, ins.operand),
        },
        OperandKind::Name => match program.name(ins.operand) {
            Some(var) => format!("{:<14} {:<4} ; {}", name, ins.operand, var),
            None => format!("{:<14} {:<4} ; <bad name>", name, ins.operand),
        },
        OperandKind::Target => {
            let direction = if (ins.operand as usize) <= ip { "↑" } else { "↓" };
            let note = match ins.op {
                OpCode::Jump if ins.operand as usize <= ip => " (loop)",
                _ => "",
            };
            format!("{:<14} {} (→ {:04}){}", name, direction, ins.operand, note)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile;
    use crate::frontend::{lexer::tokenize, parser::parse};

    fn disasm_src(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        let stmts = parse(&tokens).unwrap();
        disassemble(&compile(&stmts).unwrap())
    }

    #[test]
    fn test_constants_and_names_are_annotated() {
        let out = disasm_src("let answer = 42; yap(answer);");
        assert!(out.contains("CONST"));
        assert!(out.contains("; 42"));
        assert!(out.contains("; answer"));
        assert!(out.contains("names:\n  [0] answer"));
        assert!(out.contains("constants:\n  [0] 42"));
    }

    #[test]
    fn test_jump_targets_are_marked() {
        let out = disasm_src("let x = 0; while (x < 3) x = x + 1;");
        assert!(out.contains("► "));
        assert!(out.contains("JUMP_IF_FALSE"));
        assert!(out.contains("(loop)"));
    }

    #[test]
    fn test_bad_operands_do_not_panic() {
        let prog = Program {
            instructions: vec![
                Instruction::new(OpCode::Const, 9),
                Instruction::new(OpCode::Load, 9),
                Instruction::new(OpCode::Jump, 99),
            ],
            ..Program::default()
        };
        let out = disassemble(&prog);
        assert!(out.contains("<bad constant>"));
        assert!(out.contains("<bad name>"));
    }

    #[test]
    fn test_instruction_count_header() {
        let out = disasm_src("yap(1);");
        assert!(out.contains(" 3 instructions"));
        assert!(out.contains("HALT"));
    }
}
