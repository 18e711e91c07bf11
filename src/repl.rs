use std::io::{BufRead, Write};

use crate::bytecode::compile;
use crate::error::Result;
use crate::frontend::{parse, tokenize};
use crate::runtime::{Environment, Interpreter, OutputSink, Vm, VmConfig, WriterSink};

/// Which execution path a session sends input through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Vm,
    Interpreter,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Vm => write!(f, "vm"),
            Mode::Interpreter => write!(f, "interpreter"),
        }
    }
}

/// What the loop should do after one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report (blank line or code that ran).
    Done,
    /// A meta-command produced text for the user.
    Message(String),
    Quit,
}

pub const HELP: &str = "\
Available commands:
  :help         Show this help message
  :vm           Switch to VM mode (default)
  :interp       Switch to interpreter mode
  :mode         Show the current mode
  :env          List defined variables
  :exit, :quit  Leave the REPL
  let x = 3;    Declare variables
  yap(x);       Print variables or expressions
  Supports: if, while, blocks {}";

/// One interactive session: a mode plus an environment that outlives each
/// line of input.
pub struct Session {
    mode: Mode,
    env: Environment,
    vm: Vm,
    interpreter: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            mode: Mode::default(),
            env: Environment::new(),
            interpreter: Interpreter::with_max_steps(config.max_steps),
            vm: Vm::with_config(config),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Runs one fragment of source against the session environment.
    ///
    /// Not transactional: bindings made before a runtime error stay.
    pub fn eval(&mut self, source: &str, sink: &mut dyn OutputSink) -> Result<()> {
        let tokens = tokenize(source)?;
        let statements = parse(&tokens)?;

        match self.mode {
            Mode::Vm => {
                let program = compile(&statements)?;
                self.vm.run_in(&program, &mut self.env, sink)?;
            }
            Mode::Interpreter => {
                self.interpreter
                    .interpret(&statements, &mut self.env, sink)?;
            }
        }
        let steps = match self.mode {
            Mode::Vm => self.vm.steps(),
            Mode::Interpreter => self.interpreter.steps(),
        };
        tracing::debug!(mode = %self.mode, steps, "evaluated input");
        Ok(())
    }

    /// Handles one line: a meta-command, a blank line, or source.
    pub fn handle(&mut self, line: &str, sink: &mut dyn OutputSink) -> Result<Outcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Outcome::Done);
        }
        if let Some(outcome) = self.command(line) {
            return Ok(outcome);
        }
        self.eval(line, sink)?;
        Ok(Outcome::Done)
    }

    fn command(&mut self, line: &str) -> Option<Outcome> {
        let outcome = match line {
            ":exit" | ":quit" | "exit" => Outcome::Quit,
            ":help" => Outcome::Message(HELP.to_string()),
            ":vm" => {
                self.set_mode(Mode::Vm);
                Outcome::Message("Switched to VM mode".to_string())
            }
            ":interp" => {
                self.set_mode(Mode::Interpreter);
                Outcome::Message("Switched to interpreter mode".to_string())
            }
            ":mode" => Outcome::Message(format!("mode: {}", self.mode)),
            ":env" => {
                let bindings = self.env.bindings();
                if bindings.is_empty() {
                    Outcome::Message("(no variables)".to_string())
                } else {
                    let lines: Vec<String> = bindings
                        .iter()
                        .map(|(name, value)| format!("{} = {}", name, value))
                        .collect();
                    Outcome::Message(lines.join("\n"))
                }
            }
            other if other.starts_with(':') => {
                Outcome::Message(format!("unknown command '{}', try :help", other))
            }
            _ => return None,
        };
        Some(outcome)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GRN: &str = "\x1b[32m";
const CYN: &str = "\x1b[36m";

fn paint(color: bool, code: &str, text: &str) -> String {
    if color {
        format!("{}{}{}", code, text, RESET)
    } else {
        text.to_string()
    }
}

/// Reads lines from `input` until EOF or a quit command. Printed values,
/// messages and errors all go to `output`.
pub fn run_repl<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut output: W,
    color: bool,
) -> std::io::Result<()> {
    writeln!(output, "{}", paint(color, &format!("{}{}", GRN, BOLD), "jminus REPL"))?;
    writeln!(output, "{}", paint(color, CYN, "Type :help for available commands."))?;

    let mut lines = input.lines();
    loop {
        let prompt = match session.mode() {
            Mode::Vm => "jminus> ",
            Mode::Interpreter => "jminus(interp)> ",
        };
        write!(output, "{}", paint(color, BOLD, prompt))?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                writeln!(output)?;
                break;
            }
        };

        let result = {
            let mut sink = WriterSink::new(&mut output);
            session.handle(&line, &mut sink)
        };

        match result {
            Ok(Outcome::Done) => {}
            Ok(Outcome::Message(text)) => writeln!(output, "{}", paint(color, GRN, &text))?,
            Ok(Outcome::Quit) => break,
            Err(e) => writeln!(output, "{}", paint(color, RED, &e.to_string()))?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runtime::{CaptureSink, RuntimeError};

    fn feed(session: &mut Session, lines: &[&str]) -> Vec<i64> {
        let mut sink = CaptureSink::new();
        for line in lines {
            let _ = session.handle(line, &mut sink);
        }
        sink.values
    }

    #[test]
    fn test_default_mode_is_vm() {
        assert_eq!(Session::new().mode(), Mode::Vm);
    }

    #[test]
    fn test_bindings_persist_across_lines() {
        let mut session = Session::new();
        assert_eq!(feed(&mut session, &["let x = 2;", "x = x * 21;", "yap(x);"]), vec![42]);
    }

    #[test]
    fn test_bindings_survive_mode_switch() {
        let mut session = Session::new();
        let out = feed(
            &mut session,
            &["let n = 5;", ":interp", "n = n + 1;", "yap(n);", ":vm", "yap(n * 2);"],
        );
        assert_eq!(out, vec![6, 12]);
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let mut session = Session::new();
        let mut sink = CaptureSink::new();

        let err = session.handle("yap(1 +);", &mut sink).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));

        let err = session.handle("yap(nope);", &mut sink).unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(RuntimeError::UndefinedVariable { .. })
        ));

        session.handle("yap(7);", &mut sink).unwrap();
        assert_eq!(sink.values, vec![7]);
    }

    #[test]
    fn test_partial_line_keeps_earlier_bindings() {
        let mut session = Session::new();
        let mut sink = CaptureSink::new();
        assert!(session.handle("let a = 1; yap(b);", &mut sink).is_err());
        assert_eq!(session.env().lookup("a").unwrap(), 1);
    }

    #[test]
    fn test_meta_commands() {
        let mut session = Session::new();
        let mut sink = CaptureSink::new();

        assert_eq!(session.handle("", &mut sink).unwrap(), Outcome::Done);
        assert_eq!(session.handle(":exit", &mut sink).unwrap(), Outcome::Quit);
        assert_eq!(session.handle("exit", &mut sink).unwrap(), Outcome::Quit);
        assert_eq!(session.handle(":quit", &mut sink).unwrap(), Outcome::Quit);

        session.handle(":interp", &mut sink).unwrap();
        assert_eq!(session.mode(), Mode::Interpreter);
        assert_eq!(
            session.handle(":mode", &mut sink).unwrap(),
            Outcome::Message("mode: interpreter".to_string())
        );

        assert!(matches!(
            session.handle(":help", &mut sink).unwrap(),
            Outcome::Message(ref m) if m.contains(":interp")
        ));
        assert!(matches!(
            session.handle(":bogus", &mut sink).unwrap(),
            Outcome::Message(ref m) if m.contains("unknown command")
        ));
    }

    #[test]
    fn test_env_listing_is_sorted() {
        let mut session = Session::new();
        let mut sink = CaptureSink::new();
        assert_eq!(
            session.handle(":env", &mut sink).unwrap(),
            Outcome::Message("(no variables)".to_string())
        );
        session.handle("let zed = 1; let alpha = 2;", &mut sink).unwrap();
        assert_eq!(
            session.handle(":env", &mut sink).unwrap(),
            Outcome::Message("alpha = 2\nzed = 1".to_string())
        );
    }

    #[test]
    fn test_run_repl_transcript() {
        let input = "let x = 1;\nyap(x + 1);\nyap(y);\n:mode\n:exit\nyap(99);\n";
        let mut output = Vec::new();
        run_repl(&mut Session::new(), input.as_bytes(), &mut output, false).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("jminus> 2\n"));
        assert!(text.contains("undefined variable 'y'"));
        assert!(text.contains("mode: vm"));
        assert!(!text.contains("99"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_run_repl_stops_at_eof() {
        let mut output = Vec::new();
        run_repl(&mut Session::new(), "yap(3);".as_bytes(), &mut output, false).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("3\n"));
    }
}
