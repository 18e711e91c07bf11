use std::io::{self, IsTerminal};
use std::{env, fs, process};

use jminus::bytecode::disasm::print_bc;
use jminus::frontend::TokenDumper;
use jminus::lang::printer::print_program;
use jminus::repl::{run_repl, Session};
use jminus::{
    compile, parse, tokenize, Environment, Error, Interpreter, Program, StdoutSink, Vm, VmConfig,
};

struct Options {
    tokens_only: bool,
    kinds_only: bool,
    ast: bool,
    bytecode: bool,
    interp: bool,
    repl: bool,
    no_color: bool,
    emit_bc: Option<String>,
    run_bc: Option<String>,
    max_steps: Option<usize>,
    file: Option<String>,
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(Some(opts)) => opts,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!();
            print_usage();
            process::exit(2);
        }
    };

    let config = VmConfig {
        max_steps: opts.max_steps,
        ..VmConfig::default()
    };

    if let Some(path) = &opts.run_bc {
        exit_on_error(run_bytecode_file(path, &config));
        return;
    }

    let file = match (&opts.file, opts.repl) {
        (Some(file), false) => file.clone(),
        _ => {
            let color = !opts.no_color && io::stdout().is_terminal();
            let mut session = Session::with_config(config);
            let stdin = io::stdin();
            if let Err(e) = run_repl(&mut session, stdin.lock(), io::stdout(), color) {
                eprintln!("io error: {}", e);
                process::exit(1);
            }
            return;
        }
    };

    let source = match fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", file, e);
            process::exit(1);
        }
    };

    exit_on_error(run_file(&source, &opts, config));
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// `warn` level.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut opts = Options {
        tokens_only: false,
        kinds_only: false,
        ast: false,
        bytecode: false,
        interp: false,
        repl: false,
        no_color: false,
        emit_bc: None,
        run_bc: None,
        max_steps: None,
        file: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--tokens" => opts.tokens_only = true,
            "--kinds" => {
                opts.tokens_only = true;
                opts.kinds_only = true;
            }
            "--ast" => opts.ast = true,
            "--bc" | "--bytecode" => opts.bytecode = true,
            "--interp" => opts.interp = true,
            "--repl" | "-i" => opts.repl = true,
            "--no-color" => opts.no_color = true,
            "--emit-bc" => opts.emit_bc = Some(value_of(&mut iter, arg)?),
            "--run-bc" => opts.run_bc = Some(value_of(&mut iter, arg)?),
            "--max-steps" => {
                let raw = value_of(&mut iter, arg)?;
                let n = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--max-steps expects a number, got '{}'", raw))?;
                opts.max_steps = Some(n);
            }
            flag if flag.starts_with('-') => return Err(format!("unknown flag '{}'", flag)),
            file => {
                if opts.file.is_some() {
                    return Err(format!("unexpected extra argument '{}'", file));
                }
                opts.file = Some(file.to_string());
            }
        }
    }

    if opts.file.is_none() && opts.run_bc.is_none() {
        if let Some(flag) = file_flag(&opts) {
            return Err(format!("{} expects a file", flag));
        }
    }

    Ok(Some(opts))
}

/// A set flag that only makes sense with a source file, if any.
fn file_flag(opts: &Options) -> Option<&'static str> {
    [
        (opts.kinds_only, "--kinds"),
        (opts.tokens_only, "--tokens"),
        (opts.ast, "--ast"),
        (opts.bytecode, "--bc"),
        (opts.interp, "--interp"),
        (opts.emit_bc.is_some(), "--emit-bc"),
    ]
    .into_iter()
    .find_map(|(set, flag)| set.then_some(flag))
}

fn value_of<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("{} expects a value", flag))
}

fn print_usage() {
    println!("jminus - a tiny imperative language");
    println!();
    println!("Usage:");
    println!("  jminus                        Start interactive REPL");
    println!("  jminus <file>                 Run a program on the bytecode VM");
    println!("  jminus --repl, -i             Start interactive REPL");
    println!("  jminus --interp <file>        Run with the tree-walking interpreter");
    println!("  jminus --tokens <file>        Show tokens only");
    println!("  jminus --kinds <file>         Show token kinds without lexemes");
    println!("  jminus --ast <file>           Show the syntax tree only");
    println!("  jminus --bc <file>            Show bytecode, then run it");
    println!("  jminus --emit-bc OUT <file>   Write compiled bytecode to OUT");
    println!("  jminus --run-bc FILE          Run previously emitted bytecode");
    println!("  jminus --max-steps N ...      Abort after N execution steps");
    println!("  jminus --no-color ...         Disable ANSI colors");
    println!("  jminus --help, -h             Show this help");
}

fn run_file(source: &str, opts: &Options, config: VmConfig) -> Result<(), Error> {
    let tokens = tokenize(source)?;

    if opts.tokens_only {
        let mut dumper = TokenDumper::new();
        if opts.no_color || !io::stdout().is_terminal() {
            dumper = dumper.no_color();
        }
        if opts.kinds_only {
            dumper = dumper.kinds_only();
        }
        dumper.dump(&tokens);
        return Ok(());
    }

    let statements = parse(&tokens)?;

    // AST printing mode does not depend on the engine
    if opts.ast {
        print!("{}", print_program(&statements));
        return Ok(());
    }

    let mut sink = StdoutSink::new();

    if opts.interp {
        let mut env = Environment::new();
        let mut interpreter = Interpreter::with_max_steps(config.max_steps);
        interpreter.interpret(&statements, &mut env, &mut sink)?;
        tracing::debug!(steps = interpreter.steps(), "interpreted file");
        return Ok(());
    }

    let program = compile(&statements)?;

    if let Some(out) = &opts.emit_bc {
        fs::write(out, program.to_bytes()?)?;
        tracing::debug!(path = %out, "wrote bytecode");
        return Ok(());
    }

    if opts.bytecode {
        print_bc(&program);
    }

    let mut vm = Vm::with_config(config);
    vm.run(&program, &mut sink)?;
    tracing::debug!(steps = vm.steps(), "ran file");
    Ok(())
}

fn run_bytecode_file(path: &str, config: &VmConfig) -> Result<(), Error> {
    let bytes = fs::read(path)?;
    let program = Program::from_bytes(&bytes)?;
    let mut sink = StdoutSink::new();
    Vm::with_config(config.clone()).run(&program, &mut sink)?;
    Ok(())
}

fn exit_on_error(result: Result<(), Error>) {
    if let Err(e) = result {
        // Display already carries the stage prefix
        eprintln!("{}", e);
        tracing::debug!(stage = e.stage(), "run failed");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse_err(list: &[&str]) -> String {
        match parse_args(&args(list)) {
            Err(msg) => msg,
            Ok(_) => panic!("expected usage error for {:?}", list),
        }
    }

    #[test]
    fn test_no_arguments_means_repl() {
        let opts = parse_args(&[]).unwrap().unwrap();
        assert!(opts.file.is_none());
        assert!(!opts.repl);
    }

    #[test]
    fn test_file_flags_without_file_are_rejected() {
        assert_eq!(parse_err(&["--tokens"]), "--tokens expects a file");
        assert_eq!(parse_err(&["--kinds"]), "--kinds expects a file");
        assert_eq!(parse_err(&["--ast"]), "--ast expects a file");
        assert_eq!(parse_err(&["--bc"]), "--bc expects a file");
        assert_eq!(parse_err(&["--interp", "--no-color"]), "--interp expects a file");
        assert_eq!(parse_err(&["--emit-bc", "out.bc"]), "--emit-bc expects a file");
    }

    #[test]
    fn test_file_flags_with_file() {
        let opts = parse_args(&args(&["--kinds", "prog.jm"])).unwrap().unwrap();
        assert!(opts.tokens_only && opts.kinds_only);
        assert_eq!(opts.file.as_deref(), Some("prog.jm"));

        let opts = parse_args(&args(&["--emit-bc", "out.bc", "prog.jm"]))
            .unwrap()
            .unwrap();
        assert_eq!(opts.emit_bc.as_deref(), Some("out.bc"));
    }

    #[test]
    fn test_run_bc_needs_no_source_file() {
        let opts = parse_args(&args(&["--run-bc", "out.bc"])).unwrap().unwrap();
        assert_eq!(opts.run_bc.as_deref(), Some("out.bc"));
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(parse_err(&["--bogus"]), "unknown flag '--bogus'");
        assert_eq!(parse_err(&["--max-steps", "x"]), "--max-steps expects a number, got 'x'");
        assert_eq!(parse_err(&["a.jm", "b.jm"]), "unexpected extra argument 'b.jm'");
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }
}
