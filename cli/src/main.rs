mod highlighter;
mod lexer;

use clap::Parser;
use miette::{Result, miette};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    FileBackedHistory, IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, ValidationResult, Validator, default_emacs_keybindings,
};
use shaperule::ast::TermKind;
use shaperule::{
    Engine, EngineOptions, Expression, ListEvaluationAid, TableEvaluator, Term, render_error,
};
use std::io::BufRead;
use std::io::BufReader;

/// Shaperule - formulas for procedural shape rules
#[derive(Parser, Debug)]
#[command(name = "shaperule")]
#[command(about = "Evaluate shape rule formulas", long_about = None)]
struct Args {
    /// Print the parsed term tree (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Define a constant; the value is itself a formula (e.g. `-D height=3*4`)
    #[arg(short = 'D', long = "define", value_name = "NAME=FORMULA")]
    defines: Vec<String>,

    /// Evaluate over this many instances, with `index` bound per instance
    #[arg(long, value_name = "N")]
    count: Option<usize>,

    /// Seed for `rand` and `p`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Formula to evaluate (if not provided, reads from stdin)
    expression: Option<String>,
}

/// Keeps the line open while brackets are unbalanced.
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match lexer::calculate_depth(line) {
            Some(depth) if depth > 0 => ValidationResult::Incomplete,
            _ => ValidationResult::Complete,
        }
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let mut words: Vec<String> = shaperule_core::stdlib::names().map(String::from).collect();
    words.extend(["if", "switch", "optional", "default"].map(String::from));
    words.sort();

    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_']);
        completions.insert(words);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let mut line_editor = Reedline::create()
        .with_highlighter(Box::new(highlighter::Highlighter))
        .with_validator(Box::new(BracketValidator))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(Box::new(ide_menu)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    if let Some(dir) = dirs::data_local_dir().map(|d| d.join("shaperule")) {
        let history = std::fs::create_dir_all(&dir)
            .ok()
            .and_then(|_| FileBackedHistory::with_file(1000, dir.join("history.txt")).ok());
        match history {
            Some(history) => line_editor = line_editor.with_history(Box::new(history)),
            None => tracing::warn!(dir = %dir.display(), "history disabled"),
        }
    }

    let prompt = DefaultPrompt::new(DefaultPromptSegment::Empty, DefaultPromptSegment::Empty);

    (line_editor, prompt)
}

fn kind_label(kind: &TermKind) -> String {
    match kind {
        TermKind::Constant { number: Some(_), .. } => "Number".to_string(),
        TermKind::Constant { .. } => "Name".to_string(),
        TermKind::Str(_) => "String".to_string(),
        TermKind::Unary(_) => "Negate".to_string(),
        TermKind::Binary { op, .. } => format!("Binary {}", op.symbol()),
        TermKind::Call { name, .. } => format!("Call {}", name),
        TermKind::MemberCall { name, .. } => format!("MemberCall ->{}", name),
        TermKind::Array(elements) => format!("Array [{}]", elements.len()),
        TermKind::Index { .. } => "Index".to_string(),
        TermKind::Switch { cases, .. } => format!("Switch [{} cases]", cases.len()),
        TermKind::Conditional { .. } => "If".to_string(),
        TermKind::Optional { name, .. } => format!("Optional {}", name),
        TermKind::Not(_) => "Not".to_string(),
        TermKind::Inequality(_) => "Comparison".to_string(),
        TermKind::Combined(_) => "Chain".to_string(),
    }
}

fn print_tree(term: Term<'_>, depth: usize) {
    let span = term.span();
    println!(
        "{:indent$}{} @{}..{} `{}`",
        "",
        kind_label(term.kind()),
        span.start(),
        span.end(),
        term.text(),
        indent = depth * 2
    );
    for child in term.children() {
        print_tree(child, depth + 1);
    }
}

/// Evaluation state shared by every line of a session.
struct Session {
    engine: Engine,
    host: TableEvaluator,
    count: Option<usize>,
    debug_parse: bool,
}

impl Session {
    fn new(args: &Args) -> Result<Self> {
        let mut host = match args.count {
            Some(0) => return Err(miette!("--count must be at least 1")),
            Some(count) => {
                let mut host = TableEvaluator::with_instances(count);
                for i in 0..count {
                    host.set_instance_value(i, "index", i as f64);
                }
                host
            }
            None => TableEvaluator::new(),
        };
        host.reseed(args.seed);

        let mut session = Self {
            engine: Engine::new(EngineOptions::default()),
            host,
            count: args.count,
            debug_parse: args.debug_parse,
        };
        for definition in &args.defines {
            session.define(definition)?;
        }
        Ok(session)
    }

    /// Binds `NAME=FORMULA` as a global constant.
    fn define(&mut self, definition: &str) -> Result<()> {
        let (name, formula) = definition
            .split_once('=')
            .ok_or_else(|| miette!("expected NAME=FORMULA, found '{}'", definition))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(miette!("missing name in '{}'", definition));
        }
        let value = match self.engine.run(formula, &mut self.host) {
            Ok(value) => value,
            Err(e) => {
                render_error(&e);
                return Err(miette!("cannot define '{}'", name));
            }
        };
        tracing::debug!(name, %value, "defined constant");
        self.host.set_global(name, value);
        Ok(())
    }

    fn interpret_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        let expr = match self.engine.parse(input) {
            Ok(expr) => expr,
            Err(e) => {
                render_error(&e);
                return;
            }
        };

        if self.debug_parse {
            println!("=== Term tree ===");
            print_tree(expr.root(), 0);
            println!("=== Canonical form ===");
            println!("{}", expr);
            println!();
        }

        match self.count {
            Some(_) => self.evaluate_batch(&expr),
            None => match self.engine.evaluate(&expr, &mut self.host) {
                Ok(value) => println!("{}", value),
                Err(e) => render_error(&e),
            },
        }
    }

    fn evaluate_batch(&mut self, expr: &Expression) {
        let mut aid = ListEvaluationAid::new();
        match self.engine.evaluate_for_list(expr, &mut self.host, &mut aid) {
            Ok(values) => {
                for (index, value) in values.iter().enumerate() {
                    println!("[{}] {}", index, value);
                }
            }
            Err(e) => render_error(&e),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the level; default to WARN if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut session = Session::new(&args)?;

    // Check if we have a direct expression argument
    if let Some(expr) = &args.expression {
        session.interpret_input(expr);
        return Ok(());
    }

    // Otherwise, check if we're in interactive or pipe mode
    let is_interactive = atty::is(atty::Stream::Stdin);

    if is_interactive {
        let (mut line_editor, prompt) = setup_reedline();

        println!("Shaperule REPL - Type formulas to evaluate (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => session.interpret_input(&buffer),
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    return Ok(());
                }
            };

            session.interpret_input(&line);
        }
    }

    Ok(())
}
