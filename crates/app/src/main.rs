use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use labs_core::model::Lab;
use labs_core::parser;
use services::{Clock, LabLoader, NavigationError, Navigator, PreferencesService, ProgressTracker};
use storage::{FsContentSource, JsonStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingLabId,
    MissingStepIndex,
    InvalidStepIndex { raw: String },
    StepOutOfRange { step: usize, total: usize },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingLabId => write!(f, "expected a <lab-id> argument"),
            ArgsError::MissingStepIndex => write!(f, "expected a <step> argument"),
            ArgsError::InvalidStepIndex { raw } => write!(f, "invalid <step> value: {raw}"),
            ArgsError::StepOutOfRange { step, total } => {
                write!(f, "step {step} is out of range (lab has {total} steps)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- list                    # catalog overview");
    eprintln!("  cargo run -p app -- show <lab-id>           # one lab's details and steps");
    eprintln!("  cargo run -p app -- stats                   # progress statistics");
    eprintln!("  cargo run -p app -- toggle <lab-id> <step>  # flip a step's completion");
    eprintln!("  cargo run -p app -- bookmark <lab-id>       # flip a lab's bookmark");
    eprintln!();
    eprintln!("Flags (each also reads an environment variable):");
    eprintln!("  --catalog <path>    catalog markdown file    LABS_CATALOG   (default labs/README.md)");
    eprintln!("  --labs-root <path>  lab documents directory  LABS_ROOT      (default labs)");
    eprintln!("  --data-dir <path>   progress data directory  LABS_DATA_DIR  (default .labs-data)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Show,
    Stats,
    Toggle,
    Bookmark,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "show" => Some(Self::Show),
            "stats" => Some(Self::Stats),
            "toggle" => Some(Self::Toggle),
            "bookmark" => Some(Self::Bookmark),
            _ => None,
        }
    }
}

struct Args {
    catalog: PathBuf,
    labs_root: PathBuf,
    data_dir: PathBuf,
    positionals: Vec<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut catalog =
            PathBuf::from(std::env::var("LABS_CATALOG").unwrap_or_else(|_| "labs/README.md".into()));
        let mut labs_root = PathBuf::from(std::env::var("LABS_ROOT").unwrap_or_else(|_| "labs".into()));
        let mut data_dir =
            PathBuf::from(std::env::var("LABS_DATA_DIR").unwrap_or_else(|_| ".labs-data".into()));
        let mut positionals = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => catalog = require_value(args, "--catalog")?.into(),
                "--labs-root" => labs_root = require_value(args, "--labs-root")?.into(),
                "--data-dir" => data_dir = require_value(args, "--data-dir")?.into(),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        Ok(Self {
            catalog,
            labs_root,
            data_dir,
            positionals,
        })
    }

    fn lab_id(&self) -> Result<&str, ArgsError> {
        self.positionals
            .first()
            .map(String::as_str)
            .ok_or(ArgsError::MissingLabId)
    }

    fn step_index(&self) -> Result<usize, ArgsError> {
        let raw = self.positionals.get(1).ok_or(ArgsError::MissingStepIndex)?;
        raw.parse()
            .map_err(|_| ArgsError::InvalidStepIndex { raw: raw.clone() })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::List,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::List,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let args = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let json_store = JsonStore::open(&args.data_dir)?;
    let source = Arc::new(FsContentSource::new(&args.catalog, &args.labs_root));

    let mut store = LabLoader::new(source).initialize().await;
    let tracker = ProgressTracker::new(Arc::new(json_store.clone()));
    tracker.hydrate(store.labs_mut());

    // Record the visit regardless of the subcommand.
    let mut preferences =
        PreferencesService::new(Arc::new(json_store), Clock::default_clock());
    preferences.touch();

    match cmd {
        Command::List => {
            for lab in store.labs() {
                println!("{}", list_line(lab));
            }
        }
        Command::Stats => {
            let stats = tracker.stats(store.labs());
            println!("labs:        {}", stats.total);
            println!("completed:   {}", stats.completed);
            println!("in progress: {}", stats.in_progress);
            println!("bookmarked:  {}", stats.bookmarked);
            println!("completion:  {}%", stats.completion_percentage);
        }
        Command::Bookmark => {
            let lab_id = args.lab_id()?.to_owned();
            if store.find(&lab_id).is_none() {
                return Err(NavigationError::NotFound(lab_id).into());
            }
            tracker.toggle_bookmark(store.labs_mut(), &lab_id);
            if let Some(lab) = store.find(&lab_id) {
                println!(
                    "{}: {}",
                    lab.id(),
                    if lab.bookmarked() { "bookmarked" } else { "bookmark removed" }
                );
            }
        }
        Command::Show => {
            let lab_id = args.lab_id()?.to_owned();
            let mut navigator = Navigator::new(store, tracker);
            navigator.load_lab(&lab_id).await?;
            let lab = navigator
                .store()
                .find(&lab_id)
                .ok_or(NavigationError::NotFound(lab_id.clone()))?;
            print_lab(lab, navigator.store().content(&lab_id));
        }
        Command::Toggle => {
            let lab_id = args.lab_id()?.to_owned();
            let step = args.step_index()?;
            let mut navigator = Navigator::new(store, tracker);
            navigator.load_lab(&lab_id).await?;

            let total = navigator.store().find(&lab_id).map_or(0, Lab::total_steps);
            if step >= total {
                return Err(ArgsError::StepOutOfRange { step, total }.into());
            }
            navigator.toggle_step_completion(step);

            let lab = navigator
                .store()
                .find(&lab_id)
                .ok_or(NavigationError::NotFound(lab_id.clone()))?;
            println!("{}: {}% complete", lab.id(), lab.progress());
        }
    }

    Ok(())
}

fn list_line(lab: &Lab) -> String {
    let marker = if lab.completed() {
        'x'
    } else if lab.progress() > 0 {
        '~'
    } else {
        ' '
    };
    let bookmark = if lab.bookmarked() { " *" } else { "" };
    format!(
        "[{marker}] {:<24} {:<40} Level {} · {} · {} ({}%){bookmark}",
        lab.id(),
        lab.title(),
        lab.level(),
        lab.duration(),
        lab.persona(),
        lab.progress(),
    )
}

fn print_lab(lab: &Lab, content: Option<&str>) {
    println!("{} ({})", lab.title(), lab.id());
    println!("Level {} · {} · {}", lab.level(), lab.duration(), lab.persona());
    if !lab.purpose().is_empty() {
        println!("{}", lab.purpose());
    } else if !lab.description().is_empty() {
        println!("{}", lab.description());
    }

    if lab.use_cases().is_empty() {
        // No recognizable use cases: show the document outline instead.
        if let Some(text) = content {
            for section in parser::sections(text) {
                println!("{} {}", "#".repeat(section.level), section.title);
            }
        } else {
            println!("(no detail document)");
        }
        return;
    }

    let mut slot = 0;
    for use_case in lab.use_cases() {
        println!();
        println!(
            "{} Use Case #{}: {}",
            use_case.emoji, use_case.number, use_case.title
        );
        if use_case.steps.is_empty() {
            println!("  (no steps)");
            slot += 1;
            continue;
        }
        for step in &use_case.steps {
            let mark = if step.completed { 'x' } else { ' ' };
            let first_line = step.instruction.lines().next().unwrap_or("");
            println!("  [{mark}] {slot:>2}  {first_line}");
            slot += 1;
        }
    }
    println!();
    println!("{}% complete", lab.progress());
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
