//! sqlsynth CLI - generate synthetic NL/SQL corpora
//!
//! Usage:
//!   sqlsynth generate --db <id> [options]
//!   sqlsynth canonicalize [--schema <file>] [--skip <pass>...]
//!   sqlsynth verify --templates <file>...
//!
//! Examples:
//!   sqlsynth generate --db concert_singer --toy --verbose
//!   echo "select b, a from t" | sqlsynth canonicalize --skip order

use clap::{Args, Parser, Subcommand};
use sqlsynth::canonical::{Canonicalizer, Pass};
use sqlsynth::config::Settings;
use sqlsynth::generation::{read_templates, verify_template, Generator};
use sqlsynth::schema::{CanonicalSchema, Schema};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlsynth")]
#[command(about = "Synthetic NL/SQL corpus generation from templates")]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Settings file (defaults to $SQLSYNTH_CONFIG, ./sqlsynth.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a corpus for one database
    Generate(GenerateArgs),

    /// Canonicalize SQL queries read from stdin, one per line
    Canonicalize {
        /// Schema file used to resolve bare column references
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Passes to skip (semicolon, whitespace, case, aliases, order)
        #[arg(long, value_parser = parse_pass)]
        skip: Vec<Pass>,
    },

    /// Check template files for structural errors
    Verify {
        /// Template files
        #[arg(long, required = true, num_args = 1..)]
        templates: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Database id
    #[arg(long)]
    db: Option<String>,

    #[arg(long)]
    db_dir: Option<String>,
    #[arg(long)]
    schema: Option<String>,
    #[arg(long)]
    dictionary: Option<String>,
    #[arg(long, num_args = 1..)]
    templates: Vec<String>,
    #[arg(long)]
    adjectives: Option<String>,
    #[arg(long)]
    ppdb: Option<String>,
    #[arg(long)]
    out_dir: Option<String>,

    /// Small run for debugging
    #[arg(long)]
    toy: bool,
    #[arg(long)]
    no_group_by: bool,
    #[arg(long)]
    no_join: bool,
    /// Do not prune the slot-filling tree
    #[arg(long)]
    no_filter: bool,
    #[arg(long)]
    no_canonical: bool,
    /// Validate generated queries against the SQLite database
    #[arg(long)]
    validate: bool,
    /// Fill literal placeholders with values from the database
    #[arg(long)]
    fill_literals: bool,

    #[arg(long)]
    validation_split: Option<f64>,
    #[arg(long)]
    group_by_p: Option<f64>,
    #[arg(short, long)]
    a: Option<f64>,
    #[arg(short, long)]
    b: Option<f64>,
    #[arg(long)]
    func_boost: Option<f64>,
    #[arg(long)]
    argmax_boost: Option<f64>,
    #[arg(long)]
    join_boost: Option<f64>,
    #[arg(long)]
    in_boost: Option<f64>,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    query_bound: Option<usize>,
    #[arg(long)]
    unequal_p: Option<f64>,
    #[arg(long)]
    or_p: Option<f64>,
    #[arg(long)]
    adjective_scale: Option<f64>,
    #[arg(long)]
    pp_scale: Option<usize>,
    #[arg(long)]
    rand_drop_p: Option<f64>,
    #[arg(long)]
    rand_drop_scale: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_pass(s: &str) -> Result<Pass, String> {
    s.parse()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let mut settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let verbose = cli.verbose
        || settings.generation.verbose
        || matches!(&cli.command, Commands::Generate(args) if args.toy);
    if let Err(e) = init_logging(verbose, cli.log.as_ref()) {
        eprintln!("Error opening log file: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Commands::Generate(args) => {
            args.apply(&mut settings);
            cmd_generate(&settings)
        }
        Commands::Canonicalize { schema, skip } => cmd_canonicalize(schema, skip),
        Commands::Verify { templates } => cmd_verify(templates),
    }
}

fn init_logging(verbose: bool, log: Option<&PathBuf>) -> io::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match log {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = fs::File::create(path)?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => subscriber.with_writer(io::stderr).init(),
    }
    Ok(())
}

impl GenerateArgs {
    /// Override settings with the flags given on the command line.
    fn apply(self, settings: &mut Settings) {
        let generation = &mut settings.generation;
        let paths = &mut settings.paths;
        let paraphrase = &mut settings.paraphrase;

        if let Some(db) = self.db {
            generation.db = db;
        }
        paths.db_dir = self.db_dir.or(paths.db_dir.take());
        paths.schema = self.schema.or(paths.schema.take());
        paths.dictionary = self.dictionary.or(paths.dictionary.take());
        paths.adjectives = self.adjectives.or(paths.adjectives.take());
        paths.out_dir = self.out_dir.or(paths.out_dir.take());
        if !self.templates.is_empty() {
            paths.templates = self.templates;
        }
        paraphrase.ppdb = self.ppdb.or(paraphrase.ppdb.take());

        generation.toy |= self.toy;
        generation.no_group_by |= self.no_group_by;
        generation.no_join |= self.no_join;
        generation.no_filter |= self.no_filter;
        generation.no_canonical |= self.no_canonical;
        generation.validate |= self.validate;
        generation.fill_literals |= self.fill_literals;

        let floats = [
            (self.validation_split, &mut generation.validation_split),
            (self.group_by_p, &mut generation.group_by_p),
            (self.a, &mut generation.a),
            (self.b, &mut generation.b),
            (self.func_boost, &mut generation.func_boost),
            (self.argmax_boost, &mut generation.argmax_boost),
            (self.join_boost, &mut generation.join_boost),
            (self.in_boost, &mut generation.in_boost),
            (self.threshold, &mut generation.threshold),
            (self.unequal_p, &mut generation.unequal_p),
            (self.or_p, &mut generation.or_p),
            (self.adjective_scale, &mut generation.adjective_scale),
            (self.rand_drop_p, &mut paraphrase.rand_drop_p),
        ];
        for (value, field) in floats {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(v) = self.query_bound {
            generation.query_bound = v;
        }
        if let Some(v) = self.seed {
            generation.seed = v;
        }
        if let Some(v) = self.pp_scale {
            paraphrase.pp_scale = v;
        }
        if let Some(v) = self.rand_drop_scale {
            paraphrase.rand_drop_scale = v;
        }
    }
}

fn cmd_generate(settings: &Settings) -> ExitCode {
    if settings.generation.db.is_empty() {
        eprintln!("Error: a database id is required (--db or [generation] db)");
        return ExitCode::FAILURE;
    }
    if settings.generation.toy {
        tracing::warn!("toy mode active");
    }

    let mut generator = match Generator::from_settings(settings) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let templates = match settings.paths.template_files() {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let count = match generator.generate_from_files(&templates) {
        Ok(count) => count,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let out_dir = match settings.paths.out_dir(&settings.generation.db) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match generator.write_output(&out_dir) {
        Ok(files) => {
            println!("Generated {} samples", count);
            for path in files.train.iter().chain(&files.validation) {
                println!("  {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_canonicalize(schema: Option<PathBuf>, skip: Vec<Pass>) -> ExitCode {
    let canonical = match schema {
        Some(path) => match Schema::from_file(&path) {
            Ok(schema) => schema.canonical(),
            Err(e) => {
                eprintln!("Error reading schema '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => CanonicalSchema::new(),
    };

    let canonicalizer = skip
        .into_iter()
        .fold(Canonicalizer::new(&canonical), Canonicalizer::skip);
    let variables = BTreeMap::new();

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        println!("{}", canonicalizer.canonicalize(&line, &variables));
    }
    ExitCode::SUCCESS
}

fn cmd_verify(templates: Vec<PathBuf>) -> ExitCode {
    let mut failures = 0;
    let mut total = 0;

    for file in &templates {
        let lines = match read_templates(file) {
            Ok(lines) => lines,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", file.display(), e);
                return ExitCode::FAILURE;
            }
        };
        for line in &lines {
            total += 1;
            if let Err(e) = verify_template(line) {
                failures += 1;
                eprintln!("{}: {}", file.display(), e);
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} templates failed verification", failures, total);
        return ExitCode::FAILURE;
    }
    println!("OK: {} templates verified", total);
    ExitCode::SUCCESS
}
