//! Command-line interface for hhlex
//! Tokenizes Hack/PHP-in-HTML files and runs syntax-test fixtures against the lexer.
//!
//! Usage:
//!   hhlex tokens `<path>` [--format `<format>`] [--config `<file>`]   - Print the tokens of a file
//!   hhlex scope `<path>` --line `<n>` --column `<n>`                - Print the scope stack at a position
//!   hhlex diagnostics `<path>`                                    - Print lexical diagnostics
//!   hhlex check `<fixture>`...                                    - Run syntax-test fixtures

use clap::{Arg, ArgAction, ArgMatches, Command};
use hhlex::hhlex::config::{HhlexConfig, Loader};
use hhlex::hhlex::formats::{render, OutputFormat};
use hhlex::hhlex::provider::{HackLanguageService, LanguageService};
use hhlex::hhlex::testing::SyntaxTest;
use hhlex::hhlex::{Position, Severity};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("Configuration file layered over the built-in defaults");

    let matches = Command::new("hhlex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A scope-producing lexer for Hack/PHP embedded in HTML")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Print the tokens of a file")
                .arg(
                    Arg::new("path")
                        .help("Path to the file to tokenize")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format: simple, json, yaml or scopes"),
                )
                .arg(
                    Arg::new("no-diagnostics")
                        .long("no-diagnostics")
                        .help("Leave diagnostics out of the output")
                        .action(ArgAction::SetTrue),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("scope")
                .about("Print the scope stack at a zero-based line and column")
                .arg(
                    Arg::new("path")
                        .help("Path to the file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("line")
                        .long("line")
                        .required(true)
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("column")
                        .long("column")
                        .required(true)
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("diagnostics")
                .about("Print lexical diagnostics; exits with 1 if any is an error")
                .arg(
                    Arg::new("path")
                        .help("Path to the file")
                        .required(true)
                        .index(1),
                )
                .arg(config_arg.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Run syntax-test fixtures; exits with 1 if any assertion fails")
                .arg(
                    Arg::new("fixtures")
                        .help("Fixture files")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(config_arg),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", tokens_matches)) => handle_tokens_command(tokens_matches),
        Some(("scope", scope_matches)) => handle_scope_command(scope_matches),
        Some(("diagnostics", diagnostics_matches)) => {
            handle_diagnostics_command(diagnostics_matches)
        }
        Some(("check", check_matches)) => handle_check_command(check_matches),
        _ => unreachable!(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("missing argument <{}>", name)))
}

fn load_config(matches: &ArgMatches, overrides: &[(&str, String)]) -> HhlexConfig {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file("hhlex.toml"),
    };
    for (key, value) in overrides {
        loader = loader
            .set_override(key, value.as_str())
            .unwrap_or_else(|e| fail(format!("invalid setting {}: {}", key, e)));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("failed to load configuration: {}", e)))
}

fn load_service(config: &HhlexConfig) -> HackLanguageService {
    HackLanguageService::from_config(config).unwrap_or_else(|e| fail(e))
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(format!("reading {}: {}", path, e)))
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let path = required(matches, "path");
    let mut overrides = Vec::new();
    if let Some(format) = matches.get_one::<String>("format") {
        overrides.push(("output.format", format.clone()));
    }
    if matches.get_flag("no-diagnostics") {
        overrides.push(("output.show_diagnostics", "false".to_string()));
    }
    let config = load_config(matches, &overrides);
    let format: OutputFormat = config.output.format.parse().unwrap_or_else(|e| fail(e));

    let service = load_service(&config);
    let document = service.open_document(&read_source(path));
    let output = render(&document, format, config.output.show_diagnostics)
        .unwrap_or_else(|e| fail(e));
    print!("{}", output);
}

/// Handle the scope command
fn handle_scope_command(matches: &ArgMatches) {
    let path = required(matches, "path");
    let line = matches.get_one::<usize>("line").copied().unwrap_or_default();
    let column = matches.get_one::<usize>("column").copied().unwrap_or_default();

    let service = load_service(&load_config(matches, &[]));
    let document = service.open_document(&read_source(path));
    match service.scope_at(&document, Position::new(line, column)) {
        Some(scopes) => println!("{}", scopes),
        None => fail(format!(
            "line {} is past the end of {} ({} lines)",
            line,
            path,
            document.line_count()
        )),
    }
}

/// Handle the diagnostics command
fn handle_diagnostics_command(matches: &ArgMatches) {
    let path = required(matches, "path");
    let service = load_service(&load_config(matches, &[]));
    let document = service.open_document(&read_source(path));

    let messages = service.lint(&document);
    for message in &messages {
        println!("{} {} {}", message.severity, message.range, message.text);
    }
    if messages.iter().any(|m| m.severity == Severity::Error) {
        std::process::exit(1);
    }
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches) {
    let service = load_service(&load_config(matches, &[]));
    let mut failed = false;

    for path in matches.get_many::<String>("fixtures").into_iter().flatten() {
        let test = match SyntaxTest::parse(&read_source(path)) {
            Ok(test) => test,
            Err(e) => {
                println!("ERROR {}: {}", path, e);
                failed = true;
                continue;
            }
        };
        let report = test.run(service.lexer());
        if report.passed() {
            println!("PASS {} ({} checks)", path, report.checks);
        } else {
            failed = true;
            println!("FAIL {} ({} of {} checks)", path, report.failures.len(), report.checks);
            for failure in &report.failures {
                println!("  {}", failure);
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
