//! Command-line interface for rex
//! This binary parses a pattern and prints its syntax tree, diagnostics and captures.
//!
//! Usage:
//!   rex `<pattern>` [--literal] [--offset `<n>`] [--options `<list>`] [--format `<format>`]
//!   rex --file `<path>` [...]            - Read the pattern from a file
//!   rex --config `<file>` [...]          - Layer a configuration file over the defaults
//!   rex --list-formats                   - List all available output formats
//!
//! Exit codes: 0 when the pattern was parsed (diagnostics included), 1 on usage, literal or
//! configuration errors, 2 when the pattern nests too deeply to analyze.

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::ConfigError;
use rex_config::Loader;
use rex_parser::rex::formats::{FormatError, FormatRegistry};
use rex_parser::rex::options::UnknownOption;
use rex_parser::rex::virtual_chars::literal::{self, LiteralError};
use rex_parser::rex::{parse, ParseError, VirtualCharSequence};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Options(#[from] UnknownOption),
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid string literal: {0}")]
    Literal(#[from] LiteralError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Parse(ParseError::DepthExceeded { .. }) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}

fn command() -> Command {
    Command::new("rex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse a .NET-dialect regular expression and show its syntax tree")
        .arg_required_else_help(true)
        .arg(
            Arg::new("pattern")
                .help("The pattern, or the source of a string literal with --literal")
                .required_unless_present_any(["file", "list-formats"])
                .conflicts_with("file")
                .index(1),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .help("Read the pattern from a file (one trailing newline is dropped)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("literal")
                .long("literal")
                .short('l')
                .help("Decode the input as a host string literal (\"...\" or @\"...\")")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .help("Host-file offset of the first character; shifts every span")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("options")
                .long("options")
                .short('o')
                .help("Comma-separated options, e.g. i,x,ecma or ignore-case,explicit-capture"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["tag", "treeviz", "json"]),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats")
                .action(ArgAction::SetTrue),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(layer).init();
}

fn main() -> ExitCode {
    let matches = match command().try_get_matches() {
        Ok(matches) => matches,
        Err(error) => {
            let _ = error.print();
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_tracing();

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return ExitCode::SUCCESS;
    }

    match handle_parse_command(&matches) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::debug!(?error, "rex failed");
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

/// Layer the config file and command-line flags over the defaults
fn load_config(matches: &ArgMatches) -> Result<rex_config::RexConfig, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    if let Some(options) = matches.get_one::<String>("options") {
        loader = loader.set_override("parser.options", options.as_str())?;
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if let Some(offset) = matches.get_one::<u32>("offset") {
        loader = loader.set_override("input.base_offset", i64::from(*offset))?;
    }
    if matches.get_flag("literal") {
        loader = loader.set_override("input.literal", true)?;
    }
    Ok(loader.build()?)
}

fn read_source(matches: &ArgMatches) -> Result<String, CliError> {
    if let Some(path) = matches.get_one::<PathBuf>("file") {
        let mut source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        if source.ends_with('\n') {
            source.pop();
            if source.ends_with('\r') {
                source.pop();
            }
        }
        return Ok(source);
    }

    Ok(matches
        .get_one::<String>("pattern")
        .cloned()
        .unwrap_or_default())
}

/// Handle the default command: parse one pattern and format the tree
fn handle_parse_command(matches: &ArgMatches) -> Result<String, CliError> {
    let config = load_config(matches)?;
    let settings = config.parser.settings()?;
    let source = read_source(matches)?;

    let base = config.input.base_offset;
    let text = if config.input.literal {
        literal::decode(&source, base)?
    } else {
        VirtualCharSequence::from_text(&source, base)
    };

    tracing::debug!(
        chars = text.len(),
        options = ?settings.options,
        format = config.output.format.name(),
        "parsing pattern"
    );
    let tree = parse(&text, &settings)?;

    let registry = FormatRegistry::default();
    Ok(registry.serialize(&tree, config.output.format.name())?)
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available output formats:\n");

    for name in registry.list_formats() {
        let description = registry.get(&name).map(|f| f.description()).unwrap_or("");
        println!("  {name}");
        println!("    {description}");
        println!();
    }
}
