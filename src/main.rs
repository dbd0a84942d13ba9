//! Purpose: `bidival` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits values on stdout.
//! Invariants: Commands emit stable stdout formats (inspect text or JSON by flags).
//! Invariants: Non-interactive errors and notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use bidival::api::{Error, ErrorKind, to_exit_code};
use bidival::notice::{Notice, notice_json};

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(exit_code) => exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let missing_command = matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                );
                let exit_code = if missing_command {
                    to_exit_code(ErrorKind::Usage)
                } else {
                    0
                };
                return Ok(exit_code);
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode)
        .map(|()| 0)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "bidival",
    version,
    about = "Decode and encode WebDriver BiDi serialized values",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Values are JSON. Input comes from a file or stdin.

Mental model:
  - `decode` turns protocol values ({"type": ..., "value": ...}) into native values
  - `encode` turns plain JSON into protocol values
"#,
    after_help = r#"EXAMPLES
  $ echo '{"type":"number","value":"-0"}' | bidival decode
  -0
  $ echo '{"type":"map","value":[["k",{"type":"number","value":2}]]}' | bidival decode
  Map(1) {"k" => 2}
  $ echo '{"a":[1,2]}' | bidival encode

LEARN MORE
  $ bidival <command> --help
  Set RUST_LOG=bidival=debug to see decoder diagnostics."#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        global = true,
        help = "Colorize stderr diagnostics and inspect output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Inspect,
    Json,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Decode serialized values into native values",
        long_about = r#"Decode WebDriver BiDi serialized values.

A JSON `null` document is the absent value. Absent values and values with
unsupported types print `undefined` (or `null` with --format json) and emit a
notice on stderr."#,
        after_help = r#"EXAMPLES
  $ bidival decode value.json
  $ bidival decode --format json < value.json
  $ bidival decode --lines results.jsonl
  $ bidival decode --evaluate-result evaluate.json"#
    )]
    Decode {
        #[arg(
            help = "Input file (default: stdin; `-` also means stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<PathBuf>,
        #[arg(long, help = "Treat each non-empty input line as a separate document")]
        lines: bool,
        #[arg(long, default_value = "inspect", value_enum, help = "Output format: inspect|json")]
        format: OutputFormat,
        #[arg(
            long = "evaluate-result",
            help = "Input is a script.evaluate result envelope (success or exception)"
        )]
        evaluate_result: bool,
    },
    #[command(
        about = "Encode plain JSON into serialized values",
        after_help = r#"EXAMPLES
  $ echo '[1, "a", {"k": true}]' | bidival encode
  $ bidival encode --lines args.jsonl"#
    )]
    Encode {
        #[arg(
            help = "Input file (default: stdin; `-` also means stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: Option<PathBuf>,
        #[arg(long, help = "Treat each non-empty input line as a separate document")]
        lines: bool,
    },
    #[command(about = "Print version information")]
    Version,
}

struct InputSource {
    label: String,
    path: Option<PathBuf>,
    text: String,
}

impl InputSource {
    /// Documents paired with their 1-based line number.
    fn documents(&self, lines: bool) -> Vec<(usize, &str)> {
        if !lines {
            return vec![(1, self.text.as_str())];
        }
        self.text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, line))
            .collect()
    }

    fn attach(&self, err: Error) -> Error {
        match &self.path {
            Some(path) if err.path().is_none() => err.with_path(path),
            _ => err,
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<InputSource, Error> {
    match path {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read input")
                    .with_path(path)
                    .with_hint("Check that the file exists and is readable.")
                    .with_source(err)
            })?;
            Ok(InputSource {
                label: path.display().to_string(),
                path: Some(path.to_path_buf()),
                text,
            })
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(InputSource {
                label: "stdin".to_string(),
                path: None,
                text,
            })
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("bidival {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "bidival",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    if enabled {
        format!("\u{1b}[{code}m{label}\u{1b}[0m")
    } else {
        label.to_string()
    }
}

/// Terminals get the human rendering; pipes get one JSON record per line.
fn emit_stderr(
    color_mode: ColorMode,
    render_text: impl FnOnce(bool) -> String,
    record: impl FnOnce() -> Value,
) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", render_text(color_mode.use_color(is_tty)));
    } else {
        eprintln!("{}", record());
    }
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    emit_stderr(
        color_mode,
        |use_color| {
            let label = colorize_label("notice:", use_color, AnsiColor::Yellow);
            format!("{label} {}", notice.summary())
        },
        || match notice_json(notice) {
            Ok(value) => value,
            Err(err) => json!({"notice": {"kind": "internal", "message": err.to_string()}}),
        },
    );
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    emit_stderr(
        color_mode,
        |use_color| error_text(err, use_color),
        || error_json(err),
    );
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    let fallback = match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::Io => "i/o error",
        ErrorKind::Malformed => "malformed input",
        ErrorKind::UnsupportedType => "unsupported type",
        ErrorKind::Unserializable => "value cannot be serialized",
        ErrorKind::Evaluation => "evaluation failed",
    };
    fallback.to_string()
}

fn error_causes(err: &Error) -> Vec<String> {
    std::iter::successors(err.source(), |&cause| cause.source())
        .map(ToString::to_string)
        .collect()
}

/// Optional fields shared by the JSON and text renderings, in display order.
fn error_details(err: &Error) -> [(&'static str, Option<String>); 3] {
    [
        ("type", err.type_name().map(str::to_string)),
        ("hint", err.hint().map(str::to_string)),
        ("path", err.path().map(|path| path.display().to_string())),
    ]
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    for (key, value) in error_details(err) {
        if let Some(value) = value {
            inner.insert(key.to_string(), Value::String(value));
        }
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    )];
    let cause = error_causes(err).into_iter().next();
    let details = error_details(err)
        .into_iter()
        .chain([("caused by", cause)]);
    for (label, value) in details {
        if let Some(value) = value {
            let label = colorize_label(&format!("{label}:"), use_color, AnsiColor::Yellow);
            lines.push(format!("{label} {value}"));
        }
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let subcommand = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .and_then(|usage| {
            usage
                .split_whitespace()
                .skip_while(|token| *token != "bidival")
                .nth(1)
        })
        .filter(|token| !token.starts_with(['-', '<', '[']));
    match subcommand {
        Some(name) => format!("Try `bidival {name} --help`."),
        None => "Try `bidival --help`.".to_string(),
    }
}
