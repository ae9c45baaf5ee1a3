//! `datadict`: drive a data dictionary edit session one request at a time.
//!
//! The session snapshot lives in a file between invocations, so a shell
//! script (or a test) can replay exactly what a browser form would post.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use datadict::{
    CollectionKind, DictionarySession, DocumentFormat, Envelope, FieldType, OutputDestination,
    OutputOptions, Request, SessionOptions, SubmittedValues, emit, formats, load_session,
    render_text, save_session,
};

const LOG_ENV: &str = "DATADICT_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "datadict",
    version,
    about = "Edit JSON data dictionaries one form round trip at a time"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply one operation token to a session snapshot and print the view
    Apply(ApplyArgs),
    /// Collapse the session and print the canonical envelope
    Commit(CommitArgs),
    /// Print the format table for a field type
    Formats {
        /// string, date, integer or number
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Print the JSON Schema of the stored envelope
    Schema,
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Session snapshot file (.json, .yaml or .toml); created when missing
    #[arg(short = 's', long = "session", value_name = "PATH", env = "DATADICT_SESSION")]
    session: PathBuf,

    /// Submitted form values as an urlencoded body
    #[arg(long = "values", value_name = "URLENCODED", default_value = "")]
    values: String,

    /// Keep leading and trailing whitespace of submitted values
    #[arg(long = "no-trim")]
    no_trim: bool,

    /// Close other inline edits when one is opened
    #[arg(long = "single-edit", env = "DATADICT_SINGLE_EDIT")]
    single_edit: bool,
}

impl SessionArgs {
    fn options(&self, default_collection: CollectionKind) -> SessionOptions {
        SessionOptions::default()
            .with_trim_values(!self.no_trim)
            .with_single_edit(self.single_edit)
            .with_default_collection(default_collection)
    }
}

#[derive(Debug, Args)]
struct ApplyArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Stored envelope to start from: file path, inline JSON, or "-" for stdin
    #[arg(short = 'e', long = "envelope", value_name = "SOURCE")]
    envelope: Option<String>,

    /// Collection whose widget posted the token
    #[arg(short = 'c', long = "collection", value_name = "NAME", value_parser = parse_collection, default_value = "fields")]
    collection: CollectionKind,

    /// Operation token, e.g. add_new_field, edit_0, update_0
    #[arg(long = "op", value_name = "TOKEN")]
    op: String,

    /// Render the view as text instead of JSON
    #[arg(long = "text")]
    text: bool,

    /// Wrap width for --text
    #[arg(long = "width", value_name = "COLUMNS", default_value_t = 80)]
    width: usize,
}

#[derive(Debug, Args)]
struct CommitArgs {
    #[command(flatten)]
    session: SessionArgs,

    #[arg(long = "identifier", value_name = "TEXT")]
    identifier: Option<String>,

    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit the envelope with indentation
    #[arg(long = "pretty")]
    pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Apply(args) => run_apply(args),
        Command::Commit(args) => run_commit(args),
        Command::Formats { kind } => run_formats(&kind),
        Command::Schema => {
            let schema = schemars::schema_for!(Envelope);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_collection(raw: &str) -> std::result::Result<CollectionKind, String> {
    CollectionKind::parse(raw).ok_or_else(|| format!("unknown collection `{raw}`; use fields or indexes"))
}

fn run_apply(args: ApplyArgs) -> Result<()> {
    let mut diagnostics = DiagnosticCollector::default();
    check_session_format(&args.session.session, &mut diagnostics);
    let envelope = match args.envelope.as_deref() {
        Some(source) => match load_envelope(source) {
            Ok(raw) => Some(raw),
            Err(err) => {
                diagnostics.push_input("envelope", err.to_string());
                None
            }
        },
        None => None,
    };
    diagnostics.into_result()?;

    let options = args.session.options(args.collection);
    let mut session = match envelope {
        Some(raw) => DictionarySession::load(Some(raw.as_str())),
        None => open_session(&args.session.session)?,
    };
    session.set_options(options);

    let request = Request::for_collection(args.collection, args.op.as_str())
        .with_values(SubmittedValues::from_urlencoded(&args.session.values));
    let view = session.apply(&request);
    for notice in &view.notices {
        eprintln!("notice: {notice}");
    }
    if session.take_rebuild() {
        debug!(token = %args.op, "session changed");
    }
    save_session(&session, &args.session.session).map_err(|err| eyre!("{err:#}"))?;

    if args.text {
        print!("{}", render_text(&view, args.width));
    } else {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }
    Ok(())
}

fn run_commit(args: CommitArgs) -> Result<()> {
    let mut diagnostics = DiagnosticCollector::default();
    check_session_format(&args.session.session, &mut diagnostics);
    let (output, paths) = build_output_options(&args.outputs, &mut diagnostics);
    ensure_output_paths_available(&paths, args.force, &mut diagnostics);
    diagnostics.into_result()?;

    let mut session = open_session(&args.session.session)?;
    session.set_options(args.session.options(CollectionKind::default()));

    let mut values = SubmittedValues::from_urlencoded(&args.session.values);
    if let Some(identifier) = args.identifier {
        values.insert("/identifier", identifier);
    }
    if let Some(title) = args.title {
        values.insert("/title", title);
    }

    let raw = match session.commit(&values) {
        Ok(raw) => raw,
        Err(err) => {
            let mut body = format!("{err}\n");
            for issue in err.issues() {
                let _ = writeln!(body, "  {issue}");
            }
            return Err(Report::msg(body));
        }
    };
    save_session(&session, &args.session.session).map_err(|err| eyre!("{err:#}"))?;

    let payload = if args.pretty {
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        serde_json::to_string_pretty(&value)?
    } else {
        raw
    };
    emit(&payload, &output).map_err(|err| eyre!("{err:#}"))?;
    info!(destinations = output.destinations.len(), "envelope written");
    Ok(())
}

fn run_formats(kind: &str) -> Result<()> {
    let kind = FieldType::parse(kind).ok_or_else(|| {
        eyre!("unknown field type `{kind}`; expected string, date, integer or number")
    })?;
    println!("{}", serde_json::to_string_pretty(&formats(kind))?);
    Ok(())
}

fn open_session(path: &Path) -> Result<DictionarySession> {
    if !path.exists() {
        debug!(path = %path.display(), "starting a new session");
        return Ok(DictionarySession::default());
    }
    load_session(path).map_err(|err| eyre!("{err:#}"))
}

fn load_envelope(source: &str) -> Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        return Ok(buffer);
    }
    if source.trim_start().starts_with('{') {
        return Ok(source.to_string());
    }
    let path = PathBuf::from(source);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(source.to_string()),
        Err(err) => {
            Err(Report::new(err).wrap_err(format!("failed to read envelope {}", path.display())))
        }
    }
}

fn check_session_format(path: &Path, diagnostics: &mut DiagnosticCollector) {
    let supported = DocumentFormat::from_path(path).is_some();
    let has_extension = path.extension().is_some();
    if has_extension && !supported {
        diagnostics.push_input(
            "session",
            format!(
                "cannot store session in {}; this build supports {}",
                path.display(),
                format_list()
            ),
        );
    }
}

fn format_list() -> String {
    let items: Vec<String> = DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(
    outputs: &[String],
    diagnostics: &mut DiagnosticCollector,
) -> (OutputOptions, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    for raw in outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if outputs.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let paths = destinations
        .iter()
        .filter_map(|dest| match dest {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();
    (OutputOptions::new().with_destinations(destinations), paths)
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}
