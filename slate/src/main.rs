mod providers;

use std::collections::{HashSet, VecDeque};
use std::process::ExitCode;

use anyhow::{bail, Context};
use camino::Utf8PathBuf;
use clap::Parser;
use slate_foundation::{
    errors::DiagnosticsCollection,
    source::{SourceLoadResult, SourceProvider},
    span::SourceUri,
};
use slate_lexer::{tokenize, Definitions};
use slate_syntax::{parse, ParserResult};
use tracing::{debug, error, metadata::LevelFilter};
use tracing_subscriber::{prelude::*, EnvFilter};
use walkdir::WalkDir;

use crate::providers::{read_source_file, FileSourceProvider};

#[derive(Debug, Parser)]
pub struct Args {
    /// Source file to compile, or a directory whose `.slt` files are all
    /// compiled.
    entry: Utf8PathBuf,

    /// Preprocessor variables defined before tokenization (repeatable).
    #[clap(short, long)]
    define: Vec<String>,

    /// Additional root directories searched when resolving `using` imports.
    #[clap(short = 'I', long)]
    include: Vec<Utf8PathBuf>,

    /// Print a summary of what was parsed in each file.
    #[clap(long)]
    summary: bool,
}

pub fn fallible_main(args: Args) -> anyhow::Result<bool> {
    debug!("collecting entry files");
    let entries = list_entry_files(&args.entry)?;
    debug!("{} entry files found", entries.len());

    let mut roots: Vec<Utf8PathBuf> = args.include.clone();
    if args.entry.is_dir() {
        roots.insert(0, args.entry.clone());
    }
    let provider = FileSourceProvider::new(roots);

    let definitions: Definitions = args.define.iter().cloned().collect();
    let mut diagnostics = DiagnosticsCollection::new();
    let mut queue: VecDeque<(String, Option<SourceUri>)> = entries
        .iter()
        .map(|path| (path.to_string(), None))
        .collect();
    let mut parsed: HashSet<SourceUri> = HashSet::new();

    while let Some((requested, from)) = queue.pop_front() {
        let (source, uri) = if from.is_none() {
            // Entry files are read directly; `using` imports go through the
            // provider chain.
            let path = Utf8PathBuf::from(&requested);
            let source = read_source_file(&path)
                .with_context(|| format!("cannot read source file {path}"))?;
            (source, SourceUri::from(requested.as_str()))
        } else {
            match provider.try_load(&requested, from.as_ref()) {
                SourceLoadResult::Loaded { source, uri } => (source.to_string(), uri),
                SourceLoadResult::NotExists => {
                    error!("import {requested:?} does not resolve to a source file");
                    continue;
                }
                SourceLoadResult::Error(diagnostic) => {
                    diagnostics.add(diagnostic);
                    continue;
                }
            }
        };
        if !parsed.insert(uri.clone()) {
            continue;
        }

        debug!("parsing {uri}");
        let tokens = tokenize(&source, &uri, &mut diagnostics, definitions.clone());
        let result = parse(tokens, &uri, &mut diagnostics);
        if args.summary {
            print_summary(&uri, &result);
        }
        for using in &result.usings {
            queue.push_back((using.import_text(), Some(uri.clone())));
        }
    }

    diagnostics.print(&[&provider]);
    Ok(diagnostics.has_errors())
}

fn list_entry_files(entry: &Utf8PathBuf) -> anyhow::Result<Vec<Utf8PathBuf>> {
    if entry.is_file() {
        return Ok(vec![entry.clone()]);
    }
    if !entry.is_dir() {
        bail!("{entry} is neither a file nor a directory");
    }

    let mut files = vec![];
    for entry in WalkDir::new(entry) {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(path) = camino::Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if path.extension() == Some("slt") {
            files.push(path.to_owned());
        }
    }
    files.sort();
    Ok(files)
}

fn print_summary(uri: &SourceUri, result: &ParserResult) {
    println!(
        "{uri}: {} function(s), {} operator(s), {} struct(s), {} alias(es), {} using(s), {} top-level statement(s)",
        result.functions.len(),
        result.operators.len(),
        result.structs.len(),
        result.aliases.len(),
        result.usings.len(),
        result.top_level_statements.len(),
    );
}

fn main() -> ExitCode {
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    tracing::subscriber::set_global_default(subscriber)
        .expect("cannot set default tracing subscriber");

    let args = Args::parse();
    match fallible_main(args) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(error) => {
            error!("{error:?}");
            ExitCode::FAILURE
        }
    }
}
