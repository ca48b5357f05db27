use anyhow::{bail, Context, Result};
use apiconv_fix::{
    ConventionFix, Diagnostic, ExtractToConventionProvider, FixConfig, FixHost,
    RecordedActualOutcomes,
};
use apiconv_source::{Document, DocumentId, Workspace};
use apiconv_symbol::{SourceKind, SymbolIndex};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Workspace snapshot read from YAML (or JSON)
#[derive(Debug, Deserialize)]
struct Fixture {
    documents: Vec<Document>,
    /// Documents holding generated code
    #[serde(default)]
    generated: Vec<DocumentId>,
    /// Actual outcomes per operation; `~` marks an unclassifiable body
    #[serde(default)]
    actual_outcomes: RecordedActualOutcomes,
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
    /// Inline configuration, used when `--config` is not given
    #[serde(default)]
    config: Option<FixConfig>,
}

impl Fixture {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read fixture {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("invalid fixture {}", path.display()))
    }

    fn workspace(&self) -> Workspace {
        Workspace::from_documents(self.documents.iter().cloned())
    }

    fn index(&self, config: &FixConfig) -> Result<SymbolIndex> {
        let index = SymbolIndex::new();
        for document in &self.documents {
            let kind = if self.generated.contains(&document.id) {
                SourceKind::Generated
            } else {
                SourceKind::Source
            };
            index
                .index_document(document, kind)
                .with_context(|| format!("cannot index {}", document.id))?;
        }
        config.names.register(&index)?;
        Ok(index)
    }

    /// Diagnostics grouped by document, in first-seen order
    fn diagnostics_by_document(&self) -> IndexMap<DocumentId, Vec<Diagnostic>> {
        let mut grouped: IndexMap<DocumentId, Vec<Diagnostic>> = IndexMap::new();
        for diagnostic in &self.diagnostics {
            grouped
                .entry(diagnostic.document.clone())
                .or_default()
                .push(diagnostic.clone());
        }
        grouped
    }
}

fn cli() -> Command {
    Command::new("apiconv")
        .version(apiconv_fix::VERSION)
        .about("Extract undocumented response outcomes into API conventions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("fix")
                .about("Compute the convention fix for every diagnostic in a fixture")
                .arg(
                    Arg::new("fixture")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML or JSON workspace fixture"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output changed documents as JSON"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render the documents of a fixture as source text")
                .arg(
                    Arg::new("fixture")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML or JSON workspace fixture"),
                )
                .arg(
                    Arg::new("document")
                        .long("document")
                        .help("Render only this document"),
                ),
        )
}

fn fixture_arg(args: &ArgMatches) -> Result<Fixture> {
    let Some(path) = args.get_one::<PathBuf>("fixture") else {
        bail!("missing fixture path");
    };
    Fixture::load(path)
}

async fn run_fix(args: &ArgMatches) -> Result<()> {
    let fixture = fixture_arg(args)?;
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => FixConfig::load(path)?,
        None => match &fixture.config {
            Some(config) => {
                config.validate()?;
                config.clone()
            }
            None => FixConfig::default(),
        },
    };

    let workspace = Arc::new(fixture.workspace());
    let index = Arc::new(fixture.index(&config)?);
    let host = FixHost::with_defaults(
        workspace,
        index,
        Arc::new(fixture.actual_outcomes.clone()),
        config.names.clone(),
    );
    let provider = ExtractToConventionProvider::new(Arc::new(config));
    let cancel = CancellationToken::new();

    let fixes: Vec<ConventionFix> = fixture
        .diagnostics_by_document()
        .values()
        .filter_map(|diagnostics| provider.register(diagnostics, host.clone()))
        .collect();
    tracing::info!(
        "{} fix(es) registered for {} diagnostic(s)",
        fixes.len(),
        fixture.diagnostics.len()
    );

    let json = args.get_flag("json");
    let mut report = Vec::new();
    for fix in &fixes {
        let changed = fix.changed_solution(&cancel).await?;
        if changed.is_empty() {
            tracing::info!("no fix for {}", fix.diagnostic());
            continue;
        }
        for document in changed {
            if json {
                report.push(serde_json::json!({
                    "diagnostic": fix.diagnostic(),
                    "title": fix.title(),
                    "document": document.id,
                    "base_hash": document.base_hash.to_string(),
                    "text": document.text,
                }));
            } else {
                println!("// {}: {}", fix.title(), document.id);
                println!("{}", document.text);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn run_render(args: &ArgMatches) -> Result<()> {
    let fixture = fixture_arg(args)?;
    let workspace = fixture.workspace();

    match args.get_one::<String>("document") {
        Some(id) => {
            let id = DocumentId::new(id.as_str());
            let Some(text) = workspace.render(&id) else {
                bail!("document {id} is not in the fixture");
            };
            print!("{text}");
        }
        None => {
            for document in workspace.documents() {
                println!("// {}", document.id);
                print!("{}", apiconv_source::render_document(document));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("fix", args)) => run_fix(args).await,
        Some(("render", args)) => run_render(args),
        _ => bail!("unknown command"),
    }
}
