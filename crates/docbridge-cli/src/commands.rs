use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use docbridge_adapter::{Adapter, AdapterBuilder, AdapterConfig, ResourceRegistry};
use docbridge_store::{InMemoryBlobStore, InMemoryDocumentStore};
use docbridge_types::{Document, OperationResult, RawFile};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Run(args) => cmd_run(args, config, &cli.format).await,
        Command::Script(args) => cmd_script(args, config, &cli.format).await,
        Command::Resources => cmd_resources(&config, &cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AdapterConfig> {
    match path {
        Some(path) => AdapterConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => {
            debug!("no configuration given, using defaults");
            Ok(AdapterConfig::default())
        }
    }
}

/// An adapter over fresh in-memory stores.
struct Session {
    adapter: Adapter,
    documents: Arc<InMemoryDocumentStore>,
    blobs: Arc<InMemoryBlobStore>,
}

impl Session {
    async fn open(config: AdapterConfig, store: &StoreArgs) -> anyhow::Result<Self> {
        let documents = Arc::new(InMemoryDocumentStore::new());
        if let Some(path) = &store.fixtures {
            let seeded = seed_fixtures(&documents, path)?;
            debug!(documents = seeded, path = %path.display(), "fixtures loaded");
        }
        let blobs = Arc::new(InMemoryBlobStore::new());
        let adapter = AdapterBuilder::new(documents.clone(), blobs.clone(), config)
            .build()
            .await?;
        Ok(Self {
            adapter,
            documents,
            blobs,
        })
    }

    fn save(&self, store: &StoreArgs) -> anyhow::Result<()> {
        let Some(path) = &store.save else {
            return Ok(());
        };
        let contents = self.documents.export()?;
        let json = serde_json::to_string_pretty(&contents)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), blobs = self.blobs.len(), "store saved");
        Ok(())
    }
}

/// Load a `{collection: [document, ...]}` file into `documents`.
fn seed_fixtures(documents: &InMemoryDocumentStore, path: &Path) -> anyhow::Result<usize> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixtures {}", path.display()))?;
    let collections: BTreeMap<String, Vec<Document>> = serde_json::from_str(&source)
        .with_context(|| format!("parsing fixtures {}", path.display()))?;
    let mut seeded = 0;
    for (collection, docs) in collections {
        seeded += documents.seed(&collection, docs)?.len();
    }
    Ok(seeded)
}

/// Put each `FIELD=PATH` file into `params.data[FIELD]` as a raw upload.
fn attach_files(params: &mut Value, files: &[String]) -> anyhow::Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    let Some(params) = params.as_object_mut() else {
        bail!("--file needs object params");
    };
    let data = params
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(data) = data.as_object_mut() else {
        bail!("params.data must be an object");
    };
    for spec in files {
        let Some((field, path)) = spec.split_once('=') else {
            bail!("expected FIELD=PATH, got '{spec}'");
        };
        let path = Path::new(path);
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| field.to_string());
        let file = RawFile::new(name, mime_for(path), bytes);
        data.insert(field.to_string(), Value::Array(vec![file.to_entry()]));
    }
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

async fn cmd_run(args: RunArgs, config: AdapterConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let mut params: Value = serde_json::from_str(&args.params).context("parsing --params")?;
    attach_files(&mut params, &args.files)?;
    let session = Session::open(config, &args.store).await?;
    let result = session
        .adapter
        .dispatch_raw(&args.operation, &args.resource, params)
        .await
        .with_context(|| format!("{} {}", args.operation, args.resource))?;
    print_result(&args.operation, &args.resource, &result, format)?;
    session.save(&args.store)
}

#[derive(Debug, Deserialize)]
struct Step {
    operation: String,
    resource: String,
    #[serde(default)]
    params: Value,
}

fn load_script(path: &Path) -> anyhow::Result<Vec<Step>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing script {}", path.display()))
}

async fn cmd_script(args: ScriptArgs, config: AdapterConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let steps = load_script(&args.path)?;
    let session = Session::open(config, &args.store).await?;
    let mut failed = 0;
    for (i, step) in steps.iter().enumerate() {
        let outcome = session
            .adapter
            .dispatch_raw(&step.operation, &step.resource, step.params.clone())
            .await;
        match outcome {
            Ok(result) => print_result(&step.operation, &step.resource, &result, format)?,
            Err(e) if args.keep_going => {
                failed += 1;
                eprintln!(
                    "{} step {} {} {}: {}",
                    "✗".red().bold(),
                    i + 1,
                    step.operation.cyan(),
                    step.resource.bold(),
                    e.to_string().red()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("step {} ({} {})", i + 1, step.operation, step.resource)
                });
            }
        }
    }
    session.save(&args.store)?;
    if failed > 0 {
        bail!("{failed} of {} steps failed", steps.len());
    }
    Ok(())
}

fn cmd_resources(config: &AdapterConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let registry = ResourceRegistry::from_specs(&config.resources)?;
    match format {
        OutputFormat::Json => {
            let resources: Vec<_> = registry.iter().collect();
            println!("{}", serde_json::to_string(&resources)?);
        }
        OutputFormat::Text => {
            if registry.is_empty() {
                println!("No resources configured.");
            }
            for resource in registry.iter() {
                println!("{} → {}", resource.name.bold(), resource.storage_path.cyan());
                if resource.has_upload_fields() {
                    println!("  uploads: {}", resource.upload_fields.join(", ").yellow());
                }
            }
        }
    }
    Ok(())
}

fn print_result(
    operation: &str,
    resource: &str,
    result: &OperationResult,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let json = result.to_json()?;
    match format {
        OutputFormat::Json => println!("{json}"),
        OutputFormat::Text => {
            let summary = match result.total() {
                Some(total) => format!("{} of {total}", result.records().len()),
                None => String::new(),
            };
            println!(
                "{} {} {} {}",
                "✓".green().bold(),
                operation.cyan(),
                resource.bold(),
                summary.dimmed()
            );
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
