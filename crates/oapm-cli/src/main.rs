use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use log::info;

use oapm_core::config::{self, CONFIG_FILE_NAME, OUTPUT_ENV_VAR, OapmConfig};
use oapm_core::parse::{self, Document, schema::SchemaOrRef};
use oapm_core::resolve::Dereferencer;
use oapm_core::schema::{ExampleSynthesizer, render_table};
use oapm_postman::{AssemblerOptions, CollectionAssembler};

#[derive(Parser)]
#[command(
    name = "oapm",
    about = "Convert OpenAPI 3.0 documents into Postman collections",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI document into a Postman Collection v2.1.0
    Convert {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the collection
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Markdown file used as the collection description
        #[arg(long)]
        description_file: Option<PathBuf>,
    },

    /// Validate an OpenAPI document and dry-run the conversion
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the synthesized example for a component schema
    Example {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Name under `components.schemas`
        #[arg(long)]
        schema: String,

        /// Leave out read-only fields, as in request bodies
        #[arg(long)]
        request: bool,
    },

    /// Print the Markdown field table for a component schema
    Fields {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Name under `components.schemas`
        #[arg(long)]
        schema: String,

        /// Leave out read-only fields, as in request bodies
        #[arg(long)]
        request: bool,
    },

    /// Convert a YAML document to pretty-printed JSON
    YamlToJson {
        /// Path to the YAML file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (defaults to the input with a .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize a new oapm configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            description_file,
        } => cmd_convert(input, output, description_file),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Example {
            input,
            schema,
            request,
        } => cmd_example(input, &schema, request),

        Commands::Fields {
            input,
            schema,
            request,
        } => cmd_fields(input, &schema, request),

        Commands::YamlToJson { input, output } => cmd_yaml_to_json(input, output),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oapm", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OapmConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_document(path: &Path) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = parse::from_path_contents(path, &content)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(document)
}

/// `--output` wins, then the environment variable, then the config file.
fn output_path(flag: Option<PathBuf>, from_env: Option<String>, cfg: &OapmConfig) -> PathBuf {
    flag.or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(&cfg.output))
}

/// Pretty JSON with two-space indentation, non-ASCII kept as-is.
fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn schema_ref(name: &str) -> SchemaOrRef {
    SchemaOrRef::Ref {
        ref_path: format!("#/components/schemas/{name}"),
    }
}

fn cmd_convert(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    description_file: Option<PathBuf>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output_path(output, env::var(OUTPUT_ENV_VAR).ok(), &cfg);
    let document = load_document(&input)?;

    let mut options = AssemblerOptions::from_config(&cfg);
    let description_file =
        description_file.or_else(|| cfg.description_file.as_ref().map(PathBuf::from));
    if let Some(path) = description_file {
        let description = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        options = options.with_description(description);
    }

    let collection = CollectionAssembler::new(&document, options)
        .assemble()
        .with_context(|| format!("failed to convert {}", input.display()))?;
    write_json(&output, &collection)?;

    info!("wrote {} folders", collection.item.len());
    eprintln!("Converted {} → {}", input.display(), output.display());
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let document = load_document(&input)?;
    let spec = document.spec();

    eprintln!(
        "Valid OpenAPI {} document: {}",
        spec.openapi, spec.info.title
    );
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Tags: {}", spec.tags.len());

    if let Some(ref components) = spec.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    // Also validate that every reference resolves during conversion
    let collection = CollectionAssembler::new(&document, AssemblerOptions::default()).assemble()?;
    let requests: usize = collection.item.iter().map(|f| f.item.len()).sum();
    eprintln!("  Folders: {}", collection.item.len());
    eprintln!("  Requests: {}", requests);

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_example(input: PathBuf, schema: &str, request: bool) -> Result<()> {
    let document = load_document(&input)?;
    let example = ExampleSynthesizer::new(&document)
        .synthesize(&schema_ref(schema), request)
        .with_context(|| format!("failed to build an example for {schema}"))?;
    println!("{}", serde_json::to_string_pretty(&example)?);
    Ok(())
}

fn cmd_fields(input: PathBuf, schema: &str, request: bool) -> Result<()> {
    let document = load_document(&input)?;
    let resolved = Dereferencer::new(&document)
        .dereference_schema(&schema_ref(schema))
        .with_context(|| format!("failed to resolve {schema}"))?;

    match render_table(&resolved, !request) {
        Some(table) => println!("{table}"),
        None => eprintln!("{schema} has no fields."),
    }
    Ok(())
}

fn json_path_for(input: &Path) -> PathBuf {
    input.with_extension("json")
}

fn cmd_yaml_to_json(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let content = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let value: serde_json::Value = serde_yaml_ng::from_str(&content)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let output = output.unwrap_or_else(|| json_path_for(&input));
    write_json(&output, &value)?;
    eprintln!("Converted {} → {}", input.display(), output.display());
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
