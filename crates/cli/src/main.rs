//! jsonapi-openapi CLI
//!
//! Command-line interface for generating OpenAPI documents from JSON:API
//! server manifests.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use jsonapi_openapi_common::ServerSource;
use jsonapi_openapi_generator::{BuildContext, Generator, OutputFormat, PathsBuilder};
use jsonapi_openapi_parser::ServerManifest;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_MANIFEST: &str = "jsonapi-openapi.yaml";

#[derive(Parser)]
#[command(name = "jsonapi-openapi")]
#[command(version, about = "Generate OpenAPI documents for JSON:API servers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the OpenAPI document of a server
    #[command(after_help = "EXAMPLES:\n  \
        # Write v1.json from jsonapi-openapi.yaml\n  \
        jsonapi-openapi generate v1\n\n  \
        # YAML output to a chosen file\n  \
        jsonapi-openapi generate v1 --format yaml --output docs/openapi.yaml\n\n  \
        # Links pointing at a local server\n  \
        jsonapi-openapi generate v1 --base-url http://localhost:8000/api/v1")]
    Generate {
        /// Name of the server in the manifest
        server: String,

        /// Path to the server manifest
        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (defaults to {server}.{format})
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base URL overriding the manifest's
        #[arg(long)]
        base_url: Option<String>,
    },

    /// List the routes of a server and how they are documented
    Routes {
        /// Name of the server in the manifest
        server: String,

        /// Path to the server manifest
        #[arg(short, long, default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            server,
            manifest,
            format,
            output,
            base_url,
        } => {
            let output = output.unwrap_or_else(|| default_output(&server, format.into()));
            generate_command(
                &server,
                manifest.as_path(),
                format.into(),
                output.as_path(),
                base_url.as_deref(),
            )?;
        }
        Commands::Routes { server, manifest } => {
            routes_command(&server, manifest.as_path(), cli.verbose)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info` when verbose, `warn` when not
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_output(server: &str, format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("{}.{}", server, format.extension()))
}

fn load_manifest(path: &Path) -> Result<ServerManifest> {
    println!("{} Loading manifest: {}", "→".cyan(), path.display());
    ServerManifest::from_file(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
}

fn generate_command(
    server_name: &str,
    manifest_path: &Path,
    format: OutputFormat,
    output: &Path,
    base_url: Option<&str>,
) -> Result<()> {
    let mut manifest = load_manifest(manifest_path)?;
    if let Some(base_url) = base_url {
        manifest
            .set_base_url(server_name, base_url)
            .context("Failed to override the base URL")?;
    }

    let server = manifest
        .server(server_name)
        .context("Failed to resolve server")?;
    let translations = manifest
        .translations()
        .context("Failed to load translations")?;
    let factory = manifest
        .fixtures(server_name)
        .context("Failed to load fixtures")?;

    println!(
        "{} Generating {} document for server {}",
        "→".cyan(),
        format.to_string().yellow(),
        server_name.yellow()
    );
    Generator::new(&server, &translations, &factory)
        .write(output, format)
        .context("Failed to generate OpenAPI document")?;

    println!(
        "\n{} {}",
        "✓ Generation complete:".green().bold(),
        output.display()
    );

    Ok(())
}

fn routes_command(server_name: &str, manifest_path: &Path, verbose: bool) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let server = manifest
        .server(server_name)
        .context("Failed to resolve server")?;
    let translations = manifest
        .translations()
        .context("Failed to load translations")?;
    let factory = manifest
        .fixtures(server_name)
        .context("Failed to load fixtures")?;

    let ctx = BuildContext::new(&server, &translations, &factory);
    let groups = PathsBuilder::new(&ctx).grouped_routes();

    println!("\n{}", format!("Routes of {}:", server.name()).bold());
    let mut documented = 0;
    let mut skipped = 0;
    for (uri, routes) in &groups {
        for route in routes {
            let method = route.method().to_uppercase();
            let outcome = match (route.resource_type(), route.action()) {
                (None, _) => Err("resource type could not be resolved"),
                (Some(_), None) => Err("route matches no JSON:API action"),
                (Some(resource_type), Some(_)) if ctx.schema_for(resource_type).is_none() => {
                    Err("no schema registered for the resource type")
                }
                (Some(resource_type), Some(action)) => Ok((resource_type, action)),
            };

            match outcome {
                Ok((resource_type, action)) => {
                    documented += 1;
                    println!(
                        "  {} {:<7} {} {} {}",
                        "✓".green(),
                        method,
                        uri,
                        resource_type.yellow(),
                        action.to_string().cyan()
                    );
                    if verbose {
                        println!("      {}", route.name().dimmed());
                    }
                }
                Err(reason) => {
                    skipped += 1;
                    println!(
                        "  {} {:<7} {} {}",
                        "✗".red(),
                        method,
                        uri,
                        format!("skipped: {}", reason).dimmed()
                    );
                }
            }
        }
    }

    println!(
        "\n{} documented, {} skipped",
        documented.to_string().green(),
        skipped.to_string().red()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["jsonapi-openapi", "generate", "v1"]).unwrap();
        match cli.command {
            Commands::Generate {
                server,
                manifest,
                format,
                output,
                base_url,
            } => {
                assert_eq!(server, "v1");
                assert_eq!(manifest, PathBuf::from(DEFAULT_MANIFEST));
                assert_eq!(format, Format::Json);
                assert!(output.is_none());
                assert!(base_url.is_none());
            }
            Commands::Routes { .. } => panic!("Expected the generate command"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_generate_options() {
        let cli = Cli::try_parse_from([
            "jsonapi-openapi",
            "generate",
            "v2",
            "--format",
            "yaml",
            "-o",
            "docs/api.yaml",
            "--base-url",
            "http://localhost:8000",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Generate {
                format,
                output,
                base_url,
                ..
            } => {
                assert_eq!(format, Format::Yaml);
                assert_eq!(output, Some(PathBuf::from("docs/api.yaml")));
                assert_eq!(base_url.as_deref(), Some("http://localhost:8000"));
            }
            Commands::Routes { .. } => panic!("Expected the generate command"),
        }
    }

    #[test]
    fn test_server_is_required() {
        assert!(Cli::try_parse_from(["jsonapi-openapi", "generate"]).is_err());
        assert!(Cli::try_parse_from(["jsonapi-openapi", "generate", "v1", "-f", "xml"]).is_err());
    }

    #[test]
    fn test_default_output_follows_format() {
        assert_eq!(
            default_output("v1", OutputFormat::Json),
            PathBuf::from("v1.json")
        );
        assert_eq!(
            default_output("v1", OutputFormat::Yaml),
            PathBuf::from("v1.yaml")
        );
    }
}
