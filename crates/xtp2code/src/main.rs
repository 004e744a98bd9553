//! xtp2code converts XTP extension plugin schemas to Go or MoonBit source code.
//!
//! Usage:
//!
//! ```text
//! xtp2code --lang <go|mbt> --pkg <name> --yaml <file>... \
//!     [--types <dir>] [--plugin <dir>] [--force] [-q] [-v] [--json] [--config <file>]
//! ```

mod config;

use anyhow::{Context, bail};
use clap::Parser;
use config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xtp_codegen::{
    ArtifactSet, Backend, GenerateOptions, Layout, WriteOptions, WriteReport, backend, generate,
    parse_schema, resolve, write_artifacts,
};

#[derive(Debug, Parser)]
#[command(
    name = "xtp2code",
    version,
    about = "Generate Go or MoonBit code from XTP extension plugin schemas"
)]
struct Cli {
    /// Target language for generated code (go or mbt).
    #[arg(long)]
    lang: Option<String>,

    /// Name of the generated package.
    #[arg(long)]
    pkg: Option<String>,

    /// Input schema YAML files; several files form a batch.
    #[arg(long, required = true, num_args = 1..)]
    yaml: Vec<PathBuf>,

    /// Output directory for simple types code.
    #[arg(long)]
    types: Option<PathBuf>,

    /// Output directory for plugin PDK code.
    #[arg(long)]
    plugin: Option<PathBuf>,

    /// Overwrite existing files.
    #[arg(long)]
    force: bool,

    /// Only print errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print every written file.
    #[arg(short, long)]
    verbose: bool,

    /// Print a JSON report of written files and conflicts to stdout.
    #[arg(long)]
    json: bool,

    /// Config file (default: ./xtp2code.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Command-line values merged over the config file.
struct Settings {
    backend: &'static dyn Backend,
    package: String,
    force: bool,
    outputs: Vec<(PathBuf, Layout)>,
}

impl Settings {
    fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let Some(lang) = cli.lang.clone().or(config.lang) else {
            bail!("must specify --lang=go or --lang=mbt");
        };
        let backend = backend(&lang)?;
        let Some(package) = cli.pkg.clone().or(config.pkg) else {
            bail!("must specify --pkg=<packageName>");
        };

        let mut outputs = Vec::new();
        if let Some(dir) = cli.types.clone().or(config.types) {
            outputs.push((dir, Layout::Types));
        }
        if let Some(dir) = cli.plugin.clone().or(config.plugin) {
            outputs.push((dir, Layout::Plugin));
        }
        if outputs.is_empty() {
            bail!("must specify at least one of --types=<dirname> or --plugin=<dirname>");
        }

        Ok(Self {
            backend,
            package,
            force: cli.force || config.force,
            outputs,
        })
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend.name())
            .field("package", &self.package)
            .field("force", &self.force)
            .field("outputs", &self.outputs)
            .finish()
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse, resolve and generate every output for one schema, without writing.
fn generate_schema(
    path: &Path,
    settings: &Settings,
) -> anyhow::Result<Vec<(PathBuf, ArtifactSet)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let schema =
        parse_schema(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    let resolved =
        resolve(&schema).with_context(|| format!("failed to resolve {}", path.display()))?;

    settings
        .outputs
        .iter()
        .map(|(dir, layout)| -> anyhow::Result<(PathBuf, ArtifactSet)> {
            let options = GenerateOptions {
                package: settings.package.clone(),
                layout: *layout,
            };
            let artifacts = generate(&resolved, settings.backend, &options)
                .with_context(|| format!("failed to generate code for {}", path.display()))?;
            Ok((dir.clone(), artifacts))
        })
        .collect()
}

fn run(cli: &Cli) -> anyhow::Result<WriteReport> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = Config::load(cli.config.as_deref(), &cwd)?;
    let settings = Settings::new(cli, config)?;
    let write_options = WriteOptions { force: settings.force };

    let mut report = WriteReport::default();
    for path in &cli.yaml {
        let outputs = generate_schema(path, &settings)?;
        for (dir, artifacts) in &outputs {
            report.merge(write_artifacts(dir, artifacts, &write_options)?);
        }
        tracing::info!(schema = %path.display(), backend = settings.backend.name(), "done");
    }
    Ok(report)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("xtp2code").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_line_overrides_config() {
        let config = Config {
            lang: Some("go".into()),
            pkg: Some("fruit".into()),
            force: false,
            types: Some("types".into()),
            plugin: None,
        };
        let args = cli(&["--lang", "moonbit", "--yaml", "a.yaml", "--plugin", "out", "--force"]);
        let settings = Settings::new(&args, config).unwrap();
        assert_eq!(settings.backend.name(), "mbt");
        assert_eq!(settings.package, "fruit");
        assert!(settings.force);
        assert_eq!(
            settings.outputs,
            [
                (PathBuf::from("types"), Layout::Types),
                (PathBuf::from("out"), Layout::Plugin)
            ]
        );
    }

    #[test]
    fn requires_an_output_directory() {
        let args = cli(&["--lang", "go", "--pkg", "fruit", "--yaml", "a.yaml"]);
        let err = Settings::new(&args, Config::default()).unwrap_err();
        assert!(err.to_string().contains("--types"));
    }

    #[test]
    fn rejects_unknown_language() {
        let args = cli(&["--lang", "rust", "--pkg", "fruit", "--yaml", "a.yaml", "--types", "t"]);
        let err = Settings::new(&args, Config::default()).unwrap_err();
        assert!(err.to_string().contains("unsupported target `rust`"));
    }

    #[test]
    fn yaml_is_required_and_batches() {
        assert!(Cli::try_parse_from(["xtp2code", "--lang", "go"]).is_err());
        let args = cli(&["--yaml", "a.yaml", "b.yaml"]);
        assert_eq!(args.yaml, [PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["xtp2code", "--yaml", "a.yaml", "-q", "-v"]).is_err());
    }

    #[test]
    fn generates_without_writing() {
        let dir = tempfile::TempDir::new().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(
            &schema,
            "version: v1-draft\nexports:\n  - name: greet\n    input:\n      type: string\n",
        )
        .unwrap();
        let out = dir.path().join("plugin");
        let args = cli(&[
            "--lang",
            "go",
            "--pkg",
            "greet",
            "--yaml",
            schema.to_str().unwrap(),
            "--plugin",
            out.to_str().unwrap(),
        ]);
        let settings = Settings::new(&args, Config::default()).unwrap();
        let outputs = generate_schema(&schema, &settings).unwrap();
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].1.contains_key("main.go"));
        assert!(!out.exists());

        let report = write_artifacts(&out, &outputs[0].1, &WriteOptions::default()).unwrap();
        assert_eq!(report.written.len(), outputs[0].1.len());
    }

    #[test]
    fn rejects_package_that_is_not_an_identifier() {
        let dir = tempfile::TempDir::new().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(&schema, "version: v1-draft\nexports:\n  - name: greet\n").unwrap();
        let args = cli(&["--lang", "go", "--pkg", "my-types", "--yaml", "x", "--types", "t"]);
        let settings = Settings::new(&args, Config::default()).unwrap();
        let err = generate_schema(&schema, &settings).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("which is not a valid package name"), "{message}");
    }

    #[test]
    fn reports_schema_path_on_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let schema = dir.path().join("broken.yaml");
        std::fs::write(&schema, "exports: []\n").unwrap();
        let args = cli(&["--lang", "go", "--pkg", "p", "--yaml", "x", "--types", "t"]);
        let settings = Settings::new(&args, Config::default()).unwrap();
        let err = generate_schema(&schema, &settings).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("broken.yaml"));
        assert!(message.contains("unable to find schema version"));
    }
}
