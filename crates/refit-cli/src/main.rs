use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use refit_cli::render::{render_json, render_text};
use refit_cli::{check_source, init_tracing, load_rules, read_source};
use refit_core::{CodeTransformer, CompositeCodeTransformer, ImportPolicy};
use refit_parse::parse_and_attribute;
use refit_types::ClassPath;

#[derive(Parser, Debug)]
#[command(name = "refit")]
#[command(about = "Refit: match before/after templates against Java sources and rewrite them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and attribute a source file and dump the tree
    Parse {
        /// Path to .java source file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Run rules over a source file and report what they match
    Check {
        /// Path to .java source file
        file: PathBuf,

        /// JSON rule files, applied in order
        #[arg(long, required = true, num_args = 1..)]
        rules: Vec<PathBuf>,

        /// Rewrite the file in place with the suggested fixes
        #[arg(long)]
        apply: bool,

        /// Override the import policy of every rule
        #[arg(long, value_enum)]
        import_policy: Option<Policy>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum Format {
    Pretty,
    Json,
}

#[derive(ValueEnum, Clone, Debug)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Policy {
    ImportTopLevel,
    ImportClassDirectly,
    FullyQualified,
}

impl From<Policy> for ImportPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::ImportTopLevel => ImportPolicy::ImportTopLevel,
            Policy::ImportClassDirectly => ImportPolicy::ImportClassDirectly,
            Policy::FullyQualified => ImportPolicy::FullyQualified,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, format } => cmd_parse(&file, format),
        Commands::Check {
            file,
            rules,
            apply,
            import_policy,
            format,
        } => cmd_check(&file, &rules, apply, import_policy.map(Into::into), format),
    }
}

fn cmd_parse(file: &Path, format: Format) -> Result<()> {
    let src = read_source(file)?;
    let name = file.display().to_string();
    let mut classpath = ClassPath::with_builtins();
    let unit = parse_and_attribute(&name, &src, &mut classpath)?;

    match format {
        Format::Pretty => println!("{:#?}", unit),
        Format::Json => println!("{}", serde_json::to_string_pretty(&unit)?),
    }
    Ok(())
}

fn cmd_check(
    file: &Path,
    rule_files: &[PathBuf],
    apply: bool,
    policy: Option<ImportPolicy>,
    format: ReportFormat,
) -> Result<()> {
    let src = read_source(file)?;
    let name = file.display().to_string();
    let rules = load_rules(rule_files, policy)?;
    let transformer = CompositeCodeTransformer::new(
        rules
            .into_iter()
            .map(|rule| Box::new(rule) as Box<dyn CodeTransformer>)
            .collect(),
    );

    let report = check_source(&name, &src, &transformer, apply)?;

    match format {
        ReportFormat::Text => print!("{}", render_text(&name, &src, &report)),
        ReportFormat::Json => println!("{}", render_json(&name, &src, &report)?),
    }

    if let Some(rewritten) = &report.rewritten {
        if *rewritten != src {
            std::fs::write(file, rewritten)
                .with_context(|| format!("failed to write `{name}`"))?;
            eprintln!("Rewrote {name}");
        }
    }
    Ok(())
}
