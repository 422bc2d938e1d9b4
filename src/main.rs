use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser as ClapParser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shadow_compiler::models::{CompilerInfo, ShadowArtifact};
use shadow_compiler::{
    compile_checked, compile_sources_with_shadow, merge_ast_input, render_ast_json,
    CompileOptions, MergeStrategy, ShadowCompilation, ShadowOptions, SolcProcess, SourceInput,
};

/// Shadow Compiler CLI
///
/// Merges shadow code into existing Solidity contracts and compiles the
/// result with a local `solc`, or renders compiler ASTs back to source.

// CLI arguments
#[derive(ClapParser, Debug)]
#[command(name = "shadowc")]
#[command(about = "Solidity compiler front-end with shadow code injection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render compiler ASTs back to Solidity source
    Render(RenderArgs),
    /// Merge shadow code into a contract and compile the result
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Compiler output (or path -> AST object) in JSON
    #[arg(long)]
    ast: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Also write `<file>.map.json` with node positions
    #[arg(long)]
    source_map: bool,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Solidity source files (.sol)
    sources: Vec<PathBuf>,

    /// File containing the shadow code to inject
    #[arg(long)]
    shadow: PathBuf,

    /// Compiler ASTs for the sources, skipping the AST compile step
    #[arg(long)]
    ast: Option<PathBuf>,

    /// Source path that receives the shadow code
    #[arg(long)]
    path: Option<String>,

    /// Contract that receives the shadow code
    #[arg(long)]
    contract: Option<String>,

    /// Merge strategy (defaults to safe)
    #[arg(long, value_enum)]
    strategy: Option<MergeStrategy>,

    /// solc binary
    #[arg(long, default_value = "solc")]
    solc: PathBuf,

    /// JSON file with compile options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the merged sources instead of compiling (requires --ast)
    #[arg(long)]
    emit_sources: bool,

    /// Output file path (defaults to <contract>.json, or stdout with --emit-sources)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn install_tracing() {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Ok(directive) = "shadow_compiler=info".parse() {
        filter = filter.add_directive(directive);
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    install_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => render(args),
        Command::Merge(args) => merge(args).await,
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let json = fs::read_to_string(&args.ast)
        .with_context(|| format!("failed to read {}", args.ast.display()))?;
    let output = render_ast_json(&json, args.source_map)?;

    for (path, text) in &output.sources {
        let target = args.output.join(path);
        write_file(&target, text)?;
        info!("Rendered {}", target.display());
    }
    if let Some(maps) = &output.source_maps {
        for (path, map) in maps {
            let target = args.output.join(format!("{}.map.json", path));
            write_file(&target, &serde_json::to_string_pretty(map)?)?;
        }
    }

    println!(
        "Rendered {} source file(s) to {}",
        output.sources.len(),
        args.output.display()
    );
    Ok(())
}

async fn merge(args: MergeArgs) -> Result<()> {
    let shadow = fs::read_to_string(&args.shadow)
        .with_context(|| format!("failed to read {}", args.shadow.display()))?;
    let sources = read_sources(&args.sources)?;
    let shadow_options = ShadowOptions {
        inject_into_path: args.path.clone(),
        inject_into_contract: args.contract.clone(),
        merge_strategy: args.strategy,
    };
    let asts = args.ast.as_deref().map(read_asts).transpose()?;
    let texts = (!sources.is_empty()).then_some(&sources);

    if args.emit_sources {
        let Some(asts) = &asts else {
            bail!("--emit-sources requires --ast");
        };
        let merged = merge_ast_input(asts, texts, &shadow, &shadow_options)?;
        let json = serde_json::to_string_pretty(&json!({
            "target": merged.target,
            "sources": merged.sources,
        }))?;
        match &args.output {
            Some(path) => {
                write_file(path, &json)?;
                println!("Merged sources written to {}", path.display());
            }
            None => println!("{}", json),
        }
        return Ok(());
    }

    let options = match &args.config {
        Some(path) => {
            let config = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<CompileOptions>(&config)
                .with_context(|| format!("invalid compile options in {}", path.display()))?
        }
        None => CompileOptions::default(),
    };
    let compiler = SolcProcess::new(&args.solc);

    let compilation = match asts {
        Some(asts) => {
            let merged = merge_ast_input(&asts, texts, &shadow, &shadow_options)?;
            let output = compile_checked(&compiler, &merged.sources, &options).await?;
            ShadowCompilation {
                target: merged.target,
                sources: merged.sources,
                output,
            }
        }
        None => {
            if sources.is_empty() {
                bail!("no source files given");
            }
            compile_sources_with_shadow(
                &compiler,
                SourceInput::Solidity(sources),
                &shadow,
                &shadow_options,
                &options,
            )
            .await?
        }
    };

    for diagnostic in compilation.output.errors() {
        eprintln!("{}", diagnostic);
    }

    let version = compiler.version().await.unwrap_or_else(|err| {
        warn!("Could not determine solc version: {:#}", err);
        "unknown".to_string()
    });
    let artifact = ShadowArtifact {
        compiler: CompilerInfo {
            name: "solc".to_string(),
            version,
        },
        updated_at: Utc::now().to_rfc3339(),
        strategy: args.strategy.unwrap_or_default(),
        target: compilation.target,
        sources: compilation.sources,
        output: compilation.output,
    };

    // Determine output path
    let output_path = match args.output {
        Some(path) => path,
        None => PathBuf::from(format!("{}.json", artifact.target.contract_name)),
    };
    write_file(&output_path, &serde_json::to_string_pretty(&artifact)?)?;

    println!(
        "Compilation successful. Output written to {}",
        output_path.display()
    );
    Ok(())
}

/// Reads source files, keyed by the path as given on the command line.
fn read_sources(paths: &[PathBuf]) -> Result<BTreeMap<String, String>> {
    let mut sources = BTreeMap::new();
    for path in paths {
        if path.extension().unwrap_or_default() != "sol" {
            bail!("Input file must have .sol extension: {}", path.display());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        sources.insert(path.to_string_lossy().into_owned(), text);
    }
    Ok(sources)
}

/// Reads compiler ASTs, either a full compiler output or `path -> AST`.
fn read_asts(path: &Path) -> Result<BTreeMap<String, Value>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&json)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    let entries = if value.get("sources").map_or(false, Value::is_object) {
        value["sources"].take()
    } else {
        value
    };
    match entries {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => bail!("{} does not contain source ASTs", path.display()),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
