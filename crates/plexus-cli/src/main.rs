//! Plexus translator CLI.
//!
//! Provides the `plexus` binary with subcommands for moving between node
//! graphs and source code:
//!
//! - `compile` -- graph JSON to source text
//! - `decompile` -- source text to graph JSON
//! - `dot` -- graph JSON to a Graphviz diagram of its data-flow links
//!
//! Output goes to stdout unless `-o` is given. Diagnostics go to stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use plexus_codegen::{CompileError, CompileOptions};
use plexus_core::{dot, CoreError, Graph, Registry};
use plexus_decompile::{DecompileOptions, ProviderScope};

/// Exit code for a translation error (malformed input, unsupported syntax).
const EXIT_TRANSLATION: i32 = 1;
/// Exit code for a graph that fails structural validation.
const EXIT_VALIDATION: i32 = 2;
/// Exit code for a file that could not be read or written.
const EXIT_IO: i32 = 3;

/// Translate between node graphs and source code.
#[derive(Parser)]
#[command(name = "plexus", about = "Translate between node graphs and source code")]
struct Cli {
    /// Log pipeline steps to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compile a graph JSON file to source code.
    Compile {
        /// Path to the graph JSON file.
        graph: PathBuf,

        /// Write the source here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Node-type definitions JSON for registered callees.
        #[arg(long)]
        definitions: Option<PathBuf>,

        /// Spaces per indentation level.
        #[arg(long, default_value_t = 4)]
        indent: usize,
    },

    /// Decompile a source file to graph JSON.
    Decompile {
        /// Path to the source file.
        source: PathBuf,

        /// Write the graph here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Node-type definitions JSON for registered callees.
        #[arg(long)]
        definitions: Option<PathBuf>,

        /// Forget assignments made inside a block once it ends.
        #[arg(long)]
        block_scoped: bool,
    },

    /// Render a graph's data-flow links as Graphviz DOT.
    Dot {
        /// Path to the graph JSON file.
        graph: PathBuf,

        /// Write the diagram here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Compile {
            graph,
            output,
            definitions,
            indent,
        } => run_compile(&graph, output.as_deref(), definitions.as_deref(), indent),
        Commands::Decompile {
            source,
            output,
            definitions,
            block_scoped,
        } => run_decompile(&source, output.as_deref(), definitions.as_deref(), block_scoped),
        Commands::Dot { graph, output } => run_dot(&graph, output.as_deref()),
    };
    process::exit(exit_code);
}

/// Execute the compile subcommand.
///
/// Returns exit code: 0 = success, 1 = malformed graph or definitions,
/// 2 = structural validation failure, 3 = I/O error.
fn run_compile(
    graph_path: &Path,
    output: Option<&Path>,
    definitions: Option<&Path>,
    indent: usize,
) -> i32 {
    let registry = match load_registry(definitions) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let graph = match load_graph(graph_path) {
        Ok(g) => g,
        Err(code) => return code,
    };

    let options = CompileOptions {
        indent_width: indent,
        ..CompileOptions::default()
    };
    match plexus_codegen::compile_with(&graph, &registry, &options) {
        Ok(text) => emit(output, &text),
        Err(CompileError::Graph(e)) => {
            eprintln!("Invalid graph: {}", e);
            EXIT_VALIDATION
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            EXIT_TRANSLATION
        }
    }
}

/// Execute the decompile subcommand.
///
/// Returns exit code: 0 = success, 1 = malformed or unsupported source,
/// 3 = I/O error.
fn run_decompile(
    source_path: &Path,
    output: Option<&Path>,
    definitions: Option<&Path>,
    block_scoped: bool,
) -> i32 {
    let registry = match load_registry(definitions) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let source = match read(source_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let options = DecompileOptions {
        provider_scope: if block_scoped {
            ProviderScope::Block
        } else {
            ProviderScope::Shared
        },
    };
    let graph = match plexus_decompile::decompile_with(&source, &registry, &options) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}: {}", source_path.display(), e);
            return EXIT_TRANSLATION;
        }
    };
    match graph.to_json_pretty() {
        Ok(json) => emit(output, &format!("{}\n", json)),
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_TRANSLATION
        }
    }
}

/// Execute the dot subcommand.
fn run_dot(graph_path: &Path, output: Option<&Path>) -> i32 {
    let graph = match load_graph(graph_path) {
        Ok(g) => g,
        Err(code) => return code,
    };
    match dot::to_dot(&graph) {
        Ok(text) => emit(output, &text),
        Err(e) => {
            eprintln!("Invalid graph: {}", e);
            EXIT_VALIDATION
        }
    }
}

fn read(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", path.display(), e);
        EXIT_IO
    })
}

fn load_graph(path: &Path) -> Result<Graph, i32> {
    let json = read(path)?;
    Graph::from_json(&json).map_err(|e| report_core(path, e))
}

fn load_registry(path: Option<&Path>) -> Result<Registry, i32> {
    let Some(path) = path else {
        return Ok(Registry::new());
    };
    let json = read(path)?;
    let registry = Registry::from_definitions_json(&json).map_err(|e| report_core(path, e))?;
    tracing::debug!(
        path = %path.display(),
        functions = registry.functions().count(),
        "loaded node-type definitions"
    );
    Ok(registry)
}

fn report_core(path: &Path, err: CoreError) -> i32 {
    eprintln!("Error: {}: {}", path.display(), err);
    EXIT_TRANSLATION
}

/// Write `text` to `output`, or to stdout when no path is given.
fn emit(output: Option<&Path>, text: &str) -> i32 {
    match output {
        Some(path) => match fs::write(path, text) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = text.len(), "wrote output");
                0
            }
            Err(e) => {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                EXIT_IO
            }
        },
        None => {
            print!("{}", text);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const GRAPH: &str = r#"{"nodes": [
        {"id": "a", "type": "variable_assign", "value": "x",
         "inputs": [{"name": "value", "value": "1"}]},
        {"id": "p", "type": "print", "inputs": [{"name": "target", "link": "a"}]}
    ]}"#;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["plexus", "decompile", "in.py", "-v", "--block-scoped"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Decompile {
                block_scoped: true,
                ..
            }
        ));
    }

    #[test]
    fn compile_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let graph_path = dir.path().join("graph.json");
        let out_path = dir.path().join("out.py");
        fs::write(&graph_path, GRAPH).unwrap();

        let code = run_compile(&graph_path, Some(out_path.as_path()), None, 4);
        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&out_path).unwrap(), "x = 1\nprint(x)\n");
    }

    #[test]
    fn decompile_then_compile_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("in.py");
        let graph_path = dir.path().join("graph.json");
        let out_path = dir.path().join("out.py");
        fs::write(&source_path, "n = 3\nfor i in range(n):\n    print(i)\n").unwrap();

        assert_eq!(run_decompile(&source_path, Some(graph_path.as_path()), None, false), 0);
        assert_eq!(run_compile(&graph_path, Some(out_path.as_path()), None, 4), 0);
        assert_eq!(
            fs::read_to_string(&out_path).unwrap(),
            "n = 3\nfor i in range(n):\n    print(i)\n"
        );
    }

    #[test]
    fn exit_codes_by_failure_kind() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(run_compile(&missing, None, None, 4), EXIT_IO);

        let malformed = dir.path().join("malformed.json");
        fs::write(&malformed, "{\"nodes\": [").unwrap();
        assert_eq!(run_compile(&malformed, None, None, 4), EXIT_TRANSLATION);

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{"nodes": [{"id": "p", "type": "print"}]}"#).unwrap();
        assert_eq!(run_compile(&invalid, None, None, 4), EXIT_VALIDATION);

        let script = dir.path().join("loop.py");
        fs::write(&script, "while True:\n    pass\n").unwrap();
        assert_eq!(run_decompile(&script, None, None, false), EXIT_TRANSLATION);
    }

    #[test]
    fn dot_writes_diagram() {
        let dir = tempfile::tempdir().unwrap();
        let graph_path = dir.path().join("graph.json");
        let out_path = dir.path().join("graph.dot");
        fs::write(&graph_path, GRAPH).unwrap();

        assert_eq!(run_dot(&graph_path, Some(out_path.as_path())), 0);
        let text = fs::read_to_string(&out_path).unwrap();
        assert!(text.starts_with("digraph"));
    }
}
