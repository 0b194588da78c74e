//! Vesper CLI - loads a compiled module image and runs it.
//!
//! The process exit code is the VM's exit code: the HLT operand on a
//! clean halt, or one of the fixed failure codes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;

use vesper_config::VmConfig;
use vesper_core::{ModuleImage, Vm};

mod logging;

use logging::{parse_level, LogConfig};

/// Optional JSON run manifest. Command-line flags override its fields.
#[derive(Debug, Default, serde::Deserialize)]
struct Manifest {
    /// Value-stack capacity in slots.
    stack_slots: Option<usize>,
    /// Reserved host-interaction restriction flag.
    sandbox: Option<bool>,
    /// Entry function name.
    entry: Option<String>,
    /// Exported functions: name -> code-section offset.
    functions: Option<HashMap<String, u32>>,
}

#[derive(Parser)]
#[command(name = "vesper", about = "Vesper bytecode virtual machine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a module image and run an entry function.
    Run {
        /// Module image file (VSPX format).
        image: PathBuf,
        /// Value-stack capacity in slots.
        #[arg(long)]
        stack_slots: Option<usize>,
        /// Enable the reserved sandbox flag.
        #[arg(long)]
        sandbox: bool,
        /// Entry function name (default: manifest entry, then "main").
        #[arg(long)]
        entry: Option<String>,
        /// Log level: error, warn, info, debug, trace.
        #[arg(long, default_value = "warn")]
        log_level: String,
        /// JSON manifest supplying defaults for the options above.
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let Command::Run {
        image,
        stack_slots,
        sandbox,
        entry,
        log_level,
        manifest,
    } = cli.command;

    let Some(level) = parse_level(&log_level) else {
        eprintln!("error: unknown log level '{log_level}'");
        process::exit(2);
    };
    logging::init(&LogConfig::with_global(level));

    let manifest = match manifest {
        Some(path) => match read_manifest(&path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(2);
            }
        },
        None => Manifest::default(),
    };

    let config = VmConfig {
        stack_slots: stack_slots
            .or(manifest.stack_slots)
            .unwrap_or(vesper_config::DEFAULT_STACK_SLOTS),
        sandbox: sandbox || manifest.sandbox.unwrap_or(false),
    };
    let entry = entry
        .or(manifest.entry)
        .unwrap_or_else(|| "main".to_owned());

    process::exit(run(&image, config, &entry, manifest.functions.unwrap_or_default()));
}

/// Read and parse the JSON manifest.
fn read_manifest(path: &Path) -> Result<Manifest, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}

/// Build the VM, register the module and its exports, run the entry
/// function, and return the process exit code.
fn run(image_path: &Path, config: VmConfig, entry: &str, exports: HashMap<String, u32>) -> i32 {
    let bytes = match std::fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", image_path.display(), e);
            return 2;
        }
    };
    let image = match ModuleImage::decode(bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("error: '{}': {}", image_path.display(), e);
            return 2;
        }
    };

    let mut vm = Vm::new(config);
    let module = match vm.add_module(image.into_module()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("error: {e}");
            return vm.exit_code().unwrap_or(1);
        }
    };

    // Exports come from the manifest; the entry function defaults to
    // the start of the code section when not listed there.
    let mut exports = exports;
    exports.entry(entry.to_owned()).or_insert(0);
    for (name, address) in &exports {
        if let Err(e) = vm.add_function(name, module, *address) {
            eprintln!("error: {e}");
            return vm.exit_code().unwrap_or(1);
        }
    }

    debug!(entry, "starting");
    if !vm.call_by_name(entry) {
        eprintln!("error: entry function '{entry}' cannot be called");
        return 2;
    }
    vm.exit_code().unwrap_or(0)
}
