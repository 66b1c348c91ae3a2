//! Cistercian CLI - Front-end for the compositor
//!
//! Commands: generate, breakdown, components, audit, interactive
//! Returns 2 on rejected input or a failed audit

use clap::{Parser, Subcommand};
use image::ImageFormat;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cistercian_core::{
    Auditor, ComponentLibrary, Compositor, CompositorConfig, Numeral, DEFAULT_ASSET_DIR,
};

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "cistercian-cli")]
#[command(about = "Cistercian CLI - Component-based numeral compositor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the component images directory
    #[arg(short, long, global = true, default_value = DEFAULT_ASSET_DIR)]
    assets: PathBuf,

    /// Compositor config (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite a numeral and write it as PNG
    Generate {
        /// Number between 1 and 9999
        #[arg(allow_hyphen_values = true)]
        number: String,

        /// Output file, always PNG whatever the extension
        #[arg(short, long, default_value = "numeral.png")]
        output: PathBuf,

        /// Print the render manifest as JSON
        #[arg(long)]
        json: bool,

        /// Embed the PNG as base64 in the JSON manifest
        #[arg(long, requires = "json")]
        embed: bool,
    },

    /// List the place values a number is made of
    Breakdown {
        #[arg(allow_hyphen_values = true)]
        number: String,
    },

    /// List loaded and missing components
    Components,

    /// Check loaded components for rendering problems
    Audit,

    /// Read numbers from stdin, one per line
    Interactive {
        /// Where numeral_<n>.png files are written
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdin = io::stdin();
    let code = run(cli, &mut stdin.lock(), &mut io::stdout(), &mut io::stderr());
    ExitCode::from(code)
}

fn run(cli: Cli, input: &mut impl BufRead, out: &mut impl Write, err: &mut impl Write) -> u8 {
    match dispatch(cli, input, out, err) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("terminal i/o failed: {e}");
            EXIT_FAILURE
        }
    }
}

fn dispatch(cli: Cli, input: &mut impl BufRead, out: &mut impl Write, err: &mut impl Write) -> io::Result<u8> {
    match cli.command {
        // Pure digit work, no assets needed
        Commands::Breakdown { number } => run_breakdown(&number, out, err),

        Commands::Generate { number, output, json, embed } => {
            match build_compositor(&cli.assets, cli.config.as_deref(), err) {
                Ok(compositor) => run_generate(&compositor, &number, &output, json, embed, out, err),
                Err(code) => Ok(code),
            }
        }

        Commands::Components => match load_library(&cli.assets, err) {
            Ok(library) => run_components(&library, out),
            Err(code) => Ok(code),
        },

        Commands::Audit => {
            let config = match load_config(cli.config.as_deref(), err) {
                Ok(c) => c,
                Err(code) => return Ok(code),
            };
            match load_library(&cli.assets, err) {
                Ok(library) => run_audit(&library, &config, out),
                Err(code) => Ok(code),
            }
        }

        Commands::Interactive { out_dir } => {
            match build_compositor(&cli.assets, cli.config.as_deref(), err) {
                Ok(compositor) => run_interactive(&compositor, &out_dir, input, out, err),
                Err(code) => Ok(code),
            }
        }
    }
}

fn load_config(path: Option<&Path>, err: &mut impl Write) -> Result<CompositorConfig, u8> {
    let Some(path) = path else {
        return Ok(CompositorConfig::default());
    };
    CompositorConfig::load_from_file(path).map_err(|e| {
        let _ = writeln!(err, "error: {e}");
        EXIT_FAILURE
    })
}

/// The created-directory advisory and skipped files are reported by the library's own logging
fn load_library(dir: &Path, err: &mut impl Write) -> Result<Arc<ComponentLibrary>, u8> {
    let (library, _report) = ComponentLibrary::load_from_dir(dir).map_err(|e| {
        let _ = writeln!(err, "error: failed to load components: {e}");
        EXIT_FAILURE
    })?;
    Ok(Arc::new(library))
}

fn build_compositor(assets: &Path, config: Option<&Path>, err: &mut impl Write) -> Result<Compositor, u8> {
    let config = load_config(config, err)?;
    let library = load_library(assets, err)?;
    Ok(Compositor::new(library, config))
}

fn run_breakdown(input: &str, out: &mut impl Write, err: &mut impl Write) -> io::Result<u8> {
    let numeral = match input.parse::<Numeral>() {
        Ok(n) => n,
        Err(e) => {
            writeln!(err, "Invalid input: {e}")?;
            return Ok(EXIT_REJECTED);
        }
    };
    for entry in numeral.breakdown() {
        writeln!(out, "{entry}")?;
    }
    Ok(EXIT_SUCCESS)
}

fn run_generate(
    compositor: &Compositor,
    input: &str,
    output: &Path,
    json: bool,
    embed: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<u8> {
    let numeral = match input.parse::<Numeral>() {
        Ok(n) => n,
        Err(e) => {
            writeln!(err, "Invalid input: {e}")?;
            return Ok(EXIT_REJECTED);
        }
    };

    let rendered = match compositor.render(numeral.value() as i64) {
        Ok(r) => r,
        Err(e) => {
            writeln!(err, "error: {e}")?;
            return Ok(EXIT_REJECTED);
        }
    };

    if let Err(e) = rendered.image.save_with_format(output, ImageFormat::Png) {
        writeln!(err, "error: failed to write {}: {e}", output.display())?;
        return Ok(EXIT_FAILURE);
    }

    if !rendered.is_complete() {
        tracing::warn!(number = %rendered.number, "rendered with missing components");
    }

    if !json {
        writeln!(out, "Arabic: {}", rendered.number)?;
        writeln!(out, "Cistercian: {}", output.display())?;
        writeln!(out, "Digit Components:")?;
        for entry in &rendered.breakdown {
            writeln!(out, "  {entry}")?;
        }
        return Ok(EXIT_SUCCESS);
    }

    let mut manifest = serde_json::json!({
        "success": true,
        "output": output.display().to_string(),
        "numeral": &rendered,
    });
    if embed {
        match rendered.png_base64() {
            Ok(data) => manifest["png_base64"] = serde_json::Value::String(data),
            Err(e) => {
                writeln!(err, "error: {e}")?;
                return Ok(EXIT_FAILURE);
            }
        }
    }
    writeln!(out, "{}", serde_json::to_string_pretty(&manifest)?)?;
    Ok(EXIT_SUCCESS)
}

fn run_components(library: &ComponentLibrary, out: &mut impl Write) -> io::Result<u8> {
    writeln!(out, "Loaded ({}):", library.len())?;
    for component in library.components() {
        let (w, h) = component.dimensions();
        writeln!(out, "  {:<20} {}x{}", component.key.file_name(), w, h)?;
    }
    let missing = library.missing();
    writeln!(out, "Missing ({}):", missing.len())?;
    for key in missing {
        writeln!(out, "  {}", key.file_name())?;
    }
    Ok(EXIT_SUCCESS)
}

fn run_audit(library: &ComponentLibrary, config: &CompositorConfig, out: &mut impl Write) -> io::Result<u8> {
    let report = Auditor::new().audit(library, config);
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(if report.valid { EXIT_SUCCESS } else { EXIT_REJECTED })
}

fn run_interactive(
    compositor: &Compositor,
    out_dir: &Path,
    input: &mut impl BufRead,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<u8> {
    if let Err(e) = fs::create_dir_all(out_dir) {
        writeln!(err, "error: cannot create {}: {e}", out_dir.display())?;
        return Ok(EXIT_FAILURE);
    }

    loop {
        write!(out, "Enter Arabic number (1-9999): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            break;
        }

        // Bad input is reported and the session continues
        let numeral = match text.parse::<Numeral>() {
            Ok(n) => n,
            Err(e) => {
                writeln!(out, "Error: Invalid input: {e}")?;
                continue;
            }
        };

        let image = match compositor.generate(numeral.value() as i64) {
            Ok(img) => img,
            Err(e) => {
                writeln!(out, "Error: Invalid input: {e}")?;
                continue;
            }
        };

        let path = out_dir.join(format!("numeral_{}.png", numeral));
        if let Err(e) = image.save_with_format(&path, ImageFormat::Png) {
            writeln!(out, "Error: failed to write {}: {e}", path.display())?;
            continue;
        }

        writeln!(out, "Arabic: {numeral}")?;
        writeln!(out, "Cistercian: {}", path.display())?;
        writeln!(out, "Digit Components:")?;
        for entry in numeral.breakdown() {
            writeln!(out, "  {entry}")?;
        }
    }

    Ok(EXIT_SUCCESS)
}
