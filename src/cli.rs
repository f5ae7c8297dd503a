use crate::config::{Config, OutputFormat, load_config};
use crate::json_io::{export_config, import_config, merge_configs, parse_patch};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::model::RadarConfig;
use crate::render::{RenderOptions, SvgSurface, render_geometry, write_output_svg};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "radar", version, about = "Technology radar renderer")]
pub struct Args {
    /// More logging on stderr (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a radar config to SVG or PNG
    Render(RenderArgs),
    /// Validate a config and print it in canonical form
    Export(IoArgs),
    /// Merge a partial import into a base config
    Merge {
        /// Base config file
        base: PathBuf,
        /// Partial config to merge on top ('-' for stdin)
        import: PathBuf,
        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Check a config and report the first problem
    Validate {
        /// Config file or '-' for stdin
        input: Option<PathBuf>,
    },
    /// Dump computed geometry as JSON
    Layout(IoArgs),
    /// Print a small example config
    Sample {
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Input config (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format. Falls back to the output extension, then the settings file.
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<FormatArg>,

    /// Settings file (JSON5: theme, themeVariables, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Leave out hover/click wiring
    #[arg(long = "static")]
    pub static_svg: bool,

    /// Render a single quadrant sector (0-3)
    #[arg(short = 'z', long = "zoom")]
    pub zoom: Option<usize>,
}

#[derive(ClapArgs, Debug)]
pub struct IoArgs {
    /// Input config or '-' for stdin
    pub input: Option<PathBuf>,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    Svg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Svg => OutputFormat::Svg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Render(render) => run_render(render),
        Command::Export(io_args) => {
            let config = read_config(io_args.input.as_deref())?;
            write_text(&export_config(&config)?, io_args.output.as_deref())
        }
        Command::Merge {
            base,
            import,
            output,
        } => {
            let base = read_config(Some(base.as_path()))?;
            let patch_text = read_input(Some(import.as_path()))?;
            let patch = parse_patch(&patch_text)?;
            let merged = merge_configs(&base, &patch)?;
            write_text(&export_config(&merged)?, output.as_deref())
        }
        Command::Validate { input } => {
            let config = read_config(input.as_deref())?;
            compute_layout(&config)?;
            eprintln!(
                "ok: {} entries, {} rings",
                config.entries.len(),
                config.rings.len()
            );
            Ok(())
        }
        Command::Layout(io_args) => {
            let config = read_config(io_args.input.as_deref())?;
            let geometry = compute_layout(&config)?;
            write_layout_dump(io_args.output.as_deref(), &geometry)
        }
        Command::Sample { output } => {
            write_text(&export_config(&RadarConfig::sample())?, output.as_deref())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    // A subscriber may already be set when embedded; keep that one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn run_render(args: RenderArgs) -> Result<()> {
    let settings = load_config(args.config.as_deref())?;
    let mut config = read_config(args.input.as_deref())?;
    settings.apply(&mut config.display_options);
    if let Some(zoom) = args.zoom {
        config.display_options.zoomed_quadrant = Some(zoom);
    }

    let geometry = compute_layout(&config)?;
    let interactive = settings.render.interactive && !args.static_svg;
    let mut surface = if interactive {
        SvgSurface::new()
    } else {
        SvgSurface::new().without_interaction()
    };
    render_geometry(
        &geometry,
        &mut surface,
        &RenderOptions::from(&config.display_options),
    );
    let svg = surface.into_svg();

    match resolve_format(&args, &settings) {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &settings)
        }
    }
}

fn resolve_format(args: &RenderArgs, settings: &Config) -> OutputFormat {
    if let Some(format) = args.output_format {
        return format.into();
    }
    let by_extension = args
        .output
        .as_deref()
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"));
    match by_extension {
        Some(true) => OutputFormat::Png,
        Some(false) => OutputFormat::Svg,
        None => settings.render.format,
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, settings: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, settings.render.png_scale)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _settings: &Config) -> Result<()> {
    anyhow::bail!("PNG output needs the `png` feature")
}

fn read_config(path: Option<&Path>) -> Result<RadarConfig> {
    let text = read_input(path)?;
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());
    import_config(&text).with_context(|| format!("invalid radar config in {source}"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, format!("{text}\n"))?,
        None => println!("{text}"),
    }
    Ok(())
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn render_args(argv: &[&str]) -> RenderArgs {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();
        match args.command {
            Command::Render(render) => render,
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn format_prefers_flag_then_extension_then_settings() {
        let settings = Config::default();
        let args = render_args(&["radar", "render", "-o", "out.svg", "-e", "png"]);
        assert_eq!(resolve_format(&args, &settings), OutputFormat::Png);

        let args = render_args(&["radar", "render", "-o", "out.PNG"]);
        assert_eq!(resolve_format(&args, &settings), OutputFormat::Png);

        let mut settings = Config::default();
        settings.render.format = OutputFormat::Png;
        let args = render_args(&["radar", "render"]);
        assert_eq!(resolve_format(&args, &settings), OutputFormat::Png);
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::try_parse_from(["radar", "-vv", "merge", "base.json", "-"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::Merge { .. }));
        let args = Args::try_parse_from(["radar", "layout", "in.json", "-o", "dump.json"]).unwrap();
        assert!(matches!(args.command, Command::Layout(IoArgs { output: Some(_), .. })));
        assert!(Args::try_parse_from(["radar", "sample"]).is_ok());
    }

    #[test]
    fn render_requires_output_for_png() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("a.png")), "png").unwrap(),
            PathBuf::from("a.png")
        );
    }
}
