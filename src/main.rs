use clap::Parser;
use laser_rd::color::luminance;
use laser_rd::encoder::{JobEncoder, RuidaEncoder};
use laser_rd::preview::job_to_svg;
use laser_rd::raster::{RasterOptions, rasterize_image_file};
use laser_rd::{
    Document, Error, LaserJob, PlannerConfig, Result, compile_document, load_dxf_file,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

/// Convert SVG/DXF drawings and raster images into Ruida .rd laser jobs
#[derive(Parser, Debug)]
#[command(name = "laser-rd", version)]
struct Cli {
    /// Input file (SVG, DXF, PNG, JPG)
    input: PathBuf,

    /// Output .rd file [default: input with .rd extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Laser power (percent) for the lightest shade
    #[arg(long, default_value_t = 10.0)]
    min_power: f64,

    /// Laser power (percent) for the darkest shade
    #[arg(long, default_value_t = 70.0)]
    max_power: f64,

    /// Speed (mm/s) for all layers
    #[arg(long, default_value_t = 300.0)]
    speed: f64,

    /// Number of gray shades for raster input
    #[arg(long, default_value_t = 16)]
    num_colors: usize,

    /// Downscale factor for raster input before tracing
    #[arg(long, default_value_t = 0.5)]
    img_scale: f64,

    /// Also write an SVG preview of the compiled job
    #[arg(long, value_name = "SVG")]
    preview: Option<PathBuf>,

    /// Keep the intermediate SVG generated from raster input
    #[arg(long, value_name = "SVG")]
    svg_out: Option<PathBuf>,

    /// Write the .rd stream unscrambled (not readable by the machine)
    #[arg(long)]
    no_scramble: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

enum InputKind {
    Svg,
    Dxf,
    Image,
}

fn input_kind(path: &Path) -> Result<InputKind> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "svg" => Ok(InputKind::Svg),
        "dxf" => Ok(InputKind::Dxf),
        "png" | "jpg" | "jpeg" => Ok(InputKind::Image),
        "pdf" => Err(Error::UnsupportedFormat(format!(
            "'.{}' must be converted to SVG first",
            ext
        ))),
        _ => Err(Error::UnsupportedFormat(format!("'.{}'", ext))),
    }
}

fn print_layers(job: &LaserJob) {
    println!("Processing SVG layers:");
    let total = job.len();
    for (i, layer) in job.iter().enumerate() {
        println!(
            "- Layer {}/{}: Color {} (Gray: {}) -> Power: {:.1}%, Speed: {}mm/s, {} path segments",
            i + 1,
            total,
            layer.color_key,
            luminance(layer.rgb) as u32,
            layer.power,
            layer.speed,
            layer.paths.len()
        );
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = PlannerConfig {
        min_power: cli.min_power,
        max_power: cli.max_power,
        speed: cli.speed,
    };
    config.validate()?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("rd"));

    let document = match input_kind(&cli.input)? {
        InputKind::Svg => Document::parse(&fs::read_to_string(&cli.input)?)?,
        InputKind::Dxf => {
            println!("Converting DXF to SVG...");
            load_dxf_file(&cli.input)?
        }
        InputKind::Image => {
            println!("Converting image to SVG...");
            let options = RasterOptions {
                num_colors: cli.num_colors,
                scale: cli.img_scale,
                ..RasterOptions::default()
            };
            let result = rasterize_image_file(&cli.input, Some(options))?;
            println!("  {}x{} after scaling", result.width, result.height);

            if let Some(path) = &cli.svg_out {
                fs::write(path, &result.svg)?;
                println!("Wrote intermediate SVG to {}", path.display());
            }
            Document::parse(&result.svg)?
        }
    };

    println!("Converting SVG to RD...");
    let job = compile_document(&document, &config);

    if job.is_empty() {
        println!("Warning: No vector paths found in the SVG. The output file will be empty.");
    } else {
        print_layers(&job);
    }

    if let Some(path) = &cli.preview {
        fs::write(path, job_to_svg(&job))?;
        println!("Wrote preview to {}", path.display());
    }

    let encoder = RuidaEncoder::default().with_scramble(!cli.no_scramble);
    encoder.write_file(&job, &output)?;

    println!(
        "\nSuccessfully wrote {} layer(s) to {}",
        job.len(),
        output.display()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        let code = match e {
            Error::UnsupportedFormat(_) | Error::InvalidConfig(_) => 1,
            Error::Io(_) => 2,
            Error::MalformedDocument { .. } | Error::Image(_) | Error::Dxf(_) => 3,
            Error::Encode(_) => 4,
        };
        process::exit(code);
    }
}
