//! Builder CLI: rasterises a font through `crisp_font::Builder` and writes a
//! metrics file plus a wide-atlas image per requested size.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use crisp_font::{
    encode_png, encode_qoi, minify_with_verification, CorrectionsSpec, FontIdentity,
    FontdueRasterizer, Style, Weight,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Qoi,
}

/// Builds crisp bitmap font artifacts from a TTF/OTF font file.
#[derive(Debug, Parser)]
#[command(name = "crisp-font-build", version)]
struct Args {
    /// Path to the source TTF/OTF font file.
    #[arg(long)]
    font: PathBuf,

    /// Physical-pixel density multiplier.
    #[arg(long, default_value_t = 1.0)]
    pixel_density: f64,

    /// Font family name, as it appears in the id string.
    #[arg(long)]
    family: String,

    /// `normal`, `italic`, or `oblique`.
    #[arg(long, default_value = "normal")]
    style: Style,

    /// `normal`, `bold`, or a numeric weight 100..900.
    #[arg(long, default_value = "normal")]
    weight: Weight,

    /// One or more CSS pixel sizes to build.
    #[arg(long, num_args = 1.., required = true)]
    sizes: Vec<f64>,

    /// Optional TOML corrections spec.
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// Output directory for `metrics-<id>.json` / `atlas-<id>.<ext>`.
    #[arg(long, default_value = "font-assets")]
    out: PathBuf,

    /// Atlas image container.
    #[arg(long, value_enum, default_value_t = FormatArg::Png)]
    format: FormatArg,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let font_bytes = std::fs::read(&args.font)?;
    let rasterizer = FontdueRasterizer::from_bytes(&font_bytes)?;

    let corrections = args.corrections.as_ref().map(CorrectionsSpec::load).transpose()?;

    std::fs::create_dir_all(&args.out)?;

    for &size in &args.sizes {
        let id = FontIdentity::new(args.pixel_density, args.family.clone(), args.style, args.weight, size);

        crisp_font::crisp_log!("building {}", id.id_string());

        let output = crisp_font::Builder::build(&id, &rasterizer, corrections.as_ref())?;
        let minified = minify_with_verification(&output.metrics)?;

        let metrics_doc = serde_json::json!({
            "id": id.id_string(),
            "metrics": minified,
            "kerningDiscretization": output.kerning_discretization,
        });
        let metrics_path = args.out.join(format!("metrics-{}.json", id.id_string()));
        std::fs::write(&metrics_path, serde_json::to_vec_pretty(&metrics_doc)?)?;

        let (atlas_bytes, ext) = match args.format {
            FormatArg::Png => (encode_png(&output.wide_atlas)?, "png"),
            FormatArg::Qoi => (encode_qoi(&output.wide_atlas), "qoi"),
        };
        let atlas_path = args.out.join(format!("atlas-{}.{ext}", id.id_string()));
        std::fs::write(&atlas_path, atlas_bytes)?;

        crisp_font::crisp_log!("wrote {} and {}", metrics_path.display(), atlas_path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("crisp-font-build: {e}");
            ExitCode::FAILURE
        }
    }
}
