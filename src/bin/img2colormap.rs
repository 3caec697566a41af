use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::json;

use image_to_colormap_wasm::{
    Extractor, HttpFetcher, KmeansConfig, LogSink, Palette, PrepareOptions, ResizeTarget,
    load_source, prepare,
};

/// Build color palettes (colormaps) from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more image paths or http(s) URLs
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Number of colors in the palette
    #[arg(short = 'k', long, default_value_t = 5, allow_negative_numbers = true)]
    n_colors: i64,

    /// Search palette sizes 2..=MAX and report the elbow instead
    #[arg(short, long, value_name = "MAX")]
    optimize: Option<usize>,

    /// Downsize to fit inside 512x512 before clustering
    #[arg(short, long)]
    resize: bool,

    /// Downsize to fit inside WIDTHxHEIGHT before clustering
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size, conflicts_with = "resize")]
    max_size: Option<(u32, u32)>,

    /// Drop fully transparent pixels
    #[arg(short = 't', long)]
    remove_transparent: bool,

    /// Random seed for reproducible palettes
    #[arg(short, long)]
    seed: Option<u64>,

    /// Palette name (defaults to the image file name)
    #[arg(short, long)]
    name: Option<String>,

    /// Maximum k-means iterations
    #[arg(long, default_value_t = KmeansConfig::default().max_iter)]
    max_iter: usize,

    /// Print JSON instead of plain hex codes
    #[arg(long)]
    json: bool,
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT, got {s}");
    };
    Ok((w.trim().parse()?, h.trim().parse()?))
}

fn palette_json(palette: &Palette) -> serde_json::Value {
    json!({
        "name": palette.name(),
        "hex": palette.hex_codes(),
        "rgb": palette.colors().iter().map(|c| c.channels()).collect::<Vec<_>>(),
    })
}

fn print_palette(palette: &Palette) {
    for c in palette.colors() {
        println!("{}  (text {})", c.hex(), c.contrast_text());
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = PrepareOptions {
        resize: match (args.resize, args.max_size) {
            (_, Some((width, height))) => Some(ResizeTarget::Max { width, height }),
            (true, None) => Some(ResizeTarget::DefaultMax),
            (false, None) => None,
        },
        remove_transparent: args.remove_transparent,
    };
    let config = KmeansConfig { max_iter: args.max_iter, ..KmeansConfig::default() };
    let extractor = Extractor::new(config, &LogSink);

    for input in &args.inputs {
        let source = load_source(input, Some(&HttpFetcher))
            .with_context(|| format!("loading {input}"))?;
        let pixels = prepare(&source, &options);
        log::info!("{input}: {} pixels from a {}x{} grid", pixels.len(), pixels.width, pixels.height);

        if let Some(max_colors) = args.optimize {
            let search = extractor
                .search_optimal(&pixels, max_colors, args.name.as_deref(), args.seed)
                .with_context(|| format!("searching palette sizes for {input}"))?;

            if args.json {
                let palettes: serde_json::Map<_, _> = search
                    .palettes
                    .iter()
                    .map(|(k, p)| (k.to_string(), palette_json(p)))
                    .collect();
                let inertia: serde_json::Map<_, _> = search
                    .inertia
                    .iter()
                    .map(|(k, v)| (k.to_string(), json!(v)))
                    .collect();
                let out = json!({ "input": input, "best": search.best_k, "palettes": palettes, "inertia": inertia });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{input}");
                for (k, v) in &search.inertia {
                    println!("  {k:>3} colors  inertia {v:.1}");
                }
                match search.best_palette() {
                    Some(best) => {
                        println!("optimal number of colors: {}", best.len());
                        print_palette(best);
                    }
                    None => println!("no clear optimum in 2..={max_colors}"),
                }
            }
        } else {
            let extraction = extractor
                .extract(&pixels, args.n_colors, args.name.as_deref(), args.seed)
                .with_context(|| format!("extracting palette from {input}"))?;

            if args.json {
                let mut out = palette_json(&extraction.palette);
                out["input"] = json!(input);
                out["inertia"] = json!(extraction.inertia);
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{input}: {}", extraction.palette.name());
                print_palette(&extraction.palette);
            }
        }
    }

    Ok(())
}
