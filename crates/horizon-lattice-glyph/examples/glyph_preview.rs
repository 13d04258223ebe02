//! Print glyphs as ASCII art.
//!
//! Usage: `cargo run --example glyph_preview -- <font.ttf> [text] [px]`
//!
//! Set `RUST_LOG=horizon_lattice_glyph=trace` to watch the cache fill.

use std::process::ExitCode;

use horizon_lattice_glyph::{FontCached, LoadOptions, initialize_engine};
use tracing_subscriber::EnvFilter;

const SHADES: &[u8] = b" .:-=+*#%@";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: glyph_preview <font.ttf> [text] [px]");
        return ExitCode::FAILURE;
    };
    let text = args.next().unwrap_or_else(|| "Rg".to_string());
    let px = match args.next().map(|s| s.parse::<f32>()) {
        None => 24.0,
        Some(Ok(px)) => px,
        Some(Err(err)) => {
            eprintln!("invalid pixel size: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&path, &text, px) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, text: &str, px: f32) -> Result<(), Box<dyn std::error::Error>> {
    initialize_engine();
    let bytes = std::fs::read(path)?;
    let mut font = FontCached::new(&bytes, LoadOptions::new().scale(px))?;

    println!(
        "{path}: {} glyphs, {} units per em",
        font.glyph_count(),
        font.units_per_em()?
    );
    if let Some(line) = font.horizontal_line_metrics(px)? {
        println!(
            "ascent {:.2}, descent {:.2}, line gap {:.2}",
            line.ascent, line.descent, line.line_gap
        );
    }

    for ch in text.chars() {
        let index = font.lookup_glyph_index(ch)?;
        let glyph = font.rasterize(ch, px)?;
        let m = glyph.metrics;
        println!();
        println!(
            "{ch:?} -> glyph {index}, {}x{} at ({}, {}), advance {:.2}",
            m.width, m.height, m.xmin, m.ymin, m.advance_width
        );
        for row in glyph.bitmap.chunks(m.width.max(1)) {
            let line: String = row
                .iter()
                .map(|&c| SHADES[c as usize * (SHADES.len() - 1) / 255] as char)
                .collect();
            println!("|{line}|");
        }
    }

    let stats = font.cache_stats();
    println!();
    println!(
        "cache: {} hits, {} misses",
        stats.total_hits(),
        stats.total_misses()
    );
    Ok(())
}
