mod report;

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use uwu_peek::LazyImage;

use crate::report::{PixelStats, Report};

#[derive(Parser)]
#[command(name = "uwu-peek")]
#[command(about = "🌸 「simple and cute lazy image peeker」 🌸")]
struct Cli {
    #[arg(short = 'i', long, value_name = "FILE")]
    input: PathBuf,

    // decode the pixels too, otherwise only the header gets read
    #[arg(short = 'l', long)]
    load: bool,

    #[arg(
        short = 'e',
        long,
        value_name = "FILE",
        help = "Decode and write the first frame out as an rgba image."
    )]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    info!("peeking at {}", cli.input.display());
    let mut image = LazyImage::open(&cli.input)?;

    let description = image.describe()?;
    let header = image.info()?.clone();

    let pixels = if cli.load || cli.export.is_some() {
        let buffer = image.load()?;
        Some(PixelStats {
            samples: buffer.len(),
            palette_entries: buffer.palette_len(),
        })
    } else {
        None
    };

    let exported = match &cli.export {
        Some(out) => {
            image.export(out)?;
            Some(out.display().to_string())
        }
        None => None,
    };

    let bytes_read = image.bytes_read();
    image.close();

    report::print_report(&Report {
        description,
        info: header,
        bytes_read,
        pixels,
        exported,
    });

    Ok(())
}
