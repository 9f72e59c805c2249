use colored::Colorize;
use uwu_peek::HeaderInfo;

/// everything worth printing, collected up front so a failure halfway
/// through never leaves half a report on stdout
pub struct Report {
    pub description: String,
    pub info: HeaderInfo,
    pub bytes_read: u64,
    pub pixels: Option<PixelStats>,
    pub exported: Option<String>,
}

pub struct PixelStats {
    pub samples: usize,
    pub palette_entries: usize,
}

pub fn print_report(report: &Report) {
    println!("{}", report.description);
    println!();

    let info = &report.info;
    println!(
        "{} {}",
        "「format」".cyan().bold(),
        info.format.to_string().yellow()
    );
    println!("{} {}", "「mode」".cyan().bold(), info.mode.to_string().yellow());
    println!(
        "{} {}",
        "「size」".cyan().bold(),
        format!("{}x{}", info.width, info.height).yellow()
    );
    println!(
        "{} {}",
        "「bit depth」".cyan().bold(),
        info.bit_depth.to_string().yellow()
    );
    if let Some(interlaced) = info.interlaced {
        println!(
            "{} {}",
            "「interlaced」".cyan().bold(),
            interlaced.to_string().yellow()
        );
    }
    println!();

    match &report.pixels {
        Some(stats) => {
            println!(
                "{} {} bytes of samples",
                "「loaded」".green().bold(),
                stats.samples.to_string().yellow()
            );
            if stats.palette_entries > 0 {
                println!(
                    "{} {} entries",
                    "「palette」".green().bold(),
                    stats.palette_entries.to_string().yellow()
                );
            }
        }
        None => println!(
            "{} only the {} byte header was read",
            "「lazy」".magenta().bold(),
            info.header_len.to_string().yellow()
        ),
    }
    println!(
        "{} {}",
        "「bytes read」".cyan().bold(),
        report.bytes_read.to_string().yellow()
    );

    if let Some(path) = &report.exported {
        println!(
            "{} {}",
            "「exported」".green().bold(),
            path.cyan()
        );
    }
}
