//! The `read` subcommand: bounded decode with per-file status codes.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use zenbound::{ReadFlags, ReadOutcome, ReadParams, read_bounded};

use crate::ReadArgs;
use crate::batch;

/// Run the `read` subcommand. Returns the process exit code.
pub fn run(args: ReadArgs) -> anyhow::Result<i32> {
    let files = batch::expand_inputs(&args.files, true)?;
    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let params = ReadParams {
        flags: ReadFlags::from_bits(args.flags),
        max_size: args.max_size,
        max_pixels: args.max_pixels,
    };

    let reports: Vec<ReadReport> = if files.len() == 1 {
        vec![read_one(&files[0], &params)]
    } else {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = args.jobs {
            builder = builder.num_threads(jobs);
        }
        let pool = builder.build()?;

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );

        let reports = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let report = read_one(path, &params);
                    pb.inc(1);
                    report
                })
                .collect()
        });
        pb.finish_and_clear();
        reports
    };

    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            print_report(report);
        }
    }

    Ok(batch::exit_code(reports.iter().map(|r| r.status)))
}

/// Result of reading a single file.
#[derive(Debug, Serialize)]
pub struct ReadReport {
    pub path: PathBuf,
    pub status: i32,
    pub status_name: String,
    pub format: Option<String>,
    pub source_width: Option<u32>,
    pub source_height: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub channels: Option<u8>,
    pub bit_depth: Option<u8>,
    #[serde(with = "millis")]
    pub duration: Duration,
}

fn read_one(path: &Path, params: &ReadParams) -> ReadReport {
    let start = Instant::now();
    let outcome = read_bounded(path, params);
    report_for(path, &outcome, start.elapsed())
}

fn report_for(path: &Path, outcome: &ReadOutcome, duration: Duration) -> ReadReport {
    let status = outcome.status();
    let image = outcome.image();
    ReadReport {
        path: path.to_path_buf(),
        status: status.code(),
        status_name: status.to_string(),
        format: image.map(|img| img.info.format.to_string()),
        source_width: image.map(|img| img.info.width),
        source_height: image.map(|img| img.info.height),
        width: image.map(|img| img.width()),
        height: image.map(|img| img.height()),
        channels: image.map(|img| img.pixels.channels()),
        bit_depth: image.map(|img| img.pixels.bit_depth()),
        duration,
    }
}

fn print_report(report: &ReadReport) {
    match (report.width, report.height) {
        (Some(w), Some(h)) => println!(
            "{}: status {} | {} {}x{} -> {w}x{h}, {} ch, {}-bit ({}ms)",
            report.path.display(),
            report.status_name,
            report.format.as_deref().unwrap_or("?"),
            report.source_width.unwrap_or(0),
            report.source_height.unwrap_or(0),
            report.channels.unwrap_or(0),
            report.bit_depth.unwrap_or(0),
            report.duration.as_millis(),
        ),
        _ => println!("{}: status {}", report.path.display(), report.status_name),
    }
}

mod millis {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zenbound::Size;

    fn write_png(path: &Path, w: u32, h: u32) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), w, h);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&vec![90u8; (w * h * 3) as usize])
            .unwrap();
    }

    #[test]
    fn reports_status_and_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        write_png(&path, 20, 10);

        let params = ReadParams::new().with_flags(ReadFlags::REDUCED_GRAYSCALE_2);
        let report = read_one(&path, &params);
        assert_eq!(report.status, 0);
        assert_eq!((report.width, report.height), (Some(10), Some(5)));
        assert_eq!(report.source_width, Some(20));
        assert_eq!(report.channels, Some(1));

        let params = ReadParams::new().with_max_size(Size::new(19, 10));
        let report = read_one(&path, &params);
        assert_eq!(report.status, 3);
        assert!(report.width.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], 3);
    }

    #[test]
    fn missing_file_reports_one() {
        let dir = tempfile::tempdir().unwrap();
        let report = read_one(&dir.path().join("nofile.png"), &ReadParams::new());
        assert_eq!(report.status, 1);
    }
}
