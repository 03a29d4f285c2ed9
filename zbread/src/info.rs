//! Image inspection: probe and display metadata without decoding.

use std::path::Path;

use serde::Serialize;

use crate::InfoArgs;
use crate::batch;

/// Run the `info` subcommand.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let files = batch::expand_inputs(&args.files, false)?;

    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let multi = files.len() > 1;

    for (i, path) in files.iter().enumerate() {
        if multi && !args.json {
            if i > 0 {
                println!();
            }
            println!("{}:", path.display());
        }

        match inspect_file(path) {
            Ok(info) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    print_info(&info);
                }
            }
            Err(e) => {
                eprintln!("  error: {e}");
            }
        }
    }

    Ok(())
}

/// Probe a single file and return structured info.
fn inspect_file(path: &Path) -> anyhow::Result<ImageInfoDisplay> {
    let file_size = std::fs::metadata(path)?.len();
    let info = zenbound::probe_file(path)?;
    let display = info.display_size();

    Ok(ImageInfoDisplay {
        path: path.display().to_string(),
        format: info.format.to_string(),
        mime_type: info.format.mime_type().to_string(),
        width: info.width,
        height: info.height,
        display_width: display.width,
        display_height: display.height,
        pixels: info.size().pixels(),
        has_alpha: info.has_alpha,
        bit_depth: info.bit_depth,
        channel_count: info.channels,
        orientation: info.orientation.unwrap_or(1),
        file_size,
    })
}

#[derive(Debug, Serialize)]
struct ImageInfoDisplay {
    path: String,
    format: String,
    mime_type: String,
    width: u32,
    height: u32,
    display_width: u32,
    display_height: u32,
    pixels: u64,
    has_alpha: bool,
    bit_depth: Option<u8>,
    channel_count: Option<u8>,
    orientation: u8,
    file_size: u64,
}

fn print_info(info: &ImageInfoDisplay) {
    println!("  Format:       {} ({})", info.format, info.mime_type);
    println!("  Dimensions:   {}x{} ({} pixels)", info.width, info.height, info.pixels);
    if info.display_width != info.width || info.display_height != info.height {
        println!(
            "  Display:      {}x{} (orientation: {})",
            info.display_width, info.display_height, info.orientation
        );
    } else if info.orientation != 1 {
        println!("  Orientation:  {}", info.orientation);
    }
    if let Some(depth) = info.bit_depth {
        print!("  Bit depth:    {}", depth);
        if let Some(ch) = info.channel_count {
            print!(" x {} channels", ch);
        }
        println!();
    }
    println!(
        "  Alpha:        {}",
        if info.has_alpha { "yes" } else { "no" }
    );
    println!("  File size:    {}", batch::format_size(info.file_size));
}
