//! cbg-cli - Command-line interface for cbglib
//!
//! Decodes CompressedBG images to raw pixel buffers and reports header details.

use cbglib::{
    CbgDecoder, CbgHeader, DecodeOptions, DecodedImage, PixelFormat, Scheduling, HEADER_SIZE,
};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cbg-cli")]
#[command(about = "A CLI tool for decoding CompressedBG images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Clone, Copy)]
struct DecodeArgs {
    /// Decode bands on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads for band decoding
    #[arg(short, long, default_value_t = num_cpus::get())]
    jobs: usize,

    /// Convert the output to packed 24-bit BGR
    #[arg(long)]
    bgr24: bool,
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        if self.sequential {
            DecodeOptions::new().with_scheduling(Scheduling::Sequential)
        } else {
            DecodeOptions::new().with_threads(self.jobs.max(1))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an image to a raw pixel file
    Decode {
        /// Input CompressedBG file
        input: PathBuf,

        /// Output raw pixel file
        output: PathBuf,

        #[command(flatten)]
        args: DecodeArgs,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Decode several images into a directory
    Batch {
        /// Input CompressedBG files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory receiving `<name>.raw` files
        #[arg(short, long)]
        out_dir: PathBuf,

        #[command(flatten)]
        args: DecodeArgs,
    },

    /// Show header information
    Info {
        /// CompressedBG file to analyze
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            args,
            force,
        } => decode_file(&input, &output, args, force, cli.verbose, cli.quiet),
        Commands::Batch {
            inputs,
            out_dir,
            args,
        } => decode_batch(&inputs, &out_dir, args, cli.quiet),
        Commands::Info { input } => show_file_info(&input, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn format_name(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Gray8 => "8-bit grayscale",
        PixelFormat::Bgr565 => "16-bit BGR 5:6:5",
        PixelFormat::Bgr24 => "24-bit BGR",
        PixelFormat::Bgr32 => "32-bit BGR",
        PixelFormat::Bgra32 => "32-bit BGRA",
    }
}

fn render(image: &DecodedImage, bgr24: bool) -> Vec<u8> {
    if bgr24 {
        image.to_bgr24()
    } else {
        image.pixels.clone()
    }
}

fn decode_file(
    input: &Path,
    output: &Path,
    args: DecodeArgs,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    // Check if output file exists and force flag
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    if verbose {
        println!("Decoding '{}' to '{}'", input.display(), output.display());
    }

    let start_time = Instant::now();
    let data = fs::read(input)?;
    let image = CbgDecoder::new(args.options())
        .decode(&data)
        .map_err(|e| format!("Decoding failed: {}", e))?;

    let pixels = render(&image, args.bgr24);
    fs::write(output, &pixels)?;

    if !quiet {
        println!("✓ Decoding successful!");
        println!("  Size:   {}x{}", image.width, image.height);
        if args.bgr24 {
            println!("  Format: 24-bit BGR (converted), stride {}", image.width * 3);
        } else {
            println!(
                "  Format: {}, stride {}",
                format_name(image.format),
                image.stride
            );
        }
        println!("  Output: {} bytes", pixels.len());
        println!("  Time:   {:.2?}", start_time.elapsed());
    }

    Ok(())
}

fn decode_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    args: DecodeArgs,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(out_dir)?;
    let decoder = CbgDecoder::new(args.options());

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    };

    let mut failures = 0usize;
    let mut skipped = 0usize;
    for input in inputs {
        progress.set_message(input.display().to_string());
        let data = fs::read(input)?;
        match decoder.try_decode(&data) {
            Ok(Some(image)) => {
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                fs::write(
                    out_dir.join(format!("{stem}.raw")),
                    render(&image, args.bgr24),
                )?;
            }
            Ok(None) => skipped += 1,
            Err(e) => {
                failures += 1;
                progress.println(format!("✗ {}: {}", input.display(), e));
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("Batch complete");

    if !quiet {
        println!(
            "Decoded {} of {} files ({} not CompressedBG, {} failed)",
            inputs.len() - failures - skipped,
            inputs.len(),
            skipped,
            failures
        );
    }

    if failures > 0 {
        return Err(format!("{failures} file(s) failed to decode").into());
    }
    Ok(())
}

fn show_file_info(input: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let data = fs::read(input)?;
    let header = CbgHeader::parse(&data)?;

    println!("CompressedBG File Information:");
    println!("  File: {}", input.display());
    println!("  Size: {} bytes", data.len());
    println!("  Dimensions: {}x{}", header.width, header.height);
    println!("  Bits per pixel: {}", header.bpp);
    println!(
        "  Version: {} ({:?})",
        header.version,
        header.format_version()?
    );
    println!("  Control block: {} bytes", header.enc_length);

    if verbose {
        println!("  Key: {:08x}", header.key);
        println!(
            "  Checksums: sum {:02x}, xor {:02x}",
            header.check_sum, header.check_xor
        );
        println!("  Intermediate length: {}", header.intermediate_length);
        println!("  Body: {} bytes", data.len() - HEADER_SIZE);
    }

    match CbgDecoder::default().decode(&data) {
        Ok(image) => {
            println!(
                "  Output: {} ({}), stride {}",
                format_name(image.format),
                image.format.bits_per_pixel(),
                image.stride
            );
            println!("  Status: ✓ Valid CompressedBG file");
        }
        Err(e) => {
            println!("  Status: ✗ Invalid or corrupted CompressedBG file");
            if verbose {
                println!("  Error: {}", e);
            }
        }
    }

    Ok(())
}
