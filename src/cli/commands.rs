// CLI command implementations
use super::config::{Commands, Config};
use super::output::OutputFormatter;

use anyhow::{bail, Context};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tagscan::AnyTag;

/// Run the selected subcommand
pub fn run(config: &Config) -> anyhow::Result<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Read { files, output } => command_read(files, output.as_deref(), &formatter),
        Commands::Detect { files } => command_detect(files, &formatter),
        Commands::Info { files } => command_info(files, &formatter),
        Commands::Batch { directory, pattern } => command_batch(directory, pattern, &formatter),
        Commands::ExportImages { file, output } => command_export_images(file, output, &formatter),
    }
}

fn open(path: &Path) -> anyhow::Result<AnyTag> {
    tagscan::read_from_path(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Serialize a fully loaded tag, with the file path and format added
fn tag_record(path: &Path, file: &AnyTag) -> anyhow::Result<Value> {
    let mut record = serde_json::to_value(file.tag())?;
    if let Value::Object(map) = &mut record {
        map.insert("file".to_string(), Value::from(path.display().to_string()));
        map.insert("format".to_string(), Value::from(file.format_name()));
        map.insert("images".to_string(), Value::from(file.tag().images().len()));
    }
    Ok(record)
}

/// Read metadata from files
fn command_read(files: &[PathBuf], output: Option<&Path>, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    let mut failures = 0;
    for path in files {
        let mut file = match open(path) {
            Ok(file) => file,
            Err(e) => {
                formatter.print_error(&format!("{e:#}"));
                failures += 1;
                continue;
            }
        };

        file.load_fully();
        formatter.output_value(&tag_record(path, &file)?, &mut writer)?;
    }
    writer.flush()?;

    if failures == files.len() {
        bail!("No file could be read");
    }
    Ok(())
}

/// Detect file format
fn command_detect(files: &[PathBuf], formatter: &OutputFormatter) -> anyhow::Result<()> {
    for path in files {
        match tagscan::read_from_path(path) {
            Ok(file) => println!("{}: {}", path.display(), file.format_name()),
            Err(tagscan::Error::UnsupportedFormat(_)) => println!("{}: unknown", path.display()),
            Err(e) => formatter.print_error(&format!("{}: {e}", path.display())),
        }
    }

    Ok(())
}

/// Show file and audio properties
fn command_info(files: &[PathBuf], formatter: &OutputFormatter) -> anyhow::Result<()> {
    for path in files {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                formatter.print_error(&format!("{}: {e}", path.display()));
                continue;
            }
        };

        println!("\n📁 {}", path.display());
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", metadata.len());
        if let Ok(modified) = metadata.modified() {
            let modified = chrono::DateTime::<chrono::Local>::from(modified);
            println!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }

        let mut file = match tagscan::read_from_path(path) {
            Ok(file) => file,
            Err(e) => {
                println!("Format: Unknown ({e})");
                continue;
            }
        };
        file.load_fully();

        let tag = file.tag();
        println!("Format: {}", file.format_name());
        if let Some(duration) = tag.duration() {
            println!("Duration: {duration:.2} s");
        }
        if let Some(bitrate) = tag.bitrate() {
            println!("Bitrate: {bitrate} kbps");
        }
        if let Some(sample_rate) = tag.sample_rate() {
            println!("Sample rate: {sample_rate} Hz");
        }
        if let Some(bit_depth) = tag.bit_depth() {
            println!("Bit depth: {bit_depth} bits");
        }
        println!("Images: {}", tag.images().len());
    }

    Ok(())
}

/// Read every file matching `pattern` under `directory`
fn command_batch(directory: &Path, pattern: &str, formatter: &OutputFormatter) -> anyhow::Result<()> {
    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        directory.join(pattern)
    } else {
        directory.join("**").join(pattern)
    };
    let glob_pattern = glob_pattern.to_string_lossy();

    let mut files = Vec::new();
    for entry in glob::glob(&glob_pattern).with_context(|| format!("Invalid glob pattern: {glob_pattern}"))? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {e}")),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("Processing {} files...", files.len()));

    let mut success_count = 0;
    let mut error_count = 0;
    for path in &files {
        match open(path) {
            Ok(mut file) => {
                file.load_fully();
                log::debug!("{}: {}", path.display(), file.format_name());
                formatter.print_success(&path.display().to_string());
                success_count += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{e:#}"));
                error_count += 1;
            }
        }
    }

    formatter.print_info(&format!("Completed: {success_count} successful, {error_count} errors"));
    Ok(())
}

/// Write each embedded image to `output_dir`
fn command_export_images(file: &Path, output_dir: &Path, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let tag_file = open(file)?;
    let images = tag_file.tag().images();
    if images.is_empty() {
        formatter.print_info(&format!("{} has no embedded images", file.display()));
        return Ok(());
    }

    fs::create_dir_all(output_dir).with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    for (index, image) in images.iter().enumerate() {
        let target = output_dir.join(format!("{stem}-{}.{}", index + 1, image.extension()));
        fs::write(&target, &image.data).with_context(|| format!("Failed to write {}", target.display()))?;
        formatter.print_success(&format!("{} ({}, {})", target.display(), image.picture_type.as_str(), image.mime_type));
    }

    Ok(())
}
