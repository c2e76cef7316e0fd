use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use fllr::process::encode::FlacSessionFactory;
use fllr::{ConvertEvent, ConvertOptions, StreamParameters, convert_with};
use indicatif::MultiProgress;
use log::Level;

use super::progress::{create_progress_bar, finalize_progress_bar, start_progress_bar};
use crate::cli::command::{Cli, ConvertArgs};
use crate::cli::report::{ConversionReport, write_yaml};
use crate::input::{InputReader, is_pipe_path};

pub fn cmd_convert(args: &ConvertArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let output_base = resolve_output_base(&args.input, args.output_path.as_deref())?;

    log::info!(
        "Converting FLLR capture: {} -> {} (split: {}s, strict mode: {})",
        args.input.display(),
        output_base.display(),
        args.split,
        cli.strict
    );

    let mut input_reader = InputReader::new(&args.input)
        .with_context(|| format!("failed to open '{}'", args.input.display()))?;

    let pb = multi.map(create_progress_bar).transpose()?;

    // Configure fail level based on strict mode
    let fail_level = if cli.strict {
        Level::Warn
    } else {
        Level::Error
    };
    let options = ConvertOptions {
        split_interval_seconds: args.split,
        block_frames: args.block_frames,
        fail_level,
    };
    let factory = match args.flac_block_size {
        Some(block_size) => FlacSessionFactory::with_block_size(block_size),
        None => FlacSessionFactory::default(),
    };

    let start_time = Instant::now();
    let mut params: Option<StreamParameters> = None;
    let mut bytes_read = 0u64;

    let result = convert_with(&mut input_reader, &output_base, options, factory, |event| {
        match event {
            ConvertEvent::Started { params: p } => {
                params = Some(*p);
                if let Some(pb) = &pb {
                    start_progress_bar(pb, p);
                }
            }
            ConvertEvent::SegmentOpened { index, path } => {
                if let Some(pb) = &pb {
                    pb.set_message(format!("segment {index}: {}", path.display()));
                }
            }
            ConvertEvent::Progress { bytes_read: n } => {
                bytes_read = n;
                if let Some(pb) = &pb {
                    pb.set_position(n);
                }
            }
            ConvertEvent::SegmentClosed { index, path } => {
                log::debug!("Closed segment {index}: {}", path.display());
            }
        }
    });

    let manifest = match result {
        Ok(manifest) => manifest,
        Err(e) => {
            if let Some(pb) = &pb {
                pb.finish_with_message("conversion failed");
            }
            return Err(e).with_context(|| format!("failed to convert '{}'", args.input.display()));
        }
    };

    if let Some(pb) = &pb {
        finalize_progress_bar(pb, params.as_ref(), bytes_read, manifest.len(), start_time);
    }

    let mut stdout = std::io::stdout().lock();
    for path in &manifest {
        writeln!(stdout, "{}", path.display())?;
    }

    if let Some(report_path) = &args.manifest {
        let params = params.ok_or_else(|| anyhow!("conversion finished without stream parameters"))?;
        let report = ConversionReport::new(&args.input, &params, args.split, bytes_read, &manifest);
        write_yaml(report_path, &report)?;
        log::info!("Wrote report to {}", report_path.display());
    }

    log::info!("Conversion completed successfully");
    Ok(())
}

/// Output base path: the explicit one, or the input path without extension.
fn resolve_output_base(input: &Path, output_path: Option<&Path>) -> Result<PathBuf> {
    match output_path {
        Some(path) => Ok(path.to_path_buf()),
        None if is_pipe_path(input) => Err(anyhow!(
            "--output-path is required when reading from stdin"
        )),
        None => Ok(input.with_extension("")),
    }
}
