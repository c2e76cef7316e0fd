use anyhow::{Context, Result};
use fllr::structs::header::parse_header;

use super::command::{InfoArgs, InfoFormat};
use super::report::StreamSummary;
use crate::input::InputReader;

pub fn cmd_info(args: &InfoArgs) -> Result<()> {
    log::info!("Reading capture header: {}", args.input.display());

    let mut input_reader = InputReader::new(&args.input)
        .with_context(|| format!("failed to open '{}'", args.input.display()))?;
    let params = parse_header(&mut input_reader)
        .with_context(|| format!("failed to read header of '{}'", args.input.display()))?;

    let summary = StreamSummary::from(&params);

    match args.format {
        InfoFormat::Plain => print!("{}", format_plain(&summary)),
        InfoFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&summary)?),
    }

    Ok(())
}

fn format_plain(summary: &StreamSummary) -> String {
    format!(
        "Channels:          {}\n\
         Sample rate:       {} Hz\n\
         Bits per sample:   {}\n\
         Filler bytes:      {}\n\
         Declared data:     {} bytes\n\
         Declared duration: {}\n",
        summary.channels,
        summary.sample_rate,
        summary.bits_per_sample,
        summary.filler_bytes,
        summary.declared_data_bytes,
        summary.declared_duration,
    )
}

#[test]
fn test_format_plain() {
    let mut params = fllr::StreamParameters::new(2, 44100, 16);
    params.filler_len = 4052;
    params.data_size = 176_400 * 90;

    let text = format_plain(&StreamSummary::from(&params));
    assert!(text.contains("Sample rate:       44100 Hz"));
    assert!(text.contains("Filler bytes:      4052"));
    assert!(text.contains("Declared duration: 00:01:30.000"));
}
