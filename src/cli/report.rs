use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use fllr::{OutputManifest, StreamParameters};
use serde::Serialize;

use crate::timestamp::time_str;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSummary {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub filler_bytes: u16,
    pub declared_data_bytes: u32,
    pub declared_duration: String,
}

impl From<&StreamParameters> for StreamSummary {
    fn from(params: &StreamParameters) -> Self {
        Self {
            channels: params.channels,
            sample_rate: params.sample_rate,
            bits_per_sample: params.bits_per_sample,
            filler_bytes: params.filler_len,
            declared_data_bytes: params.data_size,
            declared_duration: time_str(params.declared_duration()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub input: String,
    pub stream: StreamSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_interval_seconds: Option<u32>,
    pub bytes_read: u64,
    pub duration: String,
    pub outputs: Vec<String>,
}

impl ConversionReport {
    pub fn new(
        input: &Path,
        params: &StreamParameters,
        split_interval_seconds: u32,
        bytes_read: u64,
        manifest: &OutputManifest,
    ) -> Self {
        Self {
            input: input.display().to_string(),
            stream: params.into(),
            split_interval_seconds: (split_interval_seconds > 0).then_some(split_interval_seconds),
            bytes_read,
            duration: time_str(fllr::utils::timing::elapsed_seconds(bytes_read, params)),
            outputs: manifest
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        }
    }
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_yaml_ng::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
