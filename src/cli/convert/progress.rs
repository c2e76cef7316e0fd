use anyhow::Result;
use fllr::StreamParameters;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {bytes}/{total_bytes} ({percent}%)\n{msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {bytes}\n{msg} | elapsed: {elapsed_precise}";

pub fn create_progress_bar(multi: &MultiProgress) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template(SPINNER_TEMPLATE)?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("reading header");
    Ok(pb)
}

/// Switches to a bounded bar when the header declares the data size.
pub fn start_progress_bar(pb: &ProgressBar, params: &StreamParameters) {
    if params.data_size > 0 {
        pb.set_length(u64::from(params.data_size));
        pb.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
    }
    pb.set_message(format!(
        "{} ch | {} Hz | {} bit",
        params.channels, params.sample_rate, params.bits_per_sample
    ));
}

pub fn finalize_progress_bar(
    pb: &ProgressBar,
    params: Option<&StreamParameters>,
    bytes_read: u64,
    segments: usize,
    start_time: std::time::Instant,
) {
    let Some(params) = params else {
        pb.finish_with_message("no stream");
        return;
    };

    let audio_duration_secs = fllr::utils::timing::elapsed_seconds(bytes_read, params);
    let elapsed = start_time.elapsed().as_secs_f64();
    let realtime_multiplier = if elapsed > 0.0 {
        audio_duration_secs / elapsed
    } else {
        0.0
    };
    let final_time_str = crate::timestamp::time_str(audio_duration_secs);

    pb.finish_with_message(format!(
        "speed: {realtime_multiplier:.1}x | timestamp: {final_time_str} | files: {segments}"
    ));
}
