use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

pub fn progress_bar(len: u64, show: bool) -> Result<Option<ProgressBar>> {
    if !show {
        return Ok(None);
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
            )?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}

pub fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
