// imgshrink/src/utils/mod.rs
use std::time::Duration;

/// `3725.4s` -> `1h 02m 05s`. Sub-second precision is dropped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

pub fn plural_suffix(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}
