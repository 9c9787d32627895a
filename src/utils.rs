use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use std::path::Path;

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// 12-hour clock, e.g. `9:05 PM`.
pub fn format_time(at: NaiveDateTime) -> String {
    let (pm, hour) = at.hour12();
    format!("{}:{:02} {}", hour, at.minute(), if pm { "PM" } else { "AM" })
}

pub fn date_key(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Label for a date separator, relative to `today` on calendar-day boundaries.
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => date.format("%-d %b %Y").to_string(),
    }
}

/// `mm:ss`, minutes are not wrapped into hours.
pub fn format_duration(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

/// Reads an image file into a `data:` URL so it can live inside a transcript.
pub fn image_data_url(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("data:{};base64,{}", image_mime(path), STANDARD.encode(bytes)))
}
