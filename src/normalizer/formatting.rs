//! Human readable durations and sizes

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// `HH:MM:SS` when there is at least one hour, `MM:SS` otherwise
pub fn format_duration(seconds: Option<u64>) -> String {
    let seconds = match seconds {
        Some(s) if s > 0 => s,
        _ => return "Unknown".to_string(),
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Binary units with one decimal; TB is terminal
pub fn format_filesize(size: Option<u64>) -> String {
    let mut size = match size {
        Some(s) if s > 0 => s as f64,
        _ => return "Unknown".to_string(),
    };

    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}
