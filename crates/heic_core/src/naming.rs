/// Extension every converted output is saved under.
pub const TARGET_EXTENSION: &str = "jpg";

/// Swaps the trailing extension of `source_name` for `.jpg`.
///
/// Only a final `.ext` whose tail contains neither `.` nor `/` is stripped, so
/// `photo.tar.heic` becomes `photo.tar.jpg` and `notes` becomes `notes.jpg`.
pub fn download_name(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(dot) if dot + 1 < source_name.len() && !source_name[dot + 1..].contains('/') => {
            &source_name[..dot]
        }
        _ => source_name,
    };
    format!("{stem}.{TARGET_EXTENSION}")
}

/// Formats a byte count with one decimal, e.g. `1.5 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{rounded:.1} {}", UNITS[unit])
    }
}
