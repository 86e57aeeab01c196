const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Render a byte count for progress messages.
///
/// A unit is used only once the size is strictly larger than it, so
/// exactly 1024 bytes is still shown as bytes.
pub fn format_size(bytes: u64) -> String {
    if bytes > GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes > MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes > KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
