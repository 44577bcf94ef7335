/// Units for [`format_memory`], one step per factor of 1024.
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count in whole units, truncating at each step.
pub fn format_memory(bytes: u64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 && unit < UNITS.len() - 1 {
        value >>= 10;
        unit += 1;
    }
    format!("{} {}", value, UNITS[unit])
}
