use chrono::{Local, TimeZone};

//Renders epoch seconds in the local timezone, falls back to the raw number if out of range
pub(crate) fn format_timestamp(epoch_secs: i64) -> String {
    match Local.timestamp_opt(epoch_secs, 0).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_secs.to_string(),
    }
}

//Renders a number of seconds as `H:MM:SS`, with a leading day count when over a day
pub(crate) fn format_duration(total_secs: i64) -> String {
    let sign = if total_secs < 0 { "-" } else { "" };
    let total_secs = total_secs.unsigned_abs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    match days {
        0 => format!("{sign}{hours}:{minutes:02}:{seconds:02}"),
        1 => format!("{sign}1 day, {hours}:{minutes:02}:{seconds:02}"),
        _ => format!("{sign}{days} days, {hours}:{minutes:02}:{seconds:02}"),
    }
}
