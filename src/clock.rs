/// 10進数の時間を`H:MM:00`形式の文字列に変換する。
///
/// 端数は分単位に四捨五入し、60分に達した場合は時間に繰り上げる。
/// 秒は常に`00`となる。負の値には先頭に`-`を付ける。
///
/// # Examples
///
/// ```
/// assert_eq!(hours_to_clock(1.5), "1:30:00");
/// assert_eq!(hours_to_clock(-2.25), "-2:15:00");
/// ```
pub fn hours_to_clock(hours: f64) -> String {
    let sign = if hours < 0.0 { "-" } else { "" };
    let abs = hours.abs();

    let mut whole_hours = abs.trunc() as u64;
    let mut minutes = ((abs - abs.trunc()) * 60.0).round() as u64;
    if minutes == 60 {
        whole_hours += 1;
        minutes = 0;
    }

    format!("{}{}:{:02}:00", sign, whole_hours, minutes)
}

/// `H:MM:SS`形式の文字列を分に変換する。
#[cfg(test)]
pub fn clock_to_minutes(clock: &str) -> i64 {
    let (sign, body) = match clock.strip_prefix('-') {
        Some(body) => (-1, body),
        None => (1, clock),
    };
    let parts: Vec<i64> = body.split(':').map(|p| p.parse().unwrap()).collect();
    sign * (parts[0] * 60 + parts[1])
}
