/// Formats elapsed whole seconds as `H:MM:SS`.
///
/// Hours are not zero-padded, matching elapsed-time display conventions
/// (`0:00:07`, `1:02:03`, `12:00:00`).
pub fn format_timecode(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0:00:00")]
    #[case(1, "0:00:01")]
    #[case(59, "0:00:59")]
    #[case(60, "0:01:00")]
    #[case(3599, "0:59:59")]
    #[case(3600, "1:00:00")]
    #[case(3661, "1:01:01")]
    #[case(43_200, "12:00:00")]
    fn test_format(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(format_timecode(secs), expected);
    }
}
