//! Display formatting helpers

/// Render seconds as `MM:SS`; minutes keep growing past 99
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(75), "01:15");
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(1200), "20:00");
        assert_eq!(format_mm_ss(6001), "100:01");
    }
}
