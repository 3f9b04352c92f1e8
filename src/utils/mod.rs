const MAX_FILENAME_LEN: usize = 50;

/// Formats a length in seconds as `M:SS`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Abbreviates a view count, e.g. `1500000` -> `1.5M views`.
pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{}M views", one_decimal(views, 1_000_000))
    } else if views >= 1_000 {
        format!("{}K views", one_decimal(views, 1_000))
    } else {
        format!("{views} views")
    }
}

// Integer division to one decimal place, ties rounded up.
fn one_decimal(value: u64, divisor: u64) -> String {
    let tenths = (u128::from(value) * 10 + u128::from(divisor) / 2) / u128::from(divisor);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Turns a video title into something safe to put in a `Content-Disposition`
/// filename: only ASCII word characters survive, whitespace runs become a
/// single underscore and the result is capped at 50 characters.
pub fn clean_filename(name: &str) -> String {
    let mut result = String::new();
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            in_whitespace = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if in_whitespace {
                result.push('_');
                in_whitespace = false;
            }
            result.push(c);
        }
    }

    if in_whitespace {
        result.push('_');
    }

    result.chars().take(MAX_FILENAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(3600), "60:00");
    }

    #[test]
    fn test_format_views() {
        assert_eq!(format_views(0), "0 views");
        assert_eq!(format_views(42), "42 views");
        assert_eq!(format_views(999), "999 views");
        assert_eq!(format_views(1000), "1.0K views");
        assert_eq!(format_views(2500), "2.5K views");
        assert_eq!(format_views(1500000), "1.5M views");
        assert_eq!(format_views(1250000), "1.3M views");
        assert_eq!(format_views(999950), "1000.0K views");
        assert_eq!(format_views(1234567890), "1234.6M views");
    }

    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename("Hello, World! @2024"), "Hello_World_2024");
        assert_eq!(clean_filename("snake_case stays"), "snake_case_stays");
        assert_eq!(clean_filename("tabs\t\tand  spaces"), "tabs_and_spaces");
        assert_eq!(clean_filename(" padded "), "_padded_");
        assert_eq!(clean_filename("Café — déjà vu"), "Caf_dj_vu");
        assert_eq!(clean_filename("!!!"), "");
    }

    #[test]
    fn test_clean_filename_truncates() {
        let long = "a".repeat(80);
        assert_eq!(clean_filename(&long).len(), 50);

        let words = "word ".repeat(20);
        let cleaned = clean_filename(&words);
        assert_eq!(cleaned.len(), 50);
        assert!(cleaned.starts_with("word_word_"));
    }
}
