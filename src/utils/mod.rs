pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
pub const GAME_ASPECT_RATIO: f64 = 4.0 / 2.2;
// space reserved around the game container for the header and side panel
pub const GAME_MARGIN: (f64, f64) = (500.0, 260.0);

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL
}

/// Reads the longest numeric prefix of `text`, like the browser's `parseFloat`.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        let value = f64::INFINITY;
        return Some(if bytes[0] == b'-' { -value } else { value });
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    text[..end].parse::<f64>().ok()
}

/// Formats a number the way the page displays it (`2`, `0.01`, `NaN`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{}", value)
    }
}

/// Largest box with the game's aspect ratio that fits in `width` x `height`.
pub fn fit_aspect(width: f64, height: f64, ratio: f64) -> (f64, f64) {
    if height <= 0.0 {
        return (0.0, 0.0);
    }
    if width / height > ratio {
        (height * ratio, height)
    } else {
        (width, width / ratio)
    }
}

pub fn game_container_size(window_width: f64, window_height: f64) -> (f64, f64) {
    let (width, height) = fit_aspect(window_width, window_height, GAME_ASPECT_RATIO);
    (
        (width - GAME_MARGIN.0).max(0.0),
        (height - GAME_MARGIN.1).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_takes_numeric_prefix() {
        assert_eq!(parse_float("2.0"), Some(2.0));
        assert_eq!(parse_float("  1.5 SOL"), Some(1.5));
        assert_eq!(parse_float("-.25"), Some(-0.25));
        assert_eq!(parse_float("3e2x"), Some(300.0));
        assert_eq!(parse_float("7e"), Some(7.0));
        assert_eq!(parse_float("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn parse_float_rejects_non_numbers() {
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("SOL"), None);
        assert_eq!(parse_float("-"), None);
    }

    #[test]
    fn balance_is_shown_in_sol() {
        assert_eq!(format_number(lamports_to_sol(2_000_000_000)), "2");
        assert_eq!(format_number(lamports_to_sol(10_000_000)), "0.01");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn wide_windows_are_limited_by_height() {
        let (w, h) = fit_aspect(2000.0, 550.0, GAME_ASPECT_RATIO);
        assert!((w - 1000.0).abs() < 1e-9);
        assert_eq!(h, 550.0);
    }

    #[test]
    fn tall_windows_are_limited_by_width() {
        let (w, h) = fit_aspect(400.0, 1000.0, GAME_ASPECT_RATIO);
        assert_eq!(w, 400.0);
        assert!((h - 220.0).abs() < 1e-9);
    }

    #[test]
    fn container_never_goes_negative() {
        assert_eq!(game_container_size(300.0, 200.0), (0.0, 0.0));
    }
}
