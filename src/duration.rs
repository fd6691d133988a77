//! Duration tokens to step counts.
//!
//! An ABC duration suffix is relative to the base note length (`L:`):
//! `2` doubles it, `/` halves it, `//` quarters it, `3/2` multiplies by one and a
//! half. Results are rounded to whole steps and never drop below one step.

/// Resolve a duration suffix against the base step length.
///
/// Broken-rhythm markers (`>`/`<`) are stripped and have no effect. Anything
/// that does not parse falls back to `base_steps`.
///
/// ```
/// use score_engine::resolve_duration;
///
/// assert_eq!(resolve_duration("", 2), 2);
/// assert_eq!(resolve_duration("3", 2), 6);
/// assert_eq!(resolve_duration("/", 2), 1);
/// assert_eq!(resolve_duration("3/2", 2), 3);
/// assert_eq!(resolve_duration("//", 2), 1); // 0.5 rounds up, never below 1
/// ```
pub fn resolve_duration(token: &str, base_steps: u32) -> u32 {
    let base = base_steps.max(1);
    if token.is_empty() {
        return base;
    }

    let token: String = token.chars().filter(|&c| c != '>' && c != '<').collect();
    if token.is_empty() {
        return base;
    }

    // "/", "//", "///" ...
    if token.chars().all(|c| c == '/') {
        let divisor = 2f64.powi(token.len() as i32);
        return round_steps(base as f64 / divisor);
    }

    if let Some(slash) = token.find('/') {
        let (num_part, den_part) = (&token[..slash], &token[slash + 1..]);

        let numerator = if num_part.is_empty() {
            Some(1)
        } else {
            parse_digits(num_part)
        };

        let denominator = if den_part.is_empty() {
            Some(2)
        } else if den_part.chars().all(|c| c == '/') {
            // "3//" is 3/4: every extra slash halves again
            Some(2u32.saturating_pow(den_part.len() as u32 + 1))
        } else {
            parse_digits(den_part)
        };

        return match (numerator, denominator) {
            (Some(num), Some(den)) if den > 0 => round_steps(base as f64 * num as f64 / den as f64),
            _ => base,
        };
    }

    match parse_digits(&token) {
        Some(n) if n > 0 => base.saturating_mul(n),
        _ => base,
    }
}

/// Parse a fraction like `1/8` (used by `L:` and `Q:`).
pub fn parse_fraction(s: &str) -> Option<(u32, u32)> {
    let (num, den) = s.trim().split_once('/')?;
    let num = parse_digits(num.trim())?;
    let den = parse_digits(den.trim())?;
    if num == 0 || den == 0 {
        return None;
    }
    Some((num, den))
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn round_steps(value: f64) -> u32 {
    (value.round() as u32).max(1)
}
