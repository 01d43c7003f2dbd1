//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge upstream error bodies.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

/// Round half towards positive infinity (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(x: f64) -> i64 {
  (x + 0.5).floor() as i64
}

// Slack for binary float noise, e.g. 2.3 * 100.0 == 229.99999999999997.
const CENT_EPSILON: f64 = 1e-9;

/// Largest multiple of 0.01 not above `x`.
pub fn floor_to_cents(x: f64) -> f64 {
  (x * 100.0 + CENT_EPSILON).floor() / 100.0
}

/// Smallest multiple of 0.01 not below `x`.
pub fn ceil_to_cents(x: f64) -> f64 {
  (x * 100.0 - CENT_EPSILON).ceil() / 100.0
}
