use chrono::Utc;
use std::env;

/// Milliseconds since the Unix epoch, the unit the index stores timestamps in.
pub fn now_epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn env_flag(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => parse_flag(&v).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "on" => Some(true),
        "0" | "false" | "FALSE" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(now_epoch_millis() > 1_577_836_800_000);
    }
}
