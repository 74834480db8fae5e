//! Field validators shared by request payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use validator::ValidationError;

use crate::domain::is_valid_otp_format;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern compiles"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Exactly six ASCII digits.
pub fn validate_otp_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_otp_format(code) {
        Ok(())
    } else {
        Err(error("otp_code", "Code must be 6 digits"))
    }
}

/// `#RRGGBB`
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(error("hex_color", "Color must be a hex value like #4F46E5"))
    }
}

/// Absolute http(s) URL with a host.
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(error("url", "Must be a valid http(s) URL")),
    }
}
