//! Configuration module
//!
//! Client and capture settings, read from the environment (with `.env` support).

use std::env;
use std::str::FromStr;

const DEFAULT_API_URL: &str = "http://localhost:3001/api";
const HTTP_TIMEOUT_SECS: u64 = 60;
const MAX_UPLOAD_MB: u64 = 100;

const CAPTURE_WIDTH: u32 = 1280;
const CAPTURE_HEIGHT: u32 = 720;
const JPEG_QUALITY: u8 = 92;
const VIDEO_BITS_PER_SECOND: u32 = 2_500_000;
const RECORDER_TIMESLICE_MS: u64 = 1000;

/// Parse an env var, falling back to `default` when it is unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Settings for talking to the inventory backend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Bearer token; requests are sent unauthenticated when absent.
    pub auth_token: Option<String>,
    pub http_timeout_secs: u64,
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            max_upload_bytes: MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ClientConfig {
    /// LOTMEDIA_API_URL (or API_URL), LOTMEDIA_API_TOKEN (or AUTH_TOKEN),
    /// LOTMEDIA_HTTP_TIMEOUT_SECS, LOTMEDIA_MAX_UPLOAD_MB.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("LOTMEDIA_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let auth_token = env::var("LOTMEDIA_API_TOKEN")
            .or_else(|_| env::var("AUTH_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        let config = Self {
            api_url,
            auth_token,
            http_timeout_secs: env_or("LOTMEDIA_HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS),
            max_upload_bytes: env_or("LOTMEDIA_MAX_UPLOAD_MB", MAX_UPLOAD_MB) * 1024 * 1024,
        };
        config.validate()?;
        tracing::debug!(
            api_url = %config.api_url,
            authenticated = config.auth_token.is_some(),
            timeout_secs = config.http_timeout_secs,
            "Client configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "API URL must start with http:// or https://, got {}",
                self.api_url
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be greater than zero"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Max upload size must be greater than zero"));
        }
        Ok(())
    }
}

/// Settings for camera capture.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Ideal stream width requested from the device
    pub ideal_width: u32,
    /// Ideal stream height requested from the device
    pub ideal_height: u32,
    /// JPEG quality for stills (0-100)
    pub jpeg_quality: u8,
    pub video_bits_per_second: u32,
    /// How often the recorder is expected to hand over a chunk
    pub timeslice_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ideal_width: CAPTURE_WIDTH,
            ideal_height: CAPTURE_HEIGHT,
            jpeg_quality: JPEG_QUALITY,
            video_bits_per_second: VIDEO_BITS_PER_SECOND,
            timeslice_ms: RECORDER_TIMESLICE_MS,
        }
    }
}

impl CaptureConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            ideal_width: env_or("LOTMEDIA_CAPTURE_WIDTH", CAPTURE_WIDTH),
            ideal_height: env_or("LOTMEDIA_CAPTURE_HEIGHT", CAPTURE_HEIGHT),
            jpeg_quality: env_or("LOTMEDIA_CAPTURE_JPEG_QUALITY", JPEG_QUALITY).min(100),
            video_bits_per_second: env_or("LOTMEDIA_CAPTURE_VIDEO_BITRATE", VIDEO_BITS_PER_SECOND),
            timeslice_ms: RECORDER_TIMESLICE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:3001/api");
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert!(config.auth_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_rejects_bad_url() {
        let config = ClientConfig {
            api_url: "localhost:3001".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_rejects_zero_timeout() {
        let config = ClientConfig {
            http_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_capture_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!((config.ideal_width, config.ideal_height), (1280, 720));
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.video_bits_per_second, 2_500_000);
        assert_eq!(config.timeslice_ms, 1000);
    }
}
