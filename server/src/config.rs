use anyhow::Context;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    /// Root URL of the Nextcloud instance hosting the album
    pub nextcloud_url: String,
    pub username: String,
    pub password: String,
    pub album: String,
    pub resize_width: u32,
    pub resize_height: u32,
    pub listen_host: String,
    pub listing_port: u16,
    pub random_port: u16,
    pub remote_timeout: Duration,
    /// Upper bound for a single fetched image body
    pub max_image_bytes: u64,
    pub jpeg_quality: u8,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let resize_width: u32 = parse_required("RESIZE_WIDTH")?;
        let resize_height: u32 = parse_required("RESIZE_HEIGHT")?;
        if resize_width == 0 || resize_height == 0 {
            anyhow::bail!("RESIZE_WIDTH and RESIZE_HEIGHT must be greater than zero");
        }

        let jpeg_quality: u8 = parse_or("JPEG_QUALITY", 85)?;
        if !(1..=100).contains(&jpeg_quality) {
            anyhow::bail!("JPEG_QUALITY must be between 1 and 100, got {}", jpeg_quality);
        }

        Ok(Config {
            nextcloud_url: required("NEXTCLOUD_URL")?,
            username: required("USERNAME")?,
            password: required("PASSWORD")?,
            album: required("ALBUM")?,
            resize_width,
            resize_height,
            listen_host: std::env::var("LISTEN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            listing_port: parse_or("LISTING_PORT", 3000)?,
            random_port: parse_or("RANDOM_PORT", 3001)?,
            remote_timeout: Duration::from_secs(parse_or("REMOTE_TIMEOUT_SECS", 30)?),
            max_image_bytes: parse_or("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            jpeg_quality,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    let value = std::env::var(key).with_context(|| format!("{} environment variable must be set", key))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} environment variable must not be empty", key);
    }
    Ok(value)
}

fn parse_required<T>(key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .trim()
        .parse()
        .with_context(|| format!("{} has an invalid value", key))
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value", key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration pointing at a local mock DAV server
    pub fn for_test(nextcloud_url: &str) -> Self {
        Config {
            nextcloud_url: nextcloud_url.to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
            album: "summer-2024".to_string(),
            resize_width: 32,
            resize_height: 24,
            listen_host: "127.0.0.1".to_string(),
            listing_port: 0,
            random_port: 0,
            remote_timeout: Duration::from_secs(5),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            jpeg_quality: 85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let port: u16 = parse_or("ALBUMD_TEST_UNSET_PORT", 4242).unwrap();
        assert_eq!(port, 4242);
    }

    #[test]
    fn test_required_reports_missing_variable() {
        let err = required("ALBUMD_TEST_MISSING_VAR").unwrap_err();
        assert!(err.to_string().contains("ALBUMD_TEST_MISSING_VAR"));
    }
}
