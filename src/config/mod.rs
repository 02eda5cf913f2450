use anyhow::{Context, Result, bail};
use std::env;

/// Credentials and target bucket for the S3 backend.
///
/// All values are required and checked once at startup; a missing variable
/// aborts construction instead of resurfacing later as per-item failures.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageConfig {
    /// Load configuration from environment variables, honoring a `.env` file
    /// when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            region: require("AWS_REGION")?,
            bucket: require("AWS_BUCKET_NAME")?,
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_ACCESS_KEY")?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("'{name}' not set"))?;
    if value.trim().is_empty() {
        bail!("'{name}' not set");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 4] = [
        "AWS_REGION",
        "AWS_BUCKET_NAME",
        "AWS_ACCESS_KEY_ID",
        "AWS_ACCESS_KEY",
    ];

    // Single test so the env mutations cannot race each other.
    #[test]
    fn test_from_env_requires_every_variable() {
        for name in VARS {
            unsafe { env::remove_var(name) };
        }
        assert!(StorageConfig::from_env().is_err());

        unsafe {
            env::set_var("AWS_REGION", "eu-west-1");
            env::set_var("AWS_BUCKET_NAME", "cdn-bucket");
            env::set_var("AWS_ACCESS_KEY_ID", "AKIATEST");
        }
        // Secret still missing.
        assert!(StorageConfig::from_env().is_err());

        unsafe { env::set_var("AWS_ACCESS_KEY", "secret") };
        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.bucket, "cdn-bucket");

        for name in VARS {
            unsafe { env::remove_var(name) };
        }
    }
}
