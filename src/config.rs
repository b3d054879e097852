use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Company boilerplate printed on slips and offer letters.
#[derive(Clone, Debug)]
pub struct CompanyDefaults {
    pub name: String,
    pub address: String,
    pub cin: String,
    pub hr_name: String,
    pub hr_designation: String,
    pub supervisor_name: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,

    // Seeded on startup when the users table has no admin
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    pub company: CompanyDefaults,

    // Document rendering
    pub company_logo_path: Option<String>,
    pub chrome_path: Option<String>,
    pub pdf_max_concurrency: usize,
    pub pdf_render_timeout_secs: u64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let log_level = match optional("LOG_LEVEL") {
            Some(raw) => tracing::Level::from_str(&raw)
                .map_err(|_| anyhow::anyhow!("LOG_LEVEL has an invalid value: {raw}"))?,
            None => tracing::Level::DEBUG,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", 10_800)?, // default 3h

            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: or_default("API_PREFIX", "/api"),

            log_dir: or_default("LOG_DIR", "logs"),
            log_level,

            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),

            company: CompanyDefaults {
                name: or_default("COMPANY_NAME", "Company"),
                address: or_default("COMPANY_ADDRESS", ""),
                cin: or_default("COMPANY_CIN", ""),
                hr_name: or_default("HR_NAME", "HR Manager"),
                hr_designation: or_default("HR_DESIGNATION", "Human Resources Manager"),
                supervisor_name: or_default("SUPERVISOR_NAME", "HR Manager"),
            },

            company_logo_path: optional("COMPANY_LOGO_PATH"),
            chrome_path: optional("CHROME_PATH"),
            pdf_max_concurrency: parsed("PDF_MAX_CONCURRENCY", 2)?,
            pdf_render_timeout_secs: parsed("PDF_RENDER_TIMEOUT_SECS", 30)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_config() -> Config {
        Config {
            database_url: "mysql://localhost/test".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 600,
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            log_dir: "logs".into(),
            log_level: tracing::Level::DEBUG,
            admin_email: None,
            admin_password: None,
            company: CompanyDefaults {
                name: "Acme Tech".into(),
                address: "1 Main Road".into(),
                cin: String::new(),
                hr_name: "Asha Rao".into(),
                hr_designation: "HR Manager".into(),
                supervisor_name: "Ravi Shah".into(),
            },
            company_logo_path: None,
            chrome_path: None,
            pdf_max_concurrency: 1,
            pdf_render_timeout_secs: 5,
        }
    }

    #[test]
    fn parsed_falls_back_to_default_when_unset() {
        let value: u32 = parsed("PAYROLL_TEST_UNSET_KEY", 42).unwrap();
        assert_eq!(value, 42);
    }
}
