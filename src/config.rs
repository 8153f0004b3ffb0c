use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Base URL of the Kong admin API, e.g. "http://127.0.0.1:8001".
    pub kong_admin_url: String,
    /// Request timeout for Kong admin calls, in seconds.
    /// Set via KONGBRIDGE_KONG_TIMEOUT. Default: 30.
    pub kong_timeout_secs: u64,
    pub admin_key: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let admin_key = std::env::var("KONGBRIDGE_ADMIN_KEY")
        .unwrap_or_else(|_| "CHANGE_ME_ADMIN_KEY".into());

    if admin_key == "CHANGE_ME_ADMIN_KEY" {
        let env_mode = std::env::var("KONGBRIDGE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "KONGBRIDGE_ADMIN_KEY is still the insecure placeholder. \
                 Set a proper key before running in production."
            );
        }
        eprintln!("⚠️  KONGBRIDGE_ADMIN_KEY is not set — using insecure placeholder. Set a real key for production.");
    }

    Ok(Config {
        port: std::env::var("KONGBRIDGE_PORT")
            .unwrap_or_else(|_| "8444".into())
            .parse()
            .unwrap_or(8444),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/kongbridge".into()),
        kong_admin_url: std::env::var("KONG_ADMIN_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8001".into()),
        kong_timeout_secs: std::env::var("KONGBRIDGE_KONG_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        admin_key,
    })
}
