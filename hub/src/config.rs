use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

/// Service configuration derived from environment variables.
///
/// `CONNECTION_STRING` keeps the name used by the existing `.env` files so
/// the same file can be reused as-is.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    /// Bearer token for API auth.  Empty ⇒ auth disabled.
    pub token: String,

    // ── Document store ─────────────────────────────────────────────
    pub db_path: PathBuf,
    pub pool_size: u32,

    // ── Series defaults ────────────────────────────────────────────
    pub ema_span: u32,
    /// Trailing sessions used for the 52-week high/low.
    pub kpi_window: u32,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Accepts a bare path or an `sqlite://` / `sqlite:` URL.
fn db_path_from_connection_string(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let path = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);
    PathBuf::from(path)
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let conn_str = env_str("CONNECTION_STRING", "");
        if conn_str.is_empty() {
            bail!("CONNECTION_STRING not set (environment or .env)");
        }

        Ok(Self {
            bind: env_str("STOCK_HUB_BIND", "127.0.0.1"),
            port: env_u16("STOCK_HUB_PORT", 8000),
            token: env_str("STOCK_HUB_TOKEN", ""),
            db_path: db_path_from_connection_string(&conn_str),
            pool_size: env_u32("STOCK_HUB_POOL_SIZE", 4).max(1),
            ema_span: env_u32("STOCK_HUB_EMA_SPAN", 20).max(1),
            kpi_window: env_u32("STOCK_HUB_KPI_WINDOW", 252).max(1),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(key: &str, val: &str) -> Option<String> {
        let prev = env::var(key).ok();
        unsafe {
            env::set_var(key, val);
        }
        prev
    }

    fn restore_env(key: &str, prev: Option<String>) {
        match prev {
            Some(v) => unsafe {
                env::set_var(key, v);
            },
            None => unsafe {
                env::remove_var(key);
            },
        }
    }

    #[test]
    fn connection_string_accepts_sqlite_urls() {
        assert_eq!(
            db_path_from_connection_string("sqlite:///var/lib/stocks.db"),
            PathBuf::from("/var/lib/stocks.db")
        );
        assert_eq!(
            db_path_from_connection_string("sqlite:stocks.db"),
            PathBuf::from("stocks.db")
        );
        assert_eq!(
            db_path_from_connection_string(" ./stocks.db "),
            PathBuf::from("./stocks.db")
        );
    }

    #[test]
    fn from_env_requires_connection_string_and_clamps_numbers() {
        let _guard = ENV_LOCK.lock().unwrap();

        let prev_conn = set_env("CONNECTION_STRING", "   ");
        assert!(AppConfig::from_env().is_err());

        set_env("CONNECTION_STRING", "sqlite://stocks.db");
        let prev_span = set_env("STOCK_HUB_EMA_SPAN", "0");
        let prev_window = set_env("STOCK_HUB_KPI_WINDOW", "not-a-number");
        let prev_port = set_env("STOCK_HUB_PORT", "9100");

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("stocks.db"));
        assert_eq!(cfg.ema_span, 1);
        assert_eq!(cfg.kpi_window, 252);
        assert_eq!(cfg.port, 9100);
        assert!(cfg.bind_addr().ends_with(":9100"));

        restore_env("CONNECTION_STRING", prev_conn);
        restore_env("STOCK_HUB_EMA_SPAN", prev_span);
        restore_env("STOCK_HUB_KPI_WINDOW", prev_window);
        restore_env("STOCK_HUB_PORT", prev_port);
    }
}
