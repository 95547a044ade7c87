use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{config_error, Error};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub sweep_interval: Duration,
    pub notification_retention_days: i64,
}

impl Config {
    /// Reads configuration from the process environment, loading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            host: parse_var("HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_var("PORT", 3000)?,
            sweep_interval: Duration::from_secs(parse_var("SWEEP_INTERVAL_SECS", 300)?),
            notification_retention_days: parse_var("NOTIFICATION_RETENTION_DAYS", 30)?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, Error> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| config_error(key)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

#[test]
fn parse_var_test() {
    env::set_var("FREIGHTLINK_TEST_PORT", "8080");
    env::set_var("FREIGHTLINK_TEST_BAD_PORT", "eighty");

    assert_eq!(parse_var("FREIGHTLINK_TEST_PORT", 3000u16).unwrap(), 8080);
    assert_eq!(parse_var("FREIGHTLINK_TEST_MISSING", 3000u16).unwrap(), 3000);

    let err = parse_var("FREIGHTLINK_TEST_BAD_PORT", 3000u16).unwrap_err();
    assert_eq!(err.code, 6);
}
