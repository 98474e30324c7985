mod analytics;
mod api;
mod clock;
mod db;
mod error;
mod models;
mod streak;
mod tone;
mod validation;

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::api::AppState;
use crate::clock::normalize_tz_offset_minutes;

const DEFAULT_PORT: u16 = 5000;

#[derive(Parser, Debug)]
#[command(name = "sina_core", version)]
struct Args {
    /// Listen address.
    ///
    /// Accepts:
    /// - ip:port (recommended), e.g. 127.0.0.1:5000
    /// - ip (implies port 5000), e.g. 127.0.0.1
    #[arg(long, env = "SINA_LISTEN", default_value = "127.0.0.1:5000")]
    listen: String,

    /// SQLite database path.
    #[arg(long, env = "SINA_DB", default_value = "./instance/sina.db")]
    db: PathBuf,

    /// Offset used for "today" when a request does not send tz_offset_minutes.
    #[arg(long, env = "SINA_TZ_OFFSET_MINUTES", default_value_t = 0, allow_hyphen_values = true)]
    tz_offset_minutes: i32,

    /// Fixed seed for quote selection. Random when unset.
    #[arg(long, env = "SINA_QUOTE_SEED")]
    quote_seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sina_core=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    if let Some(parent) = args.db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::open(&args.db)?;

    let rng = match args.quote_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let tz_offset_minutes = normalize_tz_offset_minutes(Some(args.tz_offset_minutes), 0);
    let app = api::router(AppState::new(conn, rng, tz_offset_minutes));

    let addr = parse_listen(&args.listen)?;
    info!("Sina listening on http://{addr}");
    info!("DB: {}", args.db.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn parse_listen(input: &str) -> anyhow::Result<SocketAddr> {
    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    if let Some((host, port_str)) = input.rsplit_once(':') {
        let ip = if host == "localhost" {
            Some(IpAddr::from([127, 0, 0, 1]))
        } else {
            host.parse::<IpAddr>().ok()
        };
        if let Some(ip) = ip {
            let port: u16 = port_str.parse().map_err(|_| {
                anyhow::anyhow!(
                    "invalid --listen '{}': bad port. Example: 127.0.0.1:{}",
                    input,
                    DEFAULT_PORT
                )
            })?;
            return Ok(SocketAddr::new(ip, port));
        }
    }

    if input == "localhost" {
        return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), DEFAULT_PORT));
    }

    Err(anyhow::anyhow!(
        "invalid --listen '{}'. Use ip:port (e.g. 127.0.0.1:{}) or ip (e.g. 127.0.0.1).",
        input,
        DEFAULT_PORT
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_forms() {
        assert_eq!(
            parse_listen("0.0.0.0:8080").unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(parse_listen("127.0.0.1").unwrap().port(), DEFAULT_PORT);
        assert_eq!(
            parse_listen("localhost:9000").unwrap(),
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(parse_listen("localhost").unwrap().port(), DEFAULT_PORT);
        assert_eq!(
            parse_listen("[::1]:7000").unwrap(),
            "[::1]:7000".parse::<SocketAddr>().unwrap()
        );
        // "17600" is not an IPv6 group, so this is read as host:port.
        assert_eq!(
            parse_listen("::1:17600").unwrap(),
            "[::1]:17600".parse::<SocketAddr>().unwrap()
        );
        // A trailing group that is valid hex stays part of the address.
        assert_eq!(parse_listen("::1:7000").unwrap().port(), DEFAULT_PORT);
    }

    #[test]
    fn bad_listen_is_rejected() {
        assert!(parse_listen("localhost:http").is_err());
        assert!(parse_listen("example.com").is_err());
    }

    #[test]
    fn args_parse_env_style_values() {
        let args = Args::parse_from([
            "sina_core",
            "--tz-offset-minutes",
            "-300",
            "--quote-seed",
            "9",
        ]);
        assert_eq!(args.tz_offset_minutes, -300);
        assert_eq!(args.quote_seed, Some(9));
        assert_eq!(args.db, PathBuf::from("./instance/sina.db"));
    }
}
