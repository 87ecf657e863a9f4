//! tribune server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite result store, and serves the league API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash` in config.toml:
//!
//! ```
//! cargo run -p tribune-server --bin server -- --hash-password
//! ```

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tribune_server::{AppState, ServerConfig, session::SessionKeys};
use tribune_store_sqlite::SqliteStore;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Tribune league server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Print a session token for the given account id and exit.
  #[arg(long, value_name = "ACCOUNT_ID")]
  issue_session: Option<Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    println!("{}", hash_password(&read_password()?)?);
    return Ok(());
  }

  let settings = load_settings(cli.config)?;

  if let Some(account) = cli.issue_session {
    println!("{}", issue_session(&settings, account)?);
    return Ok(());
  }

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  serve(server_cfg).await
}

fn load_settings(path: PathBuf) -> anyhow::Result<config::Config> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("TRIBUNE"))
    .build()
    .context("failed to read config file")
}

fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))
}

/// Mint a session token. Only `session_secret` has to be configured.
fn issue_session(settings: &config::Config, account: Uuid) -> anyhow::Result<String> {
  let secret = settings
    .get_string("session_secret")
    .context("session_secret is not configured")?;
  let keys = SessionKeys::new(&secret)
    .map_err(|e| anyhow::anyhow!("invalid session secret: {e}"))?;
  Ok(keys.issue(account))
}

async fn serve(server_cfg: ServerConfig) -> anyhow::Result<()> {
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  if !server_cfg.trust_forwarded_for {
    tracing::info!("ignoring X-Forwarded-For; anonymous callers are keyed by peer address");
  }

  let state = AppState::new(store, server_cfg)
    .map_err(|e| anyhow::anyhow!("invalid session secret: {e}"))?;
  let app = tribune_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings(pairs: &[(&str, &str)]) -> config::Config {
    pairs
      .iter()
      .fold(config::Config::builder(), |b, (k, v)| b.set_override(*k, *v).unwrap())
      .build()
      .unwrap()
  }

  #[test]
  fn session_issued_from_secret_alone() {
    let account = Uuid::new_v4();
    let token = issue_session(&settings(&[("session_secret", "s3cret")]), account).unwrap();

    let keys = SessionKeys::new("s3cret").unwrap();
    assert_eq!(keys.verify(&token), Some(account));
  }

  #[test]
  fn session_requires_a_secret() {
    let res = issue_session(&settings(&[("store_path", "/tmp/league.db")]), Uuid::new_v4());
    assert!(res.is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/league.db")), PathBuf::from(home).join("league.db"));
    assert_eq!(expand_tilde(Path::new("/srv/league.db")), PathBuf::from("/srv/league.db"));
  }
}
