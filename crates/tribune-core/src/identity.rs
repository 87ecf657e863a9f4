//! Deduplication identities for the voting and like ledgers.
//!
//! An authenticated account always wins. Anonymous callers are keyed by their
//! network address, which is a best-effort pseudo-identity: clients behind a
//! shared NAT collapse into one identity and a client that controls its
//! forwarded-for header can mint new ones. Ledger code only ever sees an
//! [`Identity`], so the resolver can be replaced without touching it.

use std::{fmt, net::IpAddr, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Address used when neither a forwarded-for entry nor a peer is known.
pub const UNKNOWN_ADDRESS: &str = "unknown";

const ACCOUNT_PREFIX: &str = "account:";
const ADDRESS_PREFIX: &str = "address:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Identity {
  /// A durable account id from a verified session.
  Account(Uuid),
  /// A normalised client address, or [`UNKNOWN_ADDRESS`].
  Address(String),
}

impl Identity {
  /// The single-column key the ledgers store and constrain on.
  pub fn key(&self) -> String { self.to_string() }

  pub fn is_account(&self) -> bool { matches!(self, Self::Account(_)) }

  /// Short label for log fields; never includes the address itself.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Account(_) => "account",
      Self::Address(_) => "address",
    }
  }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Account(id) => write!(f, "{ACCOUNT_PREFIX}{}", id.hyphenated()),
      Self::Address(addr) => write!(f, "{ADDRESS_PREFIX}{addr}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdentityError(pub String);

impl fmt::Display for ParseIdentityError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "not an identity key: {:?}", self.0)
  }
}

impl std::error::Error for ParseIdentityError {}

impl FromStr for Identity {
  type Err = ParseIdentityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if let Some(rest) = s.strip_prefix(ACCOUNT_PREFIX) {
      return Uuid::parse_str(rest)
        .map(Self::Account)
        .map_err(|_| ParseIdentityError(s.to_string()));
    }
    match s.strip_prefix(ADDRESS_PREFIX) {
      Some(rest) if !rest.is_empty() => Ok(Self::Address(rest.to_string())),
      _ => Err(ParseIdentityError(s.to_string())),
    }
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// What the transport knows about a request, stripped of transport types.
#[derive(Debug, Clone, Default)]
pub struct RequestHints {
  /// Account id from a session the transport has already verified.
  pub account:       Option<Uuid>,
  /// Raw `X-Forwarded-For` header value, if present and trusted.
  pub forwarded_for: Option<String>,
  /// Address of the directly connected peer.
  pub peer:          Option<IpAddr>,
}

/// Maps a request to the identity the ledgers deduplicate on.
pub trait IdentityResolver: Send + Sync {
  fn resolve(&self, hints: &RequestHints) -> Identity;
}

/// Account first, then the first forwarded-for entry, then the peer address,
/// then [`UNKNOWN_ADDRESS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressFallbackResolver;

impl IdentityResolver for AddressFallbackResolver {
  fn resolve(&self, hints: &RequestHints) -> Identity {
    if let Some(account) = hints.account {
      return Identity::Account(account);
    }

    let forwarded = hints
      .forwarded_for
      .as_deref()
      .and_then(|chain| chain.split(',').next())
      .and_then(normalize_address);

    let address = forwarded
      .or_else(|| hints.peer.map(|ip| canonical_ip(ip).to_string()))
      .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());

    Identity::Address(address)
  }
}

/// Normalise one forwarded-for entry.
///
/// Strips whitespace, ports and IPv6 brackets, and unmaps IPv4-mapped IPv6.
/// Entries that are not IP addresses (obfuscated identifiers, `unknown`) are
/// kept lower-cased rather than discarded. Empty entries yield `None`.
pub fn normalize_address(raw: &str) -> Option<String> {
  let entry = raw.trim();
  if entry.is_empty() {
    return None;
  }

  if let Ok(ip) = entry.parse::<IpAddr>() {
    return Some(canonical_ip(ip).to_string());
  }

  // `[v6]:port` or `[v6]`
  if let Some(rest) = entry.strip_prefix('[')
    && let Some((host, _)) = rest.split_once(']')
    && let Ok(ip) = host.parse::<IpAddr>()
  {
    return Some(canonical_ip(ip).to_string());
  }

  // `v4:port`
  if let Some((host, port)) = entry.rsplit_once(':')
    && port.chars().all(|c| c.is_ascii_digit())
    && let Ok(ip) = host.parse::<IpAddr>()
  {
    return Some(canonical_ip(ip).to_string());
  }

  Some(entry.to_ascii_lowercase())
}

fn canonical_ip(ip: IpAddr) -> IpAddr {
  match ip {
    IpAddr::V6(v6) => v6
      .to_ipv4_mapped()
      .map(IpAddr::V4)
      .unwrap_or(IpAddr::V6(v6)),
    v4 => v4,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn resolve(hints: RequestHints) -> Identity { AddressFallbackResolver.resolve(&hints) }

  #[test]
  fn account_takes_precedence() {
    let id = Uuid::new_v4();
    let got = resolve(RequestHints {
      account:       Some(id),
      forwarded_for: Some("203.0.113.9".into()),
      peer:          Some("10.0.0.1".parse().unwrap()),
    });
    assert_eq!(got, Identity::Account(id));
  }

  #[test]
  fn first_forwarded_entry_wins_over_peer() {
    let got = resolve(RequestHints {
      account:       None,
      forwarded_for: Some(" 203.0.113.9 , 70.41.3.18, 150.172.238.178".into()),
      peer:          Some("10.0.0.1".parse().unwrap()),
    });
    assert_eq!(got, Identity::Address("203.0.113.9".into()));
  }

  #[test]
  fn empty_forwarded_header_falls_back_to_peer() {
    let got = resolve(RequestHints {
      account:       None,
      forwarded_for: Some("  ".into()),
      peer:          Some("10.0.0.1".parse().unwrap()),
    });
    assert_eq!(got, Identity::Address("10.0.0.1".into()));
  }

  #[test]
  fn nothing_known_yields_sentinel() {
    assert_eq!(
      resolve(RequestHints::default()),
      Identity::Address(UNKNOWN_ADDRESS.into())
    );
  }

  #[test]
  fn normalization_strips_ports_and_unmaps_v4() {
    assert_eq!(normalize_address("198.51.100.7:4711").as_deref(), Some("198.51.100.7"));
    assert_eq!(normalize_address("[2001:DB8::1]:443").as_deref(), Some("2001:db8::1"));
    assert_eq!(normalize_address("::ffff:192.0.2.1").as_deref(), Some("192.0.2.1"));
    assert_eq!(normalize_address("_Hidden").as_deref(), Some("_hidden"));
    assert_eq!(normalize_address(""), None);
  }

  #[test]
  fn peer_v4_mapped_matches_forwarded_v4() {
    let via_peer = resolve(RequestHints {
      peer: Some("::ffff:192.0.2.1".parse().unwrap()),
      ..Default::default()
    });
    let via_header = resolve(RequestHints {
      forwarded_for: Some("192.0.2.1".into()),
      ..Default::default()
    });
    assert_eq!(via_peer, via_header);
  }

  #[test]
  fn key_round_trips_through_from_str() {
    for id in [
      Identity::Account(Uuid::new_v4()),
      Identity::Address("192.0.2.1".into()),
      Identity::Address("2001:db8::1".into()),
    ] {
      assert_eq!(id.key().parse::<Identity>().unwrap(), id);
    }
    assert!("address:".parse::<Identity>().is_err());
    assert!("account:nope".parse::<Identity>().is_err());
  }
}
