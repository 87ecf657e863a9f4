//! SQL schema for the Tribune SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS championships (
    championship_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    season          TEXT
);

CREATE TABLE IF NOT EXISTS teams (
    team_id         TEXT PRIMARY KEY,
    championship_id TEXT NOT NULL REFERENCES championships(championship_id),
    name            TEXT NOT NULL,
    group_name      TEXT
);

CREATE TABLE IF NOT EXISTS players (
    player_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    team_id   TEXT REFERENCES teams(team_id)   -- current registration only
);

CREATE TABLE IF NOT EXISTS matches (
    match_id        TEXT PRIMARY KEY,
    championship_id TEXT NOT NULL REFERENCES championships(championship_id),
    home_team_id    TEXT NOT NULL REFERENCES teams(team_id),
    away_team_id    TEXT NOT NULL REFERENCES teams(team_id),
    home_score      INTEGER,
    away_score      INTEGER,
    status          TEXT NOT NULL DEFAULT 'scheduled',
    kickoff_at      TEXT,                    -- ISO 8601 UTC
    featured        INTEGER NOT NULL DEFAULT 0,
    voting_open     INTEGER NOT NULL DEFAULT 0,
    voting_deadline TEXT,                    -- ISO 8601 UTC or NULL
    CHECK (home_team_id != away_team_id),
    CHECK (home_score IS NULL OR home_score >= 0),
    CHECK (away_score IS NULL OR away_score >= 0)
);

CREATE TABLE IF NOT EXISTS match_events (
    event_id  TEXT PRIMARY KEY,
    match_id  TEXT NOT NULL REFERENCES matches(match_id) ON DELETE CASCADE,
    player_id TEXT NOT NULL REFERENCES players(player_id),
    team_id   TEXT NOT NULL REFERENCES teams(team_id),
    kind      TEXT NOT NULL,
    minute    INTEGER,
    half      TEXT NOT NULL DEFAULT 'first'
);

CREATE TABLE IF NOT EXISTS lineups (
    match_id     TEXT NOT NULL REFERENCES matches(match_id) ON DELETE CASCADE,
    team_id      TEXT NOT NULL REFERENCES teams(team_id),
    player_id    TEXT NOT NULL REFERENCES players(player_id),
    starter      INTEGER NOT NULL DEFAULT 1,
    shirt_number INTEGER,
    position     TEXT,
    PRIMARY KEY (match_id, player_id)
);

-- At most one vote per (match, identity). The constraint is the ledger's
-- only guard against concurrent double votes.
CREATE TABLE IF NOT EXISTS votes (
    vote_id      TEXT PRIMARY KEY,
    match_id     TEXT NOT NULL REFERENCES matches(match_id) ON DELETE CASCADE,
    player_id    TEXT NOT NULL REFERENCES players(player_id),
    voter_key    TEXT NOT NULL,   -- 'account:<uuid>' | 'address:<ip>'
    display_name TEXT,
    cast_at      TEXT NOT NULL,
    UNIQUE (match_id, voter_key)
);

CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    author     TEXT NOT NULL,
    body       TEXT NOT NULL,
    posted_at  TEXT NOT NULL
);

-- Unliking deletes the row.
CREATE TABLE IF NOT EXISTS likes (
    message_id TEXT NOT NULL REFERENCES messages(message_id) ON DELETE CASCADE,
    voter_key  TEXT NOT NULL,
    liked_at   TEXT NOT NULL,
    PRIMARY KEY (message_id, voter_key)
);

CREATE INDEX IF NOT EXISTS matches_championship_idx ON matches(championship_id, status);
CREATE INDEX IF NOT EXISTS events_match_idx         ON match_events(match_id);
CREATE INDEX IF NOT EXISTS events_player_idx        ON match_events(player_id);
CREATE INDEX IF NOT EXISTS lineups_player_idx       ON lineups(player_id);
CREATE INDEX IF NOT EXISTS votes_match_idx          ON votes(match_id, player_id);

PRAGMA user_version = 1;
";
