//! The DB Seeder contract (spec §4.7): a capability set `{Copy, Dump,
//! ImportDump}` dispatched over a small enum of engines, not a deep trait
//! hierarchy (spec §9 design note), matching
//! `original_source/services/db_dumper.go`'s `MySQLCopy`/`PostgresCopy`.

mod error;
mod url_parts;

pub use error::DbSeedError;
pub use url_parts::UrlParts;

use std::fmt;

/// The engines the core currently knows how to dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlEngine {
    MySql,
    Postgres,
}

impl SqlEngine {
    pub fn parse(db_type: &str) -> Option<Self> {
        match db_type {
            "mysql" => Some(SqlEngine::MySql),
            "postgres" => Some(SqlEngine::Postgres),
            _ => None,
        }
    }

    /// Default image, host port and seed env vars for `perun-db` (spec §8.6,
    /// supplemented from `db_dumper.go`'s URL field extraction since the
    /// spec only worked through the mysql scenario).
    pub fn default_image(&self) -> &'static str {
        match self {
            SqlEngine::MySql => "mysql:latest",
            SqlEngine::Postgres => "postgres:latest",
        }
    }

    pub fn host_port(&self) -> &'static str {
        match self {
            SqlEngine::MySql => "3306",
            SqlEngine::Postgres => "5432",
        }
    }

    pub fn seed_env(&self, parts: &UrlParts) -> Vec<(String, String)> {
        match self {
            SqlEngine::MySql => vec![
                ("MYSQL_DATABASE".to_string(), parts.database.clone()),
                ("MYSQL_USER".to_string(), parts.user.clone()),
                ("MYSQL_PASSWORD".to_string(), parts.password.clone()),
            ],
            SqlEngine::Postgres => vec![
                ("POSTGRES_DB".to_string(), parts.database.clone()),
                ("POSTGRES_USER".to_string(), parts.user.clone()),
                ("POSTGRES_PASSWORD".to_string(), parts.password.clone()),
            ],
        }
    }
}

impl fmt::Display for SqlEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlEngine::MySql => write!(f, "mysql"),
            SqlEngine::Postgres => write!(f, "postgres"),
        }
    }
}

/// `{Copy, Dump, ImportDump}` capability set (spec §4.7). The seeder itself
/// is external; the core specifies only this interface plus the default
/// env/image wiring for the `perun-db` service.
pub trait DatabaseCopy {
    /// Dumps the source database and imports it into the target in one
    /// step. The Synchronizer calls only this after `perun-db` is up.
    fn copy(&self) -> Result<(), DbSeedError>;

    /// Dumps the source database to `target_file`.
    fn dump(&self) -> Result<(), DbSeedError>;

    /// Imports a previously produced dump into `target_db_url`.
    fn import_dump(&self) -> Result<(), DbSeedError>;
}

pub struct MySqlCopy {
    pub url: String,
    pub target_file: String,
    pub target_db_url: String,
}

pub struct PostgresCopy {
    pub url: String,
    pub target_file: String,
    pub target_db_url: String,
}

impl DatabaseCopy for MySqlCopy {
    fn dump(&self) -> Result<(), DbSeedError> {
        Err(DbSeedError::NotImplemented("mysqldump"))
    }
    fn import_dump(&self) -> Result<(), DbSeedError> {
        Err(DbSeedError::NotImplemented("mysql import"))
    }
    fn copy(&self) -> Result<(), DbSeedError> {
        self.dump().and_then(|_| self.import_dump())
    }
}

impl DatabaseCopy for PostgresCopy {
    fn dump(&self) -> Result<(), DbSeedError> {
        Err(DbSeedError::NotImplemented("pg_dump"))
    }
    fn import_dump(&self) -> Result<(), DbSeedError> {
        Err(DbSeedError::NotImplemented("psql import"))
    }
    fn copy(&self) -> Result<(), DbSeedError> {
        self.dump().and_then(|_| self.import_dump())
    }
}

/// Builds the right `DatabaseCopy` for the given engine; callers hold it
/// behind `Box<dyn DatabaseCopy>` since the Synchronizer only ever calls
/// `copy()` once, right after `perun-db` starts.
pub fn database_copy(
    engine: SqlEngine,
    url: String,
    target_file: String,
    target_db_url: String,
) -> Box<dyn DatabaseCopy> {
    match engine {
        SqlEngine::MySql => Box::new(MySqlCopy {
            url,
            target_file,
            target_db_url,
        }),
        SqlEngine::Postgres => Box::new(PostgresCopy {
            url,
            target_file,
            target_db_url,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_known_engines() {
        assert_eq!(SqlEngine::parse("mysql"), Some(SqlEngine::MySql));
        assert_eq!(SqlEngine::parse("postgres"), Some(SqlEngine::Postgres));
        assert_eq!(SqlEngine::parse("oracle"), None);
    }

    #[test]
    fn seed_env_matches_engine_conventions() {
        let parts = UrlParts {
            user: "u".to_string(),
            password: "p".to_string(),
            host: "h".to_string(),
            database: "d".to_string(),
        };
        let env = SqlEngine::MySql.seed_env(&parts);
        assert!(env.contains(&("MYSQL_DATABASE".to_string(), "d".to_string())));
        assert!(env.contains(&("MYSQL_USER".to_string(), "u".to_string())));
    }
}
