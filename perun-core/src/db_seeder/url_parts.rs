use url::Url;

use super::DbSeedError;

/// `user:pass@host/dbname` fields extracted from an RFC 3986 database URL
/// (spec §4.7).
#[derive(Debug, Clone, Default)]
pub struct UrlParts {
    pub user: String,
    pub password: String,
    pub host: String,
    pub database: String,
}

impl UrlParts {
    pub fn parse(raw: &str) -> Result<Self, DbSeedError> {
        let url = Url::parse(raw)?;
        let database = url.path().trim_start_matches('/').to_string();
        Ok(UrlParts {
            user: url.username().to_string(),
            password: url.password().unwrap_or_default().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_mysql_url() {
        let parts = UrlParts::parse("mysql://u:p@h/d").unwrap();
        assert_eq!(parts.user, "u");
        assert_eq!(parts.password, "p");
        assert_eq!(parts.host, "h");
        assert_eq!(parts.database, "d");
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(UrlParts::parse("not a url").is_err());
    }
}
