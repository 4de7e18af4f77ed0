use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbSeedError {
    #[error("invalid database url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The dumper/restorer is an external collaborator (spec §1, §4.7); the
    /// core only specifies the contract, so the default implementations
    /// surface this rather than shelling out themselves.
    #[error("{0} is not implemented by the core; the seeder is an external collaborator")]
    NotImplemented(&'static str),
}
