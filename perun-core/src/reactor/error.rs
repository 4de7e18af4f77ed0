use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum ReactorError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("event stream ended")]
    StreamEnded,
}
