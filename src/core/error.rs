use thiserror::Error;

use super::types::ScenarioKind;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid scenario config: {0}")]
    InvalidConfig(String),

    #[error("essential expenses resolved to zero; ratio is undefined")]
    DivisionByZero,

    #[error("outcomes for {kind:?} must be rated Risky, Medium, Good in that order")]
    BrokenLadder { kind: ScenarioKind },
}
