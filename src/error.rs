use thiserror::Error;

use crate::group::GroupId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown agent kind '{0}': expected forager, farmer or rice_farmer")]
    InvalidAgentKind(String),

    #[error("cell ({x}, {y}) is outside the grid")]
    InvalidPlacement { x: i64, y: i64 },

    #[error("group {0} does not exist")]
    UnknownGroup(GroupId),

    #[error("group {0} is no longer alive")]
    InactiveGroup(GroupId),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

pub type SimResult<T> = Result<T, SimError>;
