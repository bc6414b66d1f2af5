use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelsError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("price series is empty")]
    EmptySeries,

    #[error("non-finite close at index {index}")]
    NonFinitePrice { index: usize },
}

pub type Result<T> = std::result::Result<T, LevelsError>;

impl LevelsError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        LevelsError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
