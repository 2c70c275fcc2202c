use thiserror::Error;

/// Errors raised by parameter validation or by a pipeline stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldgenError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParam { field: &'static str, reason: String },

    /// The moisture zone table did not cover a computed value.
    #[error("no moisture zone for value {0}")]
    MoistureZone(f32),

    /// The temperature zone table did not cover a computed value.
    #[error("no temperature zone for value {0}")]
    TemperatureZone(f32),
}

impl WorldgenError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        WorldgenError::InvalidParam {
            field,
            reason: reason.into(),
        }
    }
}
