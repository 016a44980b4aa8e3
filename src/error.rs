//! Error values carried by terminal `on_error` notifications.

use thiserror::Error;

/// Terminal error of a source.
///
/// Delivering one ends the receiving observer's subscription. Multicast
/// connectors fan it out to every attached observer before tearing the shared
/// run down.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxError {
    /// The source failed while producing values.
    #[error("{message}")]
    Source {
        /// Human-readable failure reason.
        message: String,
    },
}

impl RxError {
    pub fn failed(message: impl Into<String>) -> Self {
        RxError::Source { message: message.into() }
    }

    /// Short stable label for log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            RxError::Source { .. } => "source_error",
        }
    }

    /// The failure reason without any label.
    pub fn as_message(&self) -> &str {
        match self {
            RxError::Source { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = RxError::failed("disk on fire");
        assert_eq!("disk on fire", err.to_string());
        assert_eq!("source_error", err.as_label());
        assert_eq!("disk on fire", err.as_message());
    }
}
