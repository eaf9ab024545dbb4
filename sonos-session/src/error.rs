use soap_client::SoapError;
use thiserror::Error;

/// Errors raised by a device session
///
/// Abstracts away the SOAP transport so callers only deal with the failure
/// modes that matter for control: the device could not be reached, it
/// answered with something unexpected, it rejected the request, or it did
/// not answer in time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Network communication error (device unreachable, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The device answered but the response could not be understood
    #[error("Parse error: {0}")]
    Parse(String),

    /// UPnP fault returned by the device
    #[error("SOAP fault: error code {0}")]
    Fault(u16),

    /// The call did not complete within the configured timeout
    #[error("Timed out waiting for {action}")]
    Timeout { action: &'static str },

    /// A request parameter was rejected before being sent
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The device does not implement the requested capability
    #[error("Unsupported by device: {0}")]
    Unsupported(String),
}

impl SessionError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SessionError::Network(_) | SessionError::Timeout { .. } => true,
            SessionError::Fault(code) => SoapError::Fault(*code).is_transient(),
            SessionError::Parse(_)
            | SessionError::InvalidParameter(_)
            | SessionError::Unsupported(_) => false,
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

impl From<SoapError> for SessionError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => SessionError::Network(msg),
            SoapError::Parse(msg) => SessionError::Parse(msg),
            SoapError::Fault(code) => SessionError::Fault(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_error_conversion() {
        let err: SessionError = SoapError::Network("connection timeout".into()).into();
        assert!(matches!(err, SessionError::Network(_)));

        let err: SessionError = SoapError::Parse("invalid XML".into()).into();
        assert!(matches!(err, SessionError::Parse(_)));

        let err: SessionError = SoapError::Fault(714).into();
        assert_eq!(err, SessionError::Fault(714));
    }

    #[test]
    fn test_transient_errors() {
        assert!(SessionError::Timeout { action: "Play" }.is_transient());
        assert!(SessionError::Fault(701).is_transient());
        assert!(!SessionError::Fault(402).is_transient());
        assert!(!SessionError::InvalidParameter("volume".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = SessionError::Timeout { action: "GetVolume" };
        assert_eq!(format!("{}", err), "Timed out waiting for GetVolume");
        assert_eq!(format!("{}", SessionError::Fault(500)), "SOAP fault: error code 500");
    }
}
