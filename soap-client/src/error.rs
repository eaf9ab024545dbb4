//! Error types for the SOAP client

use thiserror::Error;

/// UPnP fault codes that indicate a temporary condition on the device
///
/// 701: transition not available, 714: illegal seek target while
/// transitioning, 716: resource not found while the transport settles.
const TRANSIENT_FAULTS: [u16; 3] = [701, 714, 716];

/// Errors that can occur during SOAP communication
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: error code {0}")]
    Fault(u16),
}

impl SoapError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SoapError::Network(_) => true,
            SoapError::Fault(code) => TRANSIENT_FAULTS.contains(code),
            SoapError::Parse(_) => false,
        }
    }
}
