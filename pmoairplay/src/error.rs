use std::time::Duration;

/// Erreurs du client de commande Airplay.
#[derive(Debug, thiserror::Error)]
pub enum AirplayError {
    #[error("Unknown Airplay device: {0}")]
    UnknownDevice(u32),

    #[error("Transport error with {address}: {message}")]
    Transport { address: String, message: String },

    #[error("No answer from {address} within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AirplayError {
    /// `true` pour les erreurs réseau (transport ou délai dépassé).
    pub fn is_network(&self) -> bool {
        matches!(self, AirplayError::Transport { .. } | AirplayError::Timeout { .. })
    }
}

/// Result type for Airplay commands
pub type Result<T> = std::result::Result<T, AirplayError>;
