use pmodevices::DeviceRegistry;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

use crate::command::{AirplayCommand, CommandRequest, Method};
use crate::error::{AirplayError, Result};
use crate::response::{CommandResponse, PlaybackStatus};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client du protocole de commande.
///
/// Chaque appel bloque le thread appelant le temps de l'aller-retour réseau,
/// borné par le délai configuré. Aucune nouvelle tentative n'est faite :
/// l'échec est rendu à l'appelant.
pub struct AirplayClient {
    registry: Arc<DeviceRegistry>,
    agent: Agent,
    timeout: Duration,
}

impl AirplayClient {
    pub fn new(registry: Arc<DeviceRegistry>, timeout: Duration) -> Self {
        // Les statuts 4xx/5xx sont rendus tels quels à l'appelant.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(timeout))
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            registry,
            agent,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Construit la requête d'une commande sans l'envoyer.
    pub fn request_for(&self, device_id: u32, command: &AirplayCommand) -> Result<CommandRequest> {
        let receiver = self
            .registry
            .receiver(device_id)
            .ok_or(AirplayError::UnknownDevice(device_id))?;
        Ok(command.to_request(&receiver))
    }

    /// Envoie une commande au récepteur `device_id`.
    ///
    /// # Errors
    ///
    /// - [`AirplayError::UnknownDevice`] si le récepteur n'est pas enregistré
    ///   (aucun accès réseau n'a lieu).
    /// - [`AirplayError::Timeout`] / [`AirplayError::Transport`] en cas
    ///   d'échec réseau.
    pub fn send(&self, device_id: u32, command: &AirplayCommand) -> Result<CommandResponse> {
        let request = self.request_for(device_id, command)?;
        debug!(
            device_id,
            command = command.name(),
            url = %request.url(),
            "Sending Airplay command"
        );

        let response = self.execute(&request);
        match &response {
            Ok(r) => debug!(device_id, status = r.status, "Airplay command answered"),
            Err(e) => warn!(device_id, command = command.name(), error = %e, "Airplay command failed"),
        }
        response
    }

    fn execute(&self, request: &CommandRequest) -> Result<CommandResponse> {
        let url = request.url();
        // Content-Length est calculé par l'agent à partir du corps.
        let headers = request
            .headers
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("content-length"));

        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(&url);
                for (key, value) in headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post => {
                let mut builder = self.agent.post(&url);
                for (key, value) in headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.send(request.body.as_str())
            }
        };

        let mut response = result.map_err(|e| self.map_error(e, request))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(key, value)| {
                (
                    key.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.map_error(e, request))?;

        Ok(CommandResponse::new(status.as_u16(), reason, headers, body))
    }

    fn map_error(&self, err: ureq::Error, request: &CommandRequest) -> AirplayError {
        let address = request.authority();
        match err {
            ureq::Error::Timeout(_) => AirplayError::Timeout {
                address,
                timeout: self.timeout,
            },
            ureq::Error::Io(ref e)
                if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) =>
            {
                AirplayError::Timeout {
                    address,
                    timeout: self.timeout,
                }
            }
            other => AirplayError::Transport {
                address,
                message: other.to_string(),
            },
        }
    }

    // ============= Raccourcis =============

    pub fn play(&self, device_id: u32, content_location: &str, start_position: f64) -> Result<CommandResponse> {
        self.send(
            device_id,
            &AirplayCommand::Play {
                content_location: content_location.to_string(),
                start_position,
            },
        )
    }

    pub fn stop(&self, device_id: u32) -> Result<CommandResponse> {
        self.send(device_id, &AirplayCommand::Stop)
    }

    pub fn pause(&self, device_id: u32) -> Result<CommandResponse> {
        self.send(device_id, &AirplayCommand::RateChange { rate: 0.0 })
    }

    pub fn resume(&self, device_id: u32) -> Result<CommandResponse> {
        self.send(device_id, &AirplayCommand::RateChange { rate: 1.0 })
    }

    pub fn scrub(&self, device_id: u32, position: f64) -> Result<CommandResponse> {
        self.send(device_id, &AirplayCommand::Scrub { position })
    }

    /// Durée et position courantes du récepteur.
    pub fn status(&self, device_id: u32) -> Result<PlaybackStatus> {
        let response = self.send(device_id, &AirplayCommand::PlaybackStatus)?;
        if !response.is_success() {
            return Err(AirplayError::InvalidResponse(format!(
                "status request answered {} {}",
                response.status, response.reason
            )));
        }
        response.playback_status().ok_or_else(|| {
            AirplayError::InvalidResponse("missing duration or position".to_string())
        })
    }
}
