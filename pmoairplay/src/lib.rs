//! # pmoairplay - Protocole de commande Airplay
//!
//! Pilotage à distance d'un récepteur Airplay : lecture d'une URL, arrêt,
//! pause, reprise, déplacement et interrogation de la position.
//!
//! Les récepteurs sont adressés par leur identifiant dans le
//! [`pmodevices::DeviceRegistry`]. Un identifiant inconnu échoue localement
//! avec [`AirplayError::UnknownDevice`], sans accès réseau.
//!
//! ```
//! use std::sync::Arc;
//! use pmoairplay::{AirplayClient, AirplayError, DEFAULT_TIMEOUT};
//! use pmodevices::DeviceRegistry;
//!
//! let client = AirplayClient::new(Arc::new(DeviceRegistry::new()), DEFAULT_TIMEOUT);
//! let err = client.stop(42).unwrap_err();
//! assert!(matches!(err, AirplayError::UnknownDevice(42)));
//! ```

mod client;
mod command;
mod error;
mod response;

pub use client::{AirplayClient, DEFAULT_TIMEOUT};
pub use command::{AirplayCommand, CommandRequest, Method, PARAMETERS_CONTENT_TYPE, USER_AGENT};
pub use error::{AirplayError, Result};
pub use response::{CommandResponse, PlaybackStatus, parse_parameters};
