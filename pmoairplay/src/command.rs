//! Commandes Airplay et requêtes sortantes.
//!
//! Chaque commande correspond à une seule forme de requête (méthode, chemin,
//! corps éventuel). Le protocole est sans état : rien n'est conservé d'une
//! commande à l'autre.

use pmodevices::Receiver;
use std::fmt;

pub const USER_AGENT: &str = "MediaControl/1.0";
pub const PARAMETERS_CONTENT_TYPE: &str = "text/parameters";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Une commande à destination d'un récepteur.
#[derive(Debug, Clone, PartialEq)]
pub enum AirplayCommand {
    /// Lance la lecture d'une URL, à partir d'une position relative (0.0 à 1.0).
    Play {
        content_location: String,
        start_position: f64,
    },
    Stop,
    /// Déplace la lecture à `position` secondes.
    Scrub { position: f64 },
    /// Change la vitesse de lecture (0 = pause, 1 = lecture).
    RateChange { rate: f64 },
    /// Interroge la durée et la position courantes.
    PlaybackStatus,
}

impl AirplayCommand {
    pub fn name(&self) -> &'static str {
        match self {
            AirplayCommand::Play { .. } => "play",
            AirplayCommand::Stop => "stop",
            AirplayCommand::Scrub { .. } => "scrub",
            AirplayCommand::RateChange { .. } => "rate",
            AirplayCommand::PlaybackStatus => "status",
        }
    }

    /// Construit la requête adressée à `receiver`.
    pub fn to_request(&self, receiver: &Receiver) -> CommandRequest {
        let (method, path, body) = match self {
            AirplayCommand::Play {
                content_location,
                start_position,
            } => (
                Method::Post,
                "/play".to_string(),
                Some(format!(
                    "Content-Location: {}\nStart-Position: {}\n",
                    content_location,
                    format_decimal(*start_position)
                )),
            ),
            AirplayCommand::Stop => (Method::Post, "/stop".to_string(), None),
            AirplayCommand::Scrub { position } => (
                Method::Post,
                "/scrub".to_string(),
                Some(format!("position: {}\n", format_decimal(*position))),
            ),
            AirplayCommand::RateChange { rate } => (
                Method::Post,
                format!("/rate?value={}", format_decimal(*rate)),
                None,
            ),
            AirplayCommand::PlaybackStatus => (Method::Get, "/scrub".to_string(), None),
        };

        let body = body.unwrap_or_default();
        let mut headers = vec![("User-Agent".to_string(), USER_AGENT.to_string())];
        if !body.is_empty() {
            headers.push((
                "Content-Type".to_string(),
                PARAMETERS_CONTENT_TYPE.to_string(),
            ));
        }
        headers.push(("Content-Length".to_string(), body.len().to_string()));

        CommandRequest {
            method,
            host: receiver.host.clone(),
            port: receiver.port,
            path,
            headers,
            body,
        }
    }
}

/// Requête sortante complète.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub method: Method,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CommandRequest {
    /// `host:port`, avec crochets pour IPv6.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.authority(), self.path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Texte HTTP/1.1 brut de la requête (diagnostic).
    pub fn to_http(&self) -> String {
        let mut text = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\n",
            self.method,
            self.path,
            self.authority()
        );
        for (key, value) in &self.headers {
            text.push_str(key);
            text.push_str(": ");
            text.push_str(value);
            text.push_str("\r\n");
        }
        text.push_str("\r\n");
        text.push_str(&self.body);
        text
    }
}

/// Écrit un nombre décimal avec au moins une décimale (`1.0`, `12.5`).
fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
