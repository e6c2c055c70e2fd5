use std::collections::HashMap;

/// Durée et position courantes renvoyées par `GET /scrub`, en secondes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
    pub duration: f64,
    pub position: f64,
}

/// Réponse brute d'un récepteur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Paires `clé: valeur` d'un corps `text/parameters`, clés en minuscules.
    pub parameters: HashMap<String, String>,
}

impl CommandResponse {
    pub fn new(status: u16, reason: impl Into<String>, headers: Vec<(String, String)>, body: String) -> Self {
        let is_parameters = headers.iter().any(|(key, value)| {
            key.eq_ignore_ascii_case("content-type")
                && value.to_ascii_lowercase().starts_with("text/parameters")
        });
        let parameters = if is_parameters {
            parse_parameters(&body)
        } else {
            HashMap::new()
        };

        Self {
            status,
            reason: reason.into(),
            headers,
            body,
            parameters,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Décode la durée et la position, si le récepteur les a fournies.
    pub fn playback_status(&self) -> Option<PlaybackStatus> {
        let duration = self.parameter("duration")?.parse().ok()?;
        let position = self.parameter("position")?.parse().ok()?;
        Some(PlaybackStatus { duration, position })
    }
}

/// Décode un corps `text/parameters` : une paire `clé: valeur` par ligne.
///
/// Les lignes sans `:` sont ignorées.
pub fn parse_parameters(body: &str) -> HashMap<String, String> {
    body.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}
