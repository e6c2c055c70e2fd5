use serde::{Deserialize, Serialize};
use std::fmt;

const FEATURE_VIDEO: u32 = 1 << 0;
const FEATURE_PHOTO: u32 = 1 << 1;
const FEATURE_SLIDESHOW: u32 = 1 << 7;
const FEATURE_AUDIO: u32 = 1 << 9;

/// Masque de fonctionnalités annoncé par un récepteur Airplay.
///
/// Le masque est publié sous forme hexadécimale (`features=0x39f7`), parfois
/// suivi d'un second mot (`0x5A7FFFF7,0x1E`) : seul le premier mot est lu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiverFeatures(pub u32);

impl ReceiverFeatures {
    /// Décode la valeur textuelle du masque. Retourne `None` si elle n'est pas
    /// hexadécimale.
    pub fn parse(value: &str) -> Option<Self> {
        let first = value.split(',').next()?.trim();
        let digits = first
            .strip_prefix("0x")
            .or_else(|| first.strip_prefix("0X"))
            .unwrap_or(first);
        u32::from_str_radix(digits, 16).ok().map(Self)
    }

    pub fn video(&self) -> bool {
        self.0 & FEATURE_VIDEO != 0
    }

    pub fn photo(&self) -> bool {
        self.0 & FEATURE_PHOTO != 0
    }

    pub fn slideshow(&self) -> bool {
        self.0 & FEATURE_SLIDESHOW != 0
    }

    pub fn audio(&self) -> bool {
        self.0 & FEATURE_AUDIO != 0
    }
}

/// Un récepteur du protocole de commande, adressé par identifiant entier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub id: u32,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub features: ReceiverFeatures,
}

impl Receiver {
    pub fn new(id: u32, host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        Self {
            id,
            name: host.clone(),
            host,
            port,
            features: ReceiverFeatures::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_features(mut self, features: ReceiverFeatures) -> Self {
        self.features = features;
        self
    }

    /// Adresse `host:port`, avec crochets pour IPv6.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} ({})", self.name, self.id, self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_features() {
        let features = ReceiverFeatures::parse("0x39f7").unwrap();
        assert!(features.video());
        assert!(features.photo());
        assert!(features.slideshow());
        assert!(!features.audio());
        assert!(ReceiverFeatures::parse("0X200").unwrap().audio());

        let features = ReceiverFeatures::parse("0x5A7FFFF7,0x1E").unwrap();
        assert_eq!(features.0, 0x5A7F_FFF7);

        let features = ReceiverFeatures::parse("0x2").unwrap();
        assert!(!features.video());
        assert!(features.photo());

        assert!(ReceiverFeatures::parse("nope").is_none());
    }

    #[test]
    fn test_address() {
        assert_eq!(Receiver::new(1, "192.168.1.20", 7000).address(), "192.168.1.20:7000");
        assert_eq!(Receiver::new(2, "fe80::1", 7000).address(), "[fe80::1]:7000");
    }
}
