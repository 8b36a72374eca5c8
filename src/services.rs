//! Service classification from raw banners.
//!
//! A banner is matched by case-sensitive substring containment, checked in a
//! fixed priority order. Anything unmatched is [`ServiceLabel::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse service family recognised from a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceLabel {
    #[serde(rename = "SSH Server")]
    SshServer,
    #[serde(rename = "Web Server")]
    WebServer,
    #[serde(rename = "FTP Server")]
    FtpServer,
    #[serde(rename = "Mail Server")]
    MailServer,
    Unknown,
}

/// Substrings checked in order; the first hit wins.
const SIGNATURES: &[(&str, ServiceLabel)] = &[
    ("SSH", ServiceLabel::SshServer),
    ("HTTP", ServiceLabel::WebServer),
    ("FTP", ServiceLabel::FtpServer),
    ("SMTP", ServiceLabel::MailServer),
];

impl ServiceLabel {
    /// Classify a banner.
    pub fn from_banner(banner: &str) -> Self {
        SIGNATURES
            .iter()
            .find(|(needle, _)| banner.contains(needle))
            .map_or(Self::Unknown, |&(_, label)| label)
    }

    /// Whether this label is worth reporting.
    pub fn is_identified(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SshServer => write!(f, "SSH Server"),
            Self::WebServer => write!(f, "Web Server"),
            Self::FtpServer => write!(f, "FTP Server"),
            Self::MailServer => write!(f, "Mail Server"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
