use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::str::FromStr;

/// Mime type attached to raw PCM chunks sent as realtime input.
pub const PCM_MIME_TYPE: &str = "audio/pcm";

/// Mime type of the container produced for completed audio turns.
pub const WAV_MIME_TYPE: &str = "audio/wav";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Voice {
    Aoede,
    Charon,
    Fenrir,
    Kore,
    #[default]
    Puck,
    Custom(String),
}

impl Voice {
    pub fn as_str(&self) -> &str {
        match self {
            Voice::Aoede => "Aoede",
            Voice::Charon => "Charon",
            Voice::Fenrir => "Fenrir",
            Voice::Kore => "Kore",
            Voice::Puck => "Puck",
            Voice::Custom(s) => s,
        }
    }
}

impl Serialize for Voice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Aoede" => Voice::Aoede,
            "Charon" => Voice::Charon,
            "Fenrir" => Voice::Fenrir,
            "Kore" => Voice::Kore,
            "Puck" => Voice::Puck,
            _ => Voice::Custom(s.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for Voice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Voice::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The kind of output the model answers with.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, Default)]
pub enum Modality {
    #[default]
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "AUDIO")]
    Audio,
}
