//! Voice presets
//!
//! A fixed closed set of assistant voices. "grandma" is not a BCP-47 tag but
//! a persona preset: an en-US voice pitched down and slowed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceLocale {
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "it-IT")]
    ItIt,
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "grandma")]
    Grandma,
}

impl VoiceLocale {
    pub const ALL: [VoiceLocale; 4] = [
        VoiceLocale::EnUs,
        VoiceLocale::ItIt,
        VoiceLocale::ZhCn,
        VoiceLocale::Grandma,
    ];

    pub fn voice_config(self) -> VoiceConfig {
        match self {
            VoiceLocale::EnUs => VoiceConfig {
                name: "en-US-Standard-D",
                language_code: "en-US",
                ssml_gender: "MALE",
                pitch: 0.0,
                speaking_rate: 1.1,
            },
            VoiceLocale::ItIt => VoiceConfig {
                name: "it-IT-Standard-A",
                language_code: "it-IT",
                ssml_gender: "FEMALE",
                pitch: 0.0,
                speaking_rate: 1.0,
            },
            VoiceLocale::ZhCn => VoiceConfig {
                name: "cmn-CN-Standard-A",
                language_code: "cmn-CN",
                ssml_gender: "FEMALE",
                pitch: 0.0,
                speaking_rate: 1.0,
            },
            VoiceLocale::Grandma => VoiceConfig {
                name: "en-US-Standard-C",
                language_code: "en-US",
                ssml_gender: "FEMALE",
                pitch: -4.0,
                speaking_rate: 0.85,
            },
        }
    }
}

impl fmt::Display for VoiceLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            VoiceLocale::EnUs => "en-US",
            VoiceLocale::ItIt => "it-IT",
            VoiceLocale::ZhCn => "zh-CN",
            VoiceLocale::Grandma => "grandma",
        };
        f.write_str(tag)
    }
}

impl FromStr for VoiceLocale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en-US" => Ok(VoiceLocale::EnUs),
            "it-IT" => Ok(VoiceLocale::ItIt),
            "zh-CN" => Ok(VoiceLocale::ZhCn),
            "grandma" => Ok(VoiceLocale::Grandma),
            other => Err(anyhow::anyhow!("Unsupported voice locale: {}", other)),
        }
    }
}

/// TTS provider voice configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub name: &'static str,
    pub language_code: &'static str,
    pub ssml_gender: &'static str,
    pub pitch: f32,
    pub speaking_rate: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_locale_tag() {
        for locale in VoiceLocale::ALL {
            let parsed: VoiceLocale = locale.to_string().parse().unwrap();
            assert_eq!(parsed, locale);
        }
    }

    #[test]
    fn rejects_unknown_locale() {
        assert!("fr-FR".parse::<VoiceLocale>().is_err());
    }

    #[test]
    fn grandma_preset_is_slower_and_lower() {
        let config = VoiceLocale::Grandma.voice_config();
        assert!(config.pitch < 0.0);
        assert!(config.speaking_rate < 1.0);
        assert_eq!(config.language_code, "en-US");
    }

    #[test]
    fn serde_uses_locale_tags() {
        let json = serde_json::to_string(&VoiceLocale::ZhCn).unwrap();
        assert_eq!(json, "\"zh-CN\"");
        let parsed: VoiceLocale = serde_json::from_str("\"grandma\"").unwrap();
        assert_eq!(parsed, VoiceLocale::Grandma);
    }
}
