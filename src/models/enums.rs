use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(StepType {
    Email => "Email",
    LinkedIn => "LinkedIn",
    Phone => "Phone",
});

str_enum!(Cadence {
    Standard => "standard",
    Extended => "extended",
});

str_enum!(ProviderKind {
    OpenAi => "openai",
    Gemini => "gemini",
});

impl StepType {
    /// Interpret a channel label as written by a model.
    ///
    /// Accepts the canonical values in any case plus the aliases models
    /// commonly emit ("Call", "LinkedIn Message", "E-mail", ...).
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "email" | "emailstep" | "followupemail" => Some(Self::Email),
            "linkedin" | "linkedinmessage" | "linkedinconnection" | "linkedininmail"
            | "inmail" | "li" => Some(Self::LinkedIn),
            "phone" | "phonecall" | "call" | "coldcall" | "voicemail" => Some(Self::Phone),
            _ => None,
        }
    }
}
