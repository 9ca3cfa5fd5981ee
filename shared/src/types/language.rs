//! Language and internationalization types

use serde::{Deserialize, Serialize};

/// Language preference for response messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[default]
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    /// Pick the highest-weighted supported language from an `Accept-Language`
    /// header, e.g. `"en-US,en;q=0.9,zh;q=0.8"`. Falls back to the default.
    pub fn from_accept_language(header: &str) -> Self {
        let mut preferred = Language::default();
        let mut max_quality = 0.0_f32;

        for part in header.split(',') {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next().unwrap_or("").trim().to_lowercase();
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let lang = if tag.starts_with("zh") {
                Language::Chinese
            } else if tag.starts_with("en") {
                Language::English
            } else {
                continue;
            };

            if quality > max_quality {
                preferred = lang;
                max_quality = quality;
            }
        }

        preferred
    }

    /// Get language code (ISO 639-1)
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_accept_language() {
        assert_eq!(Language::from_accept_language("en-US,en;q=0.9"), Language::English);
        assert_eq!(Language::from_accept_language("zh-CN,zh;q=0.9,en;q=0.8"), Language::Chinese);
        assert_eq!(Language::from_accept_language("en;q=0.5,zh;q=0.8"), Language::Chinese);
        assert_eq!(Language::from_accept_language("fr-FR"), Language::Chinese);
        assert_eq!(Language::from_accept_language(""), Language::Chinese);
    }

    #[test]
    fn test_serde_codes() {
        assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"en\"");
        assert_eq!(serde_json::from_str::<Language>("\"zh\"").unwrap(), Language::Chinese);
    }
}
