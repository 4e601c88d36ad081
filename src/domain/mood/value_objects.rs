//! Mood Context - Value Objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::MoodError;

/// 检测到的情绪
///
/// 序列化为首字母大写的名称（`"Happy"`、`"Neutral"` 等）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Neutral,
}

impl Mood {
    /// 无法得出可信结果时返回给调用方的兜底值
    pub const FALLBACK: Mood = Mood::Neutral;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Energetic => "Energetic",
            Self::Calm => "Calm",
            Self::Neutral => "Neutral",
        }
    }
}

impl FromStr for Mood {
    type Err = MoodError;

    /// 大小写不敏感，忽略首尾空白
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "energetic" => Ok(Self::Energetic),
            "calm" => Ok(Self::Calm),
            "neutral" => Ok(Self::Neutral),
            _ => Err(MoodError::UnknownMood(s.to_string())),
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 待分析的图片负载（通常是 base64 data URI）
///
/// 内容对本服务不透明，只保证非空
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn new(data: impl Into<String>) -> Result<Self, MoodError> {
        let data = data.into();
        if data.is_empty() {
            return Err(MoodError::EmptyPayload);
        }
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// 负载可能有数 MB，Debug 只输出长度
impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_parse_is_case_insensitive() {
        assert_eq!("happy".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!(" Calm ".parse::<Mood>().unwrap(), Mood::Calm);
        assert_eq!("ENERGETIC".parse::<Mood>().unwrap(), Mood::Energetic);
        assert!("ecstatic".parse::<Mood>().is_err());
    }

    #[test]
    fn test_mood_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&Mood::Sad).unwrap(), "\"Sad\"");
        assert_eq!(Mood::FALLBACK, Mood::Neutral);
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(ImagePayload::new("").is_err());
        let payload = ImagePayload::new("data:image/png;base64,AAAA").unwrap();
        assert_eq!(payload.len(), 26);
        assert!(!format!("{:?}", payload).contains("base64"));
    }
}
