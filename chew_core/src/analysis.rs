//! The per-capture food assessment and its normalization.
//!
//! Values come from an opaque external model and are treated as untrusted:
//! every field is defaulted or clamped so the rest of the engine can rely on
//! the documented ranges.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lowest chew target accepted from the estimation service.
pub const MIN_CHEWS: u32 = 15;
/// Highest chew target accepted from the estimation service.
pub const MAX_CHEWS: u32 = 50;

const DEFAULT_FOOD_NAME: &str = "未知餐食";
const DEFAULT_CALORIES: u32 = 300;
const DEFAULT_CHEWS: u32 = 25;
const DEFAULT_TIP: &str = "充分咀嚼可以帮助身体更好地代谢热量。";

/// Categorical firmness estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureLevel {
    Soft,
    #[default]
    Medium,
    Hard,
}

impl TextureLevel {
    /// Case-insensitive parse; anything unrecognised is `Medium`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Self::Soft,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "Soft",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for TextureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dish as assessed from one photo. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub food_name: String,
    pub calories: u32,
    pub texture_level: TextureLevel,
    pub recommended_chews: u32,
    pub fat_shield_tip: String,
}

/// Fields pulled out of the service reply; every one may be absent or odd.
#[derive(Debug, Default)]
struct RawAnalysis {
    food_name: Option<String>,
    calories: Option<f64>,
    texture_level: Option<String>,
    recommended_chews: Option<f64>,
    fat_shield_tip: Option<String>,
}

impl FoodAnalysis {
    /// Substitute used whenever the estimation request fails in any way.
    pub fn fallback() -> Self {
        Self {
            food_name: "AI 连接中断".to_string(),
            calories: 0,
            texture_level: TextureLevel::Medium,
            recommended_chews: 30,
            fat_shield_tip:
                "网络信号不佳，无法启动AI分析。请手动保持慢速进食，建议每口咀嚼 30 次。"
                    .to_string(),
        }
    }

    /// Canned result used when no camera could be opened.
    pub fn demo() -> Self {
        Self {
            food_name: "红烧肉饭 (演示)".to_string(),
            calories: 850,
            texture_level: TextureLevel::Hard,
            recommended_chews: 45,
            fat_shield_tip: "高热量预警：必须彻底嚼碎以减少脂肪堆积！".to_string(),
        }
    }

    /// Parse the service's JSON text and normalize it.
    ///
    /// Tolerates a Markdown code fence around the object. Fails only when the
    /// text is not a JSON object; a field of the wrong type gets its default.
    pub fn from_reply(text: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(strip_code_fence(text))?;
        Ok(RawAnalysis::from_map(&map).normalize())
    }

    /// Chew target for the pacer, re-clamped because the fields are public.
    pub fn target_chews(&self) -> u32 {
        self.recommended_chews.clamp(MIN_CHEWS, MAX_CHEWS)
    }
}

impl RawAnalysis {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            food_name: map.get("foodName").and_then(text_field),
            calories: map.get("calories").and_then(number_field),
            texture_level: map.get("textureLevel").and_then(text_field),
            recommended_chews: map.get("recommendedChews").and_then(number_field),
            fat_shield_tip: map.get("fatShieldTip").and_then(text_field),
        }
    }

    fn normalize(self) -> FoodAnalysis {
        let calories = match self.calories.and_then(whole) {
            None | Some(0) => DEFAULT_CALORIES,
            Some(v) => u32::try_from(v.max(0)).unwrap_or(u32::MAX),
        };
        let chews = match self.recommended_chews.and_then(whole) {
            None | Some(0) => DEFAULT_CHEWS,
            Some(v) => u32::try_from(v.clamp(i64::from(MIN_CHEWS), i64::from(MAX_CHEWS)))
                .unwrap_or(DEFAULT_CHEWS),
        };
        FoodAnalysis {
            food_name: non_blank(self.food_name).unwrap_or_else(|| DEFAULT_FOOD_NAME.to_string()),
            calories,
            texture_level: self
                .texture_level
                .as_deref()
                .map(TextureLevel::parse_lenient)
                .unwrap_or_default(),
            recommended_chews: chews,
            fat_shield_tip: non_blank(self.fat_shield_tip).unwrap_or_else(|| DEFAULT_TIP.to_string()),
        }
    }
}

fn text_field(v: &Value) -> Option<String> {
    v.as_str().map(str::to_string)
}

/// JSON numbers, or strings holding one (`"620"`).
fn number_field(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Round a finite number to an integer; NaN and infinities are "absent".
#[allow(clippy::cast_possible_truncation)]
fn whole(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    // float-to-int `as` saturates
    Some(v.round() as i64)
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
