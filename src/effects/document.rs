use crate::effects::theme::Theme;
use crate::foundation::error::{CutawayError, CutawayResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The effects document as authored: a top-level theme plus one array per effect kind.
///
/// Required fields are modelled as `Option` here so that missing values surface as
/// validation errors naming the offending entry, not as opaque parse failures.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsDocument {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub lower_thirds: Vec<LowerThirdDef>,
    #[serde(default)]
    pub chapter_titles: Vec<ChapterTitleDef>,
    #[serde(default)]
    pub key_phrases: Vec<KeyPhraseDef>,
    #[serde(default)]
    pub term_definitions: Vec<TermDefinitionDef>,
    #[serde(default)]
    pub quotes: Vec<QuoteDef>,
    #[serde(default)]
    pub stats: Vec<StatDef>,
    #[serde(default)]
    pub bullet_points: Vec<BulletPointsDef>,
    #[serde(default)]
    pub social_bars: Vec<SocialBarDef>,
}

impl EffectsDocument {
    pub fn from_json_str(s: &str) -> CutawayResult<Self> {
        serde_json::from_str(s).map_err(|e| CutawayError::serde(format!("effects document: {e}")))
    }

    pub fn from_path(path: &Path) -> CutawayResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read effects document '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Total number of effect entries across all kinds.
    pub fn len(&self) -> usize {
        self.lower_thirds.len()
            + self.chapter_titles.len()
            + self.key_phrases.len()
            + self.term_definitions.len()
            + self.quotes.len()
            + self.stats.len()
            + self.bullet_points.len()
            + self.social_bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fields shared by every entry kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonDef {
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    pub theme: Option<Theme>,
    pub position: Option<PositionDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionDef {
    pub x: f64,
    pub y: f64,
}

impl<'de> Deserialize<'de> for PositionDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj { x: f64, y: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => Ok(Self { x, y }),
            Repr::Obj { x, y } => Ok(Self { x, y }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowerThirdDef {
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterTitleDef {
    pub title: Option<String>,
    pub number: Option<StatValue>,
    pub subtitle: Option<String>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhraseDef {
    pub text: Option<String>,
    pub style: Option<FancyStyle>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDefinitionDef {
    pub chinese: Option<String>,
    pub english: Option<String>,
    pub description: Option<String>,
    pub first_appearance_ms: Option<i64>,
    pub display_duration_seconds: Option<f64>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDef {
    pub text: Option<String>,
    pub author: Option<String>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatDef {
    pub number: Option<StatValue>,
    pub prefix: Option<String>,
    pub unit: Option<String>,
    pub label: Option<String>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletPointsDef {
    pub title: Option<String>,
    pub points: Option<Vec<String>>,
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialBarDef {
    pub handle: Option<String>,
    pub platform: Option<Platform>,
    pub label: Option<String>,
    #[serde(flatten)]
    pub common: CommonDef,
}

/// Highlight style of a key phrase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FancyStyle {
    #[default]
    Emphasis,
    Term,
    Number,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Twitter,
    Weibo,
    Youtube,
}

/// A figure that may be authored as a JSON number or as text (`"3.5"`, `"第一章"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    /// Numeric value when the figure can be counted up to.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Number(v) if v.is_finite() => Some(*v),
            StatValue::Number(_) => None,
            StatValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Number of fractional digits to display, taken from how the figure was written.
    pub fn decimals(&self) -> usize {
        let text = match self {
            StatValue::Number(v) => format!("{v}"),
            StatValue::Text(s) => s.trim().to_owned(),
        };
        text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
    }

    pub fn display(&self) -> String {
        match self {
            StatValue::Number(v) => format!("{v}"),
            StatValue::Text(s) => s.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/document.rs"]
mod tests;
