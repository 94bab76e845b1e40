use crate::effects::document::{FancyStyle, Platform, StatValue};
use crate::effects::theme::Theme;
use crate::foundation::core::Position;
use crate::timing::window::Span;

/// Closed set of effect kinds, in the order layers are stacked (first drawn lowest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectKind {
    LowerThird,
    ChapterTitle,
    FancyText,
    TermCard,
    QuoteCallout,
    AnimatedStat,
    BulletPoints,
    SocialBar,
}

impl EffectKind {
    pub const ALL: [EffectKind; 8] = [
        EffectKind::LowerThird,
        EffectKind::ChapterTitle,
        EffectKind::FancyText,
        EffectKind::TermCard,
        EffectKind::QuoteCallout,
        EffectKind::AnimatedStat,
        EffectKind::BulletPoints,
        EffectKind::SocialBar,
    ];

    /// Name of the array holding this kind in the effects document.
    pub fn config_key(self) -> &'static str {
        match self {
            EffectKind::LowerThird => "lowerThirds",
            EffectKind::ChapterTitle => "chapterTitles",
            EffectKind::FancyText => "keyPhrases",
            EffectKind::TermCard => "termDefinitions",
            EffectKind::QuoteCallout => "quotes",
            EffectKind::AnimatedStat => "stats",
            EffectKind::BulletPoints => "bulletPoints",
            EffectKind::SocialBar => "socialBars",
        }
    }

    /// Template stem used by the DOM-driven renderer (`<stem>.html`).
    pub fn template_name(self) -> &'static str {
        match self {
            EffectKind::LowerThird => "lower-third",
            EffectKind::ChapterTitle => "chapter-title",
            EffectKind::FancyText => "fancy-text",
            EffectKind::TermCard => "term-card",
            EffectKind::QuoteCallout => "quote-callout",
            EffectKind::AnimatedStat => "animated-stats",
            EffectKind::BulletPoints => "bullet-points",
            EffectKind::SocialBar => "social-bar",
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.template_name())
    }
}

/// Kind-specific content of an effect, with optional text fields already defaulted.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectContent {
    LowerThird {
        name: String,
        role: String,
        company: String,
    },
    ChapterTitle {
        number: String,
        title: String,
        subtitle: String,
    },
    FancyText {
        text: String,
        style: FancyStyle,
    },
    TermCard {
        chinese: String,
        english: String,
        description: String,
    },
    QuoteCallout {
        text: String,
        author: String,
    },
    AnimatedStat {
        prefix: String,
        number: StatValue,
        unit: String,
        label: String,
    },
    BulletPoints {
        title: String,
        points: Vec<String>,
    },
    SocialBar {
        platform: Platform,
        handle: String,
        label: String,
    },
}

impl EffectContent {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectContent::LowerThird { .. } => EffectKind::LowerThird,
            EffectContent::ChapterTitle { .. } => EffectKind::ChapterTitle,
            EffectContent::FancyText { .. } => EffectKind::FancyText,
            EffectContent::TermCard { .. } => EffectKind::TermCard,
            EffectContent::QuoteCallout { .. } => EffectKind::QuoteCallout,
            EffectContent::AnimatedStat { .. } => EffectKind::AnimatedStat,
            EffectContent::BulletPoints { .. } => EffectKind::BulletPoints,
            EffectContent::SocialBar { .. } => EffectKind::SocialBar,
        }
    }
}

/// A validated effect instance: every default resolved, time window normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEffect {
    /// Stable instance label such as `keyPhrases[2]`, used in logs and errors.
    pub label: String,
    pub content: EffectContent,
    pub theme: Theme,
    pub position: Position,
    pub span: Span,
}

impl ResolvedEffect {
    pub fn kind(&self) -> EffectKind {
        self.content.kind()
    }

    /// Configuration object pushed to a DOM template's `initAnimation`.
    pub fn template_config(&self) -> serde_json::Value {
        use serde_json::json;

        let mut cfg = match &self.content {
            EffectContent::LowerThird {
                name,
                role,
                company,
            } => json!({ "name": name, "role": role, "company": company }),
            EffectContent::ChapterTitle {
                number,
                title,
                subtitle,
            } => json!({ "number": number, "title": title, "subtitle": subtitle }),
            EffectContent::FancyText { text, style } => json!({ "text": text, "style": style }),
            EffectContent::TermCard {
                chinese,
                english,
                description,
            } => json!({ "chinese": chinese, "english": english, "description": description }),
            EffectContent::QuoteCallout { text, author } => {
                json!({ "text": text, "author": author })
            }
            EffectContent::AnimatedStat {
                prefix,
                number,
                unit,
                label,
            } => json!({ "prefix": prefix, "number": number, "unit": unit, "label": label }),
            EffectContent::BulletPoints { title, points } => {
                json!({ "title": title, "points": points })
            }
            EffectContent::SocialBar {
                platform,
                handle,
                label,
            } => json!({ "platform": platform, "handle": handle, "label": label }),
        };

        if let Some(obj) = cfg.as_object_mut() {
            obj.insert("theme".into(), json!(self.theme.name()));
            obj.insert(
                "position".into(),
                json!({ "x": self.position.x, "y": self.position.y }),
            );
            obj.insert("durationMs".into(), json!(self.span.duration_ms));
        }
        cfg
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/model.rs"]
mod tests;
