use crate::foundation::core::Rgba8;

/// Visual theme applied to an effect. Templates receive it by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Notion,
    Cyberpunk,
    Apple,
    Aurora,
}

/// Colors the raster renderer paints with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub panel: Rgba8,
    pub accent: Rgba8,
    pub text: Rgba8,
    pub muted: Rgba8,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Notion, Theme::Cyberpunk, Theme::Apple, Theme::Aurora];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Notion => "notion",
            Theme::Cyberpunk => "cyberpunk",
            Theme::Apple => "apple",
            Theme::Aurora => "aurora",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Notion => Palette {
                panel: Rgba8::new(255, 255, 255, 240),
                accent: Rgba8::opaque(235, 87, 87),
                text: Rgba8::opaque(55, 53, 47),
                muted: Rgba8::opaque(120, 119, 116),
            },
            Theme::Cyberpunk => Palette {
                panel: Rgba8::new(13, 2, 33, 225),
                accent: Rgba8::opaque(0, 255, 240),
                text: Rgba8::opaque(255, 255, 255),
                muted: Rgba8::opaque(255, 0, 160),
            },
            Theme::Apple => Palette {
                panel: Rgba8::new(250, 250, 252, 220),
                accent: Rgba8::opaque(0, 122, 255),
                text: Rgba8::opaque(29, 29, 31),
                muted: Rgba8::opaque(110, 110, 115),
            },
            Theme::Aurora => Palette {
                panel: Rgba8::new(16, 24, 48, 215),
                accent: Rgba8::opaque(122, 255, 196),
                text: Rgba8::opaque(240, 248, 255),
                muted: Rgba8::opaque(167, 139, 250),
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/theme.rs"]
mod tests;
