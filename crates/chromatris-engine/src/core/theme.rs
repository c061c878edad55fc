use serde::{Deserialize, Serialize};

use super::{block::Rgb, piece::PieceKind};

/// Named color palettes shipped with the game.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    #[display("classic")]
    Classic,
    #[display("pastel")]
    Pastel,
    #[display("high-contrast")]
    HighContrast,
}

/// Maps each [`PieceKind`] to the color its blocks are painted with.
///
/// The theme is handed to the [`Board`](crate::Board) explicitly; nothing
/// reads a global palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    colors: [Rgb; PieceKind::LEN],
}

impl Default for Theme {
    fn default() -> Self {
        Self::CLASSIC
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        match name {
            ThemeName::Classic => Self::CLASSIC,
            ThemeName::Pastel => Self::PASTEL,
            ThemeName::HighContrast => Self::HIGH_CONTRAST,
        }
    }
}

impl Theme {
    // Order follows `PieceKind::ALL`: I, O, S, Z, J, L, T.
    pub const CLASSIC: Self = Self::new([
        Rgb::new(0, 255, 255),
        Rgb::new(255, 255, 0),
        Rgb::new(0, 255, 0),
        Rgb::new(255, 0, 0),
        Rgb::new(0, 0, 255),
        Rgb::new(255, 127, 0),
        Rgb::new(255, 0, 255),
    ]);
    pub const PASTEL: Self = Self::new([
        Rgb::new(160, 230, 235),
        Rgb::new(250, 240, 170),
        Rgb::new(180, 235, 180),
        Rgb::new(245, 170, 170),
        Rgb::new(170, 185, 240),
        Rgb::new(250, 205, 160),
        Rgb::new(220, 180, 235),
    ]);
    pub const HIGH_CONTRAST: Self = Self::new([
        Rgb::new(255, 255, 255),
        Rgb::new(255, 215, 0),
        Rgb::new(0, 200, 0),
        Rgb::new(230, 0, 0),
        Rgb::new(30, 90, 255),
        Rgb::new(255, 120, 0),
        Rgb::new(200, 0, 200),
    ]);

    #[must_use]
    pub const fn new(colors: [Rgb; PieceKind::LEN]) -> Self {
        Self { colors }
    }

    #[must_use]
    pub const fn color_of(&self, kind: PieceKind) -> Rgb {
        self.colors[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes_give_each_kind_its_own_color() {
        for name in [ThemeName::Classic, ThemeName::Pastel, ThemeName::HighContrast] {
            let theme = Theme::from(name);
            for (i, a) in PieceKind::ALL.iter().enumerate() {
                for b in &PieceKind::ALL[i + 1..] {
                    assert_ne!(theme.color_of(*a), theme.color_of(*b), "{name}: {a:?}/{b:?}");
                }
            }
        }
    }

    #[test]
    fn test_theme_name_uses_kebab_case() {
        let json = serde_json::to_string(&ThemeName::HighContrast).unwrap();
        assert_eq!(json, "\"high-contrast\"");
        assert_eq!(ThemeName::HighContrast.to_string(), "high-contrast");
    }
}
