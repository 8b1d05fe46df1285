use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used by the cluster prompt.
///
/// Built from one of the Catppuccin flavors, chosen by name in the config
/// file.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub surface0: Color,
    pub overlay0: Color,
    pub text: Color,
    pub subtext0: Color,
    pub mauve: Color,
    pub peach: Color,
    pub green: Color,
    pub lavender: Color,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface0: catppuccin_to_color(&c.surface0),
            overlay0: catppuccin_to_color(&c.overlay0),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            peach: catppuccin_to_color(&c.peach),
            green: catppuccin_to_color(&c.green),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    /// Prompt prefix and title.
    #[must_use]
    pub const fn accent(&self) -> Color {
        self.mauve
    }

    /// Selected suggestion background.
    #[must_use]
    pub const fn selection(&self) -> Color {
        self.surface0
    }

    /// Suggestion descriptions and hints.
    #[must_use]
    pub const fn muted(&self) -> Color {
        self.subtext0
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// Look up a theme by name. Returns the default theme if not found.
pub fn theme_from_name(name: &str) -> Theme {
    match name {
        "Catppuccin Mocha" => Theme::catppuccin_mocha(),
        "Catppuccin Macchiato" => Theme::catppuccin_macchiato(),
        "Catppuccin Frappé" | "Catppuccin Frappe" => Theme::catppuccin_frappe(),
        "Catppuccin Latte" => Theme::catppuccin_latte(),
        _ => Theme::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let latte = theme_from_name("Catppuccin Latte");
        assert_eq!(latte.base, Theme::catppuccin_latte().base);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_mocha() {
        let theme = theme_from_name("Solarized");
        assert_eq!(theme.base, Theme::catppuccin_mocha().base);
    }
}
