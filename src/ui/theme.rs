use ratatui::style::Color;

use crate::calendar::EventType;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub title: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub today: Color,
    pub event_indicator: Color,
    pub weekday_header: Color,
    pub inactive_day: Color,
    pub status_bar: Color,
    pub banner: Color,
    pub error: Color,
    pub success: Color,
    pub colegio: Color,
    pub evaluacion: Color,
    pub reunion: Color,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            title: Color::Cyan,
            selected_bg: Color::Blue,
            selected_fg: Color::White,
            today: Color::Green,
            event_indicator: Color::Cyan,
            weekday_header: Color::Yellow,
            inactive_day: Color::DarkGray,
            status_bar: Color::White,
            banner: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            colegio: Color::Blue,
            evaluacion: Color::Magenta,
            reunion: Color::Green,
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            title: Color::Rgb(136, 192, 208),
            selected_bg: Color::Rgb(59, 66, 82),
            selected_fg: Color::Rgb(236, 239, 244),
            today: Color::Rgb(163, 190, 140),
            event_indicator: Color::Rgb(129, 161, 193),
            weekday_header: Color::Rgb(235, 203, 139),
            inactive_day: Color::Rgb(76, 86, 106),
            status_bar: Color::Rgb(216, 222, 233),
            banner: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
            success: Color::Rgb(163, 190, 140),
            colegio: Color::Rgb(129, 161, 193),
            evaluacion: Color::Rgb(180, 142, 173),
            reunion: Color::Rgb(163, 190, 140),
        }
    }

    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            title: Color::Rgb(139, 233, 253),
            selected_bg: Color::Rgb(68, 71, 90),
            selected_fg: Color::Rgb(248, 248, 242),
            today: Color::Rgb(80, 250, 123),
            event_indicator: Color::Rgb(255, 121, 198),
            weekday_header: Color::Rgb(241, 250, 140),
            inactive_day: Color::Rgb(98, 114, 164),
            status_bar: Color::Rgb(248, 248, 242),
            banner: Color::Rgb(255, 184, 108),
            error: Color::Rgb(255, 85, 85),
            success: Color::Rgb(80, 250, 123),
            colegio: Color::Rgb(139, 233, 253),
            evaluacion: Color::Rgb(189, 147, 249),
            reunion: Color::Rgb(80, 250, 123),
        }
    }

    pub fn get_by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nord" => Self::nord(),
            "dracula" => Self::dracula(),
            _ => Self::default_theme(),
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "nord", "dracula"]
    }

    /// Pill color for an event type. Unknown types share the colegio pill.
    pub fn event_type_color(&self, event_type: &EventType) -> Color {
        match event_type {
            EventType::Evaluacion => self.evaluacion,
            EventType::Reunion => self.reunion,
            EventType::Colegio | EventType::Other(_) => self.colegio,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_name_falls_back_to_default() {
        assert_eq!(Theme::get_by_name("solarized").name, "default");
        assert_eq!(Theme::get_by_name("NORD").name, "nord");
    }

    #[test]
    fn unknown_event_type_uses_colegio_color() {
        let theme = Theme::default();
        let other = EventType::normalize(Some("feriado"));

        assert_eq!(theme.event_type_color(&other), theme.colegio);
        assert_ne!(theme.event_type_color(&EventType::Evaluacion), theme.colegio);
    }
}
