use serde::{Deserialize, Serialize};

/// Editor colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Flip to the other theme and return it
    pub fn toggle(&mut self) -> Theme {
        *self = match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
        *self
    }

    pub fn editor_theme(&self) -> &'static str {
        match self {
            Theme::Dark => "vs-dark",
            Theme::Light => "vs",
        }
    }

    /// Page class toggled on for the light variant
    pub fn body_class(&self) -> Option<&'static str> {
        match self {
            Theme::Dark => None,
            Theme::Light => Some("light-theme"),
        }
    }
}
