use std::fmt;

/// Theme value carried by the host page's root element.
///
/// `light` and `dark` are the known members. Anything else the host sets is
/// kept verbatim and forwarded to the widget (giscus accepts names such as
/// `preferred_color_scheme` or `dark_dimmed`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Other(String),
}

impl Theme {
    /// Interprets a raw attribute value. Absent or blank means `light`.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Theme::Light;
        };
        match value {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            other => Theme::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Other(s) => s,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
