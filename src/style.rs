//! Planet presentation styles
//!
//! Looked up by planet name, case-insensitive. Unknown planets get a plain
//! gray disc.

/// Translucent ring drawn inside the planet's edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rim {
    /// Distance from the planet edge (px)
    pub inset_px: u8,
    /// Border width (px)
    pub width_px: u8,
    /// CSS color
    pub color: &'static str,
}

/// How a planet is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetStyle {
    /// Left-to-right gradient stops (a single stop is a solid fill)
    pub gradient: &'static [&'static str],
    pub rim: Option<Rim>,
}

impl PlanetStyle {
    /// CSS `background` value
    pub fn background_css(&self) -> String {
        match self.gradient {
            [] => "transparent".to_string(),
            [solid] => solid.to_string(),
            stops => format!("linear-gradient(to right, {})", stops.join(", ")),
        }
    }

    /// Inline CSS for the rim element, if this style has one
    pub fn rim_css(&self) -> Option<String> {
        self.rim.map(|rim| {
            format!(
                "position:absolute;inset:{}px;border-radius:9999px;border:{}px solid {};",
                rim.inset_px, rim.width_px, rim.color
            )
        })
    }
}

pub const DEFAULT_STYLE: PlanetStyle = PlanetStyle {
    gradient: &["#9ca3af"],
    rim: None,
};

const MERCURY: PlanetStyle = PlanetStyle {
    gradient: &["#fdba74", "#facc15", "#fdba74"],
    rim: Some(Rim {
        inset_px: 8,
        width_px: 2,
        color: "rgba(254, 215, 170, 0.3)",
    }),
};

const VENUS: PlanetStyle = PlanetStyle {
    gradient: &["#fef08a", "#fed7aa", "#fef9c3"],
    rim: Some(Rim {
        inset_px: 4,
        width_px: 4,
        color: "rgba(254, 249, 195, 0.2)",
    }),
};

const EARTH: PlanetStyle = PlanetStyle {
    gradient: &["#60a5fa", "#4ade80", "#3b82f6"],
    rim: Some(Rim {
        inset_px: 8,
        width_px: 2,
        color: "rgba(191, 219, 254, 0.3)",
    }),
};

const MARS: PlanetStyle = PlanetStyle {
    gradient: &["#ef4444", "#f87171", "#ef4444"],
    rim: Some(Rim {
        inset_px: 8,
        width_px: 2,
        color: "rgba(252, 165, 165, 0.3)",
    }),
};

/// Style for a planet name
pub fn style_for(name: &str) -> &'static PlanetStyle {
    match name.to_lowercase().as_str() {
        "mercury" => &MERCURY,
        "venus" => &VENUS,
        "earth" => &EARTH,
        "mars" => &MARS,
        _ => &DEFAULT_STYLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(style_for("Earth"), style_for("EARTH"));
        assert_eq!(style_for("earth"), style_for("EARTH"));
        assert_ne!(style_for("earth"), &DEFAULT_STYLE);
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(style_for("Pluto"), &DEFAULT_STYLE);
        assert_eq!(style_for(""), &DEFAULT_STYLE);
    }

    #[test]
    fn test_background_css() {
        assert_eq!(DEFAULT_STYLE.background_css(), "#9ca3af");
        assert_eq!(
            style_for("mars").background_css(),
            "linear-gradient(to right, #ef4444, #f87171, #ef4444)"
        );
    }

    #[test]
    fn test_rim_css() {
        assert!(DEFAULT_STYLE.rim_css().is_none());
        let rim = style_for("Venus").rim_css().unwrap();
        assert!(rim.contains("inset:4px"));
        assert!(rim.contains("border:4px solid rgba(254, 249, 195, 0.2)"));
    }

    proptest! {
        #[test]
        fn prop_lookup_ignores_case(name in "(mercury|venus|earth|mars|pluto)", flips in any::<u8>()) {
            let mixed: String = name
                .chars()
                .enumerate()
                .map(|(i, c)| if flips >> (i % 8) & 1 == 1 { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(style_for(&mixed), style_for(&name));
        }
    }
}
