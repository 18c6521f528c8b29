//! Pure selectors turning raw weather data into presentation choices.

use rand::Rng;

pub const PRECIPITATION_PARTICLES: usize = 100;
pub const CLOUD_PARTICLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeOfDay {
    #[default]
    Day,
    Night,
}

impl TimeOfDay {
    /// Local hours 6..18 are day.
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) { TimeOfDay::Day } else { TimeOfDay::Night }
    }

    pub fn now() -> Self {
        use chrono::Timelike;
        Self::from_hour(chrono::Local::now().hour())
    }
}

/// Ambient background palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    ClearDay,
    ClearNight,
    CloudsDay,
    CloudsNight,
    RainDay,
    RainNight,
    SnowDay,
    SnowNight,
    Storm,
    DefaultDay,
    DefaultNight,
}

impl Theme {
    pub fn select(condition: &str, time: TimeOfDay) -> Self {
        use TimeOfDay::{Day, Night};

        match (condition.to_lowercase().as_str(), time) {
            ("thunderstorm", _) => Theme::Storm,
            ("clear", Day) => Theme::ClearDay,
            ("clear", Night) => Theme::ClearNight,
            ("clouds", Day) => Theme::CloudsDay,
            ("clouds", Night) => Theme::CloudsNight,
            ("rain", Day) => Theme::RainDay,
            ("rain", Night) => Theme::RainNight,
            ("snow", Day) => Theme::SnowDay,
            ("snow", Night) => Theme::SnowNight,
            (_, Day) => Theme::DefaultDay,
            (_, Night) => Theme::DefaultNight,
        }
    }

    /// Gradient stops, top-left to bottom-right.
    pub fn gradient(&self) -> (&'static str, &'static str) {
        match self {
            Theme::ClearDay => ("blue-400", "blue-200"),
            Theme::ClearNight => ("blue-900", "purple-900"),
            Theme::CloudsDay => ("gray-300", "blue-200"),
            Theme::CloudsNight => ("gray-800", "blue-900"),
            Theme::RainDay => ("gray-400", "blue-300"),
            Theme::RainNight => ("gray-900", "blue-800"),
            Theme::SnowDay => ("gray-100", "blue-100"),
            Theme::SnowNight => ("gray-700", "blue-900"),
            Theme::Storm => ("gray-700", "purple-900"),
            Theme::DefaultDay => ("blue-300", "green-200"),
            Theme::DefaultNight => ("blue-800", "purple-900"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    Umbrella,
    BundleUp,
    Picnic,
    SecureLooseItems,
    Jacket,
    EnjoyYourDay,
}

impl Recommendation {
    /// First matching rule wins; the order is part of the contract.
    pub fn select(temperature_c: f64, condition: &str, wind_speed_mps: f64) -> Self {
        let condition = condition.to_lowercase();

        if condition.contains("rain") || condition.contains("drizzle") {
            Recommendation::Umbrella
        } else if condition.contains("snow") {
            Recommendation::BundleUp
        } else if condition.contains("clear") && temperature_c > 25.0 {
            Recommendation::Picnic
        } else if wind_speed_mps > 5.0 {
            Recommendation::SecureLooseItems
        } else if temperature_c < 10.0 {
            Recommendation::Jacket
        } else {
            Recommendation::EnjoyYourDay
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Recommendation::Umbrella => "Don't forget your umbrella!",
            Recommendation::BundleUp => "Bundle up, it's snowing!",
            Recommendation::Picnic => "It's a great day for a picnic!",
            Recommendation::SecureLooseItems => "It's windy! Secure any loose items outside.",
            Recommendation::Jacket => "Remember to wear a jacket!",
            Recommendation::EnjoyYourDay => "Enjoy your day!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Raindrop,
    Snowflake,
    Cloud,
}

/// One decorative particle. Offsets are percentages of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub left_pct: f64,
    pub top_pct: f64,
    pub duration_secs: f64,
    pub delay_secs: f64,
}

/// Cosmetic particles seeded from the current condition.
pub fn particles<R: Rng + ?Sized>(condition: &str, rng: &mut R) -> Vec<Particle> {
    match condition.to_lowercase().as_str() {
        "rain" => (0..PRECIPITATION_PARTICLES)
            .map(|_| Particle {
                kind: ParticleKind::Raindrop,
                left_pct: rng.random_range(0.0..100.0),
                top_pct: 0.0,
                duration_secs: rng.random_range(0.5..1.0),
                delay_secs: rng.random_range(0.0..2.0),
            })
            .collect(),
        "snow" => (0..PRECIPITATION_PARTICLES)
            .map(|_| Particle {
                kind: ParticleKind::Snowflake,
                left_pct: rng.random_range(0.0..100.0),
                top_pct: 0.0,
                duration_secs: rng.random_range(5.0..15.0),
                delay_secs: rng.random_range(0.0..5.0),
            })
            .collect(),
        "clouds" => (0..CLOUD_PARTICLES)
            .map(|_| Particle {
                kind: ParticleKind::Cloud,
                left_pct: rng.random_range(-20.0..-10.0),
                top_pct: rng.random_range(0.0..40.0),
                duration_secs: rng.random_range(20.0..30.0),
                delay_secs: rng.random_range(0.0..5.0),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_boundaries() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn thunderstorm_ignores_time_of_day() {
        assert_eq!(
            Theme::select("Thunderstorm", TimeOfDay::Day),
            Theme::select("Thunderstorm", TimeOfDay::Night)
        );
    }

    #[test]
    fn clear_differs_by_time_of_day() {
        let day = Theme::select("Clear", TimeOfDay::Day);
        let night = Theme::select("Clear", TimeOfDay::Night);
        assert_ne!(day, night);
        assert_ne!(day.gradient(), night.gradient());
    }

    #[test]
    fn unknown_condition_uses_default_palette() {
        assert_eq!(Theme::select("Mist", TimeOfDay::Day), Theme::DefaultDay);
        assert_eq!(Theme::select("Haze", TimeOfDay::Night), Theme::DefaultNight);
    }

    #[test]
    fn hot_clear_day_is_picnic_weather() {
        assert_eq!(Recommendation::select(30.0, "Clear", 2.0), Recommendation::Picnic);
    }

    #[test]
    fn snow_outranks_cold() {
        assert_eq!(Recommendation::select(5.0, "Snow", 2.0), Recommendation::BundleUp);
    }

    #[test]
    fn rule_priority_order() {
        // Rain beats wind and cold.
        assert_eq!(Recommendation::select(2.0, "Drizzle", 12.0), Recommendation::Umbrella);
        // Picnic beats wind.
        assert_eq!(Recommendation::select(28.0, "Clear", 9.0), Recommendation::Picnic);
        // Wind beats cold.
        assert_eq!(Recommendation::select(3.0, "Clouds", 6.0), Recommendation::SecureLooseItems);
        assert_eq!(Recommendation::select(3.0, "Clouds", 5.0), Recommendation::Jacket);
        assert_eq!(Recommendation::select(25.0, "Clear", 1.0), Recommendation::EnjoyYourDay);
    }

    #[test]
    fn particles_follow_condition() {
        let mut rng = rand::rng();

        let rain = particles("Rain", &mut rng);
        assert_eq!(rain.len(), PRECIPITATION_PARTICLES);
        assert!(rain.iter().all(|p| p.kind == ParticleKind::Raindrop
            && (0.0..100.0).contains(&p.left_pct)
            && (0.5..1.0).contains(&p.duration_secs)));

        assert_eq!(particles("Snow", &mut rng).len(), PRECIPITATION_PARTICLES);
        assert_eq!(particles("Clouds", &mut rng).len(), CLOUD_PARTICLES);
        assert!(particles("Clear", &mut rng).is_empty());
    }
}
