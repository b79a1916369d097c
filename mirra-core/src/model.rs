//! Domain data structures for collection schedules and widget readings.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// How often a collection stream recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every week on the configured weekday.
    Weekly,
    /// Every other week, phase-anchored to the reference date.
    Biweekly,
}

impl Frequency {
    /// Length of one recurrence cycle in weeks.
    #[must_use]
    pub fn cycle_weeks(self) -> i64 {
        match self {
            Frequency::Weekly => 1,
            Frequency::Biweekly => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One recurring waste-collection stream.
pub struct CollectionRule {
    /// Display label, unique within a configuration.
    pub name: String,
    /// Weekday the collection occurs on (0 = Sunday … 6 = Saturday).
    pub day_of_week: u8,
    /// Weekly or biweekly cadence.
    pub frequency: Frequency,
    /// For biweekly rules: which of the two cycle weeks this rule fires on.
    #[serde(default)]
    pub week_offset: u8,
    /// A known, historically correct collection date anchoring the phase.
    pub reference_date: NaiveDate,
    /// Opaque display color token; not interpreted by the resolver.
    #[serde(default)]
    pub accent: String,
}

impl CollectionRule {
    /// The configured weekday, if `day_of_week` is in range.
    #[must_use]
    pub fn weekday(&self) -> Option<Weekday> {
        weekday_from_sunday_index(self.day_of_week)
    }
}

/// Map a Sunday-based weekday index (0 = Sunday … 6 = Saturday) to [`Weekday`].
#[must_use]
pub fn weekday_from_sunday_index(index: u8) -> Option<Weekday> {
    let weekday = match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => return None,
    };
    Some(weekday)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A one-off substitution moving a collection from its normal date.
pub struct HolidayException {
    /// Date that would normally be the collection day.
    pub original_date: NaiveDate,
    /// Date the collection actually happens on.
    pub revised_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Resolved outcome for one rule, recomputed in full on every evaluation.
pub struct ResolvedCollection {
    /// Rule label.
    pub name: String,
    /// Display color token carried through from the rule.
    pub accent: String,
    /// The evening the bins should go out (one day before pickup).
    pub display_date: NaiveDate,
    /// Whole days from now until `display_date`, rounded up.
    pub days_until: i64,
    /// How many days a holiday exception pushed the pickup later.
    pub days_delay: i64,
    /// Today is the evening the bins go out.
    pub is_display_day: bool,
    /// Today is the pickup day itself.
    pub is_collection_day: bool,
    /// The current hour is still before the configured cutoff.
    pub before_cutoff: bool,
}

/// Coarse weather condition, mapped from OpenWeather condition ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherKind {
    /// Condition group 2xx.
    Thunderstorm,
    /// Condition group 3xx.
    Drizzle,
    /// Condition group 5xx.
    Rain,
    /// Condition group 6xx.
    Snow,
    /// Condition group 7xx (mist, fog, dust, …).
    Atmosphere,
    /// Condition 800.
    Clear,
    /// Conditions 801–804.
    Clouds,
}

impl WeatherKind {
    /// Map an OpenWeather condition id to its kind, if the id is known.
    #[must_use]
    pub fn from_id(id: u16) -> Option<Self> {
        let kind = match id {
            200..=232 => WeatherKind::Thunderstorm,
            300..=321 => WeatherKind::Drizzle,
            500..=531 => WeatherKind::Rain,
            600..=622 => WeatherKind::Snow,
            701..=781 => WeatherKind::Atmosphere,
            800 => WeatherKind::Clear,
            801..=804 => WeatherKind::Clouds,
            _ => return None,
        };
        Some(kind)
    }

    /// Short human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WeatherKind::Thunderstorm => "Thunderstorm",
            WeatherKind::Drizzle => "Drizzle",
            WeatherKind::Rain => "Rain",
            WeatherKind::Snow => "Snow",
            WeatherKind::Atmosphere => "Haze",
            WeatherKind::Clear => "Clear",
            WeatherKind::Clouds => "Clouds",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Current conditions at the configured location.
pub struct CurrentWeather {
    /// Air temperature in the configured units.
    pub temperature: f64,
    /// Perceived temperature.
    pub feels_like: f64,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Coarse condition.
    pub kind: WeatherKind,
    /// Upstream condition description ("light rain", …).
    pub description: String,
    /// Local sunrise time.
    pub sunrise: NaiveDateTime,
    /// Local sunset time.
    pub sunset: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Forecast summary for one day.
pub struct DailyForecast {
    /// Forecast date.
    pub date: NaiveDate,
    /// Daily minimum temperature.
    pub temp_min: f64,
    /// Daily maximum temperature.
    pub temp_max: f64,
    /// Coarse condition.
    pub kind: WeatherKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Current conditions plus the daily forecast.
pub struct WeatherReport {
    /// Conditions right now.
    pub current: CurrentWeather,
    /// Upcoming days, soonest first.
    pub daily: Vec<DailyForecast>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single predicted vehicle arrival at the configured stop.
pub struct Arrival {
    /// Line or route name.
    pub line: String,
    /// Terminating destination.
    pub destination: String,
    /// Direction summary ("towards …").
    pub towards: String,
    /// Seconds until the vehicle reaches the stop.
    pub seconds_to_arrival: i64,
    /// Predicted arrival time (local).
    pub expected_arrival: NaiveDateTime,
    /// Platform, where the stop has one.
    pub platform: Option<String>,
}

/// US EPA air-quality index band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiBand {
    /// 0–50.
    Good,
    /// 51–100.
    Moderate,
    /// 101–150.
    UnhealthyForSensitive,
    /// 151–200.
    Unhealthy,
    /// 201–300.
    VeryUnhealthy,
    /// 301 and above.
    Hazardous,
}

impl AqiBand {
    /// Band for an AQI value.
    #[must_use]
    pub fn from_index(index: i64) -> Self {
        match index {
            i64::MIN..=50 => AqiBand::Good,
            51..=100 => AqiBand::Moderate,
            101..=150 => AqiBand::UnhealthyForSensitive,
            151..=200 => AqiBand::Unhealthy,
            201..=300 => AqiBand::VeryUnhealthy,
            _ => AqiBand::Hazardous,
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiBand::Good => "Good",
            AqiBand::Moderate => "Moderate",
            AqiBand::UnhealthyForSensitive => "Unhealthy (sensitive)",
            AqiBand::Unhealthy => "Unhealthy",
            AqiBand::VeryUnhealthy => "Very unhealthy",
            AqiBand::Hazardous => "Hazardous",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One pollutant measurement from the monitoring station.
pub struct Pollutant {
    /// Display label (PM2.5, O3, …).
    pub label: String,
    /// Measured sub-index value.
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Air-quality snapshot for the configured city.
pub struct AirQualityReading {
    /// Monitoring station name.
    pub station: String,
    /// Composite AQI value.
    pub index: i64,
    /// Band the composite value falls into.
    pub band: AqiBand,
    /// Individual pollutant sub-indices.
    pub pollutants: Vec<Pollutant>,
}

#[cfg(test)]
mod tests {
    use super::{AqiBand, WeatherKind, weekday_from_sunday_index};
    use chrono::Weekday;

    #[test]
    fn weekday_index_is_sunday_based() {
        assert_eq!(weekday_from_sunday_index(0), Some(Weekday::Sun));
        assert_eq!(weekday_from_sunday_index(3), Some(Weekday::Wed));
        assert_eq!(weekday_from_sunday_index(6), Some(Weekday::Sat));
        assert_eq!(weekday_from_sunday_index(7), None);
    }

    #[test]
    fn weather_kind_covers_condition_groups() {
        assert_eq!(WeatherKind::from_id(211), Some(WeatherKind::Thunderstorm));
        assert_eq!(WeatherKind::from_id(301), Some(WeatherKind::Drizzle));
        assert_eq!(WeatherKind::from_id(500), Some(WeatherKind::Rain));
        assert_eq!(WeatherKind::from_id(616), Some(WeatherKind::Snow));
        assert_eq!(WeatherKind::from_id(741), Some(WeatherKind::Atmosphere));
        assert_eq!(WeatherKind::from_id(800), Some(WeatherKind::Clear));
        assert_eq!(WeatherKind::from_id(804), Some(WeatherKind::Clouds));
        assert_eq!(WeatherKind::from_id(900), None);
    }

    #[test]
    fn aqi_bands_match_epa_breakpoints() {
        assert_eq!(AqiBand::from_index(0), AqiBand::Good);
        assert_eq!(AqiBand::from_index(50), AqiBand::Good);
        assert_eq!(AqiBand::from_index(51), AqiBand::Moderate);
        assert_eq!(AqiBand::from_index(150), AqiBand::UnhealthyForSensitive);
        assert_eq!(AqiBand::from_index(200), AqiBand::Unhealthy);
        assert_eq!(AqiBand::from_index(300), AqiBand::VeryUnhealthy);
        assert_eq!(AqiBand::from_index(301), AqiBand::Hazardous);
    }
}
