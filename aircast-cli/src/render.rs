//! Plain-text views of search results.

use aircast_core::{
    AirQualityReading, ForecastEntry, LocationQuery, WeatherSnapshot, classify,
};
use chrono::{DateTime, Local, Utc};

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn component_name(symbol: &str) -> String {
    match symbol {
        "pm2_5" => "PM2.5".to_string(),
        other => other.to_uppercase(),
    }
}

pub fn current(query: &LocationQuery, weather: &WeatherSnapshot) -> String {
    let mut lines = vec![format!("{} ({})", query.city, weather.country)];
    lines.push(format!("{:.1}°C  {}", weather.temperature_c, weather.condition));
    if !weather.description.is_empty() {
        lines.push(weather.description.clone());
    }
    lines.join("\n")
}

pub fn forecast(query: &LocationQuery, entries: &[ForecastEntry]) -> String {
    let mut lines = vec![format!("5-day forecast for {query}")];

    for entry in entries {
        lines.push(format!(
            "{}  {:>6.1}°C  {:<20}  humidity {:>3}%  wind {:.1} m/s  {}",
            entry.label,
            entry.temperature_c,
            entry.description,
            entry.humidity_pct,
            entry.wind_speed_mps,
            entry.icon_url(),
        ));
    }

    if entries.is_empty() {
        lines.push("No forecast slots returned.".to_string());
    }
    lines.join("\n")
}

/// Current reading: overall AQI plus the tier of each pollutant.
pub fn air_quality(query: &LocationQuery, readings: &[AirQualityReading]) -> String {
    let Some(reading) = readings.first() else {
        return format!("No air-quality data for {query}");
    };

    let severity = reading.severity();
    let mut lines = vec![
        format!("Air quality in {query} at {}", local_time(reading.timestamp)),
        format!("AQI {}: {} [{}]", reading.aqi, severity.label, severity.color),
    ];

    for (symbol, value, level) in reading.pollutant_levels() {
        let tier = classify::pollutant_severity(symbol, value);
        lines.push(format!(
            "  {:<6} {:>9.2} µg/m³  level {} ({})",
            component_name(symbol),
            value,
            level,
            tier.label,
        ));
    }
    lines.join("\n")
}

pub fn history(query: &LocationQuery, readings: &[AirQualityReading]) -> String {
    let mut lines = vec![format!("Air-quality history for {query}")];

    for reading in readings {
        let severity = reading.severity();
        let components = reading
            .components
            .iter()
            .map(|(symbol, value)| format!("{}={value}", component_name(symbol)))
            .collect::<Vec<_>>()
            .join(" ");

        lines.push(format!(
            "{}  {} (AQI: {})  {}",
            local_time(reading.timestamp),
            severity.label,
            reading.aqi,
            components,
        ));
    }

    if readings.is_empty() {
        lines.push("No readings in this period.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn reading(aqi: i64, components: &[(&str, f64)]) -> AirQualityReading {
        AirQualityReading {
            timestamp: DateTime::from_timestamp(1_704_067_200, 0).expect("in range"),
            aqi,
            components: components
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn query() -> LocationQuery {
        LocationQuery::new("Recife", Some("BR".into()))
    }

    #[test]
    fn current_shows_temperature_and_condition() {
        let weather = WeatherSnapshot {
            temperature_c: 27.44,
            condition: "Clouds".into(),
            description: "broken clouds".into(),
            icon: "04d".into(),
            country: "BR".into(),
        };

        let out = current(&query(), &weather);
        assert!(out.starts_with("Recife (BR)"));
        assert!(out.contains("27.4°C  Clouds"));
    }

    #[test]
    fn air_quality_lists_pollutant_levels() {
        let out = air_quality(&query(), &[reading(4, &[("pm2_5", 60.0), ("nh3", 1.0)])]);

        assert!(out.contains("AQI 4: Poor [#FF5722]"));
        assert!(out.contains("PM2.5"));
        assert!(out.contains("level 4 (Poor)"));
        assert!(out.contains("level 1 (Good)"));
    }

    #[test]
    fn air_quality_with_no_readings() {
        assert_eq!(air_quality(&query(), &[]), "No air-quality data for Recife, BR");
    }

    #[test]
    fn history_keeps_reading_order() {
        let out = history(&query(), &[reading(5, &[]), reading(1, &[]), reading(9, &[])]);
        let lines: Vec<&str> = out.lines().skip(1).collect();

        assert!(lines[0].contains("Very Poor (AQI: 5)"));
        assert!(lines[1].contains("Good (AQI: 1)"));
        assert!(lines[2].contains("Unknown (AQI: 9)"));
    }

    #[test]
    fn forecast_rows_link_their_icon() {
        let entry = ForecastEntry {
            timestamp: DateTime::from_timestamp(1_704_067_200, 0).expect("in range"),
            label: "2024-01-01 00:00:00".into(),
            temperature_c: 24.0,
            description: "light rain".into(),
            icon: "10n".into(),
            humidity_pct: 88,
            wind_speed_mps: 2.5,
        };

        let out = forecast(&query(), &[entry]);
        let row = out.lines().nth(1).expect("one row");

        assert!(row.starts_with("2024-01-01 00:00:00"));
        assert!(row.contains("humidity  88%"));
        assert!(row.ends_with("http://openweathermap.org/img/wn/10n@2x.png"));
    }

    #[test]
    fn empty_forecast_says_so() {
        assert!(forecast(&query(), &[]).ends_with("No forecast slots returned."));
    }
}
