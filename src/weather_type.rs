/// Coarse condition derived from a period's `shortForecast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherType {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
    Thunderstorm,
    Fog,
}

/// Classify NWS short forecast wording ("Chance Rain Showers", "Mostly
/// Sunny", "Patchy Fog"). Precipitation outranks sky cover, so "Mostly
/// Cloudy then Slight Chance Rain" reads as rain.
pub fn determine_weather_type(short_forecast: &str) -> WeatherType {
    let desc = short_forecast.to_lowercase();
    if desc.contains("thunder") || desc.contains("t-storm") {
        WeatherType::Thunderstorm
    } else if desc.contains("snow") || desc.contains("flurries") || desc.contains("sleet") {
        WeatherType::Snow
    } else if desc.contains("rain") || desc.contains("drizzle") || desc.contains("showers") {
        WeatherType::Rain
    } else if desc.contains("fog") || desc.contains("haze") || desc.contains("smoke") {
        WeatherType::Fog
    } else if desc.contains("partly") || desc.contains("mostly sunny") || desc.contains("mostly clear") {
        WeatherType::PartlyCloudy
    } else if desc.contains("cloudy") || desc.contains("overcast") {
        WeatherType::Cloudy
    } else {
        WeatherType::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_nws_wording() {
        let cases = [
            ("Sunny", WeatherType::Clear),
            ("Clear", WeatherType::Clear),
            ("Mostly Sunny", WeatherType::PartlyCloudy),
            ("Partly Cloudy", WeatherType::PartlyCloudy),
            ("Mostly Cloudy", WeatherType::Cloudy),
            ("Chance Rain Showers", WeatherType::Rain),
            ("Light Snow Likely", WeatherType::Snow),
            ("Showers And Thunderstorms", WeatherType::Thunderstorm),
            ("Patchy Fog", WeatherType::Fog),
        ];
        for (text, expected) in cases {
            assert_eq!(determine_weather_type(text), expected, "{text}");
        }
    }

    #[test]
    fn precipitation_beats_sky_cover() {
        assert_eq!(
            determine_weather_type("Mostly Cloudy then Slight Chance Rain"),
            WeatherType::Rain
        );
    }
}
