use weather_core::{ProviderUnits, ViewState, WeatherReading};

/// Render the view with the units the answering provider reports in.
pub fn render(view: &ViewState, units: ProviderUnits) -> String {
    match view {
        ViewState::Idle => String::new(),
        ViewState::Loading { city } => format!("Loading weather for {city}..."),
        ViewState::Failed { city, message } => {
            format!("😕 Could not get weather for {city}\n   {message}")
        }
        ViewState::Ready(reading) => render_reading(reading, units),
    }
}

fn render_reading(reading: &WeatherReading, units: ProviderUnits) -> String {
    let (description, icon) = reading.condition();
    let local = reading.fetched_at.with_timezone(&chrono::Local);

    let mut out = format!(
        "{} {}, {}\n   {}\n",
        icon,
        reading.city.name,
        reading.city.country,
        local.format("%Y-%m-%d %H:%M"),
    );
    out.push_str(&format!(
        "   {:.1}{}  {}\n",
        reading.temperature, units.temperature, description
    ));
    out.push_str(&format!("   Humidity: {}%\n", reading.humidity));
    out.push_str(&format!(
        "   Wind:     {} {}\n",
        reading.wind_speed,
        units.wind.suffix()
    ));
    out.push_str(&format!("   Source:   {}", reading.provider.display_name()));
    out
}
