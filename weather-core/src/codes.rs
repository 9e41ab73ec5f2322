//! WMO weather interpretation codes, as reported by Open-Meteo.
//! See: https://open-meteo.com/en/docs

/// Display text and glyph for a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeEntry {
    pub description: &'static str,
    pub icon: &'static str,
}

pub const UNKNOWN_CODE: WeatherCodeEntry = WeatherCodeEntry {
    description: "未知",
    icon: "❓",
};

const fn entry(description: &'static str, icon: &'static str) -> WeatherCodeEntry {
    WeatherCodeEntry { description, icon }
}

/// Look up a WMO code. Codes outside the table map to [`UNKNOWN_CODE`].
pub fn describe_code(code: i32) -> WeatherCodeEntry {
    match code {
        0 => entry("晴朗", "☀️"),
        1 => entry("大部晴朗", "🌤️"),
        2 => entry("部分多云", "⛅"),
        3 => entry("多云", "☁️"),
        45 => entry("雾", "🌫️"),
        48 => entry("霾", "🌫️"),
        51 => entry("小毛毛雨", "🌦️"),
        53 => entry("毛毛雨", "🌦️"),
        55 => entry("大毛毛雨", "🌧️"),
        56 => entry("小冻雨", "🌨️"),
        57 => entry("大冻雨", "🌨️"),
        61 => entry("小雨", "🌧️"),
        63 => entry("中雨", "🌧️"),
        65 => entry("大雨", "🌧️"),
        66 => entry("小冰雨", "🌨️"),
        67 => entry("大冰雨", "🌨️"),
        71 => entry("小雪", "❄️"),
        73 => entry("中雪", "❄️"),
        75 => entry("大雪", "❄️"),
        77 => entry("雪粒", "❄️"),
        80 => entry("小阵雨", "🌦️"),
        81 => entry("中阵雨", "🌦️"),
        82 => entry("大阵雨", "🌦️"),
        85 => entry("小阵雪", "🌨️"),
        86 => entry("大阵雪", "🌨️"),
        95 => entry("雷暴", "⛈️"),
        96 => entry("雷暴伴有小冰雹", "⛈️"),
        99 => entry("雷暴伴有大冰雹", "⛈️"),
        _ => UNKNOWN_CODE,
    }
}
