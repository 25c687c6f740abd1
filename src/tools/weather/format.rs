use crate::tools::weather::lookup::WeatherResult;
use serde_json::Value;

/// 字段缺失时的占位符
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_CURRENT_DATA: &str = "No current weather data available";
const UNKNOWN_LOCATION: &str = "Unknown location";

/// 把查询结果渲染成多行可读文本。纯函数，不做任何 IO。
///
/// 数字和字符串按上游给出的样子输出，缺失或无法展示的值（对象、数组、`null`）记为 `N/A`。
pub fn format_weather(result: &WeatherResult) -> String {
    let report = match result {
        WeatherResult::Error(msg) => return format!("Error: {}", msg),
        WeatherResult::Success(report) => report,
    };

    let Some(current) = &report.current else {
        return NO_CURRENT_DATA.to_string();
    };

    let location = report
        .location
        .as_ref()
        .and_then(|loc| scalar(loc.name.as_ref()))
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    let description = match &current.weather_descriptions {
        Some(Value::Array(list)) => scalar(list.first()),
        other => scalar(other.as_ref()),
    };

    [
        format!("Weather in {}:", location),
        format!("- Temperature: {}°C", or_na(&current.temperature)),
        format!("- Feels like: {}°C", or_na(&current.feelslike)),
        format!("- Weather: {}", description.as_deref().unwrap_or(NOT_AVAILABLE)),
        format!("- Humidity: {}%", or_na(&current.humidity)),
        format!("- Wind Speed: {} km/h", or_na(&current.wind_speed)),
        format!("- Wind Direction: {}", or_na(&current.wind_dir)),
        format!("- Pressure: {} mb", or_na(&current.pressure)),
        format!("- Visibility: {} km", or_na(&current.visibility)),
    ]
    .join("\n")
}

fn or_na(value: &Option<Value>) -> String {
    scalar(value.as_ref()).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// 数字保持 JSON 原文（22 → "22"，-3.5 → "-3.5"），字符串去掉引号，其余返回 `None`
fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::weather::lookup::{CurrentConditions, Location, WeatherReport};
    use serde_json::json;

    fn full_conditions() -> CurrentConditions {
        CurrentConditions {
            temperature: Some(json!(18)),
            feelslike: Some(json!(17)),
            weather_descriptions: Some(json!(["Partly cloudy", "Windy"])),
            humidity: Some(json!(64)),
            wind_speed: Some(json!(12)),
            wind_dir: Some(json!("NW")),
            pressure: Some(json!(1012)),
            visibility: Some(json!(10)),
        }
    }

    fn success(current: Option<CurrentConditions>, name: Option<&str>) -> WeatherResult {
        WeatherResult::Success(WeatherReport {
            current,
            location: name.map(|n| Location {
                name: Some(json!(n)),
            }),
        })
    }

    #[test]
    fn error_shape_is_prefixed() {
        let result = WeatherResult::Error("Failed to fetch weather data: timeout".to_string());
        assert_eq!(
            format_weather(&result),
            "Error: Failed to fetch weather data: timeout"
        );
    }

    #[test]
    fn error_key_ignores_everything_else() {
        let result = WeatherResult::from_json(json!({
            "error": "bad key",
            "current": {"temperature": 30},
            "location": {"name": "Lima"}
        }));
        assert_eq!(format_weather(&result), "Error: bad key");
    }

    #[test]
    fn missing_current_has_fixed_message() {
        let result = WeatherResult::from_json(json!({"location": {"name": "Paris"}}));
        assert_eq!(format_weather(&result), NO_CURRENT_DATA);
    }

    #[test]
    fn full_report_renders_every_line() {
        let text = format_weather(&success(Some(full_conditions()), Some("London")));
        let expected = "Weather in London:\n\
                        - Temperature: 18°C\n\
                        - Feels like: 17°C\n\
                        - Weather: Partly cloudy\n\
                        - Humidity: 64%\n\
                        - Wind Speed: 12 km/h\n\
                        - Wind Direction: NW\n\
                        - Pressure: 1012 mb\n\
                        - Visibility: 10 km";
        assert_eq!(text, expected);
    }

    #[test]
    fn each_field_defaults_independently() {
        let blanks: [(&str, fn(&mut CurrentConditions)); 8] = [
            ("- Temperature: N/A°C", |c| c.temperature = None),
            ("- Feels like: N/A°C", |c| c.feelslike = None),
            ("- Weather: N/A", |c| c.weather_descriptions = None),
            ("- Humidity: N/A%", |c| c.humidity = None),
            ("- Wind Speed: N/A km/h", |c| c.wind_speed = None),
            ("- Wind Direction: N/A", |c| c.wind_dir = None),
            ("- Pressure: N/A mb", |c| c.pressure = None),
            ("- Visibility: N/A km", |c| c.visibility = None),
        ];
        let baseline = format_weather(&success(Some(full_conditions()), Some("London")));

        for (expected_line, blank) in blanks {
            let mut current = full_conditions();
            blank(&mut current);
            let text = format_weather(&success(Some(current), Some("London")));

            assert!(text.contains(expected_line), "missing {expected_line:?} in {text}");
            let changed: Vec<_> = text
                .lines()
                .zip(baseline.lines())
                .filter(|(a, b)| a != b)
                .collect();
            assert_eq!(changed.len(), 1, "only one line should change for {expected_line:?}");
        }
    }

    #[test]
    fn empty_description_list_uses_placeholder() {
        let mut current = full_conditions();
        current.weather_descriptions = Some(json!([]));
        let text = format_weather(&success(Some(current), Some("Oslo")));
        assert!(text.contains("- Weather: N/A"));
    }

    #[test]
    fn missing_location_name_is_unknown() {
        let text = format_weather(&success(Some(CurrentConditions::default()), None));
        assert!(text.starts_with("Weather in Unknown location:"));
        assert_eq!(text.matches(NOT_AVAILABLE).count(), 8);
    }

    #[test]
    fn fractional_values_keep_decimals() {
        let mut current = full_conditions();
        current.temperature = Some(json!(-3.5));
        let text = format_weather(&success(Some(current), Some("Reykjavik")));
        assert!(text.contains("- Temperature: -3.5°C"));
    }

    #[test]
    fn numbers_and_strings_render_as_given() {
        let result = WeatherResult::from_json(json!({
            "current": {
                "temperature": 22,
                "feelslike": "21",
                "humidity": "70",
                "pressure": 1008.5,
                "wind_dir": 270
            },
            "location": {"name": "Tokyo"}
        }));
        let text = format_weather(&result);
        assert!(text.contains("- Temperature: 22°C"));
        assert!(text.contains("- Feels like: 21°C"));
        assert!(text.contains("- Humidity: 70%"));
        assert!(text.contains("- Pressure: 1008.5 mb"));
        assert!(text.contains("- Wind Direction: 270"));
    }

    #[test]
    fn unusable_values_fall_back_to_placeholder() {
        let result = WeatherResult::from_json(json!({
            "current": {
                "temperature": {"value": 18},
                "humidity": [64],
                "visibility": "",
                "weather_descriptions": [{"text": "Clear"}],
                "wind_speed": 12
            },
            "location": {"name": ["Oslo"]}
        }));
        let text = format_weather(&result);
        assert!(text.starts_with("Weather in Unknown location:"));
        assert!(text.contains("- Temperature: N/A°C"));
        assert!(text.contains("- Humidity: N/A%"));
        assert!(text.contains("- Visibility: N/A km"));
        assert!(text.contains("- Weather: N/A"));
        assert!(text.contains("- Wind Speed: 12 km/h"));
    }

    #[test]
    fn bare_description_string_is_used() {
        let mut current = full_conditions();
        current.weather_descriptions = Some(json!("Overcast"));
        let text = format_weather(&success(Some(current), Some("Lima")));
        assert!(text.contains("- Weather: Overcast"));
    }
}
