use serde_json::{json, Value};

/// Build a forecast payload in the shape the upstream weather API returns.
///
/// Only `location.name` and `current.temp_c` are consumed by the lookup
/// flow; the remaining fields mirror the rest of the real response envelope.
pub fn forecast_payload(city_name: &str, temp_c: f64) -> Value {
    json!({
        "location": {
            "name": city_name,
            "region": "",
            "localtime": "2025-08-06 12:00"
        },
        "current": {
            "temp_c": temp_c,
            "condition": {
                "text": "Partly cloudy"
            }
        },
        "forecast": {
            "forecastday": []
        }
    })
}
