use serde_json::Value;

/// Print just the key answer from the output.
///
/// Looks for the headline field of each command in priority order, then
/// falls back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // score -> "35 Critical", stress -> projected, portfolio/seed -> KPI,
    // list -> match count
    let priority_keys: [(&str, Option<&str>); 5] = [
        ("score", Some("level")),
        ("projectedScore", Some("projectedLevel")),
        ("avgRiskScore", None),
        ("kpis", None),
        ("matched", None),
    ];

    if let Value::Object(map) = result_obj {
        for (key, companion) in priority_keys {
            let Some(val) = map.get(key).filter(|v| !v.is_null()) else {
                continue;
            };
            if key == "kpis" {
                if let Some(avg) = val.get("avgRiskScore") {
                    println!("{}", format_minimal(avg));
                    return;
                }
            }
            match companion.and_then(|c| map.get(c)) {
                Some(level) => println!("{} {}", format_minimal(val), format_minimal(level)),
                None => println!("{}", format_minimal(val)),
            }
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
