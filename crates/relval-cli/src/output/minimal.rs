use serde_json::Value;

/// Headline fields, most specific first. Searched in the result object and
/// one level of nested objects beneath it (e.g. `classification`).
const HEADLINE_KEYS: [&str; 9] = [
    "recommendation",
    "health_score",
    "sharpe_ratio",
    "var",
    "relative_pct",
    "score",
    "valuation_score",
    "pe",
    "sector",
];

/// Print just the key answer from the output.
///
/// Tabular results (summary rows, sector ranking) print one line per row;
/// everything else prints the first headline field found.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(rows) = row_list(result_obj) {
        for row in rows {
            println!("{}", row_line(row));
        }
        return;
    }

    if let Value::Object(map) = result_obj {
        let nested = map.values().filter_map(|v| v.as_object());
        for key in HEADLINE_KEYS {
            let hit = map
                .get(key)
                .filter(|v| !v.is_null())
                .or_else(|| nested.clone().find_map(|m| m.get(key).filter(|v| !v.is_null())));
            if let Some(val) = hit {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn row_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(arr) => Some(arr),
        Value::Object(map) => ["rows", "ranking"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_array())),
        _ => None,
    }
}

/// `<label>: <value> [<status>]` for a summary or ranking row.
fn row_line(row: &Value) -> String {
    let Value::Object(map) = row else {
        return format_minimal(row);
    };
    let label = ["multiple_type", "sector", "name", "multiple", "ticker"]
        .iter()
        .find_map(|k| map.get(*k))
        .map(format_minimal)
        .unwrap_or_default();
    let figure = ["implied_price", "valuation_score", "avg", "company"]
        .iter()
        .find_map(|k| map.get(*k))
        .map(format_minimal)
        .unwrap_or_default();
    match map.get("status") {
        Some(status) => format!("{}: {} [{}]", label, figure, format_minimal(status)),
        None => format!("{}: {}", label, figure),
    }
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
