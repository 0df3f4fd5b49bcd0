//! Grid search parameter generation
//!
//! Expands the `grid` section of a config into one config per combination of
//! strategy parameter values.

use itertools::Itertools;
use serde_json::Value;
use std::collections::HashMap;

use crate::Config;

/// Generate all config combinations from grid parameters
///
/// Each grid key names a field of the `strategy` section. Keys are sorted so
/// the combination order is stable across runs.
pub fn generate_grid_configs(config: &Config) -> Vec<Config> {
    let grid = match &config.grid {
        Some(g) if !g.is_empty() => g,
        _ => return vec![config.clone()],
    };

    let keys: Vec<&String> = grid
        .keys()
        .filter(|k| {
            let empty = grid[*k].is_empty();
            if empty {
                tracing::warn!(param = %k, "Grid parameter has no values, ignoring");
            }
            !empty
        })
        .sorted()
        .collect();
    if keys.is_empty() {
        return vec![config.clone()];
    }

    keys.iter()
        .map(|k| grid[*k].iter())
        .multi_cartesian_product()
        .map(|combo| {
            let mut cfg = config.clone();
            if !cfg.strategy.is_object() {
                cfg.strategy = Value::Object(Default::default());
            }
            if let Some(obj) = cfg.strategy.as_object_mut() {
                for (key, value) in keys.iter().zip(combo) {
                    obj.insert((*key).clone(), value.clone());
                }
            }
            cfg
        })
        .collect()
}

/// Number of combinations the grid expands to
pub fn total_combinations(config: &Config) -> usize {
    match &config.grid {
        Some(grid) if grid.values().any(|v| !v.is_empty()) => grid
            .values()
            .filter(|v| !v.is_empty())
            .map(|v| v.len())
            .product(),
        _ => 1,
    }
}

/// Parse a CLI override: `param=val1,val2,val3`
///
/// Values become integers, floats, booleans or strings, in that order of
/// preference.
pub fn parse_grid_override(s: &str) -> Option<(String, Vec<Value>)> {
    let (key, raw) = s.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let values: Vec<Value> = raw
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            if let Ok(n) = v.parse::<i64>() {
                Value::from(n)
            } else if let Ok(n) = v.parse::<f64>() {
                Value::from(n)
            } else if let Ok(b) = v.parse::<bool>() {
                Value::from(b)
            } else {
                Value::from(v)
            }
        })
        .collect();

    (!values.is_empty()).then(|| (key.to_string(), values))
}

/// Apply CLI overrides to the config grid; unparseable overrides are logged and skipped
pub fn apply_overrides(config: &mut Config, overrides: &[String]) {
    for override_str in overrides {
        match parse_grid_override(override_str) {
            Some((key, values)) => {
                tracing::debug!(param = %key, count = values.len(), "Grid override");
                config.grid.get_or_insert_with(HashMap::new).insert(key, values);
            }
            None => tracing::warn!(value = %override_str, "Ignoring malformed grid override"),
        }
    }
}

/// Numeric strategy params for reporting (booleans as 0/1)
pub fn extract_params(config: &Config) -> HashMap<String, f64> {
    let mut params = HashMap::new();
    if let Some(obj) = config.strategy.as_object() {
        for (k, v) in obj {
            let value = match v {
                Value::Number(n) => n.as_f64(),
                Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                _ => None,
            };
            if let Some(value) = value {
                params.insert(k.clone(), value);
            }
        }
    }
    params
}

/// Format params for display, sorted by name
pub fn format_params(params: &HashMap<String, f64>) -> String {
    params
        .iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .map(|(k, v)| {
            if v.fract() == 0.0 && v.abs() < 1000.0 {
                format!("{}={}", k, *v as i64)
            } else {
                format!("{}={:.2}", k, v)
            }
        })
        .sorted()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid_config(grid: &[(&str, Vec<Value>)]) -> Config {
        let mut config = Config::default();
        config.strategy = json!({"slow_period": 30});
        config.grid = Some(
            grid.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        config
    }

    #[test]
    fn test_cartesian_product_sorted_keys() {
        let config = grid_config(&[
            ("slow_period", vec![json!(20), json!(40)]),
            ("fast_period", vec![json!(5), json!(10), json!(15)]),
        ]);
        let configs = generate_grid_configs(&config);

        assert_eq!(configs.len(), 6);
        assert_eq!(total_combinations(&config), 6);
        // fast_period sorts first, so it changes slowest
        assert_eq!(configs[0].strategy, json!({"fast_period": 5, "slow_period": 20}));
        assert_eq!(configs[1].strategy, json!({"fast_period": 5, "slow_period": 40}));
        assert_eq!(configs[5].strategy, json!({"fast_period": 15, "slow_period": 40}));
    }

    #[test]
    fn test_no_grid_returns_base() {
        let config = Config::default();
        assert_eq!(generate_grid_configs(&config).len(), 1);
        assert_eq!(total_combinations(&config), 1);
    }

    #[test]
    fn test_empty_value_list_is_ignored() {
        let config = grid_config(&[("fast_period", vec![json!(5), json!(8)]), ("oops", vec![])]);
        assert_eq!(generate_grid_configs(&config).len(), 2);
        assert_eq!(total_combinations(&config), 2);
    }

    #[test]
    fn test_parse_grid_override() {
        let (key, values) = parse_grid_override("rsi_period = 7, 14,2.5,true,fast").unwrap();
        assert_eq!(key, "rsi_period");
        assert_eq!(values, vec![json!(7), json!(14), json!(2.5), json!(true), json!("fast")]);

        assert!(parse_grid_override("no_equals").is_none());
        assert!(parse_grid_override("empty=").is_none());
        assert!(parse_grid_override("=1,2").is_none());
    }

    #[test]
    fn test_apply_overrides_replaces_grid_entry() {
        let mut config = grid_config(&[("fast_period", vec![json!(5)])]);
        apply_overrides(&mut config, &["fast_period=8,13".to_string(), "bad".to_string()]);
        let grid = config.grid.unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid["fast_period"], vec![json!(8), json!(13)]);
    }

    #[test]
    fn test_extract_and_format_params() {
        let mut config = Config::default();
        config.strategy = json!({
            "period": 20,
            "width": 2.25,
            "allow_shorts": false,
            "_note": 1,
            "label": "x"
        });
        let params = extract_params(&config);
        assert_eq!(params.len(), 4);
        assert_eq!(params["allow_shorts"], 0.0);
        assert_eq!(format_params(&params), "allow_shorts=0, period=20, width=2.25");
    }
}
