//! Configuration *loading*: merges an optional TOML overlay and
//! `--set group.option=value` CLI overrides over [`Config::default`]
//! (§4.11). The engine itself never reads the environment or the
//! filesystem; this module exists entirely at the CLI boundary.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

/// Build a fully-populated `Config` from the documented defaults, an
/// optional TOML overlay file, and a list of `group.option=value`
/// overrides applied in order after the overlay.
pub fn load(overlay_path: Option<&Path>, overrides: &[String]) -> Result<Config> {
    let mut value = serde_json::to_value(Config::default()).context("encoding default configuration")?;

    if let Some(path) = overlay_path {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config overlay {}", path.display()))?;
        let overlay: toml::Value = toml::from_str(&text)
            .with_context(|| format!("parsing config overlay {}", path.display()))?;
        let overlay = serde_json::to_value(overlay).context("re-encoding TOML overlay as JSON")?;
        merge(&mut value, overlay);
    }

    for assignment in overrides {
        apply_override(&mut value, assignment)?;
    }

    serde_json::from_value(value).context("assembling final configuration")
}

fn merge(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                merge(base_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn apply_override(value: &mut serde_json::Value, assignment: &str) -> Result<()> {
    let (path, raw) = assignment
        .split_once('=')
        .with_context(|| format!("override '{assignment}' is not GROUP.OPTION=VALUE"))?;
    let segments: Vec<&str> = path.split('.').collect();
    set_path(value, &segments, parse_scalar(raw))
        .with_context(|| format!("applying override '{assignment}'"))
}

fn set_path(value: &mut serde_json::Value, path: &[&str], new_value: serde_json::Value) -> Result<()> {
    let obj = value
        .as_object_mut()
        .context("override path does not reach a configuration group")?;
    match path {
        [] => anyhow::bail!("override path is empty"),
        [last] => {
            obj.insert((*last).to_string(), new_value);
            Ok(())
        }
        [head, rest @ ..] => {
            let child = obj
                .entry(*head)
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
            set_path(child, rest, new_value)
        }
    }
}

/// Parse a CLI-supplied override value into the narrowest JSON scalar
/// that round-trips: booleans, then numbers, falling back to a string.
fn parse_scalar(raw: &str) -> serde_json::Value {
    if let Ok(b) = raw.parse::<bool>() {
        return serde_json::Value::Bool(b);
    }
    if let Ok(n) = raw.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(n) {
            return serde_json::Value::Number(number);
        }
    }
    serde_json::Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn no_overlay_or_overrides_yields_documented_defaults() {
        let config = load(None, &[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn toml_overlay_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[takeoff]\nspeed_threshold = 30.0\n").unwrap();
        let config = load(Some(file.path()), &[]).unwrap();
        assert_eq!(config.takeoff.speed_threshold, 30.0);
        assert_eq!(config.takeoff.climb_rate, Config::default().takeoff.climb_rate);
    }

    #[test]
    fn cli_overrides_apply_after_overlay_and_parse_numerics() {
        let overrides = vec!["landing.speed_max=7.5".to_string(), "global.acceleration_clip=15".to_string()];
        let config = load(None, &overrides).unwrap();
        assert_eq!(config.landing.speed_max, 7.5);
        assert_eq!(config.global.acceleration_clip, 15.0);
    }

    #[test]
    fn malformed_override_is_rejected() {
        let err = load(None, &["not-an-assignment".to_string()]).unwrap_err();
        assert!(err.to_string().contains("GROUP.OPTION=VALUE"));
    }
}
