// ──────────────────────────────────────────────────────────────────────────
// assets/loader.rs
//
//  *   map JSON  { width, height, layout, objects, playerStart }  ──╮
//  *   secret_<x>_<y> flags inside `objects`                        │ ---> world::GridMap
//                                                                   ╯
//  *   engine config JSON                                           ---> config::EngineConfig
// ──────────────────────────────────────────────────────────────────────────

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use glam::IVec2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    world::{GridMap, MapError, ObjectState},
};

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("object `{symbol}`: {source}")]
    Object {
        symbol: char,
        source: serde_json::Error,
    },
}

/*──────────────────────────── Raw JSON ─────────────────────────────*/

static SECRET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^secret_(-?\d+)_(-?\d+)$").expect("static regex"));

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMap {
    width: usize,
    height: usize,
    layout: Vec<RawRow>,
    #[serde(default)]
    objects: serde_json::Map<String, Value>,
    #[serde(default)]
    player_start: Option<RawPoint>,
}

/// A layout row is either `"W..W"` or `["W", ".", ".", "W"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRow {
    Text(String),
    Chars(Vec<char>),
}

impl RawRow {
    fn into_chars(self) -> Vec<char> {
        match self {
            RawRow::Text(s) => s.chars().collect(),
            RawRow::Chars(c) => c,
        }
    }
}

#[derive(Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

/// JavaScript-style truthiness for secret flags.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Parse a map from JSON text.
///
/// `objects` keys are single object symbols or `secret_<x>_<y>` flags;
/// anything else is ignored with a warning.
pub fn parse_map(json: &str) -> Result<GridMap, LoadError> {
    let raw: RawMap = serde_json::from_str(json)?;

    let mut objects = HashMap::new();
    let mut secrets = HashSet::new();
    for (key, value) in raw.objects {
        if let Some(caps) = SECRET_KEY.captures(&key) {
            let (Ok(x), Ok(y)) = (caps[1].parse::<i32>(), caps[2].parse::<i32>()) else {
                warn!(%key, "secret flag coordinates out of range");
                continue;
            };
            if truthy(&value) {
                secrets.insert((x, y));
            }
            continue;
        }

        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => {
                let state: ObjectState = serde_json::from_value(value)
                    .map_err(|source| LoadError::Object { symbol, source })?;
                objects.insert(symbol, state);
            }
            _ => warn!(%key, "ignoring unknown object key"),
        }
    }

    let rows = raw.layout.into_iter().map(RawRow::into_chars).collect();
    let start = raw
        .player_start
        .map(|p| IVec2::new(p.x.floor() as i32, p.y.floor() as i32));

    let map = GridMap::new(raw.width, raw.height, rows, objects, secrets, start)?;
    Ok(map)
}

/// Read and parse a map file.
pub fn load_map(path: impl AsRef<Path>) -> Result<GridMap, LoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_map(&json)?;
    info!(path = %path.display(), w = map.width(), h = map.height(), "map loaded");
    Ok(map)
}

/// Like [`load_map`], but any failure yields the built-in training room.
pub fn load_map_or_fallback(path: impl AsRef<Path>) -> GridMap {
    let path = path.as_ref();
    load_map(path).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "using fallback level");
        GridMap::fallback()
    })
}

/// Read engine settings. A missing file gives the defaults; a file that
/// exists but does not parse is an error.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, LoadError> {
    let path = path.as_ref();
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config not found, using defaults");
            return Ok(EngineConfig::default());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let config: EngineConfig = serde_json::from_str(&json)?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Cell, ObjectKind, names};
    use std::io::Write;

    const LEVEL: &str = r#"{
        "width": 5,
        "height": 3,
        "layout": ["WWWWW", "W.DCW", "WWWWW"],
        "objects": {
            "D": { "type": "door", "locked": true, "keyType": "gold" },
            "C": { "type": "chest", "contains": { "type": "key", "keyType": "gold" } },
            "secret_4_1": true,
            "secret_0_1": 0,
            "notes": "ignored"
        },
        "playerStart": { "x": 1, "y": 1 }
    }"#;

    #[test]
    fn parses_level_with_secrets() {
        let map = parse_map(LEVEL).unwrap();
        assert_eq!((map.width(), map.height()), (5, 3));
        assert_eq!(map.cell(2, 1), Some(Cell::Door));
        assert_eq!(map.player_start(), Some(IVec2::new(1, 1)));

        let door = map.object('D').unwrap();
        assert_eq!(door.kind, ObjectKind::Door);
        assert!(door.locked);
        assert_eq!(door.key_type.as_deref(), Some("gold"));
        assert!(map.object('C').unwrap().contains.is_some());

        assert!(map.is_secret_wall(4, 1));
        assert!(!map.is_secret_wall(0, 1));
        assert_eq!(map.wall_texture_name_at(4, 1, false), names::STONE_WALL);
        assert_eq!(map.wall_texture_name_at(4, 1, true), names::SECRET_WALL_DEBUG);
    }

    #[test]
    fn char_array_rows() {
        let json = r#"{ "width": 2, "height": 1, "layout": [["W", "."]] }"#;
        let map = parse_map(json).unwrap();
        assert_eq!(map.cell(1, 0), Some(Cell::Floor));
        assert_eq!(map.player_start(), None);
    }

    #[test]
    fn missing_object_is_an_error() {
        let json = r#"{ "width": 3, "height": 1, "layout": ["W?W"] }"#;
        match parse_map(json) {
            Err(LoadError::Map(MapError::UnknownSymbol { symbol, x, y })) => {
                assert_eq!((symbol, x, y), ('?', 1, 0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_object_reports_symbol() {
        let json = r#"{ "width": 1, "height": 1, "layout": ["C"],
                        "objects": { "C": { "open": "yes" } } }"#;
        assert!(matches!(
            parse_map(json),
            Err(LoadError::Object { symbol: 'C', .. })
        ));
    }

    #[test]
    fn truthiness() {
        assert!(truthy(&serde_json::json!(1)));
        assert!(truthy(&serde_json::json!("x")));
        assert!(truthy(&serde_json::json!({})));
        assert!(!truthy(&serde_json::json!(0)));
        assert!(!truthy(&serde_json::json!("")));
        assert!(!truthy(&serde_json::json!(null)));
        assert!(!truthy(&serde_json::json!(false)));
    }

    #[test]
    fn files_and_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(LEVEL.as_bytes())
            .unwrap();
        assert_eq!(load_map(&path).unwrap().width(), 5);

        let missing = dir.path().join("nope.json");
        assert!(matches!(load_map(&missing), Err(LoadError::Io { .. })));
        assert_eq!(load_map_or_fallback(&missing).width(), 10);
    }

    #[test]
    fn config_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path().join("config.json")).unwrap();
        assert_eq!(cfg, EngineConfig::default());

        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "depthTextures": { "randomSeed": 7 } }"#).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.depth_textures.random_seed, 7);
        assert!(cfg.depth_textures.enabled);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(LoadError::Json(_))));
    }
}
