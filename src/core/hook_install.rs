// Hook installation - registers the notifier as a command hook in the
// calling tool's JSON settings file.
//
// The merge is additive. Keys outside `hooks.<event>` are preserved
// verbatim, and an entry that already runs the same command is left alone,
// so installing twice changes nothing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde_json::{json, Map, Value};

use super::error::{Error, Result};

/// Hook event the notifier is registered under unless told otherwise.
pub const DEFAULT_EVENT: &str = "Stop";

/// `~/.claude/settings.json`, the user-level settings of the calling tool.
pub fn default_settings_path() -> Result<PathBuf> {
    let dirs = BaseDirs::new().ok_or(Error::NoConfigDir)?;
    Ok(dirs.home_dir().join(".claude").join("settings.json"))
}

/// Register `command` under `hooks.<event>` in `settings_path`.
///
/// Returns `true` when a new entry was written, `false` when an identical
/// command was already registered.
pub fn install_hook(settings_path: &Path, event: &str, command: &str) -> Result<bool> {
    let mut root = read_json_or_empty_object(settings_path)?;
    let wrong_shape = |key: String, expected: &'static str| Error::UnexpectedShape {
        path: settings_path.to_path_buf(),
        key,
        expected,
    };

    let hooks = root
        .as_object_mut()
        .ok_or_else(|| Error::NotAnObject {
            path: settings_path.to_path_buf(),
        })?
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()));
    let entries = hooks
        .as_object_mut()
        .ok_or_else(|| wrong_shape("hooks".to_string(), "object"))?
        .entry(event)
        .or_insert_with(|| Value::Array(Vec::new()));
    let entries = entries
        .as_array_mut()
        .ok_or_else(|| wrong_shape(format!("hooks.{event}"), "array"))?;

    if entries.iter().any(|entry| runs_command(entry, command)) {
        log::info!("{event} hook already runs {command}");
        return Ok(false);
    }

    entries.push(json!({
        "hooks": [{
            "type": "command",
            "command": command
        }]
    }));

    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(settings_path, serde_json::to_string_pretty(&root)?)?;
    log::info!("registered {event} hook in {}", settings_path.display());
    Ok(true)
}

/// Whether a matcher entry (`{"hooks": [{"command": ...}]}`) runs `command`.
fn runs_command(entry: &Value, command: &str) -> bool {
    entry["hooks"]
        .as_array()
        .map(|hooks| hooks.iter().any(|h| h["command"].as_str() == Some(command)))
        .unwrap_or(false)
}

fn read_json_or_empty_object(path: &Path) -> Result<Value> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(Value::Object(Map::new())),
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Value::Object(Map::new())),
        Err(e) => Err(e.into()),
    }
}
