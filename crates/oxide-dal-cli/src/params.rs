//! Parameters from the command line and from JSON files.
//!
//! On the command line a parameter is written `NAME=VALUE` or
//! `NAME:TYPE=VALUE`. Without a type the value is inferred: integers become
//! `LONG`, other numbers `DOUBLE`, `true`/`false` `BOOLEAN`, `null` a NULL and
//! anything else `STRING`.
//!
//! A parameter file is a JSON object. Each member is either a plain JSON
//! value, inferred the same way, or `{"type": "DATE", "value": "2024-01-31"}`.

use std::collections::BTreeMap;
use std::path::Path;

use oxide_dal_core::{DataParam, DataType, Params, Value};
use serde::Deserialize;

use crate::error::{CliError, Result};

/// Parses one `NAME[:TYPE]=VALUE` argument.
pub fn parse_param(spec: &str) -> Result<(String, DataParam)> {
    let invalid = |message: &str| CliError::InvalidParam {
        spec: spec.to_string(),
        message: message.to_string(),
    };

    let (key, text) = spec.split_once('=').ok_or_else(|| invalid("expected NAME=VALUE"))?;
    let (name, type_name) = match key.split_once(':') {
        Some((name, type_name)) => (name.trim(), Some(type_name.trim())),
        None => (key.trim(), None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return Err(invalid("parameter names are letters, digits, '_' or '$'"));
    }

    let param = match type_name {
        Some(type_name) => {
            let data_type = data_type(type_name)?;
            convert(name, data_type, Value::from(text))?
        }
        None => infer(text),
    };
    Ok((name.to_uppercase(), param))
}

/// Infers a typed parameter from command-line text.
#[must_use]
pub fn infer(text: &str) -> DataParam {
    if text.eq_ignore_ascii_case("null") {
        return DataParam::null(DataType::Other);
    }
    if let Ok(v) = text.parse::<i64>() {
        return DataParam::of(v);
    }
    if let Ok(v) = text.parse::<f64>() {
        return DataParam::of(v);
    }
    match text {
        "true" => DataParam::of(true),
        "false" => DataParam::of(false),
        _ => DataParam::of(text),
    }
}

/// A member of a parameter file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileParam {
    Typed {
        #[serde(rename = "type")]
        data_type: String,
        value: serde_json::Value,
    },
    Plain(serde_json::Value),
}

/// Reads a JSON parameter file.
pub fn load_params_file(path: &Path) -> Result<Params> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    params_from_json(&text)
}

/// Parses the contents of a parameter file.
pub fn params_from_json(text: &str) -> Result<Params> {
    let members: BTreeMap<String, FileParam> = serde_json::from_str(text)?;
    let mut params = Params::new();
    for (name, member) in members {
        let param = match member {
            FileParam::Typed { data_type: type_name, value } => {
                let data_type = data_type(&type_name)?;
                convert(&name, data_type, json_value(&name, value)?)?
            }
            FileParam::Plain(value) => {
                let value = json_value(&name, value)?;
                if value.is_null() {
                    DataParam::null(DataType::Other)
                } else {
                    DataParam::of(value)
                }
            }
        };
        params.set(&name, param);
    }
    Ok(params)
}

/// Builds the parameter set for a command: file entries first, then
/// command-line arguments, which win on conflicts.
pub fn collect(args: &[String], file: Option<&Path>) -> Result<Params> {
    let mut params = match file {
        Some(path) => load_params_file(path)?,
        None => Params::new(),
    };
    for spec in args {
        let (name, param) = parse_param(spec)?;
        params.set(&name, param);
    }
    Ok(params)
}

fn data_type(name: &str) -> Result<DataType> {
    DataType::from_name(name).ok_or_else(|| CliError::UnknownType(name.to_string()))
}

fn convert(name: &str, data_type: DataType, value: Value) -> Result<DataParam> {
    DataParam::convert(data_type, value).map_err(|source| CliError::Binding {
        name: name.to_uppercase(),
        source,
    })
}

fn json_value(name: &str, value: serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Long)
            .or_else(|| n.as_f64().map(Value::Double))
            .ok_or_else(|| CliError::InvalidParam {
                spec: name.to_string(),
                message: format!("number {n} is out of range"),
            }),
        serde_json::Value::String(s) => Ok(Value::Text(s)),
        other => Err(CliError::InvalidParam {
            spec: name.to_string(),
            message: format!("unsupported JSON value {other}"),
        }),
    }
}
