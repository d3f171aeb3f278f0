//! Lenient policy JSON decoding
//!
//! Policy documents write several fields in more than one JSON shape: a
//! lone string where a list is meant, and a principal that is either the
//! literal `"*"` or a map of principal types. Decoding dispatches on the
//! observed shape explicitly; an unrecognized shape fails with
//! [`Error::InvalidShape`] naming the offending field. Unknown members on
//! statements are ignored.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::{
    ApplyRequest, Condition, Effect, Policy, Principal, Statement, StringOrList,
};
use crate::{MAX_POLICY_BYTES, SUPPORTED_VERSIONS};

/// Parse and validate a raw policy document.
pub fn parse_policy(raw: &[u8]) -> Result<Policy> {
    if raw.len() > MAX_POLICY_BYTES {
        return Err(Error::InputTooLarge);
    }

    let value: Value =
        serde_json::from_slice(raw).map_err(|e| Error::InvalidJson(e.to_string()))?;

    let policy = policy_from_value(&value)?;
    validate(&policy)?;
    Ok(policy)
}

/// Parse an apply request `{policy, patchIds}`. The embedded policy goes
/// through the same decoding and validation as `parse_policy` input.
pub fn parse_apply_request(raw: &[u8]) -> Result<ApplyRequest> {
    if raw.len() > MAX_POLICY_BYTES {
        return Err(Error::InputTooLarge);
    }

    let value: Value =
        serde_json::from_slice(raw).map_err(|e| Error::InvalidJson(e.to_string()))?;

    let obj = value.as_object().ok_or_else(|| shape("request", "object", &value))?;

    let policy_value = match obj.get("policy") {
        Some(v) if !v.is_null() => v,
        _ => return Err(Error::MissingPolicy),
    };
    let policy = policy_from_value(policy_value)?;
    validate(&policy)?;

    let patch_ids = match obj.get("patchIds") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| shape("patchIds", "array of strings", item))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => return Err(shape("patchIds", "array of strings", other)),
    };

    Ok(ApplyRequest { policy, patch_ids })
}

/// Build a policy from an already-parsed JSON value.
pub fn policy_from_value(value: &Value) -> Result<Policy> {
    let obj = value.as_object().ok_or_else(|| shape("policy", "object", value))?;

    let version = match obj.get("Version") {
        None | Some(Value::Null) => String::new(),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| shape("Version", "string", v))?,
    };

    let id = match obj.get("Id") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| shape("Id", "string", v))?,
        ),
    };

    let statement = match obj.get("Statement") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| statement_from_value(i, item))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => return Err(shape("Statement", "array", other)),
    };

    Ok(Policy { version, id, statement })
}

/// Enforce the post-parse invariants: version, non-empty statements, and
/// per-statement action/target presence.
pub fn validate(policy: &Policy) -> Result<()> {
    if policy.version.is_empty() {
        return Err(Error::MissingVersion);
    }
    if !SUPPORTED_VERSIONS.contains(&policy.version.as_str()) {
        return Err(Error::UnsupportedVersion(policy.version.clone()));
    }
    if policy.statement.is_empty() {
        return Err(Error::MissingStatement);
    }

    for (i, stmt) in policy.statement.iter().enumerate() {
        if stmt.action.is_empty() && stmt.not_action.is_empty() {
            return Err(Error::MissingActionOrNotAction(i));
        }
        if stmt.resource.is_empty() && stmt.not_resource.is_empty() && stmt.principal.is_none() {
            return Err(Error::MissingTarget(i));
        }
    }
    Ok(())
}

fn statement_from_value(index: usize, value: &Value) -> Result<Statement> {
    let obj = value
        .as_object()
        .ok_or_else(|| shape("Statement", "object", value))?;

    let sid = match obj.get("Sid") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| shape("Sid", "string", v))?,
        ),
    };

    let effect = match obj.get("Effect").and_then(Value::as_str) {
        Some("Allow") => Effect::Allow,
        Some("Deny") => Effect::Deny,
        Some(other) => return Err(Error::InvalidEffect(index, other.to_string())),
        None => return Err(Error::InvalidEffect(index, String::new())),
    };

    Ok(Statement {
        sid,
        effect,
        principal: optional_principal("Principal", obj.get("Principal"))?,
        not_principal: optional_principal("NotPrincipal", obj.get("NotPrincipal"))?,
        action: optional_list("Action", obj.get("Action"))?,
        not_action: optional_list("NotAction", obj.get("NotAction"))?,
        resource: optional_list("Resource", obj.get("Resource"))?,
        not_resource: optional_list("NotResource", obj.get("NotResource"))?,
        condition: match obj.get("Condition") {
            None | Some(Value::Null) => None,
            Some(v) => Some(condition_from_value(v)?),
        },
    })
}

fn optional_list(field: &str, value: Option<&Value>) -> Result<StringOrList> {
    match value {
        None | Some(Value::Null) => Ok(StringOrList::default()),
        Some(v) => string_or_list_from_value(field, v),
    }
}

fn optional_principal(field: &str, value: Option<&Value>) -> Result<Option<Principal>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => principal_from_value(field, v).map(Some),
    }
}

fn string_or_list_from_value(field: &str, value: &Value) -> Result<StringOrList> {
    match value {
        Value::String(s) => Ok(StringOrList::new(vec![s.clone()])),
        Value::Array(items) => {
            let strings = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| shape(field, "string or array of strings", item))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(StringOrList::new(strings))
        }
        other => Err(shape(field, "string or array of strings", other)),
    }
}

fn principal_from_value(field: &str, value: &Value) -> Result<Principal> {
    match value {
        Value::String(s) if s == "*" => Ok(Principal::Wildcard),
        Value::String(_) => Err(shape(field, "\"*\" or map of principal types", value)),
        Value::Object(map) => {
            let mut members = BTreeMap::new();
            for (key, v) in map {
                members.insert(key.clone(), string_or_list_from_value(field, v)?);
            }
            Ok(Principal::Members(members))
        }
        other => Err(shape(field, "\"*\" or map of principal types", other)),
    }
}

fn condition_from_value(value: &Value) -> Result<Condition> {
    let obj = value
        .as_object()
        .ok_or_else(|| shape("Condition", "object", value))?;

    let mut condition = Condition::new();
    for (operator, kvs) in obj {
        let kvs_obj = kvs
            .as_object()
            .ok_or_else(|| shape("Condition", "object of key/value maps", kvs))?;
        let mut keys = BTreeMap::new();
        for (key, v) in kvs_obj {
            keys.insert(key.clone(), string_or_list_from_value("Condition", v)?);
        }
        condition.insert(operator.clone(), keys);
    }
    Ok(condition)
}

fn shape(field: &str, expected: &'static str, found: &Value) -> Error {
    Error::InvalidShape {
        field: field.to_string(),
        expected,
        found: json_type_name(found),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
