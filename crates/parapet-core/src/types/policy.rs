//! IAM policy object model
//!
//! The in-memory form of an AWS-style policy document. Decoding of the
//! lenient JSON shapes lives in [`crate::decode`]; serialization always
//! emits the canonical form (lists as arrays, wildcard principal as `"*"`,
//! empty members omitted). Maps are BTreeMaps so canonical JSON is
//! deterministic.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// An ordered list of strings that policy JSON may write either as a bare
/// string or as an array. Always serializes as an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringOrList(Vec<String>);

impl StringOrList {
    pub fn new(items: Vec<String>) -> Self {
        Self(items)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn contains(&self, s: &str) -> bool {
        self.0.iter().any(|item| item == s)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl<S: Into<String>> FromIterator<S> for StringOrList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a StringOrList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Statement effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal specification: either the wildcard `"*"` or a map from
/// principal-type key (e.g. `"AWS"`, `"Service"`) to identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Wildcard,
    Members(BTreeMap<String, StringOrList>),
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Principal::Wildcard => serializer.serialize_str("*"),
            Principal::Members(members) => members.serialize(serializer),
        }
    }
}

/// Condition block, preserved verbatim: operator -> (key -> values)
pub type Condition = BTreeMap<String, BTreeMap<String, StringOrList>>;

/// A single policy statement
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    pub effect: Effect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_principal: Option<Principal>,

    #[serde(skip_serializing_if = "StringOrList::is_empty")]
    pub action: StringOrList,

    #[serde(skip_serializing_if = "StringOrList::is_empty")]
    pub not_action: StringOrList,

    #[serde(skip_serializing_if = "StringOrList::is_empty")]
    pub resource: StringOrList,

    #[serde(skip_serializing_if = "StringOrList::is_empty")]
    pub not_resource: StringOrList,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Statement {
    /// Create a new allow statement
    pub fn allow() -> Self {
        Self {
            effect: Effect::Allow,
            ..Self::default()
        }
    }

    /// Create a new deny statement
    pub fn deny() -> Self {
        Self {
            effect: Effect::Deny,
            ..Self::default()
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_actions<S: Into<String>>(mut self, actions: impl IntoIterator<Item = S>) -> Self {
        self.action = actions.into_iter().collect();
        self
    }

    pub fn with_not_actions<S: Into<String>>(
        mut self,
        actions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.not_action = actions.into_iter().collect();
        self
    }

    pub fn with_resources<S: Into<String>>(
        mut self,
        resources: impl IntoIterator<Item = S>,
    ) -> Self {
        self.resource = resources.into_iter().collect();
        self
    }

    pub fn with_not_resources<S: Into<String>>(
        mut self,
        resources: impl IntoIterator<Item = S>,
    ) -> Self {
        self.not_resource = resources.into_iter().collect();
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// IAM policy document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub statement: Vec<Statement>,
}

impl Policy {
    /// Create an empty policy with the current language version
    pub fn new() -> Self {
        Self {
            version: "2012-10-17".to_string(),
            id: None,
            statement: Vec::new(),
        }
    }

    pub fn add_statement(mut self, statement: Statement) -> Self {
        self.statement.push(statement);
        self
    }
}
