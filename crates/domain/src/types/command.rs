//! Commands and their parameter values
//!
//! A [`Command`] is the generic shape every API call is reduced to: a name,
//! a map of parameters, the set of fields that must be present, and whether
//! the server answers with an async job id. Typed commands describe
//! themselves through [`CommandSpec`] instead of runtime introspection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::{PARAM_API_KEY, PARAM_COMMAND, PARAM_RESPONSE, PARAM_SIGNATURE};
use crate::errors::{CloudCallError, Result};

/// Parameter names the request builder injects itself.
pub const RESERVED_PARAMS: [&str; 4] = [PARAM_COMMAND, PARAM_RESPONSE, PARAM_API_KEY, PARAM_SIGNATURE];

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Sent as-is.
    Scalar(String),
    /// Sent comma-joined: `ids=1,2,3`.
    List(Vec<String>),
    /// Sent as indexed dotted keys: `tags[0].key=a&tags[0].value=1`.
    Records(Vec<BTreeMap<String, String>>),
}

impl ParamValue {
    /// Build a scalar list from anything displayable.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::List(items.into_iter().map(|item| item.to_string()).collect())
    }

    /// Build a record list from `(field, value)` pairs per record.
    pub fn records<R, F, K, V>(records: R) -> Self
    where
        R: IntoIterator<Item = F>,
        F: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self::Records(
            records
                .into_iter()
                .map(|record| {
                    record.into_iter().map(|(k, v)| (k.into(), v.to_string())).collect()
                })
                .collect(),
        )
    }

    /// Empty strings, empty lists and empty record lists are treated as
    /// absent and never sent.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Records(records) => records.iter().all(BTreeMap::is_empty),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(bool, i32, i64, u16, u32, u64, usize, f64);

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        Self::list(value)
    }
}

impl From<Vec<BTreeMap<String, String>>> for ParamValue {
    fn from(value: Vec<BTreeMap<String, String>>) -> Self {
        Self::Records(value)
    }
}

/// One declared field of a typed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Wire name of the parameter.
    pub name: &'static str,
    /// Current value; `None` is never sent.
    pub value: Option<ParamValue>,
    /// Whether validation rejects the command without a value.
    pub required: bool,
}

impl Field {
    /// A field the command cannot be sent without.
    pub fn required<V: Into<ParamValue>>(name: &'static str, value: Option<V>) -> Self {
        Self { name, value: value.map(Into::into), required: true }
    }

    /// A field that may be left out.
    pub fn optional<V: Into<ParamValue>>(name: &'static str, value: Option<V>) -> Self {
        Self { name, value: value.map(Into::into), required: false }
    }
}

/// Static description of a typed command.
///
/// Implementors list every field with its value and whether it is required;
/// [`Command::from_spec`] turns that into the generic wire shape.
pub trait CommandSpec {
    /// API command name, e.g. `deployVirtualMachine`.
    const NAME: &'static str;
    /// Whether the server answers with a job id to poll.
    const IS_ASYNC: bool = false;

    /// Every declared field, set or not.
    fn fields(&self) -> Vec<Field>;
}

/// A named, parameterized request to the management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    name: String,
    parameters: BTreeMap<String, ParamValue>,
    required_fields: BTreeSet<String>,
    is_async: bool,
}

impl Command {
    /// Synchronous command with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
            required_fields: BTreeSet::new(),
            is_async: false,
        }
    }

    /// Build the generic command from a typed spec.
    pub fn from_spec<S: CommandSpec>(spec: &S) -> Self {
        let mut command = Self::new(S::NAME).asynchronous(S::IS_ASYNC);
        for field in spec.fields() {
            if field.required {
                command.required_fields.insert(field.name.to_string());
            }
            if let Some(value) = field.value {
                command.parameters.insert(field.name.to_string(), value);
            }
        }
        command
    }

    /// Set a parameter, replacing any previous value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set_param(key, value);
        self
    }

    /// Add the parameter only when a value is present.
    pub fn with_optional_param<V: Into<ParamValue>>(
        mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        if let Some(value) = value {
            self.set_param(key, value);
        }
        self
    }

    /// Mark `field` as required.
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required_fields.insert(field.into());
        self
    }

    /// Mark the command as answering with a job id.
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// In-place form of [`Command::with_param`].
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// API command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in key order.
    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    /// Names that must carry a value.
    pub fn required_fields(&self) -> &BTreeSet<String> {
        &self.required_fields
    }

    /// Whether the dispatcher polls for a job result.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Required fields that have no non-empty value, in sorted order.
    pub fn missing_required_fields(&self) -> Vec<&str> {
        self.required_fields
            .iter()
            .filter(|field| self.parameters.get(*field).map_or(true, ParamValue::is_empty))
            .map(String::as_str)
            .collect()
    }

    /// Check the command can be sent. No I/O happens here.
    ///
    /// # Errors
    /// Returns [`CloudCallError::Validation`] when the name is empty, a
    /// required field is missing, or a parameter shadows a name the request
    /// builder injects.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CloudCallError::Validation("command name is empty".into()));
        }

        let missing = self.missing_required_fields();
        if !missing.is_empty() {
            return Err(CloudCallError::Validation(format!(
                "{}: missing required field(s): {}",
                self.name,
                missing.join(", ")
            )));
        }

        if let Some(reserved) = self.parameters.keys().find(|key| {
            RESERVED_PARAMS.iter().any(|reserved| reserved.eq_ignore_ascii_case(key))
        }) {
            return Err(CloudCallError::Validation(format!(
                "{}: parameter '{reserved}' is reserved",
                self.name
            )));
        }

        Ok(())
    }
}
