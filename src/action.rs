use crate::{
    error::{Result, StoreError},
    plain_record::{is_plain_record, kind_of},
};
use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, sync::OnceLock};

const NAMESPACE: &str = "@@reactive_store";

/// An `Action` which can be dispatched to a [Store](crate::Store).
///
/// Every action must carry a type. The store additionally needs to
/// be able to send its own private [LifecycleAction]s through the
/// application's reducers, hence the `From<LifecycleAction>` bound.
/// Reducers are expected to treat lifecycle actions like any other
/// action type they do not recognise.
pub trait StoreAction: From<LifecycleAction> {
    /// The type of this action, or `None` if it has no type, which
    /// the store rejects on dispatch.
    fn action_type(&self) -> Option<&str>;
}

/// Private actions dispatched by the store itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    /// Dispatched once when a store is created, to seed the initial
    /// state.
    Init,
    /// Dispatched by [Store::replace_reducer()](crate::Store::replace_reducer()).
    Replace,
    /// A random action type used to check that reducers pass unknown
    /// actions through. Never seen by reducers during normal
    /// operation.
    ProbeUnknownAction(String),
}

impl LifecycleAction {
    /// A probe action with a freshly generated, unguessable type.
    pub fn probe_unknown_action() -> Self {
        LifecycleAction::ProbeUnknownAction(format!(
            "{}/PROBE_UNKNOWN_ACTION{}",
            NAMESPACE,
            random_suffix()
        ))
    }

    pub fn action_type(&self) -> &str {
        match self {
            LifecycleAction::Init => init_type(),
            LifecycleAction::Replace => replace_type(),
            LifecycleAction::ProbeUnknownAction(action_type) => action_type,
        }
    }
}

impl Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_type())
    }
}

impl StoreAction for LifecycleAction {
    fn action_type(&self) -> Option<&str> {
        Some(LifecycleAction::action_type(self))
    }
}

fn init_type() -> &'static str {
    static INIT: OnceLock<String> = OnceLock::new();
    INIT.get_or_init(|| format!("{}/INIT{}", NAMESPACE, random_suffix()))
}

fn replace_type() -> &'static str {
    static REPLACE: OnceLock<String> = OnceLock::new();
    REPLACE.get_or_init(|| format!("{}/REPLACE{}", NAMESPACE, random_suffix()))
}

/// Returns `true` if `action_type` is the store's private `INIT` type.
pub fn is_init(action_type: &str) -> bool {
    action_type == init_type()
}

/// Returns `true` if `action_type` is the store's private `REPLACE`
/// type.
pub fn is_replace(action_type: &str) -> bool {
    action_type == replace_type()
}

/// Six random base 36 digits, each preceded by a `.`.
fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .flat_map(|digit| ['.', digit])
        .collect()
}

/// A dynamically shaped action: a `type` plus an arbitrary JSON
/// payload, serialized as a single flat record.
///
/// ```
/// use reactive_store::Action;
///
/// let action = Action::new("todos/add").with("text", "write docs");
/// assert_eq!(action.action_type(), "todos/add");
/// assert_eq!(action.get("text"), Some(&serde_json::json!("write docs")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Action {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Action {
    pub fn new<S: Into<String>>(action_type: S) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field to this action.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl StoreAction for Action {
    fn action_type(&self) -> Option<&str> {
        Some(&self.action_type)
    }
}

impl From<LifecycleAction> for Action {
    fn from(action: LifecycleAction) -> Self {
        Action::new(action.action_type())
    }
}

impl TryFrom<Value> for Action {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self> {
        check_action_value(&value)?;

        let mut record = match value {
            Value::Object(record) => record,
            other => {
                return Err(StoreError::InvalidAction {
                    kind: kind_of(&other).to_string(),
                })
            }
        };

        let action_type = match record.remove("type") {
            Some(Value::String(action_type)) => action_type,
            Some(Value::Null) | None => return Err(StoreError::MissingActionType),
            Some(other) => other.to_string(),
        };

        Ok(Action {
            action_type,
            payload: record,
        })
    }
}

/// Check that an untyped action is a plain record with a `type`.
fn check_action_value(value: &Value) -> Result<()> {
    if !is_plain_record(value) {
        return Err(StoreError::InvalidAction {
            kind: kind_of(value).to_string(),
        });
    }

    match value.get("type") {
        None | Some(Value::Null) => Err(StoreError::MissingActionType),
        Some(_) => Ok(()),
    }
}

/// Read an action which arrived as an untyped value (for example over
/// a wire) into the store's action type.
pub(crate) fn action_from_value<A: DeserializeOwned>(value: Value) -> Result<A> {
    check_action_value(&value)?;
    serde_json::from_value(value).map_err(|error| StoreError::MalformedAction(error.to_string()))
}
