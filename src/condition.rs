use crate::context::RequestContext;
use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde_json::Value;
use std::borrow::Cow;

/// Predicate attached to a permission. A grant applies only when every
/// attached condition holds for the request context.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Compares a dotted-path context field against a value.
    Context(ContextCondition),
    /// Restricts the grant to a time window, weekdays, or hours.
    Time(TimeCondition),
    /// Restricts the grant to a set of locations.
    Location(LocationCondition),
    /// Defers to a registered [`CustomEvaluator`].
    Custom(CustomCondition),
}

/// Context field comparison.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContextCondition {
    /// Dotted path into the request context.
    pub field: String,
    /// Comparison operator.
    pub operator: ContextOperator,
    /// Right-hand side of the comparison.
    pub value: Value,
}

/// Comparison operators for [`ContextCondition`].
///
/// String operators are case-sensitive. `In`/`NotIn` require the condition
/// value to be an array; any other value shape never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
}

/// Wall-clock restriction. Weekdays are numbered 0 (Sunday) through
/// 6 (Saturday); hours are 0 through 23.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum TimeCondition {
    /// Absolute window, inclusive on both ends.
    #[serde(rename_all = "camelCase")]
    Window {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    /// Allowed weekdays. An empty list does not constrain.
    Days { days: Vec<u8> },
    /// Allowed hours of day. An empty list does not constrain.
    Hours { hours: Vec<u8> },
}

/// Location restriction compared against the context `location` entry.
/// A context without a location is not constrained by this condition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCondition {
    pub allowed_locations: Vec<String>,
}

/// Opaque condition delegated to an injected evaluator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CustomCondition {
    /// Evaluator-facing condition name.
    pub name: String,
    /// Free-form parameters passed to the evaluator.
    #[serde(default)]
    pub params: Value,
}

/// Evaluator interface for [`Condition::Custom`].
///
/// There is no default implementation: reaching a custom condition with no
/// evaluator registered fails the resolution (deny), it never grants.
pub trait CustomEvaluator: Send + Sync {
    /// Evaluates a custom condition against the request context.
    fn evaluate(&self, condition: &CustomCondition, context: &RequestContext) -> Result<bool>;
}

impl Condition {
    /// Evaluates this condition against a context at the given instant.
    pub fn evaluate(
        &self,
        context: &RequestContext,
        now: DateTime<Utc>,
        custom: Option<&dyn CustomEvaluator>,
    ) -> Result<bool> {
        match self {
            Condition::Context(condition) => Ok(condition.evaluate(context)),
            Condition::Time(condition) => Ok(condition.evaluate(now)),
            Condition::Location(condition) => Ok(condition.evaluate(context)),
            Condition::Custom(condition) => match custom {
                Some(evaluator) => evaluator.evaluate(condition, context),
                None => Err(Error::MissingCustomEvaluator {
                    name: condition.name.clone(),
                }),
            },
        }
    }
}

/// Evaluates a condition list with AND semantics, short-circuiting on the
/// first failed condition. An empty list trivially holds.
pub fn evaluate_all(
    conditions: &[Condition],
    context: &RequestContext,
    now: DateTime<Utc>,
    custom: Option<&dyn CustomEvaluator>,
) -> Result<bool> {
    for condition in conditions {
        if !condition.evaluate(context, now, custom)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl ContextCondition {
    fn evaluate(&self, context: &RequestContext) -> bool {
        let actual = context.get_path(&self.field);
        match self.operator {
            ContextOperator::Equals => actual == Some(&self.value),
            ContextOperator::NotEquals => actual != Some(&self.value),
            ContextOperator::In => match (&self.value, actual) {
                (Value::Array(items), Some(actual)) => items.contains(actual),
                _ => false,
            },
            ContextOperator::NotIn => match &self.value {
                Value::Array(items) => match actual {
                    Some(actual) => !items.contains(actual),
                    None => true,
                },
                _ => false,
            },
            ContextOperator::Contains => self.string_compare(actual, |a, b| a.contains(b)),
            ContextOperator::StartsWith => self.string_compare(actual, |a, b| a.starts_with(b)),
            ContextOperator::EndsWith => self.string_compare(actual, |a, b| a.ends_with(b)),
        }
    }

    fn string_compare(&self, actual: Option<&Value>, op: impl Fn(&str, &str) -> bool) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        op(value_as_text(actual).as_ref(), value_as_text(&self.value).as_ref())
    }
}

fn value_as_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

impl TimeCondition {
    fn evaluate(&self, now: DateTime<Utc>) -> bool {
        match self {
            TimeCondition::Window {
                start_time,
                end_time,
            } => now >= *start_time && now <= *end_time,
            TimeCondition::Days { days } => {
                days.is_empty() || days.contains(&(now.weekday().num_days_from_sunday() as u8))
            }
            TimeCondition::Hours { hours } => {
                hours.is_empty() || hours.contains(&(now.hour() as u8))
            }
        }
    }
}

impl LocationCondition {
    fn evaluate(&self, context: &RequestContext) -> bool {
        let Some(location) = context.get_path("location").and_then(Value::as_str) else {
            return true;
        };
        self.allowed_locations
            .iter()
            .any(|allowed| allowed == location)
    }
}
