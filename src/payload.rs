//! Loosely-typed constraint ingestion.
//!
//! Callers usually hold constraints as stored records: the kind and
//! priority as strings and the parameters as an arbitrary JSON value. This
//! module turns those records into typed [`Constraint`]s.
//!
//! # Rule payloads
//! A rule value may be a scalar or an object:
//!
//! | Kind | Scalar | Object keys |
//! |------|--------|-------------|
//! | `STUDENT_BREAK` | minutes | `minBreakMinutes` |
//! | `DEPARTMENT_POLICY` | hour or `"HH:MM"` | `maxEndHour`, `maxEndTime` |
//! | `TIME_WINDOW` | - | `start`/`startTime`, `end`/`endTime` |
//! | `CONSECUTIVE_SESSIONS` | count | `maxConsecutive` |
//!
//! Missing and unknown keys fall back to the kind's defaults. The other
//! four kinds take no parameters and ignore the value.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::{PayloadError, Result};
use crate::models::{
    parse_time_of_day, ConsecutiveRule, Constraint, ConstraintRule, ConstraintType,
    DepartmentPolicyRule, Priority, StudentBreakRule, TimeWindowRule,
};

/// A constraint as stored by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub constraint_type: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub entity_ids: Vec<String>,
    #[serde(default)]
    pub rule: Value,
}

fn default_active() -> bool {
    true
}

impl ConstraintRecord {
    /// Creates an active record with no parameters.
    pub fn new(id: impl Into<String>, constraint_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            constraint_type: constraint_type.into(),
            priority: None,
            is_active: true,
            weight: None,
            entity_ids: Vec::new(),
            rule: Value::Null,
        }
    }

    /// Sets the priority name.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the rule payload.
    pub fn with_rule(mut self, rule: Value) -> Self {
        self.rule = rule;
        self
    }

    /// Adds an entity to the scope.
    pub fn for_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_ids.push(entity_id.into());
        self
    }
}

impl TryFrom<ConstraintRecord> for Constraint {
    type Error = PayloadError;

    fn try_from(record: ConstraintRecord) -> Result<Self> {
        let kind = ConstraintType::from_name(&record.constraint_type)
            .ok_or_else(|| PayloadError::UnknownConstraintType(record.constraint_type.clone()))?;

        let priority = match record.priority.as_deref() {
            None => Priority::default(),
            Some(name) => Priority::from_name(name)
                .ok_or_else(|| PayloadError::UnknownPriority(name.to_string()))?,
        };

        let weight = record.weight.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&weight) {
            return Err(PayloadError::InvalidWeight(weight));
        }

        Ok(Constraint {
            id: record.id,
            rule: parse_rule(kind, &record.rule)?,
            priority,
            is_active: record.is_active,
            weight,
            entity_ids: record.entity_ids.into_iter().collect::<BTreeSet<_>>(),
        })
    }
}

/// Builds the typed rule for `kind` from a raw payload.
pub fn parse_rule(kind: ConstraintType, value: &Value) -> Result<ConstraintRule> {
    let rule = match kind {
        ConstraintType::StudentBreak => {
            let mut rule = StudentBreakRule::default();
            if let Some(v) = param(value, &["minBreakMinutes"]) {
                if let Some(minutes) = positive_u32(v, "minBreakMinutes")? {
                    rule.min_break_minutes = minutes;
                }
            }
            ConstraintRule::StudentBreak(rule)
        }
        ConstraintType::DepartmentPolicy => {
            let mut rule = DepartmentPolicyRule::default();
            if let Some(v) = param(value, &["maxEndHour", "maxEndTime"]) {
                if let Some(time) = time_param(v)? {
                    rule.max_end_hour = time.hour();
                }
            }
            ConstraintRule::DepartmentPolicy(rule)
        }
        ConstraintType::TimeWindow => {
            let mut rule = TimeWindowRule::default();
            if let Some(v) = field(value, &["start", "startTime"]) {
                if let Some(time) = time_param(v)? {
                    rule.start = time;
                }
            }
            if let Some(v) = field(value, &["end", "endTime"]) {
                if let Some(time) = time_param(v)? {
                    rule.end = time;
                }
            }
            ConstraintRule::TimeWindow(rule)
        }
        ConstraintType::ConsecutiveSessions => {
            let mut rule = ConsecutiveRule::default();
            if let Some(v) = param(value, &["maxConsecutive"]) {
                if let Some(count) = positive_u32(v, "maxConsecutive")? {
                    rule.max_consecutive = count as usize;
                }
            }
            ConstraintRule::ConsecutiveSessions(rule)
        }
        ConstraintType::HardAvailability
        | ConstraintType::VenueCapacity
        | ConstraintType::EquipmentRequirement
        | ConstraintType::LecturerPreference => ConstraintRule::default_for(kind),
    };
    Ok(rule)
}

/// The scalar itself, or the first present key of an object.
fn param<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    match value {
        Value::Object(_) => field(value, keys),
        Value::Null | Value::Array(_) => None,
        scalar => Some(scalar),
    }
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = value.as_object()?;
    keys.iter()
        .find_map(|k| map.get(*k))
        .filter(|v| !v.is_null())
}

/// A positive whole number. Non-numeric values fall back to the default.
fn positive_u32(value: &Value, key: &'static str) -> Result<Option<u32>> {
    let Some(n) = value.as_f64() else {
        return Ok(None);
    };
    if n <= 0.0 {
        return Err(PayloadError::NonPositiveParameter { key, value: n });
    }
    Ok(Some(n.round().min(f64::from(u32::MAX)) as u32))
}

/// `"HH:MM"` string or an integer hour.
fn time_param(value: &Value) -> Result<Option<NaiveTime>> {
    match value {
        Value::String(s) => parse_time_of_day(s).map(Some),
        Value::Number(n) => {
            let hour = n
                .as_u64()
                .filter(|h| *h < 24)
                .ok_or_else(|| PayloadError::InvalidTime(n.to_string()))?;
            NaiveTime::from_hms_opt(hour as u32, 0, 0)
                .map(Some)
                .ok_or_else(|| PayloadError::InvalidTime(n.to_string()))
        }
        _ => Ok(None),
    }
}

/// A converted batch of constraint records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintCatalogue {
    constraints: Vec<Constraint>,
    rejected: Vec<(String, PayloadError)>,
}

impl ConstraintCatalogue {
    /// Converts records in order.
    ///
    /// Records that fail to convert are left out and kept in
    /// [`rejected`](Self::rejected) so the rest can still be evaluated.
    pub fn from_records(records: impl IntoIterator<Item = ConstraintRecord>) -> Self {
        let mut catalogue = Self::default();
        for record in records {
            let id = record.id.clone();
            match Constraint::try_from(record) {
                Ok(c) => catalogue.constraints.push(c),
                Err(err) => {
                    tracing::warn!(constraint_id = %id, error = %err, "constraint record skipped");
                    catalogue.rejected.push((id, err));
                }
            }
        }
        catalogue
    }

    /// Converted constraints, in record order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Ids and errors of records that were skipped.
    pub fn rejected(&self) -> &[(String, PayloadError)] {
        &self.rejected
    }

    /// Consumes the catalogue, returning the converted constraints.
    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }
}
