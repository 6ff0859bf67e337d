//! Field descriptors: one per member of a record, carrying the naming used by
//! flags, the config document and prompts, plus a checked write path back
//! into the record.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ClapbindError;
use crate::flatten;
use crate::record::Record;
use crate::schema;
use crate::types::{FieldValue, Kind};

/// One member of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Serialized member name, the key used when writing into the record.
    pub member: String,
    /// Flag name and config document key.
    pub long: String,
    pub short: Option<char>,
    pub usage: String,
    pub prompt: bool,
    pub kind: Kind,
}

/// Describe every member of `record`, in declaration order.
///
/// Members of unsupported kinds are included so the list mirrors the record;
/// callers skip them with [`Kind::is_bindable`].
pub fn describe<R: Record>(record: &R) -> Result<Vec<Field>, ClapbindError> {
    let mut members = flatten::members(record).map_err(|e| ClapbindError::NotARecord {
        type_name: std::any::type_name::<R>().to_string(),
        reason: e.to_string(),
    })?;
    refine_kinds::<R>(&mut members);
    let tags = R::tags();

    let mut fields = Vec::with_capacity(members.len());
    let mut longs = HashSet::new();
    let mut shorts = HashSet::new();

    for (member, kind) in members {
        let tagged = tags.get(&member);
        let long = tagged
            .and_then(|t| t.long.clone())
            .unwrap_or_else(|| member.to_lowercase());
        if long.is_empty() {
            return Err(ClapbindError::EmptyLongName { member });
        }
        if !longs.insert(long.clone()) {
            return Err(ClapbindError::DuplicateFlag(long));
        }
        let short = tagged.and_then(|t| t.short);
        if let Some(c) = short
            && !shorts.insert(c)
        {
            return Err(ClapbindError::DuplicateFlag(c.to_string()));
        }
        let usage = tagged
            .and_then(|t| t.usage.clone())
            .unwrap_or_else(|| member.clone());
        let prompt = tagged
            .and_then(|t| t.prompt.as_deref())
            .is_some_and(|token| token.eq_ignore_ascii_case("yes"));

        if !kind.is_bindable() {
            tracing::debug!(member = %member, "member kind is not bindable, skipping");
        }

        fields.push(Field {
            member,
            long,
            short,
            usage,
            prompt,
            kind,
        });
    }
    Ok(fields)
}

/// Replace value-based kinds with the kinds of the members' types. Records
/// whose types reject placeholder values keep the value-based kinds.
fn refine_kinds<R: Record>(members: &mut [(String, Kind)]) {
    if members.is_empty() {
        return;
    }
    let names: Vec<String> = members.iter().map(|(name, _)| name.clone()).collect();
    match schema::member_kinds::<R>(&names) {
        Ok(kinds) => {
            for (name, kind) in members.iter_mut() {
                if let Some(typed) = kinds.get(name) {
                    *kind = *typed;
                }
            }
        }
        Err(e) => {
            tracing::debug!(
                record = std::any::type_name::<R>(),
                error = %e,
                "member types not readable, using value kinds"
            );
        }
    }
}

impl Field {
    /// Write `value` into this field's member of `record`.
    ///
    /// The record is round-tripped through JSON so serde attributes and the
    /// member's own range checks apply. On failure the record is unchanged.
    pub fn write<R: Record>(&self, record: &mut R, value: FieldValue) -> Result<(), ClapbindError> {
        let mut json = serde_json::to_value(&*record).map_err(|e| self.write_failed(e))?;
        let Value::Object(map) = &mut json else {
            return Err(self.write_failed("record does not serialize as a struct"));
        };
        map.insert(self.member.clone(), value.into_json());
        *record = serde_json::from_value(json).map_err(|e| self.write_failed(e))?;
        Ok(())
    }

    /// Current value of this field's member, rendered for help text.
    pub fn current<R: Record>(&self, record: &R) -> Option<String> {
        let json = serde_json::to_value(record).ok()?;
        json.get(&self.member).map(render)
    }

    fn write_failed(&self, reason: impl std::fmt::Display) -> ClapbindError {
        ClapbindError::WriteFailed {
            key: self.long.clone(),
            reason: reason.to_string(),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
