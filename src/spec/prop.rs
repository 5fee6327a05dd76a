//! Tri-state specification attributes.
//!
//! Machine-generated Vega-Lite distinguishes three states for almost every
//! attribute: the key is absent, the key is explicitly `null`, or the key
//! carries a value. Several heuristics must tell "explicitly disabled" apart
//! from "never set" (legend suppression, binning), so the distinction is a
//! first-class enum rather than nested `Option`s.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A specification attribute that is unset, explicitly null, or a value.
///
/// With `#[serde(default, skip_serializing_if = "Prop::is_unset")]` on the
/// field, a missing key round-trips as [`Prop::Unset`] and an explicit JSON
/// `null` as [`Prop::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prop<T> {
    /// The attribute was never specified.
    Unset,
    /// The attribute was explicitly set to `null` (e.g. `"legend": null`).
    Null,
    /// The attribute carries a value.
    Value(T),
}

impl<T> Prop<T> {
    /// True when the attribute was never specified.
    pub fn is_unset(&self) -> bool {
        matches!(self, Prop::Unset)
    }

    /// True when the attribute was explicitly nulled out.
    pub fn is_null(&self) -> bool {
        matches!(self, Prop::Null)
    }

    /// True when the attribute carries a value.
    pub fn is_defined(&self) -> bool {
        matches!(self, Prop::Value(_))
    }

    /// The contained value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Prop::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Mutable access to the contained value, if any.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Prop::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Reset the attribute to unset.
    pub fn unset(&mut self) {
        *self = Prop::Unset;
    }

    /// Replace the attribute with unset, returning the previous state.
    pub fn take(&mut self) -> Prop<T> {
        std::mem::replace(self, Prop::Unset)
    }

    /// The contained value, inserting one first if unset or null.
    pub fn get_or_insert_with(&mut self, default: impl FnOnce() -> T) -> &mut T {
        if !self.is_defined() {
            *self = Prop::Value(default());
        }
        match self {
            Prop::Value(value) => value,
            // Just written above.
            _ => unreachable!(),
        }
    }
}

// Manual impl: must not require `T: Default`.
impl<T> Default for Prop<T> {
    fn default() -> Self {
        Prop::Unset
    }
}

impl<T> From<T> for Prop<T> {
    fn from(value: T) -> Self {
        Prop::Value(value)
    }
}

impl<T: Serialize> Serialize for Prop<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Unset attributes are skipped at the field level; if one is
            // serialized anyway, null is the closest JSON has.
            Prop::Unset | Prop::Null => serializer.serialize_none(),
            Prop::Value(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Prop<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => Prop::Null,
            Some(value) => Prop::Value(value),
        })
    }
}
