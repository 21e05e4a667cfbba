//! Parameter bundle (spec §3, "Node type"): "a parameter bundle (name →
//! typed default plus required flag)".

use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSlot {
    pub default: ParamValue,
    pub required: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterBundle {
    slots: HashMap<String, ParameterSlot>,
}

impl ParameterBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: impl Into<String>, default: ParamValue, required: bool) -> Self {
        self.slots.insert(name.into(), ParameterSlot { default, required });
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSlot> {
        self.slots.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.slots.get(name).map(|s| s.required).unwrap_or(false)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(|s| s.as_str())
    }

    pub fn defaults(&self) -> HashMap<String, ParamValue> {
        self.slots
            .iter()
            .map(|(k, v)| (k.clone(), v.default.clone()))
            .collect()
    }
}
