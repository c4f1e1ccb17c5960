// Label keys handed to the charting surface
use serde::Serialize;

/// Text of a series name, axis title or annotation.
///
/// The pipeline only ever produces keys; turning them into display text is
/// the job of a [`LabelLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Key(&'static str),
    /// A key with a qualifier, displayed as `"<key> - <qualifier>"`.
    Qualified(&'static str, &'static str),
    Text(String),
}

impl Label {
    pub fn resolve(&self, labels: &dyn LabelLookup) -> Label {
        match self {
            Label::Key(key) => Label::Text(labels.label(key)),
            Label::Qualified(key, qualifier) => Label::Text(format!(
                "{} - {}",
                labels.label(key),
                labels.label(qualifier)
            )),
            Label::Text(text) => Label::Text(text.clone()),
        }
    }
}

pub trait LabelLookup: Send + Sync {
    fn label(&self, key: &str) -> String;
}

/// Lookup returning every key unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLabels;

impl LabelLookup for KeyLabels {
    fn label(&self, key: &str) -> String {
        key.to_string()
    }
}
