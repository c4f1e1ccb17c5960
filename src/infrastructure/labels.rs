// Label lookup backed by the configured label table
use crate::domain::label::LabelLookup;
use std::collections::HashMap;

/// Keys missing from the table are shown as-is.
#[derive(Debug, Clone, Default)]
pub struct ConfigLabels {
    table: HashMap<String, String>,
}

impl ConfigLabels {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }
}

impl LabelLookup for ConfigLabels {
    fn label(&self, key: &str) -> String {
        self.table
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::Label;

    #[test]
    fn test_translates_known_keys_only() {
        let labels = ConfigLabels::new(HashMap::from([
            ("Temperature".to_string(), "Temperatura".to_string()),
            ("range".to_string(), "zakres".to_string()),
        ]));

        assert_eq!(labels.label("Temperature"), "Temperatura");
        assert_eq!(labels.label("Humidity"), "Humidity");
        assert_eq!(
            Label::Qualified("Temperature", "range").resolve(&labels),
            Label::Text("Temperatura - zakres".to_string())
        );
    }
}
