//! Option groups attached to menu items

use serde::{Deserialize, Serialize};

use crate::de::{bool_lenient, f64_lenient, string_lenient};

fn default_max_selected() -> u32 {
    1
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One selectable choice inside an [`OptionGroup`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    #[serde(rename = "nome", default, deserialize_with = "string_lenient")]
    pub name: String,
    /// Added to the item's base price when selected, never negative
    #[serde(rename = "valor_extra", default, deserialize_with = "f64_lenient")]
    pub extra_price: f64,
    /// Sold out choices are shown but cannot be toggled
    #[serde(
        rename = "esgotado",
        default,
        deserialize_with = "bool_lenient",
        skip_serializing_if = "is_false"
    )]
    pub sold_out: bool,
    /// Set on options stored with an order line; absent means selected
    #[serde(rename = "selecionado", default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl OptionChoice {
    pub fn new(name: impl Into<String>, extra_price: f64) -> Self {
        Self {
            name: name.into(),
            extra_price: extra_price.max(0.0),
            sold_out: false,
            selected: None,
        }
    }

    pub fn sold_out(mut self) -> Self {
        self.sold_out = true;
        self
    }

    /// Whether this choice counts as picked when stored on an order line
    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(true)
    }
}

/// A named group of choices with a cap on how many may be picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    #[serde(rename = "nome", default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub ids: String,
    /// Always at least 1
    #[serde(default = "default_max_selected")]
    pub max_selected: u32,
    #[serde(default)]
    pub options: Vec<OptionChoice>,
}

impl OptionGroup {
    pub fn new(name: impl Into<String>, max_selected: u32) -> Self {
        Self {
            name: name.into(),
            ids: String::new(),
            max_selected: max_selected.max(1),
            options: Vec::new(),
        }
    }

    /// The placeholder group used when a menu item has no usable options
    pub fn empty() -> Self {
        Self::new("", 1)
    }

    pub fn with_option(mut self, option: OptionChoice) -> Self {
        self.options.push(option);
        self
    }

    pub fn find(&self, name: &str) -> Option<&OptionChoice> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let group = OptionGroup::new("Frutas", 2)
            .with_option(OptionChoice::new("manga", 2.0))
            .with_option(OptionChoice::new("kiwi", 0.0).sold_out());
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["nome"], "Frutas");
        assert_eq!(json["max_selected"], 2);
        assert_eq!(json["options"][0]["nome"], "manga");
        assert_eq!(json["options"][0]["valor_extra"], 2.0);
        assert!(json["options"][0].get("esgotado").is_none());
        assert_eq!(json["options"][1]["esgotado"], true);
    }

    #[test]
    fn test_lenient_option_fields() {
        let json = r#"{"nome":"Molho","max_selected":1,"options":[{"nome":"barbecue","valor_extra":"1,5","esgotado":1}]}"#;
        let group: OptionGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.options[0].extra_price, 1.5);
        assert!(group.options[0].sold_out);
        assert!(group.options[0].is_selected());
        assert_eq!(group.ids, "");
    }

    #[test]
    fn test_selected_flag() {
        let json = r#"{"nome":"a","selecionado":false}"#;
        let choice: OptionChoice = serde_json::from_str(json).unwrap();
        assert!(!choice.is_selected());
    }

    #[test]
    fn test_negative_extra_clamped_by_constructor() {
        assert_eq!(OptionChoice::new("x", -3.0).extra_price, 0.0);
        assert_eq!(OptionGroup::new("g", 0).max_selected, 1);
    }
}
