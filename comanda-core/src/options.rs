//! Option-group normalizer
//!
//! Menu items store their options in whatever shape the backend happened to
//! write: a structured array, the same array JSON-encoded into a string, or
//! the legacy `Group(opt1-opt2+N)` notation. Everything is classified into
//! [`RawOptions`] first and then normalized into `Vec<OptionGroup>`.

use serde_json::Value;
use shared::de::{value_as_f64, value_as_string};
use shared::models::{Category, MenuEntry, MenuItem, OptionChoice, OptionGroup};
use shared::order::MenuItemForm;

use crate::error::{CoreError, CoreResult};

/// Classified options payload
#[derive(Debug, Clone, PartialEq)]
pub enum RawOptions {
    /// Array of group objects (possibly decoded from a JSON string)
    Structured(Vec<Value>),
    /// Legacy `Name(a-b+2)` notation
    Legacy(String),
    /// Null, number, bool, blank text or an object without groups
    Unrecognised,
}

impl RawOptions {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::Structured(items.clone()),
            Value::Object(map) => ["groups", "opcoes", "options"]
                .iter()
                .find_map(|key| match map.get(*key) {
                    Some(Value::Array(items)) => Some(Self::Structured(items.clone())),
                    _ => None,
                })
                .unwrap_or(Self::Unrecognised),
            Value::String(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Self::Unrecognised;
                }
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(parsed @ (Value::Array(_) | Value::Object(_))) => Self::classify(&parsed),
                    _ => Self::Legacy(trimmed.to_string()),
                }
            }
            _ => Self::Unrecognised,
        }
    }
}

/// Normalize any stored options payload; never fails.
///
/// Unusable or empty input yields a single empty default group.
pub fn normalize(value: &Value) -> Vec<OptionGroup> {
    let groups = match RawOptions::classify(value) {
        RawOptions::Structured(items) => items.iter().map(structured_group).collect(),
        RawOptions::Legacy(text) => parse_legacy(&text),
        RawOptions::Unrecognised => Vec::new(),
    };
    if groups.is_empty() {
        tracing::debug!("No usable option groups, using default group");
        return vec![OptionGroup::empty()];
    }
    groups
}

fn structured_group(value: &Value) -> OptionGroup {
    let empty = serde_json::Map::new();
    let map = value.as_object().unwrap_or(&empty);

    let max_selected = map
        .get("max_selected")
        .and_then(value_as_f64)
        .filter(|v| *v >= 1.0)
        .map(|v| v.min(u32::MAX as f64) as u32)
        .unwrap_or(1);
    let mut group = OptionGroup::new(
        map.get("nome").and_then(value_as_string).unwrap_or_default(),
        max_selected,
    );
    group.ids = map.get("ids").and_then(value_as_string).unwrap_or_default();

    if let Some(Value::Array(options)) = map.get("options") {
        group.options = options.iter().map(structured_option).collect();
    }
    group
}

fn structured_option(value: &Value) -> OptionChoice {
    match value {
        Value::Object(map) => {
            let name = map.get("nome").and_then(value_as_string).unwrap_or_default();
            let extra = map
                .get("valor_extra")
                .and_then(value_as_f64)
                .unwrap_or(0.0);
            let mut choice = OptionChoice::new(name, extra);
            choice.sold_out = map
                .get("esgotado")
                .is_some_and(shared::de::value_as_bool);
            choice
        }
        other => OptionChoice::new(value_as_string(other).unwrap_or_default(), 0.0),
    }
}

/// Parse the legacy notation, e.g. `Frutas(morango-melancia-manga+2)`.
///
/// Several groups may be concatenated. A `Name()` group has no options.
pub fn parse_legacy(text: &str) -> Vec<OptionGroup> {
    let mut groups = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('(') {
        let Some(close_offset) = rest[open + 1..].find(')') else {
            break;
        };
        let close = open + 1 + close_offset;
        let raw_name = &rest[..open];
        let body = rest[open + 1..close].trim();
        rest = &rest[close + 1..];

        if raw_name.is_empty() {
            continue;
        }

        let mut group = OptionGroup::new(raw_name.trim(), 1);
        if !body.is_empty() {
            group.options = body.split('-').map(parse_legacy_token).collect();
        }
        groups.push(group);
    }
    groups
}

/// `name+N` -> (name, N) when `N` is all digits; anything else is the
/// whole token as the name at no extra cost.
fn parse_legacy_token(token: &str) -> OptionChoice {
    let token = token.trim();
    let priced = token.rsplit_once('+').and_then(|(name, digits)| {
        let is_price = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
        is_price.then(|| (name, digits.parse::<f64>().unwrap_or(0.0)))
    });
    match priced {
        Some((name, extra)) => OptionChoice::new(name.trim(), extra),
        None => {
            if token.contains('+') {
                tracing::warn!(token = %token, "Option suffix is not a whole price, kept in the name");
            }
            OptionChoice::new(token, 0.0)
        }
    }
}

/// Drop blank-named options, then groups left with no options.
///
/// Applied before a menu edit is submitted.
pub fn sanitize_groups(groups: &[OptionGroup]) -> Vec<OptionGroup> {
    groups
        .iter()
        .filter_map(|group| {
            let options: Vec<OptionChoice> = group
                .options
                .iter()
                .filter(|o| !o.name.trim().is_empty())
                .cloned()
                .collect();
            (!options.is_empty()).then(|| OptionGroup {
                options,
                ..group.clone()
            })
        })
        .collect()
}

/// Check a menu admin submission and strip its blank options
pub fn prepare_menu_form(mut form: MenuItemForm) -> CoreResult<MenuItemForm> {
    form.item = form.item.trim().to_string();
    if form.item.is_empty() {
        return Err(CoreError::invalid_field("item", "name is required"));
    }
    if !form.preco.is_finite() || form.preco < 0.0 {
        return Err(CoreError::invalid_field("preco", "invalid price"));
    }
    form.novo_nome = form
        .novo_nome
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    form.opcoes = sanitize_groups(&form.opcoes);
    Ok(form)
}

/// Options with a positive extra price, e.g. `manga (+R$ 2,00), kiwi (+R$ 1,50)`
pub fn extras_label(options: &[OptionChoice]) -> String {
    options
        .iter()
        .filter(|o| o.extra_price > 0.0)
        .map(|o| format!("{} (+{})", o.name, crate::money::format_brl(o.extra_price)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a menu item from a raw menu row
pub fn menu_item(entry: &MenuEntry) -> MenuItem {
    MenuItem {
        id: entry.id.clone(),
        name: entry.item.clone(),
        base_price: entry.preco.max(0.0),
        category: Category::from(entry.categoria_id as i64),
        option_groups: normalize(&entry.opcoes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(group: &OptionGroup) -> Vec<(&str, f64)> {
        group
            .options
            .iter()
            .map(|o| (o.name.as_str(), o.extra_price))
            .collect()
    }

    #[test]
    fn test_legacy_single_group() {
        let groups = normalize(&json!("Frutas(morango-melancia-manga+2)"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Frutas");
        assert_eq!(groups[0].max_selected, 1);
        assert_eq!(
            names(&groups[0]),
            vec![("morango", 0.0), ("melancia", 0.0), ("manga", 2.0)]
        );
    }

    #[test]
    fn test_legacy_concatenated_groups() {
        let groups = parse_legacy(
            "Frutas(morango-manga+2)Complementos(banana-leite-leite condensado+2)",
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].name, "Complementos");
        assert_eq!(groups[1].options[2].name, "leite condensado");
        assert_eq!(groups[1].options[2].extra_price, 2.0);
    }

    #[test]
    fn test_legacy_empty_body() {
        let groups = normalize(&json!("Molhos()"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Molhos");
        assert!(groups[0].options.is_empty());
    }

    #[test]
    fn test_legacy_malformed_suffix() {
        let groups = parse_legacy("Extras(bacon+abc-queijo+1,5-ovo+-palmito+4)");
        assert_eq!(
            names(&groups[0]),
            vec![
                ("bacon+abc", 0.0),
                ("queijo+1,5", 0.0),
                ("ovo+", 0.0),
                ("palmito", 4.0)
            ]
        );
    }

    #[test]
    fn test_unrecognised_yields_default_group() {
        for value in [json!(null), json!(12), json!(true), json!(""), json!("   "), json!([])] {
            let groups = normalize(&value);
            assert_eq!(groups, vec![OptionGroup::empty()], "input {value}");
        }
        assert_eq!(normalize(&json!("sem grupos")), vec![OptionGroup::empty()]);
    }

    #[test]
    fn test_structured_array() {
        let groups = normalize(&json!([
            {"nome": "Tamanho", "ids": "1,2", "max_selected": "2", "options": [
                {"nome": "P", "valor_extra": 0},
                {"nome": "G", "valor_extra": "3,50", "esgotado": true},
                "Médio"
            ]}
        ]));
        assert_eq!(groups[0].ids, "1,2");
        assert_eq!(groups[0].max_selected, 2);
        assert_eq!(groups[0].options[1].extra_price, 3.5);
        assert!(groups[0].options[1].sold_out);
        assert_eq!(groups[0].options[2].name, "Médio");
        assert_eq!(groups[0].options[2].extra_price, 0.0);
    }

    #[test]
    fn test_structured_json_string_and_wrapped_object() {
        let text = r#"[{"nome":"Molho","max_selected":0,"options":[{"nome":"alho","valor_extra":"x"}]}]"#;
        let groups = normalize(&json!(text));
        assert_eq!(groups[0].max_selected, 1);
        assert_eq!(groups[0].options[0].extra_price, 0.0);

        let wrapped = normalize(&json!({"groups": [{"nome": "A", "options": []}]}));
        assert_eq!(wrapped[0].name, "A");

        let encoded_wrapped = normalize(&json!(r#"{"opcoes":[{"nome":"B"}]}"#));
        assert_eq!(encoded_wrapped[0].name, "B");
    }

    #[test]
    fn test_negative_extra_clamped() {
        let groups = normalize(&json!([{"nome": "g", "options": [{"nome": "x", "valor_extra": -4}]}]));
        assert_eq!(groups[0].options[0].extra_price, 0.0);
    }

    #[test]
    fn test_sanitize_groups() {
        let groups = vec![
            OptionGroup::new("A", 1)
                .with_option(OptionChoice::new("  ", 0.0))
                .with_option(OptionChoice::new("x", 1.0)),
            OptionGroup::new("B", 1).with_option(OptionChoice::new("", 0.0)),
            OptionGroup::new("C", 1),
        ];
        let clean = sanitize_groups(&groups);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].name, "A");
        assert_eq!(clean[0].options.len(), 1);
    }

    #[test]
    fn test_prepare_menu_form() {
        let form = MenuItemForm {
            categoria: "3".into(),
            item: "  Açaí 500ml ".into(),
            preco: 22.0,
            novo_nome: Some("  ".into()),
            opcoes: vec![
                OptionGroup::new("Frutas", 2).with_option(OptionChoice::new("manga", 2.0)),
                OptionGroup::new("Vazio", 1).with_option(OptionChoice::new(" ", 0.0)),
            ],
            ..MenuItemForm::default()
        };
        let ready = prepare_menu_form(form.clone()).unwrap();
        assert_eq!(ready.item, "Açaí 500ml");
        assert_eq!(ready.novo_nome, None);
        assert_eq!(ready.opcoes.len(), 1);

        let blank = MenuItemForm {
            item: " ".into(),
            ..form.clone()
        };
        assert!(prepare_menu_form(blank).is_err());
        let negative = MenuItemForm {
            preco: -1.0,
            ..form
        };
        assert!(matches!(
            prepare_menu_form(negative),
            Err(CoreError::InvalidField { field: "preco", .. })
        ));
    }

    #[test]
    fn test_extras_label() {
        let options = vec![
            OptionChoice::new("morango", 0.0),
            OptionChoice::new("manga", 2.0),
            OptionChoice::new("kiwi", 1.5),
        ];
        assert_eq!(
            extras_label(&options),
            "manga (+R$ 2,00), kiwi (+R$ 1,50)"
        );
        assert_eq!(extras_label(&options[..1]), "");
    }

    #[test]
    fn test_menu_item_from_entry() {
        let entry: MenuEntry = serde_json::from_value(json!({
            "id": 4, "item": "Açaí 300ml", "preco": "15", "categoria_id": 3,
            "opcoes": "Frutas(morango-manga+2)"
        }))
        .unwrap();
        let item = menu_item(&entry);
        assert_eq!(item.category, Category::Porcao);
        assert_eq!(item.base_price, 15.0);
        assert_eq!(item.option_groups[0].options.len(), 2);
    }
}
