//! Order line and payment types shared with the backend

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::de::{
    bool_lenient, f64_lenient, opt_f64_lenient, opt_string_lenient, string_lenient,
    u32_lenient, value_as_f64, value_as_string,
};
use crate::models::{Category, OptionChoice, OptionGroup};

// ==================== Order Line ====================

/// One line of a tab
///
/// `quantity_paid <= quantity` holds for every line produced by this crate;
/// lines arriving from the backend are clamped on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOrderLine")]
pub struct OrderLine {
    pub id: String,
    #[serde(rename = "pedido")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "quantidade_paga")]
    pub quantity_paid: u32,
    #[serde(rename = "preco_unitario")]
    pub unit_price: f64,
    /// Line total (`unit_price * quantity`)
    #[serde(rename = "preco")]
    pub line_total: f64,
    /// Free-text note attached by the waiter
    #[serde(rename = "extra")]
    pub note: String,
    /// Customer the line belongs to inside the tab
    #[serde(rename = "nome")]
    pub customer: String,
    #[serde(rename = "opcoes")]
    pub options: Vec<OptionGroup>,
    pub printed: bool,
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Preparation state as stored by the backend (`"em preparo"`, `"pronto"`)
    #[serde(rename = "estado", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "horario_para_entrega", skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
}

impl OrderLine {
    /// Units not paid yet
    pub fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.quantity_paid)
    }

    /// Options that count as picked, flattened in group order
    pub fn selected_options(&self) -> Vec<SelectedOption> {
        self.options
            .iter()
            .flat_map(|g| {
                g.options
                    .iter()
                    .filter(|o| o.is_selected())
                    .map(|o| SelectedOption {
                        group: g.name.clone(),
                        name: o.name.clone(),
                        extra_price: o.extra_price,
                    })
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct RawOrderLine {
    #[serde(default, deserialize_with = "string_lenient")]
    id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pedido: String,
    #[serde(default, deserialize_with = "u32_lenient")]
    quantidade: u32,
    #[serde(default, deserialize_with = "u32_lenient")]
    quantidade_paga: u32,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    preco_unitario: Option<f64>,
    #[serde(default, deserialize_with = "f64_lenient")]
    preco: f64,
    #[serde(default, deserialize_with = "string_lenient")]
    extra: String,
    #[serde(default, deserialize_with = "string_lenient")]
    nome: String,
    #[serde(default)]
    opcoes: Value,
    #[serde(default, deserialize_with = "bool_lenient")]
    printed: bool,
    #[serde(default)]
    categoria: Value,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    estado: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    horario_para_entrega: Option<String>,
}

impl From<RawOrderLine> for OrderLine {
    fn from(raw: RawOrderLine) -> Self {
        let unit_price = match raw.preco_unitario {
            Some(price) => price,
            None if raw.quantidade > 0 => raw.preco / raw.quantidade as f64,
            None => 0.0,
        };
        Self {
            id: raw.id,
            name: raw.pedido,
            quantity: raw.quantidade,
            quantity_paid: raw.quantidade_paga.min(raw.quantidade),
            unit_price,
            line_total: raw.preco,
            note: raw.extra,
            customer: raw.nome,
            options: parse_stored_options(&raw.opcoes),
            printed: raw.printed,
            category: Category::from_value(&raw.categoria),
            status: raw.estado.filter(|s| !s.trim().is_empty()),
            delivery_time: raw.horario_para_entrega.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Parse the options stored on an order line.
///
/// Accepts an array of groups, a JSON string of one (single quotes tolerated)
/// or an object wrapping it; options may be objects or bare names. Anything
/// else yields no groups.
pub fn parse_stored_options(value: &Value) -> Vec<OptionGroup> {
    match value {
        Value::Array(items) => items.iter().filter_map(stored_group).collect(),
        Value::String(text) if !text.trim().is_empty() => serde_json::from_str::<Value>(text)
            .or_else(|_| serde_json::from_str::<Value>(&text.replace('\'', "\"")))
            .map(|parsed| parse_stored_options(&parsed))
            .unwrap_or_default(),
        Value::Object(map) => ["groups", "opcoes", "options"]
            .iter()
            .find_map(|k| map.get(*k).filter(|v| v.is_array()))
            .map(parse_stored_options)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn stored_group(value: &Value) -> Option<OptionGroup> {
    let map = value.as_object()?;
    let mut group = OptionGroup::new(
        map.get("nome").and_then(value_as_string).unwrap_or_default(),
        map.get("max_selected")
            .and_then(value_as_f64)
            .map(|v| v as u32)
            .unwrap_or(1),
    );
    group.ids = map.get("ids").and_then(value_as_string).unwrap_or_default();
    let options = map
        .get("options")
        .or_else(|| map.get("opcoes"))
        .and_then(Value::as_array);
    for option in options.into_iter().flatten() {
        let choice = match option {
            Value::String(name) => OptionChoice::new(name.clone(), 0.0),
            Value::Object(_) => match serde_json::from_value::<OptionChoice>(option.clone()) {
                Ok(choice) => choice,
                Err(_) => continue,
            },
            _ => continue,
        };
        group.options.push(choice);
    }
    Some(group)
}

/// A picked option, flattened out of its group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    #[serde(rename = "grupo")]
    pub group: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor_extra")]
    pub extra_price: f64,
}

// ==================== Payment ====================

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "credito")]
    Credit,
    #[serde(rename = "debito")]
    Debit,
    #[serde(rename = "dinheiro")]
    Cash,
    #[serde(rename = "pix")]
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [Self::Credit, Self::Debit, Self::Cash, Self::Pix];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credito",
            Self::Debit => "debito",
            Self::Cash => "dinheiro",
            Self::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a payment method tag is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credito" | "crédito" | "credit" => Ok(Self::Credit),
            "debito" | "débito" | "debit" => Ok(Self::Debit),
            "dinheiro" | "cash" => Ok(Self::Cash),
            "pix" => Ok(Self::Pix),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Which part of the tab a payment settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Selected units of selected lines
    Itemized,
    /// An arbitrary amount up to what is due
    Partial,
    /// Everything that is due; closes the tab
    Full,
}

/// A past payment as listed by the payment history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(
        default,
        alias = "id_pagamento",
        alias = "pagamento_id",
        deserialize_with = "opt_string_lenient"
    )]
    pub id: Option<String>,
    #[serde(
        rename = "valor",
        default,
        alias = "valor_pago",
        alias = "total",
        deserialize_with = "f64_lenient"
    )]
    pub amount: f64,
    #[serde(
        rename = "forma_de_pagamento",
        default,
        alias = "metodo",
        alias = "forma",
        deserialize_with = "opt_string_lenient"
    )]
    pub method: Option<String>,
    #[serde(rename = "caixinha", default, deserialize_with = "f64_lenient")]
    pub gratuity: f64,
    #[serde(rename = "dez_por_cento", default, deserialize_with = "f64_lenient")]
    pub surcharge: f64,
    #[serde(
        rename = "horario",
        default,
        alias = "data",
        alias = "criado_em",
        deserialize_with = "opt_string_lenient"
    )]
    pub paid_at: Option<String>,
}

impl PaymentRecord {
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.method.as_deref().and_then(|m| m.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_line_from_backend() {
        let line: OrderLine = serde_json::from_value(json!({
            "id": 15,
            "pedido": "Açaí 500ml",
            "quantidade": "5",
            "quantidade_paga": "2",
            "preco": "50.00",
            "extra": "sem granola",
            "nome": "Ana",
            "opcoes": "[{\"nome\":\"Frutas\",\"options\":[{\"nome\":\"manga\",\"valor_extra\":2}]}]",
            "printed": 1,
            "categoria": "3",
            "estado": "em preparo"
        }))
        .unwrap();

        assert_eq!(line.id, "15");
        assert_eq!(line.quantity, 5);
        assert_eq!(line.quantity_paid, 2);
        assert_eq!(line.remaining(), 3);
        assert_eq!(line.unit_price, 10.0);
        assert_eq!(line.line_total, 50.0);
        assert!(line.printed);
        assert_eq!(line.category, Some(Category::Porcao));
        assert_eq!(line.options.len(), 1);
        assert_eq!(line.selected_options()[0].name, "manga");
        assert_eq!(line.status.as_deref(), Some("em preparo"));
    }

    #[test]
    fn test_order_line_degrades_malformed_numbers() {
        let line: OrderLine = serde_json::from_value(json!({
            "pedido": "Suco",
            "quantidade": "dois",
            "preco": null,
            "opcoes": 7
        }))
        .unwrap();
        assert_eq!(line.quantity, 0);
        assert_eq!(line.unit_price, 0.0);
        assert_eq!(line.line_total, 0.0);
        assert!(line.options.is_empty());
        assert_eq!(line.category, None);
    }

    #[test]
    fn test_order_line_clamps_paid() {
        let line: OrderLine =
            serde_json::from_value(json!({"quantidade": 2, "quantidade_paga": 5, "preco": 8}))
                .unwrap();
        assert_eq!(line.quantity_paid, 2);
        assert_eq!(line.remaining(), 0);
    }

    #[test]
    fn test_order_line_serializes_wire_names() {
        let line: OrderLine = serde_json::from_value(json!({
            "id": "1", "pedido": "Água", "quantidade": 2, "preco": 6, "preco_unitario": 3
        }))
        .unwrap();
        let v = serde_json::to_value(&line).unwrap();
        assert_eq!(v["pedido"], "Água");
        assert_eq!(v["quantidade"], 2);
        assert_eq!(v["preco_unitario"], 3.0);
        assert_eq!(v["preco"], 6.0);
        assert!(v.get("categoria").is_none());

        let back: OrderLine = serde_json::from_value(v).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn test_stored_options_shapes() {
        let single_quoted = Value::String("[{'nome':'Molho','options':['barbecue']}]".into());
        let groups = parse_stored_options(&single_quoted);
        assert_eq!(groups[0].name, "Molho");
        assert_eq!(groups[0].options[0].name, "barbecue");

        let wrapped = json!({"groups": [{"nome": "A", "options": [{"nome": "x", "selecionado": false}]}]});
        let groups = parse_stored_options(&wrapped);
        assert!(!groups[0].options[0].is_selected());

        assert!(parse_stored_options(&Value::String("not json".into())).is_empty());
    }

    #[test]
    fn test_payment_method_wire() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cash).unwrap(),
            "\"dinheiro\""
        );
        assert_eq!("Crédito".parse::<PaymentMethod>(), Ok(PaymentMethod::Credit));
        assert_eq!("PIX".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_record_aliases() {
        let record: PaymentRecord = serde_json::from_value(json!({
            "id_pagamento": 9,
            "valor_pago": "25,50",
            "metodo": "pix",
            "caixinha": 2,
            "criado_em": "20:15"
        }))
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("9"));
        assert_eq!(record.amount, 25.5);
        assert_eq!(record.payment_method(), Some(PaymentMethod::Pix));
        assert_eq!(record.gratuity, 2.0);
        assert_eq!(record.surcharge, 0.0);
        assert_eq!(record.paid_at.as_deref(), Some("20:15"));
    }
}
