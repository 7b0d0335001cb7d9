//! Order commands - requests from the client to the backend
//!
//! Each variant maps onto one named event of the backend channel; the
//! payload field names are the backend's.

use serde::{Deserialize, Serialize};

use super::types::{OrderLine, PaymentMethod, PaymentMode};
use crate::models::OptionGroup;

/// Command sent over the message channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OrderCommand {
    /// Pay selected units of selected lines
    #[serde(rename = "pagar_itens")]
    PayItems(PayItems),
    /// Pay an arbitrary amount
    #[serde(rename = "pagar_parcial")]
    PayPartial(PayPartial),
    /// Pay everything due and close the tab
    #[serde(rename = "delete_comanda")]
    PayFull(PayFull),
    /// Push quantity edits made in edit mode
    #[serde(rename = "atualizar_comanda")]
    UpdateTab(UpdateTab),
    /// Add new lines to a tab
    #[serde(rename = "insert_order")]
    InsertOrder(InsertOrder),
    /// Move a line through the kitchen/bar preparation states
    #[serde(rename = "inserir_preparo")]
    SetPreparation(SetPreparation),
    /// Manual correction of one line
    #[serde(rename = "atualizar_pedidos")]
    EditLine(EditLine),
    /// Ask the backend to push fresh tab snapshots
    #[serde(rename = "faturamento")]
    RequestRefresh(bool),
    /// Ask the backend for the open order lines (kitchen and bar boards)
    #[serde(rename = "getPedidos")]
    ListOrders(bool),
    /// Ask the backend for the menu
    #[serde(rename = "getCardapio")]
    ListMenu(bool),
    /// Ask the backend for the open and closed tabs
    #[serde(rename = "getComandas")]
    ListTabs(bool),
    /// Revert the payments of one payment round
    #[serde(rename = "desfazer_pagamento")]
    UndoPayment(UndoPayment),
    /// Discount or other manual adjustment of the tab total
    #[serde(rename = "alterarValor")]
    AdjustTotal(AdjustTotal),
    /// Create a menu item
    #[serde(rename = "adicionarCardapio")]
    AddMenuItem(MenuItemForm),
    /// Change a menu item, optionally renaming it
    #[serde(rename = "editarCardapio")]
    EditMenuItem(MenuItemForm),
    #[serde(rename = "removerCardapio")]
    RemoveMenuItem(RemoveMenuItem),
}

impl OrderCommand {
    pub fn request_refresh() -> Self {
        Self::RequestRefresh(true)
    }

    pub fn list_orders() -> Self {
        Self::ListOrders(false)
    }

    pub fn list_menu() -> Self {
        Self::ListMenu(false)
    }

    pub fn list_tabs() -> Self {
        Self::ListTabs(false)
    }

    /// Backend event name
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::PayItems(_) => "pagar_itens",
            Self::PayPartial(_) => "pagar_parcial",
            Self::PayFull(_) => "delete_comanda",
            Self::UpdateTab(_) => "atualizar_comanda",
            Self::InsertOrder(_) => "insert_order",
            Self::SetPreparation(_) => "inserir_preparo",
            Self::EditLine(_) => "atualizar_pedidos",
            Self::RequestRefresh(_) => "faturamento",
            Self::ListOrders(_) => "getPedidos",
            Self::ListMenu(_) => "getCardapio",
            Self::ListTabs(_) => "getComandas",
            Self::UndoPayment(_) => "desfazer_pagamento",
            Self::AdjustTotal(_) => "alterarValor",
            Self::AddMenuItem(_) => "adicionarCardapio",
            Self::EditMenuItem(_) => "editarCardapio",
            Self::RemoveMenuItem(_) => "removerCardapio",
        }
    }

    /// Tab this command targets, when it targets one
    pub fn tab_id(&self) -> Option<&str> {
        match self {
            Self::PayItems(c) => Some(&c.comanda),
            Self::PayPartial(c) => Some(&c.fcomanda),
            Self::PayFull(c) => Some(&c.fcomanda),
            Self::UpdateTab(c) => Some(&c.comanda),
            Self::InsertOrder(c) => Some(&c.comanda),
            Self::EditLine(c) => c.pedido_alterado.comanda.as_deref(),
            Self::UndoPayment(c) => Some(&c.comanda),
            Self::AdjustTotal(c) => Some(&c.comanda),
            Self::SetPreparation(_)
            | Self::AddMenuItem(_)
            | Self::EditMenuItem(_)
            | Self::RemoveMenuItem(_)
            | Self::RequestRefresh(_)
            | Self::ListOrders(_)
            | Self::ListMenu(_)
            | Self::ListTabs(_) => None,
        }
    }
}

// ==================== Payment ====================

/// One line of an itemized payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidItem {
    /// Position of the line in the tab as displayed
    pub index: usize,
    pub id: Option<String>,
    pub pedido: String,
    pub extra: String,
    pub quantidade: u32,
}

/// Confirmed payment, independent of how the backend names its events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub tab_id: String,
    pub mode: PaymentMode,
    pub method: PaymentMethod,
    /// Amount being settled before surcharge and gratuity
    pub base: f64,
    pub apply_surcharge: bool,
    /// 10% of `base`, present when `apply_surcharge`
    pub surcharge: Option<f64>,
    /// Present only when positive
    pub gratuity: Option<f64>,
    pub total: f64,
    /// Empty unless `mode` is itemized
    pub items: Vec<PaidItem>,
}

impl PaymentRequest {
    /// Translate into the backend event for this payment mode
    pub fn into_command(self) -> OrderCommand {
        match self.mode {
            PaymentMode::Itemized => OrderCommand::PayItems(PayItems {
                comanda: self.tab_id,
                itens: self.items,
                forma_de_pagamento: self.method,
                aplicar_dez: self.apply_surcharge,
                dez_por_cento: self.surcharge,
                caixinha: self.gratuity,
            }),
            PaymentMode::Partial => OrderCommand::PayPartial(PayPartial {
                valor_pago: self.base,
                fcomanda: self.tab_id,
                caixinha: self.gratuity,
                dez_por_cento: self.surcharge,
                forma_de_pagamento: self.method,
            }),
            PaymentMode::Full => OrderCommand::PayFull(PayFull {
                fcomanda: self.tab_id,
                valor_pago: self.base,
                caixinha: self.gratuity,
                dez_por_cento: self.surcharge,
                forma_de_pagamento: self.method,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayItems {
    pub comanda: String,
    pub itens: Vec<PaidItem>,
    pub forma_de_pagamento: PaymentMethod,
    #[serde(rename = "aplicarDez")]
    pub aplicar_dez: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dez_por_cento: Option<f64>,
    pub caixinha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayPartial {
    pub valor_pago: f64,
    pub fcomanda: String,
    pub caixinha: Option<f64>,
    pub dez_por_cento: Option<f64>,
    pub forma_de_pagamento: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayFull {
    pub fcomanda: String,
    pub valor_pago: f64,
    pub caixinha: Option<f64>,
    pub dez_por_cento: Option<f64>,
    pub forma_de_pagamento: PaymentMethod,
}

// ==================== Tab editing ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTab {
    #[serde(rename = "itensAlterados")]
    pub itens_alterados: Vec<OrderLine>,
    pub comanda: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// New lines for a tab, as parallel arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOrder {
    pub comanda: String,
    pub pedidos_selecionados: Vec<String>,
    pub quantidade_selecionada: Vec<u32>,
    pub extra_selecionados: Vec<String>,
    pub nome_selecionado: Vec<String>,
    pub opcoes_selecionadas: Vec<Vec<OptionGroup>>,
    pub horario: String,
    pub username: String,
    /// Complimentary lines: added to the tab without being charged
    #[serde(rename = "preco", default, skip_serializing_if = "std::ops::Not::not")]
    pub complimentary: bool,
}

impl InsertOrder {
    pub fn len(&self) -> usize {
        self.pedidos_selecionados.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pedidos_selecionados.is_empty()
    }
}

/// Reverts payment round `ordem` of a tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoPayment {
    pub comanda: String,
    /// Amount due as shown when the undo was requested
    pub preco: f64,
    pub ordem: u32,
}

/// Manual adjustment; `categoria` says what kind (`"desconto"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustTotal {
    pub valor: String,
    pub categoria: String,
    pub comanda: String,
}

// ==================== Menu administration ====================

/// Menu item as submitted by the admin screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItemForm {
    /// Category id as text (`"1"`, `"2"`, `"3"`)
    pub categoria: String,
    #[serde(default)]
    pub modalidade: String,
    pub item: String,
    pub preco: f64,
    /// New name when renaming, edit only
    #[serde(rename = "novoNome", default, skip_serializing_if = "Option::is_none")]
    pub novo_nome: Option<String>,
    pub opcoes: Vec<OptionGroup>,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveMenuItem {
    pub item: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPreparation {
    pub id: String,
    pub estado: String,
}

/// Fields an operator may correct on a single line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comanda: Option<String>,
    pub quantidade: u32,
    pub quantidade_paga: u32,
    pub preco_unitario: f64,
    pub preco: f64,
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub opcoes: Vec<OptionGroup>,
    #[serde(default)]
    pub horario_para_entrega: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditLine {
    #[serde(rename = "pedidoAlterado")]
    pub pedido_alterado: LineEdit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: PaymentMode) -> PaymentRequest {
        PaymentRequest {
            tab_id: "12".to_string(),
            mode,
            method: PaymentMethod::Pix,
            base: 87.5,
            apply_surcharge: true,
            surcharge: Some(8.75),
            gratuity: Some(5.0),
            total: 101.25,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_full_payment_wire_shape() {
        let cmd = request(PaymentMode::Full).into_command();
        assert_eq!(cmd.event_name(), "delete_comanda");
        let v = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["event"], "delete_comanda");
        assert_eq!(v["data"]["fcomanda"], "12");
        assert_eq!(v["data"]["valor_pago"], 87.5);
        assert_eq!(v["data"]["dez_por_cento"], 8.75);
        assert_eq!(v["data"]["caixinha"], 5.0);
        assert_eq!(v["data"]["forma_de_pagamento"], "pix");
    }

    #[test]
    fn test_itemized_payment_wire_shape() {
        let mut req = request(PaymentMode::Itemized);
        req.gratuity = None;
        req.items.push(PaidItem {
            index: 0,
            id: Some("15".into()),
            pedido: "Cerveja".into(),
            extra: String::new(),
            quantidade: 3,
        });
        let cmd = req.into_command();
        assert_eq!(cmd.tab_id(), Some("12"));
        let v = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["event"], "pagar_itens");
        assert_eq!(v["data"]["aplicarDez"], true);
        assert!(v["data"]["caixinha"].is_null());
        assert_eq!(v["data"]["itens"][0]["quantidade"], 3);
    }

    #[test]
    fn test_partial_payment_event() {
        let cmd = request(PaymentMode::Partial).into_command();
        let v = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["event"], "pagar_parcial");
        assert_eq!(v["data"]["valor_pago"], 87.5);
    }

    #[test]
    fn test_insert_order_camel_case() {
        let cmd = OrderCommand::InsertOrder(InsertOrder {
            comanda: "3".into(),
            pedidos_selecionados: vec!["Açaí".into()],
            quantidade_selecionada: vec![2],
            extra_selecionados: vec![String::new()],
            nome_selecionado: vec!["Ana".into()],
            opcoes_selecionadas: vec![Vec::new()],
            horario: "19:40".into(),
            username: "caixa".into(),
            complimentary: false,
        });
        let v = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["event"], "insert_order");
        assert_eq!(v["data"]["pedidosSelecionados"][0], "Açaí");
        assert_eq!(v["data"]["quantidadeSelecionada"][0], 2);
        assert_eq!(v["data"]["opcoesSelecionadas"][0], serde_json::json!([]));
        assert!(v["data"].get("preco").is_none());
    }

    #[test]
    fn test_undo_and_adjust_events() {
        let undo = OrderCommand::UndoPayment(UndoPayment {
            comanda: "7".into(),
            preco: 40.0,
            ordem: 2,
        });
        assert_eq!(undo.tab_id(), Some("7"));
        let v = serde_json::to_value(&undo).unwrap();
        assert_eq!(v["event"], "desfazer_pagamento");
        assert_eq!(v["data"]["ordem"], 2);

        let adjust = OrderCommand::AdjustTotal(AdjustTotal {
            valor: "10".into(),
            categoria: "desconto".into(),
            comanda: "7".into(),
        });
        assert_eq!(adjust.event_name(), "alterarValor");
    }

    #[test]
    fn test_refresh_roundtrip() {
        let json = serde_json::to_string(&OrderCommand::request_refresh()).unwrap();
        assert_eq!(json, r#"{"event":"faturamento","data":true}"#);
        let back: OrderCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderCommand::request_refresh());
    }

    #[test]
    fn test_list_requests() {
        let cases = [
            (OrderCommand::list_tabs(), r#"{"event":"getComandas","data":false}"#),
            (OrderCommand::list_orders(), r#"{"event":"getPedidos","data":false}"#),
            (OrderCommand::list_menu(), r#"{"event":"getCardapio","data":false}"#),
        ];
        for (command, wire) in cases {
            assert_eq!(serde_json::to_string(&command).unwrap(), wire);
            assert_eq!(command.tab_id(), None);
        }
        assert_eq!(OrderCommand::list_tabs().event_name(), "getComandas");
    }
}
