//! Kitchen and bar preparation boards

use std::fmt;

use shared::models::Category;
use shared::order::{OrderLine, SetPreparation};

use crate::error::{CoreError, CoreResult};
use crate::search::normalize;

/// Preparation state of a line; the wire strings are the backend's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreparationStatus {
    Queued,
    InPreparation,
    Ready,
}

impl PreparationStatus {
    /// Parse the line's `estado`; missing or unknown text means queued.
    pub fn parse(estado: Option<&str>) -> Self {
        match estado.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("em preparo") => Self::InPreparation,
            Some("pronto") => Self::Ready,
            _ => Self::Queued,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Queued => "A Fazer",
            Self::InPreparation => "Em Preparo",
            Self::Ready => "Pronto",
        }
    }

    /// Next state of the board's single action button; ready goes back to
    /// queued (undo).
    pub fn next(&self) -> Self {
        match self {
            Self::Queued => Self::InPreparation,
            Self::InPreparation => Self::Ready,
            Self::Ready => Self::Queued,
        }
    }
}

impl fmt::Display for PreparationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Selected options as `Group: a, b | Other: c`
///
/// Options flagged `selecionado: false` are skipped, as are groups left
/// with nothing; an unnamed group shows as `Opções`.
pub fn format_selected_options(line: &OrderLine) -> String {
    line.options
        .iter()
        .filter_map(|group| {
            let names: Vec<&str> = group
                .options
                .iter()
                .filter(|o| o.is_selected())
                .map(|o| o.name.as_str())
                .collect();
            if names.is_empty() {
                return None;
            }
            let title = if group.name.trim().is_empty() {
                "Opções"
            } else {
                group.name.as_str()
            };
            Some(format!("{title}: {}", names.join(", ")))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// How [`KitchenBoard::groups`] counts identical orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    /// Number of lines
    Rows,
    /// Sum of quantities
    Quantity,
}

/// Identical orders (same item and note) shown together
#[derive(Debug, Clone, PartialEq)]
pub struct OrderGroup {
    pub key: String,
    pub count: u32,
    /// Position of first appearance, usable as a colour slot
    pub slot: usize,
}

/// Open lines of one station
#[derive(Debug, Clone, PartialEq)]
pub struct KitchenBoard {
    station: Category,
    lines: Vec<OrderLine>,
}

impl KitchenBoard {
    pub fn new(station: Category) -> Self {
        Self {
            station,
            lines: Vec::new(),
        }
    }

    pub fn kitchen() -> Self {
        Self::new(Category::Porcao)
    }

    pub fn bar() -> Self {
        Self::new(Category::Bebida)
    }

    pub fn station(&self) -> Category {
        self.station
    }

    /// Replace the board with the station's share of `lines`
    pub fn apply(&mut self, lines: Vec<OrderLine>) {
        self.lines = lines
            .into_iter()
            .filter(|line| line.category == Some(self.station))
            .collect();
        tracing::debug!(station = %self.station, lines = self.lines.len(), "Board refreshed");
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Lines to display; ready ones are dropped when `hide_ready`
    pub fn visible(&self, hide_ready: bool) -> Vec<&OrderLine> {
        self.lines
            .iter()
            .filter(|line| {
                !hide_ready || Self::status_of(line) != PreparationStatus::Ready
            })
            .collect()
    }

    pub fn status_of(line: &OrderLine) -> PreparationStatus {
        PreparationStatus::parse(line.status.as_deref())
    }

    /// Command moving line `id` to `status`
    pub fn set_status(&self, id: &str, status: PreparationStatus) -> CoreResult<SetPreparation> {
        if !self.lines.iter().any(|line| line.id == id) {
            return Err(CoreError::LineNotFound(id.to_string()));
        }
        Ok(SetPreparation {
            id: id.to_string(),
            estado: status.as_wire().to_string(),
        })
    }

    /// Command for the line's next state
    pub fn advance(&self, id: &str) -> CoreResult<SetPreparation> {
        let line = self
            .lines
            .iter()
            .find(|line| line.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))?;
        self.set_status(id, Self::status_of(line).next())
    }

    /// Identical orders grouped by normalized item name and note, in order
    /// of first appearance
    pub fn groups(&self, mode: CountMode) -> Vec<OrderGroup> {
        let mut groups: Vec<OrderGroup> = Vec::new();
        for line in &self.lines {
            let key = format!("{}|{}", normalize(&line.name), normalize(&line.note));
            let amount = match mode {
                CountMode::Rows => 1,
                CountMode::Quantity => line.quantity,
            };
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.count += amount,
                None => {
                    let slot = groups.len();
                    groups.push(OrderGroup {
                        key,
                        count: amount,
                        slot,
                    });
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines() -> Vec<OrderLine> {
        serde_json::from_value(json!([
            {"id": 1, "pedido": "Fritas", "quantidade": 2, "categoria": "3", "estado": "Em Preparo",
             "opcoes": [{"nome": "Molho", "options": [{"nome": "alho"}, {"nome": "barbecue", "selecionado": false}]},
                        {"nome": "", "options": [{"nome": "sem sal"}]}]},
            {"id": 2, "pedido": "Caipirinha", "quantidade": 1, "categoria": 2},
            {"id": 3, "pedido": "Calabresa", "quantidade": 1, "categoria": "3", "estado": "pronto"},
            {"id": 4, "pedido": "fritas", "quantidade": 3, "categoria": 3},
            {"id": 5, "pedido": "Água", "quantidade": 1}
        ]))
        .unwrap()
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(PreparationStatus::parse(Some("EM PREPARO")), PreparationStatus::InPreparation);
        assert_eq!(PreparationStatus::parse(Some("Pronto")), PreparationStatus::Ready);
        assert_eq!(PreparationStatus::parse(Some("A Fazer")), PreparationStatus::Queued);
        assert_eq!(PreparationStatus::parse(None), PreparationStatus::Queued);
        assert_eq!(PreparationStatus::Ready.next(), PreparationStatus::Queued);
    }

    #[test]
    fn test_board_keeps_station_lines() {
        let mut board = KitchenBoard::kitchen();
        board.apply(lines());
        let ids: Vec<&str> = board.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);

        let visible: Vec<&str> = board.visible(true).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(visible, vec!["1", "4"]);
        assert_eq!(board.visible(false).len(), 3);

        let mut bar = KitchenBoard::bar();
        bar.apply(lines());
        assert_eq!(bar.lines().len(), 1);
    }

    #[test]
    fn test_format_selected_options() {
        let all = lines();
        assert_eq!(
            format_selected_options(&all[0]),
            "Molho: alho | Opções: sem sal"
        );
        assert_eq!(format_selected_options(&all[1]), "");
    }

    #[test]
    fn test_status_commands() {
        let mut board = KitchenBoard::kitchen();
        board.apply(lines());
        let cmd = board.advance("1").unwrap();
        assert_eq!(cmd.id, "1");
        assert_eq!(cmd.estado, "Pronto");
        assert_eq!(board.advance("4").unwrap().estado, "Em Preparo");
        assert_eq!(board.advance("3").unwrap().estado, "A Fazer");
        assert!(matches!(board.advance("2"), Err(CoreError::LineNotFound(_))));
        assert_eq!(
            board
                .set_status("4", PreparationStatus::Ready)
                .unwrap()
                .estado,
            "Pronto"
        );
    }

    #[test]
    fn test_groups() {
        let mut board = KitchenBoard::kitchen();
        board.apply(lines());
        let rows = board.groups(CountMode::Rows);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "fritas|");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].slot, 1);

        let qty = board.groups(CountMode::Quantity);
        assert_eq!(qty[0].count, 5);
    }
}
