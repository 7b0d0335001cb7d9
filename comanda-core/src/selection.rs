//! Selection tracker for a menu item's option groups

use shared::models::{MenuItem, OptionChoice, OptionGroup};
use shared::order::SelectedOption;

use crate::money::{checked_sum, to_decimal, to_f64};

/// What a [`Selection::toggle`] call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Group was full; the oldest choice was evicted to make room
    Replaced { evicted: String },
    /// Option is sold out, nothing changed
    SoldOut,
    /// Unknown group or option, nothing changed
    Ignored,
}

/// Options picked for one menu item, per group in insertion order
///
/// Each group's list never holds more than its `max_selected`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    groups: Vec<OptionGroup>,
    chosen: Vec<Vec<String>>,
}

impl Selection {
    pub fn new(groups: Vec<OptionGroup>) -> Self {
        let chosen = vec![Vec::new(); groups.len()];
        Self { groups, chosen }
    }

    pub fn for_item(item: &MenuItem) -> Self {
        Self::new(item.option_groups.clone())
    }

    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    pub fn toggle(&mut self, group_index: usize, option_name: &str) -> ToggleOutcome {
        let Some(group) = self.groups.get(group_index) else {
            return ToggleOutcome::Ignored;
        };
        let Some(option) = group.find(option_name) else {
            return ToggleOutcome::Ignored;
        };
        if option.sold_out {
            tracing::debug!(option = %option_name, "Sold out option, toggle rejected");
            return ToggleOutcome::SoldOut;
        }

        let max = group.max_selected.max(1) as usize;
        let picked = &mut self.chosen[group_index];
        if let Some(pos) = picked.iter().position(|n| n == option_name) {
            picked.remove(pos);
            return ToggleOutcome::Removed;
        }

        let evicted = if picked.len() >= max {
            Some(picked.remove(0))
        } else {
            None
        };
        picked.push(option_name.to_string());
        match evicted {
            Some(evicted) => ToggleOutcome::Replaced { evicted },
            None => ToggleOutcome::Added,
        }
    }

    /// Names chosen in a group, oldest first
    pub fn selected(&self, group_index: usize) -> &[String] {
        self.chosen.get(group_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_selected(&self, group_index: usize, option_name: &str) -> bool {
        self.selected(group_index).iter().any(|n| n == option_name)
    }

    fn chosen_choices(&self) -> impl Iterator<Item = (&OptionGroup, &OptionChoice)> {
        self.groups.iter().zip(&self.chosen).flat_map(|(group, names)| {
            names
                .iter()
                .filter_map(move |name| group.find(name).map(|choice| (group, choice)))
        })
    }

    /// All chosen options, flattened in group order
    pub fn selected_options(&self) -> Vec<SelectedOption> {
        self.chosen_choices()
            .map(|(group, choice)| SelectedOption {
                group: group.name.clone(),
                name: choice.name.clone(),
                extra_price: choice.extra_price,
            })
            .collect()
    }

    /// Groups restricted to the chosen options, in the shape stored on order lines
    pub fn selected_groups(&self) -> Vec<OptionGroup> {
        self.groups
            .iter()
            .zip(&self.chosen)
            .filter(|(_, names)| !names.is_empty())
            .map(|(group, names)| OptionGroup {
                options: names
                    .iter()
                    .filter_map(|name| group.find(name).cloned())
                    .collect(),
                ..group.clone()
            })
            .collect()
    }

    pub fn extras_total(&self) -> f64 {
        to_f64(checked_sum(
            self.chosen_choices()
                .map(|(_, choice)| to_decimal(choice.extra_price)),
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.iter().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.chosen.iter_mut().for_each(Vec::clear);
    }
}
