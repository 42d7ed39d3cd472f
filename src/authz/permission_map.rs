use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::registry::{Action, Module};

const READ_BIT: u8 = 0b001;
const WRITE_BIT: u8 = 0b010;
const DELETE_BIT: u8 = 0b100;

/// Actions granted on a single module.
///
/// Only the five states where `write`/`delete` come with `read` can be
/// built: every constructor adds `read` when a dependent action is present.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSet {
    bits: u8,
}

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet { bits: 0 };
    pub const READ: ActionSet = ActionSet { bits: READ_BIT };
    pub const READ_WRITE: ActionSet = ActionSet { bits: READ_BIT | WRITE_BIT };
    pub const READ_DELETE: ActionSet = ActionSet { bits: READ_BIT | DELETE_BIT };
    pub const FULL: ActionSet = ActionSet { bits: READ_BIT | WRITE_BIT | DELETE_BIT };

    /// Builds a set from arbitrary actions, adding `read` if `write` or
    /// `delete` is requested without it.
    pub fn from_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        let bits = actions.into_iter().fold(0, |acc, action| acc | bit(action));
        Self::normalized(bits)
    }

    fn normalized(bits: u8) -> Self {
        if bits & (WRITE_BIT | DELETE_BIT) != 0 {
            Self { bits: bits | READ_BIT }
        } else {
            Self { bits }
        }
    }

    pub fn contains(&self, action: Action) -> bool {
        self.bits & bit(action) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(move |action| self.contains(*action))
    }

    /// Applies one checkbox toggle from the permission editor.
    ///
    /// Turning `read` off clears the whole set. `write` and `delete` can only
    /// be toggled while `read` is held; otherwise the set is returned as is.
    #[must_use]
    pub fn toggle(self, action: Action) -> Self {
        match action {
            Action::Read if self.is_empty() => Self::READ,
            Action::Read => Self::EMPTY,
            _ if !self.contains(Action::Read) => self,
            other => Self {
                bits: self.bits ^ bit(other),
            },
        }
    }
}

fn bit(action: Action) -> u8 {
    match action {
        Action::Read => READ_BIT,
        Action::Write => WRITE_BIT,
        Action::Delete => DELETE_BIT,
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.actions()).finish()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self::from_actions(iter)
    }
}

impl Serialize for ActionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.actions())
    }
}

impl<'de> Deserialize<'de> for ActionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let actions = Vec::<Action>::deserialize(deserializer)?;
        Ok(Self::from_actions(actions))
    }
}

/// Module to granted actions. Lookup is total: a module without an entry
/// has no grants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap {
    entries: BTreeMap<Module, ActionSet>,
}

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module: Module) -> ActionSet {
        self.entries.get(&module).copied().unwrap_or_default()
    }

    pub fn set(&mut self, module: Module, actions: ActionSet) {
        self.entries.insert(module, actions);
    }

    pub fn grants(&self, module: Module, action: Action) -> bool {
        self.get(module).contains(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Module, ActionSet)> + '_ {
        self.entries.iter().map(|(module, actions)| (*module, *actions))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Module, ActionSet)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (Module, ActionSet)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dependent_actions_pull_in_read() {
        assert_eq!(ActionSet::from_actions([Action::Write]), ActionSet::READ_WRITE);
        assert_eq!(ActionSet::from_actions([Action::Delete]), ActionSet::READ_DELETE);
        assert_eq!(
            ActionSet::from_actions([Action::Write, Action::Delete]),
            ActionSet::FULL
        );
        assert_eq!(ActionSet::from_actions(Vec::new()), ActionSet::EMPTY);
    }

    #[test]
    fn toggling_read_off_clears_everything() {
        assert_eq!(ActionSet::FULL.toggle(Action::Read), ActionSet::EMPTY);
        assert_eq!(ActionSet::READ_DELETE.toggle(Action::Read), ActionSet::EMPTY);
        assert_eq!(ActionSet::EMPTY.toggle(Action::Read), ActionSet::READ);
    }

    #[test]
    fn write_and_delete_need_read_first() {
        assert_eq!(ActionSet::EMPTY.toggle(Action::Write), ActionSet::EMPTY);
        assert_eq!(ActionSet::EMPTY.toggle(Action::Delete), ActionSet::EMPTY);
        assert_eq!(ActionSet::READ.toggle(Action::Write), ActionSet::READ_WRITE);
        assert_eq!(ActionSet::READ_WRITE.toggle(Action::Delete), ActionSet::FULL);
        assert_eq!(ActionSet::FULL.toggle(Action::Write), ActionSet::READ_DELETE);
        assert_eq!(ActionSet::READ_DELETE.toggle(Action::Delete), ActionSet::READ);
    }

    #[test]
    fn toggles_never_leave_the_reachable_states() {
        let reachable = [
            ActionSet::EMPTY,
            ActionSet::READ,
            ActionSet::READ_WRITE,
            ActionSet::READ_DELETE,
            ActionSet::FULL,
        ];
        for state in reachable {
            for action in Action::ALL {
                let next = state.toggle(action);
                assert!(reachable.contains(&next), "{state:?} --{action}--> {next:?}");
            }
        }
    }

    #[test]
    fn absent_module_has_no_grants() {
        let mut map = PermissionMap::new();
        map.set(Module::Products, ActionSet::READ);

        assert!(map.grants(Module::Products, Action::Read));
        assert!(!map.grants(Module::Deals, Action::Read));
        assert_eq!(map.get(Module::Deals), ActionSet::EMPTY);
    }

    #[test]
    fn serializes_as_module_keyed_action_lists() -> anyhow::Result<()> {
        let map: PermissionMap = [
            (Module::Products, ActionSet::READ_WRITE),
            (Module::ComboOffers, ActionSet::EMPTY),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&map)?;
        assert_eq!(value, json!({"products": ["read", "write"], "combo_offers": []}));
        Ok(())
    }

    #[test]
    fn deserializing_repairs_missing_read() -> anyhow::Result<()> {
        let map: PermissionMap = serde_json::from_value(json!({
            "categories": ["delete"],
            "deals": ["write", "read"]
        }))?;

        assert_eq!(map.get(Module::Categories), ActionSet::READ_DELETE);
        assert_eq!(map.get(Module::Deals), ActionSet::READ_WRITE);
        Ok(())
    }

    #[test]
    fn unknown_module_is_rejected_on_deserialize() {
        let parsed = serde_json::from_value::<PermissionMap>(json!({"warehouses": ["read"]}));
        assert!(parsed.is_err());
    }
}
