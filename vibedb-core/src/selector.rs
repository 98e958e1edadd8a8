//! Resolving which instance an action targets

use crate::model::{Instance, InstanceName};

/// One item of the front end's current selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionItem {
    Instance(InstanceName),
    /// Something selected that is not an instance (a group, a file, ...)
    Other(String),
}

/// The front end's current selection, passed in explicitly
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub items: Vec<SelectionItem>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(item: SelectionItem) -> Self {
        Self { items: vec![item] }
    }

    /// Parse a comma-separated selection such as `instance:dev,group:all`.
    ///
    /// Bare names and `instance:<name>` are instance handles; any other
    /// `kind:value` item is not.
    pub fn parse(raw: &str) -> Self {
        let items = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|item| match item.split_once(':') {
                Some(("instance", name)) => SelectionItem::Instance(name.trim().to_string()),
                Some(_) => SelectionItem::Other(item.to_string()),
                None => SelectionItem::Instance(item.to_string()),
            })
            .collect();
        Self { items }
    }

    /// The selected instance name, if exactly one instance handle is selected
    fn single_instance(&self) -> Option<&str> {
        match self.items.as_slice() {
            [SelectionItem::Instance(name)] => Some(name),
            _ => None,
        }
    }
}

/// Pick the instance an action means.
///
/// An explicit reference naming a known instance wins. Otherwise fall back to a
/// single selected instance handle. `None` means there is nothing to act on.
pub fn resolve_target(explicit: Option<&str>, selection: &Selection, instances: &[Instance]) -> Option<Instance> {
    let find = |name: &str| instances.iter().find(|i| i.name == name).cloned();

    if let Some(found) = explicit.and_then(find) {
        return Some(found);
    }
    selection.single_instance().and_then(find)
}
