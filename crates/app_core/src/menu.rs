//! Menu tree model
//!
//! A menu is an ordered `Vec<MenuEntry>`. Leaves carry a deferred action;
//! building the tree never runs any of them.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type ActionFuture = BoxFuture<'static, ()>;

/// Deferred, possibly long-running effect bound to a leaf
#[derive(Clone)]
pub struct Action(Arc<dyn Fn() -> ActionFuture + Send + Sync>);

impl Action {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self(Arc::new(move || f().boxed()))
    }

    /// Action that runs synchronously when invoked
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(move || {
            f();
            futures::future::ready(()).boxed()
        }))
    }

    /// Start the action; the future completes when its effect has settled
    pub fn invoke(&self) -> ActionFuture {
        (self.0)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

#[derive(Debug, Clone)]
pub struct MenuLeaf {
    pub label: String,
    pub icon: Option<String>,
    pub action: Action,
    pub primary: bool,
}

#[derive(Debug, Clone)]
pub struct Submenu {
    pub label: String,
    pub icon: Option<String>,
    pub entries: Vec<MenuEntry>,
    pub primary: bool,
}

/// One row of a menu
#[derive(Debug, Clone)]
pub enum MenuEntry {
    Leaf(MenuLeaf),
    Submenu(Submenu),
    Separator,
}

impl MenuEntry {
    pub fn leaf(label: impl Into<String>, action: Action) -> Self {
        MenuEntry::Leaf(MenuLeaf {
            label: label.into(),
            icon: None,
            action,
            primary: false,
        })
    }

    pub fn submenu(label: impl Into<String>, entries: Vec<MenuEntry>) -> Self {
        MenuEntry::Submenu(Submenu {
            label: label.into(),
            icon: None,
            entries,
            primary: false,
        })
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        match &mut self {
            MenuEntry::Leaf(leaf) => leaf.icon = icon,
            MenuEntry::Submenu(menu) => menu.icon = icon,
            MenuEntry::Separator => {}
        }
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        match &mut self {
            MenuEntry::Leaf(leaf) => leaf.primary = primary,
            MenuEntry::Submenu(menu) => menu.primary = primary,
            MenuEntry::Separator => {}
        }
        self
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuEntry::Leaf(leaf) => Some(&leaf.label),
            MenuEntry::Submenu(menu) => Some(&menu.label),
            MenuEntry::Separator => None,
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            MenuEntry::Leaf(leaf) => leaf.icon.as_deref(),
            MenuEntry::Submenu(menu) => menu.icon.as_deref(),
            MenuEntry::Separator => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, MenuEntry::Separator)
    }

    pub fn is_primary(&self) -> bool {
        match self {
            MenuEntry::Leaf(leaf) => leaf.primary,
            MenuEntry::Submenu(menu) => menu.primary,
            MenuEntry::Separator => false,
        }
    }

    pub fn action(&self) -> Option<&Action> {
        match self {
            MenuEntry::Leaf(leaf) => Some(&leaf.action),
            _ => None,
        }
    }

    pub fn children(&self) -> &[MenuEntry] {
        match self {
            MenuEntry::Submenu(menu) => &menu.entries,
            _ => &[],
        }
    }
}

/// Labels of a menu level, separators rendered as `---`
pub fn labels(entries: &[MenuEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|entry| entry.label().unwrap_or(SEPARATOR_LABEL))
        .collect()
}

pub const SEPARATOR_LABEL: &str = "---";

/// First entry of a menu level with `label`
pub fn find<'a>(entries: &'a [MenuEntry], label: &str) -> Option<&'a MenuEntry> {
    entries.iter().find(|entry| entry.label() == Some(label))
}

/// Entry reached by following labels through submenus
pub fn find_path<'a>(entries: &'a [MenuEntry], path: &[&str]) -> Option<&'a MenuEntry> {
    let (first, rest) = path.split_first()?;
    let entry = find(entries, first)?;
    if rest.is_empty() {
        Some(entry)
    } else {
        find_path(entry.children(), rest)
    }
}

/// Serializable view of a menu for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MenuSnapshot {
    Item {
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        primary: bool,
    },
    Menu {
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        primary: bool,
        items: Vec<MenuSnapshot>,
    },
    Separator,
}

impl From<&MenuEntry> for MenuSnapshot {
    fn from(entry: &MenuEntry) -> Self {
        match entry {
            MenuEntry::Leaf(leaf) => MenuSnapshot::Item {
                label: leaf.label.clone(),
                icon: leaf.icon.clone(),
                primary: leaf.primary,
            },
            MenuEntry::Submenu(menu) => MenuSnapshot::Menu {
                label: menu.label.clone(),
                icon: menu.icon.clone(),
                primary: menu.primary,
                items: snapshot(&menu.entries),
            },
            MenuEntry::Separator => MenuSnapshot::Separator,
        }
    }
}

pub fn snapshot(entries: &[MenuEntry]) -> Vec<MenuSnapshot> {
    entries.iter().map(MenuSnapshot::from).collect()
}

/// Indented text rendering, primary entries marked with `*`
pub fn render(entries: &[MenuEntry]) -> String {
    let mut out = String::new();
    render_level(entries, 0, &mut out);
    out
}

fn render_level(entries: &[MenuEntry], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for entry in entries {
        match entry {
            MenuEntry::Separator => out.push_str(&format!("{}{}\n", indent, SEPARATOR_LABEL)),
            MenuEntry::Leaf(leaf) => {
                let marker = if leaf.primary { "*" } else { "" };
                out.push_str(&format!("{}{}{}\n", indent, leaf.label, marker));
            }
            MenuEntry::Submenu(menu) => {
                let marker = if menu.primary { "*" } else { "" };
                out.push_str(&format!("{}{}{} >\n", indent, menu.label, marker));
                render_level(&menu.entries, depth + 1, out);
            }
        }
    }
}
