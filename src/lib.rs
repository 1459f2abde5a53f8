//! Live filtering and bulk selection for list-group bird lists.
//!
//! The widget reads a search term from a text input, hides every list row
//! whose label does not contain the term (case-insensitively), and checks or
//! unchecks the checkbox nested in every row in bulk.
//!
//! Rows are reached through the [`Row`] capability trait, so the same three
//! operations run over plain in-memory rows ([`MemoryRow`]) or over rows of a
//! parsed document ([`DomRows`]). [`Page`] wires a parsed page to the widget
//! and plays the user actions that trigger it.
//!
//! ```no_run
//! use bird_list_filter::{Page, WidgetConfig};
//!
//! # fn main() -> bird_list_filter::Result<()> {
//! let html = r#"
//!     <input id="searchInput" type="text">
//!     <button id="selectAllBirds">Select all</button>
//!     <button id="deselectAllBirds">Deselect all</button>
//!     <ul id="birdList">
//!       <li class="list-group-item"><input type="checkbox"> Robin</li>
//!       <li class="list-group-item"><input type="checkbox"> Blue Jay</li>
//!     </ul>
//! "#;
//! let mut page = Page::from_html(html)?;
//! page.mount(WidgetConfig::default())?;
//! page.type_text("#searchInput", "jay")?;
//! assert_eq!(page.visible_labels()?, vec!["Blue Jay".to_string()]);
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

mod config;
mod dom;
mod dom_utils;
mod html;
mod page;
mod render;
mod selector;
mod widget;

pub use config::WidgetConfig;
pub use page::{EventKind, Page};
pub use render::{Species, render_bird_list, render_bird_rows};
pub use widget::{
    BoundWidget, DomRow, DomRows, FilterReport, ListFilterWidget, MemoryRow, Row, RowList,
    SkippedRow, ToggleReport, apply_filter, case_fold, matches_term, set_all_toggles,
};

use dom_utils::*;
use html::{is_void_tag, parse_html};
use selector::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// A control the widget needs is absent from the page. Fatal for the
    /// widget instance.
    #[error("missing {role} element: #{id}")]
    MissingTargetElement { role: String, id: String },

    /// A row has no toggle control. Bulk operations skip such rows.
    #[error("row {row:?} has no toggle control")]
    MissingToggleControl { row: String },

    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },

    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },

    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Handle to a node inside a [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
}

/// Arena-backed document tree produced by the markup parser.
#[derive(Debug, Clone)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, NodeId>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    /// Parses `html` into a fresh document.
    pub fn parse(html: &str) -> Result<Self> {
        parse_html(html)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let element = Element {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some()
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.nodes
            .get(node_id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|e| e.attrs.get(&name.to_ascii_lowercase()).cloned())
    }

    pub fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|e| e.attrs.contains_key(&name.to_ascii_lowercase()))
    }

    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;
        element.attrs.insert(name.clone(), value.to_string());
        if name == "id" {
            self.rebuild_id_index();
        }
        Ok(())
    }

    pub fn checked(&self, node_id: NodeId) -> Option<bool> {
        self.element(node_id).map(|e| e.checked)
    }

    pub fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;
        element.checked = checked;
        Ok(())
    }

    pub fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub fn value(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.value.as_str())
    }

    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn rebuild_id_index(&mut self) {
        let mut next = HashMap::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if let NodeType::Element(element) = &self.nodes[node.0].node_type {
                if let Some(id) = element.attrs.get("id") {
                    if !id.is_empty() {
                        next.entry(id.clone()).or_insert(node);
                    }
                }
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        self.id_index = next;
    }
}
