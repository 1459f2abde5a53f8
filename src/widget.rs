//! The list filter widget: live text filtering and bulk toggling of rows.
//!
//! Both operations are single stateless passes over the rows in order. They
//! never add, remove or reorder rows; they only touch each row's visibility
//! or its toggle control.

use tracing::{debug, info, warn};

use super::*;

/// Capability contract for one list row.
///
/// `label` is the only thing filtering reads. A row without a toggle control
/// reports `None` from [`Row::checked`] and refuses [`Row::set_checked`] with
/// [`Error::MissingToggleControl`].
pub trait Row {
    fn label(&self) -> String;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    fn checked(&self) -> Option<bool>;

    fn set_checked(&mut self, checked: bool) -> Result<()>;
}

/// An ordered collection of rows that can be visited one at a time.
pub trait RowList {
    fn row_count(&self) -> usize;

    fn for_each_row(&mut self, visit: &mut dyn FnMut(usize, &mut dyn Row));
}

impl<R: Row> RowList for [R] {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn for_each_row(&mut self, visit: &mut dyn FnMut(usize, &mut dyn Row)) {
        for (index, row) in self.iter_mut().enumerate() {
            visit(index, row);
        }
    }
}

impl<R: Row> RowList for Vec<R> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn for_each_row(&mut self, visit: &mut dyn FnMut(usize, &mut dyn Row)) {
        self.as_mut_slice().for_each_row(visit);
    }
}

/// Canonical case used for comparisons: full Unicode upper-casing.
pub fn case_fold(text: &str) -> String {
    text.to_uppercase()
}

/// Whether a row labelled `label` stays visible for `term`. The empty term
/// matches everything.
pub fn matches_term(label: &str, term: &str) -> bool {
    case_fold(label).contains(&case_fold(term))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub total: usize,
    pub shown: usize,
}

impl FilterReport {
    pub fn hidden(&self) -> usize {
        self.total - self.shown
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleReport {
    pub updated: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ToggleReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Shows every row whose label contains `term` (case-insensitively) and hides
/// the rest.
pub fn apply_filter<L: RowList + ?Sized>(term: &str, rows: &mut L) -> FilterReport {
    let needle = case_fold(term);
    let mut report = FilterReport::default();
    rows.for_each_row(&mut |_, row| {
        let shown = case_fold(&row.label()).contains(&needle);
        row.set_visible(shown);
        report.total += 1;
        if shown {
            report.shown += 1;
        }
    });
    debug!(term, total = report.total, shown = report.shown, "filter applied");
    report
}

/// Sets every row's toggle to `checked`, hidden rows included. Rows without a
/// toggle control are skipped and listed in the report.
pub fn set_all_toggles<L: RowList + ?Sized>(rows: &mut L, checked: bool) -> ToggleReport {
    let mut report = ToggleReport::default();
    rows.for_each_row(&mut |index, row| match row.set_checked(checked) {
        Ok(()) => {
            let label = collapse_whitespace(&row.label());
            debug!(index, %label, checked, "toggle set");
            report.updated += 1;
        }
        Err(reason) => {
            warn!(index, %reason, "skipping row without toggle control");
            report.skipped.push(SkippedRow { index, reason });
        }
    });
    report
}

/// A row held in memory, for callers that have no document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    pub label: String,
    pub visible: bool,
    pub toggle: Option<bool>,
}

impl MemoryRow {
    /// A visible, unchecked row with a toggle control.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visible: true,
            toggle: Some(false),
        }
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.toggle = Some(checked);
        self
    }

    pub fn without_toggle(mut self) -> Self {
        self.toggle = None;
        self
    }
}

impl Row for MemoryRow {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn checked(&self) -> Option<bool> {
        self.toggle
    }

    fn set_checked(&mut self, checked: bool) -> Result<()> {
        match self.toggle.as_mut() {
            Some(state) => {
                *state = checked;
                Ok(())
            }
            None => Err(Error::MissingToggleControl {
                row: self.label.clone(),
            }),
        }
    }
}

/// One row element of a [`Dom`], borrowed for the duration of a visit.
#[derive(Debug)]
pub struct DomRow<'a> {
    dom: &'a mut Dom,
    node: NodeId,
    toggle_selector: &'a str,
}

impl DomRow<'_> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    fn toggle_node(&self) -> Option<NodeId> {
        self.dom
            .query_selector_from(self.node, self.toggle_selector)
            .ok()
            .flatten()
    }

    fn missing_toggle(&self) -> Error {
        Error::MissingToggleControl {
            row: collapse_whitespace(&self.label()),
        }
    }
}

impl Row for DomRow<'_> {
    fn label(&self) -> String {
        self.dom.text_content(self.node)
    }

    fn is_visible(&self) -> bool {
        !self.dom.is_display_none(self.node)
    }

    fn set_visible(&mut self, visible: bool) {
        let display = if visible { "" } else { "none" };
        // The node is an element by construction of DomRows.
        let _ = self.dom.style_set(self.node, "display", display);
    }

    fn checked(&self) -> Option<bool> {
        self.toggle_node().and_then(|toggle| self.dom.checked(toggle))
    }

    fn set_checked(&mut self, checked: bool) -> Result<()> {
        let toggle = self.toggle_node().ok_or_else(|| self.missing_toggle())?;
        self.dom.set_checked(toggle, checked)
    }
}

/// The rows of a list container, adapted to [`RowList`].
#[derive(Debug)]
pub struct DomRows<'a> {
    dom: &'a mut Dom,
    nodes: Vec<NodeId>,
    toggle_selector: &'a str,
}

impl<'a> DomRows<'a> {
    /// Collects the descendants of `list` carrying `row_class`.
    pub fn from_list(
        dom: &'a mut Dom,
        list: NodeId,
        row_class: &str,
        toggle_selector: &'a str,
    ) -> Self {
        let nodes = dom.elements_by_class_name_from(list, row_class);
        Self {
            dom,
            nodes,
            toggle_selector,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl RowList for DomRows<'_> {
    fn row_count(&self) -> usize {
        self.nodes.len()
    }

    fn for_each_row(&mut self, visit: &mut dyn FnMut(usize, &mut dyn Row)) {
        for (index, node) in self.nodes.iter().copied().enumerate() {
            let mut row = DomRow {
                dom: &mut *self.dom,
                node,
                toggle_selector: self.toggle_selector,
            };
            visit(index, &mut row);
        }
    }
}

/// Widget description, not yet tied to a page.
#[derive(Debug, Clone, Default)]
pub struct ListFilterWidget {
    config: WidgetConfig,
}

impl ListFilterWidget {
    pub fn new(config: WidgetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Resolves every control the widget needs. Any missing control is a
    /// fatal [`Error::MissingTargetElement`].
    pub fn bind(&self, dom: &Dom) -> Result<BoundWidget> {
        self.config.validate()?;

        let resolve = |role: &str, id: &str| {
            dom.by_id(id)
                .filter(|node| dom.is_element(*node))
                .ok_or_else(|| Error::MissingTargetElement {
                    role: role.to_string(),
                    id: id.to_string(),
                })
        };

        let bound = BoundWidget {
            input: resolve("search input", &self.config.input_id)?,
            list: resolve("list container", &self.config.list_id)?,
            select_all: resolve("select-all control", &self.config.select_all_id)?,
            deselect_all: resolve("deselect-all control", &self.config.deselect_all_id)?,
            row_class: self.config.row_class.clone(),
            toggle_selector: self.config.toggle_selector.clone(),
        };
        info!(
            list = %self.config.list_id,
            rows = dom.elements_by_class_name_from(bound.list, &bound.row_class).len(),
            "list filter widget bound"
        );
        Ok(bound)
    }
}

/// A widget whose controls have been resolved against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundWidget {
    input: NodeId,
    list: NodeId,
    select_all: NodeId,
    deselect_all: NodeId,
    row_class: String,
    toggle_selector: String,
}

impl BoundWidget {
    pub fn input(&self) -> NodeId {
        self.input
    }

    pub fn list(&self) -> NodeId {
        self.list
    }

    pub fn select_all_control(&self) -> NodeId {
        self.select_all
    }

    pub fn deselect_all_control(&self) -> NodeId {
        self.deselect_all
    }

    pub fn row_class(&self) -> &str {
        &self.row_class
    }

    pub fn toggle_selector(&self) -> &str {
        &self.toggle_selector
    }

    pub fn rows<'a>(&'a self, dom: &'a mut Dom) -> DomRows<'a> {
        DomRows::from_list(dom, self.list, &self.row_class, &self.toggle_selector)
    }

    /// Filters the rows by the current value of the search input.
    pub fn filter(&self, dom: &mut Dom) -> FilterReport {
        let term = dom.value(self.input).unwrap_or_default().to_string();
        apply_filter(&term, &mut self.rows(dom))
    }

    pub fn select_all(&self, dom: &mut Dom) -> ToggleReport {
        set_all_toggles(&mut self.rows(dom), true)
    }

    pub fn deselect_all(&self, dom: &mut Dom) -> ToggleReport {
        set_all_toggles(&mut self.rows(dom), false)
    }
}
