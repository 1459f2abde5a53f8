use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use super::*;

/// DOM events the page knows how to route to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    KeyUp,
    Change,
    Click,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::KeyUp => "keyup",
            Self::Change => "change",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" => Ok(Self::Input),
            "keyup" => Ok(Self::KeyUp),
            "change" => Ok(Self::Change),
            "click" => Ok(Self::Click),
            other => Err(Error::TypeMismatch {
                selector: "event".into(),
                expected: "input, keyup, change or click".into(),
                actual: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetAction {
    Filter,
    SelectAll,
    DeselectAll,
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    target: NodeId,
    event: EventKind,
    action: WidgetAction,
}

/// A parsed page with the list filter widget wired to its controls.
///
/// User actions run synchronously: every bound handler has finished by the
/// time the action returns.
#[derive(Debug)]
pub struct Page {
    dom: Dom,
    widget: Option<BoundWidget>,
    bindings: Vec<Binding>,
    last_filter: Option<FilterReport>,
    last_toggle: Option<ToggleReport>,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Ok(Self::from_dom(parse_html(html)?))
    }

    pub fn from_dom(dom: Dom) -> Self {
        Self {
            dom,
            widget: None,
            bindings: Vec::new(),
            last_filter: None,
            last_toggle: None,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn widget(&self) -> Option<&BoundWidget> {
        self.widget.as_ref()
    }

    /// Binds the widget to this page: filter on `input`/`keyup` of the search
    /// input, select-all and deselect-all on `click` of their controls.
    /// Mounting again replaces the previous bindings.
    pub fn mount(&mut self, config: WidgetConfig) -> Result<&BoundWidget> {
        let widget = ListFilterWidget::new(config).bind(&self.dom)?;

        self.bindings = vec![
            Binding {
                target: widget.input(),
                event: EventKind::Input,
                action: WidgetAction::Filter,
            },
            Binding {
                target: widget.input(),
                event: EventKind::KeyUp,
                action: WidgetAction::Filter,
            },
            Binding {
                target: widget.select_all_control(),
                event: EventKind::Click,
                action: WidgetAction::SelectAll,
            },
            Binding {
                target: widget.deselect_all_control(),
                event: EventKind::Click,
                action: WidgetAction::DeselectAll,
            },
        ];
        info!(bindings = self.bindings.len(), "widget mounted");
        Ok(self.widget.insert(widget))
    }

    pub fn last_filter_report(&self) -> Option<FilterReport> {
        self.last_filter
    }

    pub fn last_toggle_report(&self) -> Option<&ToggleReport> {
        self.last_toggle.as_ref()
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let is_text_input = match tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                self.input_type(target).as_str(),
                "checkbox" | "radio" | "button" | "submit" | "reset"
            ),
            _ => false,
        };
        if !is_text_input {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, EventKind::Input);
        self.dispatch_event(target, EventKind::KeyUp);
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        self.dispatch_event(target, EventKind::Click);

        if self.is_checkbox(target) {
            let current = self.dom.checked(target).unwrap_or(false);
            self.dom.set_checked(target, !current)?;
            self.dispatch_event(target, EventKind::Input);
            self.dispatch_event(target, EventKind::Change);
        }
        Ok(())
    }

    /// Checks or unchecks a single checkbox, as a user clicking it would.
    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if !self.is_checkbox(target) {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox]".into(),
                actual: self.describe(target),
            });
        }

        if self.dom.checked(target) != Some(checked) {
            self.dom.set_checked(target, checked)?;
            self.dispatch_event(target, EventKind::Input);
            self.dispatch_event(target, EventKind::Change);
        }
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let event = event.parse::<EventKind>()?;
        self.dispatch_event(target, event);
        Ok(())
    }

    fn dispatch_event(&mut self, target: NodeId, event: EventKind) {
        let Some(widget) = self.widget.as_ref() else {
            return;
        };
        let actions = self
            .bindings
            .iter()
            .filter(|binding| binding.target == target && binding.event == event)
            .map(|binding| binding.action)
            .collect::<Vec<_>>();

        for action in actions {
            debug!(%event, ?action, "dispatching widget handler");
            match action {
                WidgetAction::Filter => self.last_filter = Some(widget.filter(&mut self.dom)),
                WidgetAction::SelectAll => {
                    self.last_toggle = Some(widget.select_all(&mut self.dom))
                }
                WidgetAction::DeselectAll => {
                    self.last_toggle = Some(widget.deselect_all(&mut self.dom))
                }
            }
        }
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target).unwrap_or_default();
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target).unwrap_or(false);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    /// Visible means no `display: none` on the element or any ancestor.
    pub fn assert_visible(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.is_rendered(target);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    /// Whitespace-collapsed labels of every row, in list order.
    pub fn row_labels(&self) -> Result<Vec<String>> {
        Ok(self
            .row_nodes()?
            .into_iter()
            .map(|node| collapse_whitespace(&self.dom.text_content(node)))
            .collect())
    }

    /// Labels of the rows currently shown, in list order.
    pub fn visible_labels(&self) -> Result<Vec<String>> {
        Ok(self
            .row_nodes()?
            .into_iter()
            .filter(|node| !self.dom.is_display_none(*node))
            .map(|node| collapse_whitespace(&self.dom.text_content(node)))
            .collect())
    }

    /// Toggle state of every row in list order; `None` for rows without one.
    pub fn checked_states(&self) -> Result<Vec<Option<bool>>> {
        let widget = self.mounted()?;
        let selector = widget.toggle_selector();
        self.row_nodes()?
            .into_iter()
            .map(|node| {
                Ok(self
                    .dom
                    .query_selector_from(node, selector)?
                    .and_then(|toggle| self.dom.checked(toggle)))
            })
            .collect()
    }

    fn row_nodes(&self) -> Result<Vec<NodeId>> {
        let widget = self.mounted()?;
        Ok(self
            .dom
            .elements_by_class_name_from(widget.list(), widget.row_class()))
    }

    fn mounted(&self) -> Result<&BoundWidget> {
        self.widget.as_ref().ok_or_else(|| Error::MissingTargetElement {
            role: "mounted widget".into(),
            id: "-".into(),
        })
    }

    fn is_rendered(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.dom.is_display_none(current) {
                return false;
            }
            cursor = self.dom.parent(current);
        }
        true
    }

    fn is_checkbox(&self, node: NodeId) -> bool {
        self.dom.tag_name(node) == Some("input") && self.input_type(node) == "checkbox"
    }

    fn input_type(&self, node: NodeId) -> String {
        self.dom
            .attr(node, "type")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase()
    }

    fn describe(&self, node: NodeId) -> String {
        match self.dom.tag_name(node) {
            Some("input") => format!("input[type={}]", self.input_type(node)),
            Some(tag) => tag.to_string(),
            None => "non-element".into(),
        }
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn assertion_failed(
        &self,
        selector: &str,
        target: NodeId,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            dom_snippet: truncate_chars(&self.dom.dump_node(target), 200),
        }
    }
}
