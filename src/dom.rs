use super::*;

// Recursive walks grow the stack on demand so generated pages with very deep
// nesting cannot overflow it.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

impl Dom {
    /// Concatenated text of every descendant text node, in document order.
    pub fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.push_text_content(node_id, &mut out);
        out
    }

    fn push_text_content(&self, node_id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(node_id.0) else {
            return;
        };
        match &node.node_type {
            NodeType::Text(text) => out.push_str(text),
            NodeType::Document | NodeType::Element(_) => {
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    for child in &node.children {
                        self.push_text_content(*child, out);
                    }
                });
            }
        }
    }

    pub fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            });
        }
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        self.rebuild_id_index();
        Ok(())
    }

    /// Reads one declaration from the inline `style` attribute.
    pub fn style_get(&self, node_id: NodeId, property: &str) -> Option<String> {
        let element = self.element(node_id)?;
        let name = property.trim().to_ascii_lowercase();
        parse_style_declarations(element.attrs.get("style").map(String::as_str))
            .into_iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value)
    }

    /// Writes one declaration of the inline `style` attribute. An empty value
    /// removes the declaration, like assigning `""` to `element.style.x`.
    pub fn style_set(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let name = property.trim().to_ascii_lowercase();
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::TypeMismatch {
                selector: format!("node {}", node_id.0),
                expected: "element".into(),
                actual: "non-element".into(),
            })?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        let value = value.trim();
        match decls.iter().position(|(prop, _)| prop == &name) {
            Some(pos) if value.is_empty() => {
                decls.remove(pos);
            }
            Some(pos) => decls[pos].1 = value.to_string(),
            None if !value.is_empty() => decls.push((name, value.to_string())),
            None => {}
        }

        // Keep an empty style attribute to match CSSStyleDeclaration behavior.
        element
            .attrs
            .insert("style".to_string(), serialize_style_declarations(&decls));
        Ok(())
    }

    /// True when the element's inline style hides it with `display: none`.
    pub fn is_display_none(&self, node_id: NodeId) -> bool {
        self.style_get(node_id, "display")
            .is_some_and(|value| value.eq_ignore_ascii_case("none"))
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    /// Like [`Dom::query_selector`] but restricted to descendants of `root`.
    pub fn query_selector_from(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all_from(root, selector)?.into_iter().next())
    }

    pub fn query_selector_all_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut ids = Vec::new();
        self.collect_elements_descendants_dfs(root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    fn filter_matching(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| {
                groups
                    .iter()
                    .any(|steps| self.matches_selector_chain(*candidate, steps))
                    && seen.insert(*candidate)
            })
            .collect()
    }

    /// Descendant elements of `root` carrying `class_name`, in document order.
    pub fn elements_by_class_name_from(&self, root: NodeId, class_name: &str) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.collect_elements_descendants_dfs(root, &mut ids);
        ids.retain(|id| self.element(*id).is_some_and(|e| has_class(e, class_name)));
        ids
    }

    pub fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        if self.element(node_id).is_none() {
            return Ok(false);
        }
        let groups = parse_selector_groups(selector)?;
        Ok(groups
            .iter()
            .any(|steps| self.matches_selector_chain(node_id, steps)))
    }

    pub fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(current, steps))
            {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if self.element(node_id).is_some() {
            out.push(node_id);
        }
        self.collect_elements_descendants_dfs(node_id, out);
    }

    pub(crate) fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            for child in self.children(node_id) {
                self.collect_elements_dfs(*child, out);
            }
        });
    }

    fn element_siblings(&self, node_id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(node_id) else {
            return Vec::new();
        };
        self.children(parent)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    pub(crate) fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let siblings = self.element_siblings(node_id);
        let pos = siblings.iter().position(|id| *id == node_id)?;
        pos.checked_sub(1).map(|prev| siblings[prev])
    }

    fn is_first_element_child(&self, node_id: NodeId) -> bool {
        self.element_siblings(node_id).first() == Some(&node_id)
    }

    fn is_last_element_child(&self, node_id: NodeId) -> bool {
        self.element_siblings(node_id).last() == Some(&node_id)
    }

    pub(crate) fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => self
                    .parent(current)
                    .filter(|parent| self.matches_step(*parent, prev_step)),
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent(parent);
                    }
                    found
                }
                SelectorCombinator::AdjacentSibling => self
                    .previous_element_sibling(current)
                    .filter(|sibling| self.matches_step(*sibling, prev_step)),
                SelectorCombinator::GeneralSibling => {
                    let mut cursor = self.previous_element_sibling(current);
                    let mut found = None;
                    while let Some(sibling) = cursor {
                        if self.matches_step(sibling, prev_step) {
                            found = Some(sibling);
                            break;
                        }
                        cursor = self.previous_element_sibling(sibling);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    pub(crate) fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        if !step.attrs.iter().all(|cond| cond.matches(element)) {
            return false;
        }

        step.pseudo_classes.iter().all(|pseudo| match pseudo {
            SelectorPseudoClass::FirstChild => self.is_first_element_child(node_id),
            SelectorPseudoClass::LastChild => self.is_last_element_child(node_id),
            SelectorPseudoClass::Checked => element.checked,
            SelectorPseudoClass::Disabled => element.disabled,
            SelectorPseudoClass::Enabled => !element.disabled,
            SelectorPseudoClass::Not(inners) => !inners
                .iter()
                .any(|inner| self.matches_selector_chain(node_id, inner)),
        })
    }

    /// Serializes a subtree back to markup. Attributes are sorted so the
    /// output is stable.
    pub fn dump_node(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.push_dump(node_id, &mut out);
        out
    }

    fn push_dump(&self, node_id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(node_id.0) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {
                for child in &node.children {
                    self.push_dump(*child, out);
                }
            }
            NodeType::Text(text) => out.push_str(&escape_html_text_for_serialization(text)),
            NodeType::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort_by(|(left, _), (right, _)| left.cmp(right));
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_html_attr_for_serialization(v));
                    out.push('"');
                }
                out.push('>');
                if is_void_tag(&element.tag_name) {
                    return;
                }
                let raw_text_container = element.tag_name.eq_ignore_ascii_case("script")
                    || element.tag_name.eq_ignore_ascii_case("style");
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    for child in &node.children {
                        match &self.nodes[child.0].node_type {
                            NodeType::Text(text) if raw_text_container => out.push_str(text),
                            _ => self.push_dump(*child, out),
                        }
                    }
                });
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
            }
        }
    }
}
