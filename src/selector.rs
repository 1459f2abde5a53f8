use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

impl SelectorAttrCondition {
    fn build(op: AttrOperator, key: String, value: String) -> Self {
        match op {
            AttrOperator::Eq => Self::Eq { key, value },
            AttrOperator::StartsWith => Self::StartsWith { key, value },
            AttrOperator::EndsWith => Self::EndsWith { key, value },
            AttrOperator::Contains => Self::Contains { key, value },
            AttrOperator::Includes => Self::Includes { key, value },
            AttrOperator::DashMatch => Self::DashMatch { key, value },
        }
    }

    pub(crate) fn matches(&self, element: &Element) -> bool {
        let attr = |key: &str| element.attrs.get(key);
        match self {
            Self::Exists { key } => element.attrs.contains_key(key),
            Self::Eq { key, value } => attr(key) == Some(value),
            Self::StartsWith { key, value } => attr(key).is_some_and(|a| a.starts_with(value)),
            Self::EndsWith { key, value } => attr(key).is_some_and(|a| a.ends_with(value)),
            Self::Contains { key, value } => attr(key).is_some_and(|a| a.contains(value)),
            Self::Includes { key, value } => {
                attr(key).is_some_and(|a| a.split_whitespace().any(|token| token == value))
            }
            Self::DashMatch { key, value } => attr(key)
                .is_some_and(|a| a == value || a.starts_with(&format!("{value}-"))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AttrOperator {
    Eq,
    StartsWith,
    EndsWith,
    Contains,
    Includes,
    DashMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    FirstChild,
    LastChild,
    Checked,
    Disabled,
    Enabled,
    Not(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
    pub(crate) pseudo_classes: Vec<SelectorPseudoClass>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal
            && self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && !self.universal
            && self.pseudo_classes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

/// Checks that `selector` parses without evaluating it.
pub(crate) fn validate_selector(selector: &str) -> Result<()> {
    parse_selector_groups(selector).map(|_| ())
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    split_selector_groups(selector)?
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut steps = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokenize_selector(selector)? {
        let combinator = match token.as_str() {
            ">" => Some(SelectorCombinator::Child),
            "+" => Some(SelectorCombinator::AdjacentSibling),
            "~" => Some(SelectorCombinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(combinator);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(steps)
}

/// Tracks `[...]` and `(...)` nesting so separators inside them are ignored.
#[derive(Default)]
struct Nesting {
    bracket: usize,
    paren: usize,
}

impl Nesting {
    fn feed(&mut self, ch: char, selector: &str) -> Result<()> {
        match ch {
            '[' => self.bracket += 1,
            ']' => {
                self.bracket = self
                    .bracket
                    .checked_sub(1)
                    .ok_or_else(|| Error::UnsupportedSelector(selector.into()))?
            }
            '(' => self.paren += 1,
            ')' => {
                self.paren = self
                    .paren
                    .checked_sub(1)
                    .ok_or_else(|| Error::UnsupportedSelector(selector.into()))?
            }
            _ => {}
        }
        Ok(())
    }

    fn top_level(&self) -> bool {
        self.bracket == 0 && self.paren == 0
    }

    fn finish(&self, selector: &str) -> Result<()> {
        if self.top_level() {
            Ok(())
        } else {
            Err(Error::UnsupportedSelector(selector.into()))
        }
    }
}

pub(crate) fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut nesting = Nesting::default();

    for ch in selector.chars() {
        if ch == ',' && nesting.top_level() {
            let trimmed = current.trim();
            if trimmed.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            groups.push(trimmed.to_string());
            current.clear();
            continue;
        }
        nesting.feed(ch, selector)?;
        current.push(ch);
    }
    nesting.finish(selector)?;

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

pub(crate) fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut nesting = Nesting::default();

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.trim().is_empty() {
            tokens.push(current.trim().to_string());
        }
        current.clear();
    };

    for ch in selector.chars() {
        if nesting.top_level() {
            if matches!(ch, '>' | '+' | '~') {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
                continue;
            }
            if ch.is_ascii_whitespace() {
                flush(&mut current, &mut tokens);
                continue;
            }
        }
        nesting.feed(ch, selector)?;
        current.push(ch);
    }
    nesting.finish(selector)?;
    flush(&mut current, &mut tokens);

    Ok(tokens)
}

pub(crate) fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let part = part.trim();
    let unsupported = || Error::UnsupportedSelector(part.into());
    if part.is_empty() {
        return Err(unsupported());
    }

    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || step.tag.is_some() {
                    return Err(unsupported());
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_selector_ident(part, i + 1).ok_or_else(unsupported)?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported());
                }
                i = next;
            }
            b'.' => {
                let (class_name, next) =
                    parse_selector_ident(part, i + 1).ok_or_else(unsupported)?;
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            b':' => {
                let (pseudo, next) = parse_selector_pseudo(part, i).ok_or_else(unsupported)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if !step.is_empty() {
                    return Err(unsupported());
                }
                let (tag, next) = parse_selector_ident(part, i).ok_or_else(unsupported)?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step.is_empty() {
        return Err(unsupported());
    }
    Ok(step)
}

const SIMPLE_PSEUDO_CLASSES: &[&str] = &["first-child", "last-child", "checked", "disabled", "enabled"];

fn simple_pseudo_class(name: &str) -> Option<SelectorPseudoClass> {
    match name {
        "first-child" => Some(SelectorPseudoClass::FirstChild),
        "last-child" => Some(SelectorPseudoClass::LastChild),
        "checked" => Some(SelectorPseudoClass::Checked),
        "disabled" => Some(SelectorPseudoClass::Disabled),
        "enabled" => Some(SelectorPseudoClass::Enabled),
        _ => None,
    }
}

pub(crate) fn parse_selector_pseudo(
    part: &str,
    start: usize,
) -> Option<(SelectorPseudoClass, usize)> {
    if part.as_bytes().get(start)? != &b':' {
        return None;
    }
    let start = start + 1;
    let tail = part.get(start..)?;

    for name in SIMPLE_PSEUDO_CLASSES {
        if let Some(rest) = tail.strip_prefix(name) {
            if rest
                .bytes()
                .next()
                .is_none_or(|next| is_selector_continuation(&next))
            {
                return Some((simple_pseudo_class(name)?, start + name.len()));
            }
        }
    }

    if tail.starts_with("not(") {
        let (inners, next) = parse_pseudo_selector_list(part, start, "not(")?;
        return Some((SelectorPseudoClass::Not(inners), next));
    }

    None
}

pub(crate) fn parse_pseudo_selector_list(
    part: &str,
    start: usize,
    prefix: &str,
) -> Option<(Vec<Vec<SelectorPart>>, usize)> {
    let rest = part.get(start..)?.strip_prefix(prefix)?;
    let close_pos = find_matching_paren(rest)?;
    let body = rest[..close_pos].trim();
    if body.is_empty() {
        return None;
    }

    let selectors = parse_selector_groups(body).ok()?;

    let next = start + prefix.len() + close_pos + 1;
    if let Some(ch) = part.as_bytes().get(next) {
        if !is_selector_continuation(ch) {
            return None;
        }
    }
    Some((selectors, next))
}

pub(crate) fn find_matching_paren(body: &str) -> Option<usize> {
    let mut paren_depth = 1usize;
    let mut bracket_depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (idx, b) in body.bytes().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'\'' | b'"' => quote = Some(b),
            b'[' => bracket_depth += 1,
            b']' => bracket_depth = bracket_depth.checked_sub(1)?,
            b'(' if bracket_depth == 0 => paren_depth += 1,
            b')' if bracket_depth == 0 => {
                paren_depth -= 1;
                if paren_depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

pub(crate) fn is_selector_continuation(next: &u8) -> bool {
    matches!(next, b'.' | b'#' | b'[' | b':')
}

pub(crate) fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_selector_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_selector_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

pub(crate) fn is_selector_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn is_selector_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':'
}

fn skip_selector_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

pub(crate) fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let unsupported = || Error::UnsupportedSelector(src.into());
    let bytes = src.as_bytes();
    let mut i = skip_selector_ws(bytes, open_bracket + 1);

    let key_start = i;
    while i < bytes.len() && is_selector_attr_name_char(bytes[i]) {
        i += 1;
    }
    if key_start == i {
        return Err(unsupported());
    }
    let key = src
        .get(key_start..i)
        .ok_or_else(unsupported)?
        .to_ascii_lowercase();

    i = skip_selector_ws(bytes, i);
    if bytes.get(i) == Some(&b']') {
        return Ok((SelectorAttrCondition::Exists { key }, i + 1));
    }

    let (op, next) = match (bytes.get(i), bytes.get(i + 1)) {
        (Some(b'='), _) => (AttrOperator::Eq, i + 1),
        (Some(b'^'), Some(b'=')) => (AttrOperator::StartsWith, i + 2),
        (Some(b'$'), Some(b'=')) => (AttrOperator::EndsWith, i + 2),
        (Some(b'*'), Some(b'=')) => (AttrOperator::Contains, i + 2),
        (Some(b'~'), Some(b'=')) => (AttrOperator::Includes, i + 2),
        (Some(b'|'), Some(b'=')) => (AttrOperator::DashMatch, i + 2),
        _ => return Err(unsupported()),
    };

    i = skip_selector_ws(bytes, next);
    let (value, after_value) = parse_selector_attr_value(src, i)?;
    i = skip_selector_ws(bytes, after_value);
    if bytes.get(i) != Some(&b']') {
        return Err(unsupported());
    }

    Ok((SelectorAttrCondition::build(op, key, value), i + 1))
}

fn unescape_selector_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn parse_selector_attr_value(src: &str, start: usize) -> Result<(String, usize)> {
    let unsupported = || Error::UnsupportedSelector(src.into());
    let bytes = src.as_bytes();
    if start >= bytes.len() {
        return Err(unsupported());
    }

    if bytes[start] == b'"' || bytes[start] == b'\'' {
        let quote = bytes[start];
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                i = (i + 2).min(bytes.len());
                continue;
            }
            if bytes[i] == quote {
                let raw = src.get(start + 1..i).ok_or_else(unsupported)?;
                return Ok((unescape_selector_value(raw), i + 1));
            }
            i += 1;
        }
        return Err(unsupported());
    }

    let mut i = start;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b']' {
        if bytes[i] == b'\\' {
            i = (i + 2).min(bytes.len());
            continue;
        }
        i += 1;
    }
    let raw = src.get(start..i).ok_or_else(unsupported)?;
    Ok((unescape_selector_value(raw), i))
}
