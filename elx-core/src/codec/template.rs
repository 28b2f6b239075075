//! Template compilation into render functions.

use serde::{Deserialize, Serialize};

use super::error::CompileError;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Output of a template compiler, shipped alongside the component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTemplate {
    pub render: String,
    #[serde(default)]
    pub static_render_fns: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl CompiledTemplate {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Turns template markup into a [`CompiledTemplate`].
///
/// Problems the compiler can recover from go into `errors` and `tips`;
/// an `Err` means no render function could be produced.
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, template: &str) -> Result<CompiledTemplate, CompileError>;
}

/// Built-in compiler for HTML-like templates.
///
/// Produces a `with(this){return ...}` render function built from the runtime
/// helpers `_c` (element), `_v` (text), `_s` (to string), `_e` (empty node),
/// `_l` (list) and `_t` (slot). Static subtrees are not hoisted, so
/// `static_render_fns` is always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupCompiler;

impl TemplateCompiler for MarkupCompiler {
    fn compile(&self, template: &str) -> Result<CompiledTemplate, CompileError> {
        let template = template.replace("\r\n", "\n");
        if template.trim().is_empty() {
            return Err(CompileError::EmptyTemplate);
        }

        let (roots, errors) = TreeBuilder::new(&template).build()?;
        let mut generator = Generator {
            errors,
            tips: Vec::new(),
        };
        let code = generator.root(&roots);

        Ok(CompiledTemplate {
            render: format!("with(this){{return {}}}", code),
            static_render_fns: Vec::new(),
            errors: generator.errors,
            tips: generator.tips,
        })
    }
}

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    fn is_blank(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
struct Attr {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<Attr>,
    children: Vec<Node>,
    line: usize,
}

impl Element {
    fn has(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Value of an attribute; a bare attribute reads as an empty string.
    fn value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn missing_end_tag(element: &Element) -> String {
    format!(
        "<{}> at line {} has no matching end tag",
        element.tag, element.line
    )
}

/// Builds the element tree, closing what it can and collecting recoverable
/// problems.
struct TreeBuilder {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    stack: Vec<Element>,
    roots: Vec<Node>,
    errors: Vec<String>,
}

impl TreeBuilder {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            stack: Vec::new(),
            roots: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(mut self) -> Result<(Vec<Node>, Vec<String>), CompileError> {
        while self.pos < self.chars.len() {
            if self.starts_with("<!--") {
                self.skip_comment()?;
            } else if self.at_close_tag() {
                self.close_tag()?;
            } else if self.at_open_tag() {
                self.open_tag()?;
            } else {
                self.text()?;
            }
        }

        while let Some(element) = self.stack.pop() {
            self.errors.push(missing_end_tag(&element));
            self.attach(Node::Element(element));
        }
        Ok((self.roots, self.errors))
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn find(&self, pattern: &str) -> Option<usize> {
        let pattern: Vec<char> = pattern.chars().collect();
        (self.pos..self.chars.len()).find(|&i| self.chars[i..].starts_with(&pattern))
    }

    fn at_open_tag(&self) -> bool {
        self.peek_at(0) == Some('<') && self.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn at_close_tag(&self) -> bool {
        self.starts_with("</") && self.peek_at(2).is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn at_markup(&self) -> bool {
        self.starts_with("<!--") || self.at_open_tag() || self.at_close_tag()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_at(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_at(0).is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn syntax(line: usize, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Adds a node to the innermost open element, merging adjacent text.
    fn attach(&mut self, node: Node) {
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        if let (Node::Text(text), Some(Node::Text(previous))) = (&node, siblings.last_mut()) {
            previous.push_str(text);
            return;
        }
        siblings.push(node);
    }

    fn skip_comment(&mut self) -> Result<(), CompileError> {
        let line = self.line;
        self.pos += 4;
        while !self.starts_with("-->") {
            if self.advance().is_none() {
                return Err(Self::syntax(line, "unterminated comment"));
            }
        }
        self.pos += 3;
        Ok(())
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek_at(0) {
            if !(c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')) {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        name
    }

    fn read_attr_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek_at(0) {
            if c.is_whitespace() || c == '=' || c == '>' || (c == '/' && self.peek_at(1) == Some('>'))
            {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        name
    }

    fn read_attr_value(&mut self, tag: &str) -> Result<String, CompileError> {
        let line = self.line;
        let mut value = String::new();
        match self.peek_at(0) {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                loop {
                    match self.advance() {
                        None => {
                            return Err(Self::syntax(
                                line,
                                format!("unterminated attribute value in <{}>", tag),
                            ))
                        }
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                    }
                }
            }
            _ => {
                while let Some(c) = self.peek_at(0) {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    self.pos += 1;
                }
                Ok(value)
            }
        }
    }

    fn open_tag(&mut self) -> Result<(), CompileError> {
        let line = self.line;
        self.pos += 1;
        let tag = self.read_name();
        let mut attrs = Vec::new();

        let self_closing = loop {
            self.skip_whitespace();
            match self.peek_at(0) {
                None => return Err(Self::syntax(line, format!("unterminated tag <{}>", tag))),
                Some('>') => {
                    self.pos += 1;
                    break false;
                }
                Some('/') if self.peek_at(1) == Some('>') => {
                    self.pos += 2;
                    break true;
                }
                Some(_) => {}
            }

            let name = self.read_attr_name();
            if name.is_empty() {
                self.advance();
                continue;
            }
            self.skip_whitespace();
            let value = if self.peek_at(0) == Some('=') {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.read_attr_value(&tag)?)
            } else {
                None
            };
            attrs.push(Attr { name, value });
        };

        let element = Element {
            tag,
            attrs,
            children: Vec::new(),
            line,
        };
        if self_closing || is_void(&element.tag) {
            self.attach(Node::Element(element));
        } else {
            self.stack.push(element);
        }
        Ok(())
    }

    fn close_tag(&mut self) -> Result<(), CompileError> {
        let line = self.line;
        self.pos += 2;
        let tag = self.read_name();
        loop {
            match self.advance() {
                None => return Err(Self::syntax(line, format!("unterminated tag </{}>", tag))),
                Some('>') => break,
                Some(_) => {}
            }
        }

        match self
            .stack
            .iter()
            .rposition(|e| e.tag.eq_ignore_ascii_case(&tag))
        {
            Some(index) => {
                while self.stack.len() > index + 1 {
                    if let Some(unclosed) = self.stack.pop() {
                        self.errors.push(missing_end_tag(&unclosed));
                        self.attach(Node::Element(unclosed));
                    }
                }
                if let Some(element) = self.stack.pop() {
                    self.attach(Node::Element(element));
                }
            }
            None if is_void(&tag) => {}
            None => self.errors.push(format!(
                "end tag </{}> at line {} has no matching start tag",
                tag, line
            )),
        }
        Ok(())
    }

    fn text(&mut self) -> Result<(), CompileError> {
        let mut text = String::new();
        while self.pos < self.chars.len() && !self.at_markup() {
            if self.starts_with("{{") {
                let line = self.line;
                let end = self
                    .find("}}")
                    .ok_or_else(|| Self::syntax(line, "unterminated interpolation"))?;
                while self.pos < end + 2 {
                    if let Some(c) = self.advance() {
                        text.push(c);
                    }
                }
            } else if let Some(c) = self.advance() {
                text.push(c);
            }
        }
        self.attach(Node::Text(text));
        Ok(())
    }
}

struct Children {
    items: Vec<String>,
    normalize: bool,
}

/// Emits render code from the element tree.
struct Generator {
    errors: Vec<String>,
    tips: Vec<String>,
}

impl Generator {
    fn root(&mut self, roots: &[Node]) -> String {
        let mut elements = Vec::new();
        for node in roots {
            match node {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.tips.push(format!(
                            "text \"{}\" outside the root element will be ignored",
                            text
                        ));
                    }
                }
                Node::Element(element) => {
                    if element.has("v-for") {
                        self.errors.push(
                            "cannot use v-for on the root element because it renders multiple elements"
                                .to_string(),
                        );
                    }
                    if element.tag == "template" || element.tag == "slot" {
                        self.errors.push(format!(
                            "cannot use <{}> as the root element",
                            element.tag
                        ));
                    }
                    elements.push(node.clone());
                }
            }
        }

        let items = self.children(&elements).items;
        if items.len() > 1 {
            self.errors.push(
                "template must contain exactly one root element; use v-if, v-else-if and v-else for alternatives"
                    .to_string(),
            );
        }
        match items.into_iter().next() {
            Some(code) => code,
            None => {
                self.errors.push("template has no root element".to_string());
                "_e()".to_string()
            }
        }
    }

    fn children(&mut self, nodes: &[Node]) -> Children {
        let normalize = nodes.iter().any(|node| {
            matches!(node, Node::Element(e) if e.has("v-for") || e.tag == "slot" || e.tag == "template")
        });
        let last = nodes.len().saturating_sub(1);
        let mut items = Vec::new();
        let mut i = 0;

        while i < nodes.len() {
            match &nodes[i] {
                Node::Text(text) => {
                    if !text.trim().is_empty() {
                        items.push(text_code(text, i == 0, i == last));
                    } else if i != 0 && i != last {
                        items.push(r#"_v(" ")"#.to_string());
                    }
                    i += 1;
                }
                Node::Element(element) => {
                    if element.has("v-else-if") || element.has("v-else") {
                        self.errors.push(format!(
                            "v-else used on <{}> at line {} without a preceding v-if",
                            element.tag, element.line
                        ));
                        i += 1;
                    } else if element.has("v-for") {
                        items.push(self.for_code(element));
                        i += 1;
                    } else if let Some(condition) = element.value("v-if") {
                        let (code, next) = self.if_chain(nodes, i, element, condition);
                        items.push(code);
                        i = next;
                    } else {
                        items.push(self.element_code(element));
                        i += 1;
                    }
                }
            }
        }

        Children { items, normalize }
    }

    /// Folds a v-if element and its v-else-if/v-else siblings into one
    /// conditional expression. Returns the index after the chain.
    fn if_chain(
        &mut self,
        nodes: &[Node],
        start: usize,
        first: &Element,
        condition: &str,
    ) -> (String, usize) {
        let mut code = format!("({})?{}:", condition, self.element_code(first));
        let mut next = start + 1;

        loop {
            let mut k = next;
            while k < nodes.len() && nodes[k].is_blank() {
                k += 1;
            }
            let Some(Node::Element(element)) = nodes.get(k) else {
                break;
            };
            if let Some(condition) = element.value("v-else-if") {
                code.push_str(&format!("({})?{}:", condition, self.element_code(element)));
                next = k + 1;
            } else if element.has("v-else") {
                code.push_str(&self.element_code(element));
                return (code, k + 1);
            } else {
                break;
            }
        }

        code.push_str("_e()");
        (code, next)
    }

    fn for_code(&mut self, element: &Element) -> String {
        let expression = element.value("v-for").unwrap_or_default();
        let Some((alias, list)) = split_for(expression) else {
            self.errors.push(format!(
                "invalid v-for expression \"{}\" on <{}> at line {}",
                expression, element.tag, element.line
            ));
            return self.element_code(element);
        };

        let inner = match element.value("v-if") {
            Some(condition) => format!("({})?{}:_e()", condition, self.element_code(element)),
            None => self.element_code(element),
        };
        format!("_l(({}),function({}){{return {}}})", list, alias, inner)
    }

    fn element_code(&mut self, element: &Element) -> String {
        let children = self.children(&element.children);
        match element.tag.as_str() {
            "template" => format!("[{}]", children.items.join(",")),
            "slot" => {
                let name = quote(element.value("name").unwrap_or("default"));
                if children.items.is_empty() {
                    format!("_t({})", name)
                } else {
                    format!("_t({},[{}])", name, children.items.join(","))
                }
            }
            tag => {
                let mut code = format!("_c('{}'", tag);
                if let Some(data) = data_code(element, &mut self.errors) {
                    code.push(',');
                    code.push_str(&data);
                }
                if !children.items.is_empty() {
                    code.push_str(&format!(",[{}]", children.items.join(",")));
                    if children.normalize {
                        code.push_str(",2");
                    }
                }
                code.push(')');
                code
            }
        }
    }
}

/// Builds the data object of an element from its attributes.
fn data_code(element: &Element, errors: &mut Vec<String>) -> Option<String> {
    let mut directives = Vec::new();
    let mut key = None;
    let mut reference = None;
    let mut slot = None;
    let mut static_class = None;
    let mut class = None;
    let mut static_style = None;
    let mut style = None;
    let mut attrs = Vec::new();
    let mut dom_props = Vec::new();
    let mut on = Listeners::default();
    let mut native_on = Listeners::default();
    let mut model = None;

    for attr in &element.attrs {
        let name = attr.name.as_str();
        let value = attr.value.as_deref();
        if matches!(name, "v-if" | "v-else-if" | "v-else" | "v-for") {
            continue;
        }

        if let Some(prop) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
            let expression = value.unwrap_or("true").to_string();
            match prop {
                "class" => class = Some(expression),
                "style" => style = Some(expression),
                "key" => key = Some(expression),
                _ => attrs.push(format!("{}:{}", quote(prop), expression)),
            }
        } else if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:")) {
            let binding = event_binding(event, value.unwrap_or_default(), element, errors);
            let target = if binding.native { &mut native_on } else { &mut on };
            target.add(binding.event, binding.handler, false);
        } else if name == "v-model" || name.starts_with("v-model.") {
            let expression = value.unwrap_or_default();
            let (_, modifiers) = split_modifiers(name);
            let mut lazy = false;
            let mut trim = false;
            let mut number = false;
            for modifier in &modifiers {
                match *modifier {
                    "lazy" => lazy = true,
                    "trim" => trim = true,
                    "number" => number = true,
                    other => errors.push(unsupported_modifier(other, name, element)),
                }
            }
            if is_form_control(&element.tag) {
                directives.push(directive("model", name, None, &modifiers, Some(expression)));
                let mut assigned = "$event.target.value".to_string();
                if trim {
                    assigned.push_str(".trim()");
                }
                if number {
                    assigned = format!("_n({})", assigned);
                }
                let body = if lazy {
                    format!("{}={}", expression, assigned)
                } else {
                    format!("if($event.target.composing)return;{}={}", expression, assigned)
                };
                dom_props.push(format!("\"value\":({})", expression));
                let event = if lazy { "change" } else { "input" };
                on.add(event.to_string(), format!("function($event){{{}}}", body), true);
                if trim || number {
                    on.add(
                        "blur".to_string(),
                        "function($event){return $forceUpdate()}".to_string(),
                        false,
                    );
                }
            } else {
                let mut assigned = "$$v".to_string();
                if trim {
                    assigned = "(typeof $$v === 'string'? $$v.trim(): $$v)".to_string();
                }
                if number {
                    assigned = format!("_n({})", assigned);
                }
                model = Some(format!(
                    "{{value:({}),callback:function ($$v) {{{}={}}},expression:{}}}",
                    expression,
                    expression,
                    assigned,
                    quote(expression)
                ));
            }
        } else if name == "v-html" {
            dom_props.push(format!("\"innerHTML\":_s({})", value.unwrap_or_default()));
        } else if name == "v-text" {
            dom_props.push(format!("\"textContent\":_s({})", value.unwrap_or_default()));
        } else if let Some(rest) = name.strip_prefix("v-") {
            let (head, modifiers) = split_modifiers(rest);
            let (directive_name, arg) = match head.split_once(':') {
                Some((directive_name, arg)) => (directive_name, Some(arg)),
                None => (head, None),
            };
            directives.push(directive(directive_name, name, arg, &modifiers, value));
        } else {
            let value = value.unwrap_or_default();
            match name {
                "ref" => reference = Some(quote(value)),
                "key" => key = Some(quote(value)),
                "slot" => slot = Some(quote(value)),
                "class" => static_class = Some(quote(condense(value).trim())),
                "style" => static_style = Some(style_object(value)),
                _ => attrs.push(format!("{}:{}", quote(name), quote(value))),
            }
        }
    }

    let mut fields = Vec::new();
    if !directives.is_empty() {
        fields.push(format!("directives:[{}]", directives.join(",")));
    }
    let scalars = [
        ("key", key),
        ("ref", reference),
        ("slot", slot),
        ("staticClass", static_class),
        ("class", class),
        ("staticStyle", static_style),
        ("style", style),
    ];
    for (field, value) in scalars {
        if let Some(value) = value {
            fields.push(format!("{}:{}", field, value));
        }
    }
    for (field, entries) in [("attrs", attrs), ("domProps", dom_props)] {
        if !entries.is_empty() {
            fields.push(format!("{}:{{{}}}", field, entries.join(",")));
        }
    }
    for (field, listeners) in [("on", on), ("nativeOn", native_on)] {
        if let Some(code) = listeners.code() {
            fields.push(format!("{}:{}", field, code));
        }
    }
    if let Some(model) = model {
        fields.push(format!("model:{}", model));
    }

    if fields.is_empty() {
        None
    } else {
        Some(format!("{{{}}}", fields.join(",")))
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

fn split_modifiers(name: &str) -> (&str, Vec<&str>) {
    let mut parts = name.split('.');
    let head = parts.next().unwrap_or_default();
    (head, parts.collect())
}

fn split_for(expression: &str) -> Option<(&str, &str)> {
    let index = expression
        .find(" in ")
        .or_else(|| expression.find(" of "))?;
    let alias = expression[..index]
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    let list = expression[index + 4..].trim();
    if alias.is_empty() || list.is_empty() {
        return None;
    }
    Some((alias, list))
}

fn directive(
    name: &str,
    raw_name: &str,
    arg: Option<&str>,
    modifiers: &[&str],
    value: Option<&str>,
) -> String {
    let mut fields = vec![
        format!("name:{}", quote(name)),
        format!("rawName:{}", quote(raw_name)),
    ];
    if let Some(value) = value {
        fields.push(format!("value:({})", value));
        fields.push(format!("expression:{}", quote(value)));
    }
    if let Some(arg) = arg {
        fields.push(format!("arg:{}", quote(arg)));
    }
    if !modifiers.is_empty() {
        let flags: Vec<String> = modifiers
            .iter()
            .map(|m| format!("{}:true", quote(m)))
            .collect();
        fields.push(format!("modifiers:{{{}}}", flags.join(",")));
    }
    format!("{{{}}}", fields.join(","))
}

/// Listeners of one element, merged by event name in attribute order.
#[derive(Default)]
struct Listeners {
    entries: Vec<(String, Vec<String>)>,
}

impl Listeners {
    /// `first` puts the handler ahead of those already bound to the event.
    fn add(&mut self, event: String, handler: String, first: bool) {
        match self.entries.iter_mut().find(|(name, _)| *name == event) {
            Some((_, handlers)) if first => handlers.insert(0, handler),
            Some((_, handlers)) => handlers.push(handler),
            None => self.entries.push((event, vec![handler])),
        }
    }

    fn code(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let fields: Vec<String> = self
            .entries
            .iter()
            .map(|(event, handlers)| match handlers.as_slice() {
                [single] => format!("{}:{}", quote(event), single),
                _ => format!("{}:[{}]", quote(event), handlers.join(",")),
            })
            .collect();
        Some(format!("{{{}}}", fields.join(",")))
    }
}

struct EventBinding {
    /// Event name with the `!` (capture), `~` (once) and `&` (passive) flags.
    event: String,
    native: bool,
    handler: String,
}

fn event_binding(
    attribute: &str,
    handler: &str,
    element: &Element,
    errors: &mut Vec<String>,
) -> EventBinding {
    let (name, modifiers) = split_modifiers(attribute);
    let has = |modifier: &str| modifiers.contains(&modifier);

    if has("passive") && has("prevent") {
        errors.push(format!(
            "passive and prevent can't be used together on <{}> at line {}",
            element.tag, element.line
        ));
    }

    let mut event = name.to_string();
    let mut right_click = false;
    if event == "click" {
        if has("right") {
            event = "contextmenu".to_string();
            right_click = true;
        } else if has("middle") {
            event = "mouseup".to_string();
        }
    }
    for (flag, prefix) in [("capture", '!'), ("once", '~'), ("passive", '&')] {
        if has(flag) {
            event.insert(0, prefix);
        }
    }

    let mut keys = Vec::new();
    let mut guards = String::new();
    for modifier in &modifiers {
        match *modifier {
            "capture" | "once" | "passive" | "native" => {}
            "right" if right_click => {}
            "stop" => guards.push_str("$event.stopPropagation();"),
            "prevent" => guards.push_str("$event.preventDefault();"),
            "self" => guards.push_str(&guard("$event.target !== $event.currentTarget")),
            "ctrl" | "shift" | "alt" | "meta" => {
                guards.push_str(&guard(&format!("!$event.{}Key", modifier)))
            }
            "left" => {
                guards.push_str(&guard("'button' in $event && $event.button !== 0"));
                keys.push("left");
            }
            "middle" => guards.push_str(&guard("'button' in $event && $event.button !== 1")),
            "right" => {
                guards.push_str(&guard("'button' in $event && $event.button !== 2"));
                keys.push("right");
            }
            "exact" => {
                let others: Vec<String> = ["ctrl", "shift", "alt", "meta"]
                    .iter()
                    .filter(|key| !has(**key))
                    .map(|key| format!("$event.{}Key", key))
                    .collect();
                if !others.is_empty() {
                    guards.push_str(&guard(&others.join("||")));
                }
            }
            key if is_key_alias(key) => keys.push(key),
            other => errors.push(unsupported_modifier(other, attribute, element)),
        }
    }

    let mut code = key_filter(&keys);
    code.push_str(&guards);

    let handler = handler.trim();
    let handler = if handler.is_empty() {
        format!("function($event){{{}}}", code)
    } else if is_simple_path(handler) {
        if code.is_empty() {
            handler.to_string()
        } else {
            format!("function($event){{{}return {}($event)}}", code, handler)
        }
    } else {
        format!("function($event){{{}{}}}", code, handler)
    };

    EventBinding {
        event,
        native: has("native"),
        handler,
    }
}

fn guard(condition: &str) -> String {
    format!("if({})return null;", condition)
}

/// Keyboard aliases are written in kebab case, e.g. `.enter` or `.page-down`.
fn is_key_alias(modifier: &str) -> bool {
    !modifier.is_empty()
        && modifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Codes and `KeyboardEvent.key` names of the built-in key aliases.
fn key_alias(key: &str) -> Option<(&'static str, &'static str)> {
    let alias = match key {
        "esc" => ("27", r#"["Esc","Escape"]"#),
        "tab" => ("9", r#""Tab""#),
        "enter" => ("13", r#""Enter""#),
        "space" => ("32", r#"[" ","Spacebar"]"#),
        "up" => ("38", r#"["Up","ArrowUp"]"#),
        "left" => ("37", r#"["Left","ArrowLeft"]"#),
        "right" => ("39", r#"["Right","ArrowRight"]"#),
        "down" => ("40", r#"["Down","ArrowDown"]"#),
        "delete" => ("[8,46]", r#"["Backspace","Delete","Del"]"#),
        _ => return None,
    };
    Some(alias)
}

/// Guard that returns early from key events not matching any of `keys`.
fn key_filter(keys: &[&str]) -> String {
    if keys.is_empty() {
        return String::new();
    }
    let checks: Vec<String> = keys
        .iter()
        .map(|key| {
            if key.chars().all(|c| c.is_ascii_digit()) {
                return format!("$event.keyCode!=={}", key);
            }
            let (code, name) = key_alias(key).unwrap_or(("undefined", "undefined"));
            format!("_k($event.keyCode,{},{},$event.key,{})", quote(key), code, name)
        })
        .collect();
    guard(&format!(
        "!$event.type.indexOf('key')&&{}",
        checks.join("&&")
    ))
}

fn unsupported_modifier(modifier: &str, attribute: &str, element: &Element) -> String {
    format!(
        "unsupported modifier \".{}\" in {} on <{}> at line {}",
        modifier, attribute, element.tag, element.line
    )
}

/// True for member paths such as `save` or `form.submit`.
fn is_simple_path(expression: &str) -> bool {
    let starts_ok = expression
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
    starts_ok
        && expression
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
        && !expression.contains("..")
        && !expression.ends_with('.')
}

fn style_object(text: &str) -> String {
    let entries: Vec<String> = text
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some(format!("{}:{}", quote(property), quote(value.trim())))
        })
        .collect();
    format!("{{{}}}", entries.join(","))
}

enum Segment {
    Static(String),
    Expr(String),
}

fn text_code(text: &str, trim_start: bool, trim_end: bool) -> String {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let Some(length) = rest[start + 2..].find("}}") else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Static(condense(&rest[..start])));
        }
        segments.push(Segment::Expr(
            rest[start + 2..start + 2 + length].trim().to_string(),
        ));
        rest = &rest[start + 2 + length + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Static(condense(rest)));
    }

    if trim_start {
        if let Some(Segment::Static(first)) = segments.first_mut() {
            *first = first.trim_start().to_string();
        }
    }
    if trim_end {
        if let Some(Segment::Static(last)) = segments.last_mut() {
            *last = last.trim_end().to_string();
        }
    }

    let parts: Vec<String> = segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Static(text) if text.is_empty() => None,
            Segment::Static(text) => Some(quote(&text)),
            Segment::Expr(expression) => Some(format!("_s({})", expression)),
        })
        .collect();

    if parts.is_empty() {
        return r#"_v("")"#.to_string();
    }
    format!("_v({})", parts.join("+"))
}

/// Collapses each whitespace run into one space.
fn condense(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Double-quoted script string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
