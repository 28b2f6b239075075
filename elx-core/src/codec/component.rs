//! Structured component description and its source form.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use super::error::ParseError;
use super::parser::{parse_object, Value};
use super::template::CompiledTemplate;

/// Wire name of the derived compiled-template field.
const COMPILED_KEY: &str = "compiledTemplate";

/// Indentation of section bodies in generated source.
const BODY_INDENT: &str = "    ";

/// Named sections of a component, in the order they are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Name,
    Props,
    Template,
    Data,
    Computed,
    Watch,
    Methods,
    BeforeCreate,
    Created,
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeDestroy,
    Destroyed,
}

/// How a section is written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Quoted,
    Markup,
    Bare,
    Code,
}

impl Section {
    pub const ALL: [Section; 15] = [
        Section::Name,
        Section::Props,
        Section::Template,
        Section::Data,
        Section::Computed,
        Section::Watch,
        Section::Methods,
        Section::BeforeCreate,
        Section::Created,
        Section::BeforeMount,
        Section::Mounted,
        Section::BeforeUpdate,
        Section::Updated,
        Section::BeforeDestroy,
        Section::Destroyed,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Name => "name",
            Section::Props => "props",
            Section::Template => "template",
            Section::Data => "data",
            Section::Computed => "computed",
            Section::Watch => "watch",
            Section::Methods => "methods",
            Section::BeforeCreate => "beforeCreate",
            Section::Created => "created",
            Section::BeforeMount => "beforeMount",
            Section::Mounted => "mounted",
            Section::BeforeUpdate => "beforeUpdate",
            Section::Updated => "updated",
            Section::BeforeDestroy => "beforeDestroy",
            Section::Destroyed => "destroyed",
        }
    }

    pub fn from_key(key: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn is_lifecycle_hook(&self) -> bool {
        *self >= Section::BeforeCreate
    }

    fn style(&self) -> Style {
        match self {
            Section::Name => Style::Quoted,
            Section::Template => Style::Markup,
            Section::Props => Style::Bare,
            _ => Style::Code,
        }
    }
}

/// A UI component: optional text sections plus the derived compiled template.
///
/// Section values are stored trimmed; empty sections are absent. The compiled
/// template never appears in source form and is dropped when parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    sections: BTreeMap<Section, String>,
    compiled: Option<CompiledTemplate>,
}

impl Component {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: Section) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    /// Sets a section; blank text removes it. Line endings are stored as `\n`.
    pub fn set(&mut self, section: Section, text: impl AsRef<str>) {
        let text = text.as_ref().replace("\r\n", "\n");
        let text = text.trim();
        if text.is_empty() {
            self.sections.remove(&section);
        } else {
            self.sections.insert(section, text.to_string());
        }
    }

    pub fn with(mut self, section: Section, text: impl AsRef<str>) -> Self {
        self.set(section, text);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.get(Section::Name)
    }

    pub fn template(&self) -> Option<&str> {
        self.get(Section::Template)
    }

    pub fn sections(&self) -> impl Iterator<Item = (Section, &str)> {
        self.sections.iter().map(|(s, t)| (*s, t.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn compiled(&self) -> Option<&CompiledTemplate> {
        self.compiled.as_ref()
    }

    pub fn with_compiled(mut self, compiled: CompiledTemplate) -> Self {
        self.compiled = Some(compiled);
        self
    }

    /// Parses component source text.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let source = source.replace("\r\n", "\n");
        let mut component = Component::new();

        for entry in parse_object(&source)? {
            let error = |message: String| ParseError {
                line: entry.line,
                column: entry.column,
                message,
            };
            let section = Section::from_key(&entry.key)
                .ok_or_else(|| error(format!("unknown section '{}'", entry.key)))?;
            if component.sections.contains_key(&section) {
                return Err(error(format!("duplicate section '{}'", entry.key)));
            }

            let text = match entry.value {
                Value::Quoted(text) | Value::Bare(text) => text,
                Value::Template { body, .. } => dedent(&body),
            };
            component.set(section, text);
        }

        Ok(component)
    }

    /// Writes the component as source text. Absent sections and the compiled
    /// template are left out.
    pub fn to_source(&self) -> String {
        if self.sections.is_empty() {
            return "module.exports = {}\n".to_string();
        }

        let mut source = String::from("module.exports = {\n");
        let mut entries = self.sections.iter().peekable();
        while let Some((section, text)) = entries.next() {
            source.push_str(&format!("  {}: {}", section.key(), render_section(*section, text)));
            if entries.peek().is_some() {
                // a trailing line comment would swallow the comma
                if section.style() == Style::Bare && ends_with_line_comment(text) {
                    source.push_str("\n  ");
                }
                source.push(',');
            }
            source.push('\n');
        }
        source.push_str("}\n");
        source
    }

    /// Builds a component from its JSON wire form.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Converts the component, including any compiled template, to JSON.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn render_section(section: Section, text: &str) -> String {
    match section.style() {
        Style::Quoted => quote(text),
        Style::Bare => text.to_string(),
        Style::Markup => format!("/* html */`\n{}\n  `", indent_body(text)),
        Style::Code => format!("/* js */`\n{}\n  `", indent_body(text)),
    }
}

fn ends_with_line_comment(text: &str) -> bool {
    text.lines().last().is_some_and(|line| line.contains("//"))
}

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
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escapes a template-string body and indents every non-empty line.
fn indent_body(text: &str) -> String {
    let escaped = text.replace('`', "\\`").replace("${", "\\${");
    escaped
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", BODY_INDENT, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes the indentation shared by the body's lines, then trims.
///
/// Text on the same line as the opening backtick has no meaningful
/// indentation and is left out of the calculation.
fn dedent(body: &str) -> String {
    let mut lines = body.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut out = String::from(first);
    for line in rest {
        out.push('\n');
        out.push_str(strip_indent(line, indent));
    }
    out.trim().to_string()
}

fn strip_indent(line: &str, width: usize) -> &str {
    let mut end = 0;
    for (i, c) in line.char_indices().take(width) {
        if !c.is_whitespace() {
            return &line[i..];
        }
        end = i + c.len_utf8();
    }
    &line[end..]
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.sections.len() + usize::from(self.compiled.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (section, text) in &self.sections {
            match section {
                // props travel as structured JSON when they are valid JSON
                Section::Props => match serde_json::from_str::<serde_json::Value>(text) {
                    Ok(value) => map.serialize_entry(section.key(), &value)?,
                    Err(_) => map.serialize_entry(section.key(), text)?,
                },
                _ => map.serialize_entry(section.key(), text)?,
            }
        }
        if let Some(compiled) = &self.compiled {
            map.serialize_entry(COMPILED_KEY, compiled)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut component = Component::new();

        for (key, value) in raw {
            let Some(section) = Section::from_key(&key) else {
                // compiledTemplate and unknown fields are not authoritative
                continue;
            };
            match value {
                serde_json::Value::Null | serde_json::Value::Bool(false) => {}
                serde_json::Value::String(text) => component.set(section, text),
                other => component.set(section, other.to_string()),
            }
        }

        Ok(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn card() -> Component {
        Component::new()
            .with(Section::Name, "CardComponent")
            .with(Section::Props, "[\"title\", \"description\"]")
            .with(
                Section::Template,
                "<div class=\"card\">\n  <h2>{{ title }}</h2>\n\n  <p>{{ description }}</p>\n</div>",
            )
            .with(
                Section::Data,
                "function() {\n  return {\n    counter: 0,\n    label: `n=${this.counter}`\n  };\n}",
            )
            .with(
                Section::Methods,
                "{\n  increment() {\n    this.counter++;\n  }\n}",
            )
            .with(
                Section::Mounted,
                "function() {\n  console.log(\"mounted\\n\");\n}",
            )
    }

    #[test]
    fn test_source_roundtrip() {
        let component = card();
        let source = component.to_source();
        let parsed = Component::parse(&source).unwrap();
        assert_eq!(parsed, component);
    }

    #[test]
    fn test_source_layout() {
        let component = Component::new()
            .with(Section::Name, "Hello")
            .with(Section::Template, "<p>hi</p>")
            .with(Section::Props, "['msg']");
        assert_eq!(
            component.to_source(),
            "module.exports = {\n  name: \"Hello\",\n  props: ['msg'],\n  template: /* html */`\n    <p>hi</p>\n  `\n}\n"
        );
    }

    #[test]
    fn test_source_excludes_compiled_template() {
        let component = card().with_compiled(CompiledTemplate {
            render: "with(this){return _e()}".to_string(),
            ..Default::default()
        });
        let source = component.to_source();
        assert!(!source.contains("compiledTemplate"));
        assert!(!source.contains("_e()"));
        assert!(Component::parse(&source).unwrap().compiled().is_none());
    }

    #[test]
    fn test_parse_trims_and_dedents() {
        let source = "module.exports = {\n  name: \"  Spaced  \",\n  template: /* html */`\n        <div>\n          <p>x</p>\n        </div>\n      `,\n  data: /* js */`function() {\n      return {};\n    }`\n}";
        let component = Component::parse(source).unwrap();
        assert_eq!(component.name(), Some("Spaced"));
        assert_eq!(component.template(), Some("<div>\n  <p>x</p>\n</div>"));
        assert_eq!(component.get(Section::Data), Some("function() {\n  return {};\n}"));
    }

    #[test]
    fn test_absent_sections_are_none() {
        let component = Component::parse("module.exports = { template: `<a></a>`, watch: `   ` }")
            .unwrap();
        assert_eq!(component.template(), Some("<a></a>"));
        assert_eq!(component.get(Section::Watch), None);
        assert_eq!(component.get(Section::Computed), None);
        assert_eq!(component.sections().count(), 1);
    }

    #[test]
    fn test_unknown_and_duplicate_sections() {
        let err = Component::parse("{ name: 'a',\n  style: `x` }").unwrap_err();
        assert_eq!(err.message, "unknown section 'style'");
        assert_eq!(err.line, 2);

        let err = Component::parse("{ name: 'a', name: 'b' }").unwrap_err();
        assert_eq!(err.message, "duplicate section 'name'");
    }

    #[test]
    fn test_bare_sections_accepted() {
        let component =
            Component::parse("{ data: function () { return { a: 1 } }, props: { a: Number } }")
                .unwrap();
        assert_eq!(
            component.get(Section::Data),
            Some("function () { return { a: 1 } }")
        );
        assert_eq!(component.get(Section::Props), Some("{ a: Number }"));
    }

    #[test]
    fn test_crlf_source() {
        let component =
            Component::parse("module.exports = {\r\n  template: `\r\n    <p>a</p>\r\n  `\r\n}\r\n")
                .unwrap();
        assert_eq!(component.template(), Some("<p>a</p>"));
    }

    #[test]
    fn test_empty_component_source() {
        assert_eq!(Component::new().to_source(), "module.exports = {}\n");
        assert!(Component::parse("module.exports = {}\n").unwrap().is_empty());
    }

    #[test]
    fn test_from_server_value() {
        let value = serde_json::json!({
            "name": "ListComponent",
            "template": "\n  <ul></ul>\n",
            "props": ["items"],
            "watch": null,
            "created": false,
            "compiledTemplate": {"render": "x", "staticRenderFns": [], "errors": [], "tips": []},
            "components": {}
        });
        let component = Component::from_value(value).unwrap();
        assert_eq!(component.name(), Some("ListComponent"));
        assert_eq!(component.template(), Some("<ul></ul>"));
        assert_eq!(component.get(Section::Props), Some("[\"items\"]"));
        assert_eq!(component.get(Section::Watch), None);
        assert_eq!(component.get(Section::Created), None);
        assert!(component.compiled().is_none());
    }

    #[test]
    fn test_to_value_with_compiled() {
        let component = Component::new()
            .with(Section::Template, "<p></p>")
            .with(Section::Props, "['not', json]")
            .with_compiled(CompiledTemplate {
                render: "r".to_string(),
                ..Default::default()
            });
        let value = component.to_value().unwrap();
        assert_eq!(value["template"], "<p></p>");
        assert_eq!(value["props"], "['not', json]");
        assert_eq!(value["compiledTemplate"]["render"], "r");
        assert_eq!(
            value["compiledTemplate"]["staticRenderFns"],
            serde_json::json!([])
        );

        let json_props = Component::new().with(Section::Props, "[\"a\"]");
        assert_eq!(
            json_props.to_value().unwrap()["props"],
            serde_json::json!(["a"])
        );
    }

    #[test]
    fn test_server_value_to_source_and_back() {
        let value = serde_json::json!({
            "name": "X",
            "template": "<div>`quoted`</div>",
            "methods": "{ go() { return `${1}`; } }"
        });
        let component = Component::from_value(value).unwrap();
        let reparsed = Component::parse(&component.to_source()).unwrap();
        assert_eq!(reparsed, component);
    }

    #[test]
    fn test_trailing_line_comment_keeps_separator() {
        let source = "module.exports = {\n  props: ['a'] // the props\n  ,\n  template: `<p></p>`\n}";
        let component = Component::parse(source).unwrap();
        assert_eq!(component.get(Section::Props), Some("['a'] // the props"));
        assert_eq!(component.template(), Some("<p></p>"));

        let written = component.to_source();
        assert!(written.contains("  props: ['a'] // the props\n  ,\n  template:"));
        assert_eq!(Component::parse(&written).unwrap(), component);
    }

    #[test]
    fn test_crlf_text_matches_parsed_form() {
        let component = Component::new().with(Section::Template, "<div>\r\n  <p>x</p>\r\n</div>");
        assert_eq!(component.template(), Some("<div>\n  <p>x</p>\n</div>"));
        assert_eq!(Component::parse(&component.to_source()).unwrap(), component);

        let from_server =
            Component::from_value(serde_json::json!({"methods": "{\r\n  go() {}\r\n}"})).unwrap();
        assert_eq!(from_server.get(Section::Methods), Some("{\n  go() {}\n}"));
    }

    const FRAGMENTS: &[&str] = &[
        "a", "Zé", " ", "\t", "\n", "\r\n", "`", "${x}", "$", "{", "}", "\\", "\\`", "\\${",
        "\"", "'", "// note", "/* c */", "*/", ",", "<p>", "</p>",
    ];

    fn section_text() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(FRAGMENTS), 0..24).prop_map(|parts| parts.concat())
    }

    fn props_text() -> impl Strategy<Value = String> {
        (
            prop::collection::vec("[a-z ]{0,6}", 0..4),
            prop::option::of("[a-z ,{}/*]{0,10}"),
        )
            .prop_map(|(names, comment)| {
                let items: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
                let mut text = format!("[{}]", items.join(", "));
                if let Some(comment) = comment {
                    text.push_str(" // ");
                    text.push_str(&comment);
                }
                text
            })
    }

    proptest! {
        #[test]
        fn test_source_roundtrip_keeps_section_text(
            name in section_text(),
            props in props_text(),
            template in section_text(),
            data in section_text(),
            mounted in section_text(),
        ) {
            let component = Component::new()
                .with(Section::Name, &name)
                .with(Section::Props, &props)
                .with(Section::Template, &template)
                .with(Section::Data, &data)
                .with(Section::Mounted, &mounted);
            let parsed = Component::parse(&component.to_source()).unwrap();
            prop_assert_eq!(parsed, component);
        }
    }

    #[test]
    fn test_section_keys() {
        for section in Section::ALL {
            assert_eq!(Section::from_key(section.key()), Some(section));
        }
        assert!(Section::Mounted.is_lifecycle_hook());
        assert!(!Section::Methods.is_lifecycle_hook());
    }
}
