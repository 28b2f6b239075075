//! Component codec.
//!
//! Converts UI components between the server's structured JSON form and
//! the human-editable source form kept on disk, and compiles templates
//! before upload.

mod component;
mod error;
mod parser;
mod template;

pub use component::{Component, Section};
pub use error::{CodecError, CompileError, ParseError};
pub use template::{CompiledTemplate, MarkupCompiler, TemplateCompiler};

/// Parses component source text.
pub fn parse(source: &str) -> Result<Component, ParseError> {
    Component::parse(source)
}

/// Writes a component as source text.
pub fn serialize(component: &Component) -> String {
    component.to_source()
}

/// Compiles the component's template and attaches the result.
///
/// Recoverable template problems are logged and kept in the compiled output.
pub fn compile(
    component: Component,
    compiler: &dyn TemplateCompiler,
) -> Result<Component, CompileError> {
    let template = component
        .template()
        .ok_or(CompileError::MissingTemplate)?;
    let compiled = compiler.compile(template)?;

    let name = component.name().unwrap_or("<anonymous>");
    for error in &compiled.errors {
        tracing::warn!("Template error in {}: {}", name, error);
    }
    for tip in &compiled.tips {
        tracing::info!("Template tip for {}: {}", name, tip);
    }

    Ok(component.with_compiled(compiled))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCompiler;

    impl TemplateCompiler for FixedCompiler {
        fn compile(&self, template: &str) -> Result<CompiledTemplate, CompileError> {
            Ok(CompiledTemplate {
                render: format!("render({})", template.len()),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_compile_attaches_output() {
        let component = Component::new().with(Section::Template, "<div></div>");
        let compiled = compile(component, &FixedCompiler).unwrap();
        assert_eq!(compiled.compiled().unwrap().render, "render(11)");
    }

    #[test]
    fn test_compile_requires_template() {
        let component = Component::new().with(Section::Name, "NoTemplate");
        assert_eq!(
            compile(component, &MarkupCompiler).unwrap_err(),
            CompileError::MissingTemplate
        );
    }

    #[test]
    fn test_compile_keeps_recoverable_errors() {
        let component = Component::new().with(Section::Template, "<div></div><p></p>");
        let compiled = compile(component, &MarkupCompiler).unwrap();
        assert!(compiled.compiled().unwrap().has_errors());
    }

    #[test]
    fn test_parse_serialize_roundtrip() {
        let source = serialize(
            &Component::new()
                .with(Section::Name, "Nav")
                .with(Section::Template, "<nav></nav>"),
        );
        assert_eq!(parse(&source).unwrap().name(), Some("Nav"));
    }
}
