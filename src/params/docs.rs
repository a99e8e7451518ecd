use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::params::schema::ParameterSchema;

/// Rendering context for the parameter reference
#[derive(Serialize)]
struct DocsContext {
    title: String,
    sections: Vec<SectionContext>,
}

/// One UI group: a titled section and the parameters declared under it
#[derive(Serialize)]
struct SectionContext {
    title: String,
    parameters: Vec<ParamContext>,
}

#[derive(Serialize)]
struct ParamContext {
    name: String,
    kind: String,
    default: String,
    description: String,
    required: bool,
}

/// Group parameters into sections, a section title on a descriptor starts a new group
fn sections(schema: &ParameterSchema) -> Vec<SectionContext> {
    let mut sections: Vec<SectionContext> = Vec::new();
    for param in schema.iter() {
        if param.section_title.is_some() || sections.is_empty() {
            let title = param.section_title.unwrap_or("Parameters").to_string();
            sections.push(SectionContext { title, parameters: Vec::new() });
        }

        let kind = match (param.optional, param.output) {
            (_, true) => format!("{} (output)", param.semantic_type),
            (true, false) => format!("optional {}", param.semantic_type),
            (false, false) => param.semantic_type.to_string(),
        };
        let default = param.default_value()
            .map(|value| format!("`{value}`"))
            .unwrap_or_default();

        if let Some(section) = sections.last_mut() {
            section.parameters.push(ParamContext {
                name: param.name.to_string(),
                kind,
                default,
                description: param.description.trim().to_string(),
                required: param.is_required(),
            });
        }
    }
    sections
}

/// Render a markdown reference of every parameter in declaration order
pub fn render_markdown(schema: &ParameterSchema) -> Result<String, tinytemplate::error::Error> {
    /// included parameter reference template
    static PARAMETERS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/parameters.md"));
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("parameters", PARAMETERS)?;

    let context = DocsContext {
        title: "nf-core/mhcquant".to_string(),
        sections: sections(schema),
    };
    tt.render("parameters", &context)
}
