//! Printing an introspection result as SDL.

use crate::introspection::{
    DirectiveDef, EnumValue, Field, FullType, InputValue, IntrospectionSchema, TypeKind, TypeRef,
};
use std::fmt::{self, Write};

const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];
const BUILT_IN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// Render `schema` as SDL, leaving out introspection types and the built-in
/// scalars and directives.
#[must_use]
#[tracing::instrument(skip(schema), fields(types = schema.types.len()))]
pub fn introspection_to_sdl(schema: &IntrospectionSchema) -> String {
    let sdl = Sdl(schema).to_string();
    tracing::debug!(length = sdl.len(), "Printed introspection result as SDL");
    sdl
}

struct Sdl<'a>(&'a IntrospectionSchema);

impl fmt::Display for Sdl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = self.0;
        let mut blocks: Vec<String> = Vec::new();

        if let Some(block) = schema_block(schema) {
            blocks.push(block);
        }

        for directive in &schema.directives {
            if BUILT_IN_DIRECTIVES.contains(&directive.name.as_str()) {
                continue;
            }
            let mut out = String::new();
            write_directive(&mut out, directive)?;
            blocks.push(out);
        }

        for ty in &schema.types {
            if ty.name.starts_with("__") || BUILT_IN_SCALARS.contains(&ty.name.as_str()) {
                continue;
            }
            let mut out = String::new();
            write_type(&mut out, ty)?;
            blocks.push(out);
        }

        f.write_str(&blocks.join("\n"))
    }
}

/// An explicit `schema { ... }` block, needed only when a root type does not
/// use its conventional name.
fn schema_block(schema: &IntrospectionSchema) -> Option<String> {
    let roots = [
        ("query", &schema.query_type, "Query"),
        ("mutation", &schema.mutation_type, "Mutation"),
        ("subscription", &schema.subscription_type, "Subscription"),
    ];
    let conventional = roots
        .iter()
        .all(|(_, root, name)| root.as_ref().is_none_or(|r| r.name == *name));
    if conventional {
        return None;
    }

    let mut block = String::from("schema {\n");
    for (operation, root, _) in roots {
        if let Some(root) = root {
            block.push_str(&format!("  {operation}: {}\n", root.name));
        }
    }
    block.push_str("}\n");
    Some(block)
}

fn write_directive(out: &mut String, directive: &DirectiveDef) -> fmt::Result {
    write_description(out, directive.description.as_deref(), "")?;
    write!(out, "directive @{}", directive.name)?;
    write_arguments(out, &directive.args)?;
    writeln!(out, " on {}", directive.locations.join(" | "))
}

fn write_type(out: &mut String, ty: &FullType) -> fmt::Result {
    write_description(out, ty.description.as_deref(), "")?;
    match ty.kind {
        TypeKind::Scalar => writeln!(out, "scalar {}", ty.name),
        TypeKind::Object | TypeKind::Interface => {
            let keyword = if ty.kind == TypeKind::Object {
                "type"
            } else {
                "interface"
            };
            write!(out, "{keyword} {}", ty.name)?;
            write_implements(out, &ty.interfaces)?;
            writeln!(out, " {{")?;
            for field in &ty.fields {
                write_field(out, field)?;
            }
            writeln!(out, "}}")
        }
        TypeKind::Union => {
            let members: Vec<String> = ty.possible_types.iter().map(ToString::to_string).collect();
            writeln!(out, "union {} = {}", ty.name, members.join(" | "))
        }
        TypeKind::Enum => {
            writeln!(out, "enum {} {{", ty.name)?;
            for value in &ty.enum_values {
                write_enum_value(out, value)?;
            }
            writeln!(out, "}}")
        }
        TypeKind::InputObject => {
            writeln!(out, "input {} {{", ty.name)?;
            for input in &ty.input_fields {
                write_description(out, input.description.as_deref(), "  ")?;
                write!(out, "  ")?;
                write_input_value(out, input)?;
                writeln!(out)?;
            }
            writeln!(out, "}}")
        }
        // wrappers never appear as top-level types
        TypeKind::List | TypeKind::NonNull => Ok(()),
    }
}

fn write_implements(out: &mut String, interfaces: &[TypeRef]) -> fmt::Result {
    if interfaces.is_empty() {
        return Ok(());
    }
    let names: Vec<String> = interfaces.iter().map(ToString::to_string).collect();
    write!(out, " implements {}", names.join(" & "))
}

fn write_field(out: &mut String, field: &Field) -> fmt::Result {
    write_description(out, field.description.as_deref(), "  ")?;
    write!(out, "  {}", field.name)?;
    write_arguments(out, &field.args)?;
    write!(out, ": {}", field.ty)?;
    write_deprecation(out, field.is_deprecated, field.deprecation_reason.as_deref())?;
    writeln!(out)
}

fn write_enum_value(out: &mut String, value: &EnumValue) -> fmt::Result {
    write_description(out, value.description.as_deref(), "  ")?;
    write!(out, "  {}", value.name)?;
    write_deprecation(out, value.is_deprecated, value.deprecation_reason.as_deref())?;
    writeln!(out)
}

fn write_arguments(out: &mut String, args: &[InputValue]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_input_value(out, arg)?;
    }
    out.push(')');
    Ok(())
}

fn write_input_value(out: &mut String, value: &InputValue) -> fmt::Result {
    write!(out, "{}: {}", value.name, value.ty)?;
    if let Some(default) = &value.default_value {
        write!(out, " = {default}")?;
    }
    Ok(())
}

fn write_deprecation(out: &mut String, deprecated: bool, reason: Option<&str>) -> fmt::Result {
    match (deprecated, reason) {
        (false, _) => Ok(()),
        (true, Some(reason)) if reason != "No longer supported" => {
            write!(out, " @deprecated(reason: {})", quote(reason))
        }
        (true, _) => write!(out, " @deprecated"),
    }
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) -> fmt::Result {
    let Some(description) = description.filter(|d| !d.is_empty()) else {
        return Ok(());
    };
    if description.contains('\n') {
        writeln!(out, "{indent}\"\"\"")?;
        for line in description.replace("\"\"\"", "\\\"\"\"").lines() {
            if line.is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, "{indent}{line}")?;
            }
        }
        writeln!(out, "{indent}\"\"\"")
    } else {
        writeln!(out, "{indent}{}", quote(description))
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}
