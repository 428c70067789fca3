//! Field index derived from a validated schema.

use apollo_compiler::schema::{Component, ExtendedType, FieldDefinition, Type};
use apollo_compiler::{Node, Schema};
use gql_assist_types::Position;
use std::collections::HashMap;

/// What the generators need to know about one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Where the field is declared, if the schema came from source text.
    pub position: Option<Position>,
    /// The type as written, e.g. `[User!]!`.
    pub type_ref: String,
    /// The innermost named type, e.g. `User`.
    pub named_type: String,
    pub nullable: bool,
    pub is_list: bool,
    /// The named type is a scalar or an enum.
    pub is_leaf: bool,
    pub has_arguments: bool,
    pub description: Option<String>,
    pub deprecated: bool,
}

/// The fields of one named type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TypeFields {
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
}

impl TypeFields {
    fn new(fields: Vec<FieldDescriptor>) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        Self { fields, by_name }
    }
}

/// Type name to its fields, in declaration order.
///
/// Every named type the schema defines has an entry; scalars, enums and
/// unions have no fields. Built-in types are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIndex {
    types: HashMap<String, TypeFields>,
}

impl FieldIndex {
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        let mut types = HashMap::new();

        for (name, ty) in &schema.types {
            if ty.is_built_in() {
                continue;
            }
            let fields: Vec<FieldDescriptor> = match ty {
                ExtendedType::Object(object) => object
                    .fields
                    .values()
                    .map(|field| describe_field(schema, field))
                    .collect(),
                ExtendedType::Interface(interface) => interface
                    .fields
                    .values()
                    .map(|field| describe_field(schema, field))
                    .collect(),
                ExtendedType::InputObject(input) => input
                    .fields
                    .values()
                    .map(|field| {
                        let mut descriptor = describe(
                            schema,
                            &field.name,
                            &field.ty,
                            &field.node,
                            field.description.as_deref(),
                        );
                        descriptor.deprecated = field.directives.get("deprecated").is_some();
                        descriptor
                    })
                    .collect(),
                ExtendedType::Scalar(_) | ExtendedType::Enum(_) | ExtendedType::Union(_) => {
                    Vec::new()
                }
            };
            types.insert(name.to_string(), TypeFields::new(fields));
        }

        tracing::debug!(types = types.len(), "Built field index");
        Self { types }
    }

    /// Fields of `type_name` in declaration order. Empty for scalars, enums
    /// and unions; `None` for types the schema does not define.
    #[must_use]
    pub fn fields(&self, type_name: &str) -> Option<&[FieldDescriptor]> {
        self.types
            .get(type_name)
            .map(|entry| entry.fields.as_slice())
    }

    #[must_use]
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDescriptor> {
        let entry = self.types.get(type_name)?;
        entry
            .by_name
            .get(field_name)
            .and_then(|&i| entry.fields.get(i))
    }

    #[must_use]
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Indexed type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of indexed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn describe_field(schema: &Schema, field: &Component<FieldDefinition>) -> FieldDescriptor {
    let mut descriptor = describe(
        schema,
        &field.name,
        &field.ty,
        &field.node,
        field.description.as_deref(),
    );
    descriptor.has_arguments = !field.arguments.is_empty();
    descriptor.deprecated = field.directives.get("deprecated").is_some();
    descriptor
}

fn describe<T>(
    schema: &Schema,
    name: &str,
    ty: &Type,
    node: &Node<T>,
    description: Option<&str>,
) -> FieldDescriptor {
    let named_type = ty.inner_named_type();
    let is_leaf = matches!(
        schema.types.get(named_type),
        Some(ExtendedType::Scalar(_) | ExtendedType::Enum(_))
    );
    let position = node
        .location()
        .and_then(|span| span.line_column(&schema.sources))
        .map(|lc| {
            Position::new(
                lc.line.saturating_sub(1) as u32,
                lc.column.saturating_sub(1) as u32,
            )
        });

    FieldDescriptor {
        name: name.to_string(),
        position,
        type_ref: ty.to_string(),
        named_type: named_type.to_string(),
        nullable: !ty.is_non_null(),
        is_list: ty.is_list(),
        is_leaf,
        has_arguments: false,
        description: description.map(ToString::to_string),
        deprecated: false,
    }
}
