//! Entity derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericArgument, PathArguments, Type};

use crate::parse::{parse_entity_class, AnnotationArg, EntityClassArgs, EntityFieldArgs};

/// Generate the EntityReflect implementation
pub fn derive_entity(input: DeriveInput) -> TokenStream {
    match parse_entity_class(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: EntityClassArgs) -> TokenStream {
    let struct_name = &args.ident;
    let class_name = args
        .class_name
        .clone()
        .unwrap_or_else(|| args.ident.to_string());

    let fields = match args.data {
        darling::ast::Data::Struct(fields) => fields.fields,
        _ => {
            return syn::Error::new_spanned(&args.ident, "Entity can only be derived for structs")
                .to_compile_error()
        }
    };

    let entity_flag = args.entity;

    let class_annotations: Vec<TokenStream> = args
        .annotations
        .iter()
        .map(|AnnotationArg { key, value }| quote! { .annotation(#key, #value) })
        .collect();

    let properties: Vec<TokenStream> = fields
        .iter()
        .filter(|field| !field.skip)
        .map(generate_property)
        .collect();

    quote! {
        impl ::hydrate_core::registry::EntityReflect for #struct_name {
            const CLASS_NAME: &'static str = #class_name;

            fn class_def() -> ::hydrate_core::registry::ClassDef {
                ::hydrate_core::registry::ClassDef::builder(#class_name)
                    .entity(#entity_flag)
                    #(#class_annotations)*
                    #(#properties)*
                    .build()
            }
        }
    }
}

fn generate_property(field: &EntityFieldArgs) -> TokenStream {
    let field_name = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string())
        .unwrap_or_default();

    // The `var` annotation carries "<type expression> $<field name>"
    let type_expr = match &field.var {
        Some(var) => var.clone(),
        None => type_token(&field.ty),
    };
    let declaration = format!("{type_expr} ${field_name}");

    let mut extra: Vec<TokenStream> = Vec::new();
    if let Some(format) = &field.format {
        extra.push(quote! { annotations.insert("format", #format); });
    }
    for AnnotationArg { key, value } in &field.annotations {
        extra.push(quote! { annotations.insert(#key, #value); });
    }

    quote! {
        .property(#field_name, {
            let mut annotations = ::hydrate_core::annotations::AnnotationMap::new();
            annotations.insert("var", #declaration);
            #(#extra)*
            annotations
        })
    }
}

/// Map a Rust field type to a declared type token
fn type_token(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return "mixed".to_string();
            };
            let ident = segment.ident.to_string();
            match ident.as_str() {
                "String" | "str" => "string".to_string(),
                "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
                    "int".to_string()
                }
                "f32" | "f64" => "float".to_string(),
                "bool" => "bool".to_string(),
                "Value" => "mixed".to_string(),
                "HashMap" | "BTreeMap" | "ValueMap" => "array".to_string(),
                "DateTime" | "NaiveDateTime" => "DateTime".to_string(),
                "Vec" => match inner_type(segment) {
                    Some(inner) => format!("{}[]", type_token(inner)),
                    None => "array".to_string(),
                },
                "Option" | "Box" | "Arc" => match inner_type(segment) {
                    Some(inner) => type_token(inner),
                    None => "mixed".to_string(),
                },
                _ => type_path
                    .path
                    .segments
                    .iter()
                    .map(|segment| segment.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::"),
            }
        }
        Type::Reference(reference) => type_token(&reference.elem),
        _ => "mixed".to_string(),
    }
}

/// First generic type argument of a path segment
fn inner_type(segment: &syn::PathSegment) -> Option<&Type> {
    if let PathArguments::AngleBracketed(args) = &segment.arguments {
        for argument in &args.args {
            if let GenericArgument::Type(inner) = argument {
                return Some(inner);
            }
        }
    }
    None
}
