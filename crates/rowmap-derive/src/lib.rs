//! Derive macro for `rowmap_core::Entity`.
//!
//! Tagging a field with `#[column(...)]` is what makes it a persisted
//! column; untagged fields are ignored entirely.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit, LitStr, Meta,
    PathArguments, Type, parse_macro_input,
};

/// Derives `rowmap_core::Entity` for a struct with named fields.
///
/// # Attributes
///
/// - `#[entity(table = "table_name")]` - Default table name (optional,
///   defaults to snake_case of the struct name)
///
/// # Field Attributes
///
/// - `#[column("constraint text")]` - Persists the field; the text is
///   appended after the SQL kind in `CREATE TABLE`
/// - `#[column]` - Persists the field with no constraint
///
/// The SQL kind is inferred from the field's type name (`Option<T>` uses
/// `T`). The struct must implement `Default`, and every tagged field type
/// must implement `ToSqlValue`, `FromSqlValue` and `Clone`.
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(constraint) = parse_column_tag(&field.attrs)? else {
            continue;
        };
        let field_name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "tagged field has no name"))?;
        columns.push(ColumnInfo {
            type_name: scalar_type_name(&field.ty),
            field_name,
            constraint,
        });
    }

    let field_defs: Vec<TokenStream2> = columns
        .iter()
        .map(|info| {
            let name = info.field_name.to_string();
            let type_name = &info.type_name;
            let constraint = &info.constraint;
            quote! {
                ::rowmap_core::FieldDef {
                    name: #name,
                    type_name: #type_name,
                    constraint: #constraint,
                }
            }
        })
        .collect();

    let get_arms: Vec<TokenStream2> = columns
        .iter()
        .map(|info| {
            let ident = &info.field_name;
            let name = ident.to_string();
            quote! {
                #name => ::core::option::Option::Some(
                    ::rowmap_core::ToSqlValue::to_sql_value(
                        ::core::clone::Clone::clone(&self.#ident),
                    ),
                ),
            }
        })
        .collect();

    let set_arms: Vec<TokenStream2> = columns
        .iter()
        .map(|info| {
            let ident = &info.field_name;
            let name = ident.to_string();
            quote! {
                #name => {
                    self.#ident = ::rowmap_core::FromSqlValue::from_sql_value(value)?;
                    ::core::result::Result::Ok(true)
                }
            }
        })
        .collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::rowmap_core::Entity for #struct_name #ty_generics #where_clause {
            const TABLE: &'static str = #table_name;

            fn fields() -> &'static [::rowmap_core::FieldDef] {
                &[#(#field_defs),*]
            }

            #[allow(unused_variables)]
            fn get(&self, field: &str) -> ::core::option::Option<::rowmap_core::SqlValue> {
                match field {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                field: &str,
                value: ::rowmap_core::SqlValue,
            ) -> ::core::result::Result<bool, ::rowmap_core::ConversionError> {
                match field {
                    #(#set_arms)*
                    _ => ::core::result::Result::Ok(false),
                }
            }
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    type_name: String,
    constraint: String,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("entity") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let value: Expr = meta.value()?.parse()?;
                    if let Expr::Lit(lit) = value {
                        if let Lit::Str(s) = lit.lit {
                            table_name = Some(s.value());
                        }
                    }
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity attribute, expected `table`"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    Ok(to_snake_case(&struct_name.to_string()))
}

/// Returns the constraint text of a `#[column]` tag, `None` when untagged.
fn parse_column_tag(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        return match &attr.meta {
            Meta::Path(_) => Ok(Some(String::new())),
            Meta::List(list) => {
                let text: LitStr = list.parse_args()?;
                Ok(Some(text.value().trim().to_string()))
            }
            Meta::NameValue(nv) => Err(syn::Error::new_spanned(
                nv,
                "expected #[column] or #[column(\"constraint\")]",
            )),
        };
    }
    Ok(None)
}

/// Name of the last path segment, looking through `Option<T>`.
fn scalar_type_name(ty: &Type) -> String {
    match ty {
        Type::Path(path) => {
            let Some(last) = path.path.segments.last() else {
                return String::new();
            };
            if last.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &last.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return scalar_type_name(inner);
                    }
                }
            }
            last.ident.to_string()
        }
        Type::Reference(reference) => scalar_type_name(&reference.elem),
        Type::Group(group) => scalar_type_name(&group.elem),
        Type::Paren(paren) => scalar_type_name(&paren.elem),
        other => quote!(#other).to_string().replace(' ', ""),
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
