#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Visibility, parse_macro_input};

#[derive(Default)]
struct RecordOptions {
    constructor: bool,
    no_default: bool,
}

struct FieldOptions {
    column: String,
    readonly: bool,
}

/// Derives `switchy_materialize::Record` and `switchy_materialize::Materialize`.
///
/// Every named field becomes a member keyed by its name. `pub` fields are
/// assigned from same-named columns; fields with any narrower visibility are
/// recorded but never assigned.
///
/// Struct attributes:
///
/// * `#[record(constructor)]` registers a constructor taking every field
/// * `#[record(no_default)]` drops the parameterless constructor, so the type
///   need not implement `Default`
///
/// Field attributes:
///
/// * `#[record(rename = "Column")]` reads from a differently named column
/// * `#[record(readonly)]` keeps a `pub` field from being assigned
///
/// ```ignore
/// #[derive(Debug, Default, Record)]
/// pub struct Album {
///     pub id: i64,
///     #[record(rename = "AlbumTitle")]
///     pub title: String,
///     #[record(readonly)]
///     pub version: i32,
///     cached: Option<String>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record only supports structs",
            ));
        }
    };

    let options = record_options(input)?;

    if options.no_default && !options.constructor {
        return Err(syn::Error::new_spanned(
            name,
            "#[record(no_default)] requires #[record(constructor)]",
        ));
    }

    let mut members = Vec::new();
    let mut params = Vec::new();
    let mut arguments = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_ty = &field.ty;
        let field_options = field_options(field)?;
        let column = &field_options.column;

        let public = matches!(field.vis, Visibility::Public(_));

        members.push(if public && !field_options.readonly {
            quote! {
                .member::<#field_ty>(#column, |record, value| record.#field_name = value)
            }
        } else {
            let access = if public {
                quote! { ::switchy_materialize::Access::ReadOnly }
            } else {
                quote! { ::switchy_materialize::Access::Restricted }
            };
            quote! {
                .skipped_member::<#field_ty>(#column, #access)
            }
        });

        params.push(quote! { ::switchy_materialize::param::<#field_ty>(#column) });
        arguments.push(quote! { #field_name: args.get(#column)? });
    }

    let default = if options.no_default {
        quote! {}
    } else {
        quote! { .default_constructor(<Self as ::core::default::Default>::default) }
    };

    let constructor = if options.constructor {
        quote! {
            .constructor(
                ::std::vec![#(#params),*],
                |args| ::core::result::Result::Ok(Self { #(#arguments),* }),
            )
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl ::switchy_materialize::Record for #name {
            fn shape() -> ::switchy_materialize::RecordShape<Self> {
                ::switchy_materialize::RecordShape::new(#name_str)
                    #constructor
                    #default
                    #(#members)*
            }
        }

        impl ::switchy_materialize::Materialize for #name {
            fn target() -> ::switchy_materialize::Target<Self> {
                ::switchy_materialize::Target::record()
            }
        }
    })
}

fn record_options(input: &DeriveInput) -> Result<RecordOptions, syn::Error> {
    let mut options = RecordOptions::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                options.constructor = true;
                Ok(())
            } else if meta.path.is_ident("no_default") {
                options.no_default = true;
                Ok(())
            } else {
                Err(meta.error("unknown record attribute (expected `constructor` or `no_default`)"))
            }
        })?;
    }

    Ok(options)
}

fn field_options(field: &syn::Field) -> Result<FieldOptions, syn::Error> {
    let mut column = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default();
    let mut readonly = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                column = value.value();
                Ok(())
            } else if meta.path.is_ident("readonly") {
                readonly = true;
                Ok(())
            } else {
                Err(meta.error("unknown record field attribute (expected `rename` or `readonly`)"))
            }
        })?;
    }

    Ok(FieldOptions { column, readonly })
}
