//! # `valmsg` Macros
//!
//! Procedural macros for the `valmsg` crate.
//!
//! `#[derive(Record)]` declares a record's shape at compile time: its
//! fields in declaration order, each with an optional external alias.
//! The alias is taken from `#[record(alias = "...")]` when present,
//! otherwise from `#[serde(rename = "...")]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Token};

/// Derive `valmsg::Record` for a struct with named fields
///
/// # Usage
///
/// ```ignore
/// #[derive(Validate, Record)]
/// struct User {
///     #[record(alias = "user_name")]
///     #[validate(required, length(min = 6))]
///     username: Option<String>,
///     #[record(skip)]
///     internal: u32,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// One declared field as it ends up in the generated shape
struct FieldSpec {
    ident: String,
    alias: Option<String>,
}

/// Options gathered from a field's `record` and `serde` attributes
#[derive(Default)]
struct FieldOptions {
    alias: Option<String>,
    serde_rename: Option<String>,
    skip: bool,
}

impl FieldOptions {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in attrs {
            if attr.path().is_ident("record") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("alias") {
                        let alias: LitStr = meta.value()?.parse()?;
                        options.alias = Some(alias.value());
                        Ok(())
                    } else if meta.path.is_ident("skip") {
                        options.skip = true;
                        Ok(())
                    } else {
                        Err(meta.error("unsupported record attribute, expected `alias` or `skip`"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                if let Some(rename) = serde_rename(attr) {
                    options.serde_rename = Some(rename);
                }
            }
        }
        Ok(options)
    }

    fn into_alias(self) -> Option<String> {
        self.alias.or(self.serde_rename)
    }
}

/// Extract the serialized name from `#[serde(rename = "..")]` or
/// `#[serde(rename(serialize = ".."))]`
///
/// Everything else in the attribute belongs to serde and is skipped.
fn serde_rename(attr: &Attribute) -> Option<String> {
    let mut rename = None;
    attr.parse_nested_meta(|meta| {
        if !meta.path.is_ident("rename") {
            return skip_meta(&meta);
        }
        if meta.input.peek(Token![=]) {
            let name: LitStr = meta.value()?.parse()?;
            rename = Some(name.value());
            return Ok(());
        }
        meta.parse_nested_meta(|nested| {
            if nested.path.is_ident("serialize") {
                let name: LitStr = nested.value()?.parse()?;
                rename = Some(name.value());
                Ok(())
            } else {
                skip_meta(&nested)
            }
        })
    })
    .ok()?;
    rename
}

fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Record requires a struct with named fields",
        ));
    };

    let mut specs = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(ident) = &field.ident else { continue };
        let options = FieldOptions::from_attrs(&field.attrs)?;
        if options.skip {
            continue;
        }
        let ident = ident.to_string();
        let ident = ident.strip_prefix("r#").map_or_else(|| ident.clone(), str::to_owned);
        specs.push(FieldSpec {
            ident,
            alias: options.into_alias(),
        });
    }

    let name = &input.ident;
    let record_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = specs.iter().map(|spec| {
        let ident = &spec.ident;
        match &spec.alias {
            Some(alias) => quote! { ::valmsg::FieldShape::aliased(#ident, #alias) },
            None => quote! { ::valmsg::FieldShape::new(#ident) },
        }
    });

    Ok(quote! {
        impl #impl_generics ::valmsg::Record for #name #ty_generics #where_clause {
            fn shape() -> &'static ::valmsg::RecordShape {
                static SHAPE: ::valmsg::RecordShape =
                    ::valmsg::RecordShape::new(#record_name, &[#(#fields),*]);
                &SHAPE
            }
        }
    })
}
