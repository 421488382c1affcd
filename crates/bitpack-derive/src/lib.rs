//! Derive macro for `bitpack::Packable`.
//!
//! Emits a static field table describing the struct: one `FieldDesc` per
//! non-skipped field, with byte offsets taken from `core::mem::offset_of!`.
//! All type checking that does not need runtime values happens here, at
//! compile time.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitInt, Type, TypePath};

#[proc_macro_derive(Packable, attributes(packed))]
pub fn derive_packable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Packable can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Packable requires named fields",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Packable cannot be derived for generic structs",
        ));
    }

    let name = &input.ident;
    let mut entries = Vec::new();

    for field in &fields.named {
        let ident = field.ident.as_ref().expect("named field");
        let mut skip = false;
        let mut bits: Option<LitInt> = None;

        for attr in &field.attrs {
            if !attr.path().is_ident("packed") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("bits") {
                    bits = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `bits = <integer>`"))
                }
            })?;
        }

        if skip {
            if let Some(lit) = bits {
                return Err(syn::Error::new_spanned(
                    lit,
                    "`bits` has no effect on a skipped field",
                ));
            }
            continue;
        }

        let kind = kind_for_type(&field.ty)?;
        let name_lit = ident.to_string();
        let width = match bits {
            Some(lit) => {
                let value: u8 = lit.base10_parse()?;
                quote!(::core::option::Option::Some(#value))
            }
            None => quote!(::core::option::Option::None),
        };

        entries.push(quote! {
            ::bitpack::FieldDesc {
                name: #name_lit,
                offset: ::core::mem::offset_of!(#name, #ident),
                kind: #kind,
                width: #width,
            }
        });
    }

    Ok(quote! {
        unsafe impl ::bitpack::Packable for #name {
            const FIELDS: &'static [::bitpack::FieldDesc] = &[#(#entries),*];
        }
    })
}

fn kind_for_type(ty: &Type) -> syn::Result<proc_macro2::TokenStream> {
    match ty {
        Type::Path(TypePath { qself: None, path }) => {
            let last = path
                .segments
                .last()
                .ok_or_else(|| syn::Error::new_spanned(ty, "unsupported field type"))?;
            let ident = last.ident.to_string();
            let kind = match ident.as_str() {
                "bool" => quote!(::bitpack::FieldKind::Bool),
                "u8" => quote!(::bitpack::FieldKind::U8),
                "u16" => quote!(::bitpack::FieldKind::U16),
                "u32" => quote!(::bitpack::FieldKind::U32),
                "u64" => quote!(::bitpack::FieldKind::U64),
                "i8" => quote!(::bitpack::FieldKind::I8),
                "i16" => quote!(::bitpack::FieldKind::I16),
                "i32" => quote!(::bitpack::FieldKind::I32),
                "i64" => quote!(::bitpack::FieldKind::I64),
                "f32" | "f64" | "u128" | "i128" | "usize" | "isize" | "char" | "str"
                | "String" | "Vec" | "Box" | "Option" => {
                    return Err(syn::Error::new_spanned(
                        ty,
                        format!("cannot pack type `{}`", ident),
                    ));
                }
                // Anything else is taken to be a nested packable struct; a
                // missing Packable impl surfaces as a compile error at the
                // use site.
                _ => quote!(::bitpack::FieldKind::Struct(
                    <#ty as ::bitpack::Packable>::FIELDS
                )),
            };
            Ok(kind)
        }
        Type::Array(arr) => {
            let elem = kind_for_type(&arr.elem)?;
            let elem_ty = &arr.elem;
            let len = &arr.len;
            Ok(quote! {
                ::bitpack::FieldKind::Array {
                    elem: &#elem,
                    len: #len,
                    stride: ::core::mem::size_of::<#elem_ty>(),
                }
            })
        }
        _ => Err(syn::Error::new_spanned(
            ty,
            "cannot pack this field type; use integers, bool, nested packable structs, or fixed arrays of them",
        )),
    }
}
