//! `#[derive(WalkAst)]` for the goimpl-syntax AST.
//!
//! Generates `impl crate::walk::Walk` that walks every field in declaration
//! order. Fields marked `#[walk(skip)]` are left out of the traversal.

use proc_macro::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Field, Fields, Index};

#[proc_macro_derive(WalkAst, attributes(walk))]
pub fn derive_walk_ast(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let span = input.span();

    let walk_body = match walk_body(&input.data) {
        Ok(body) => body,
        Err(err) => return err.into_compile_error().into(),
    };

    let expanded = quote_spanned! {span =>
        impl<'ast> crate::walk::Walk<'ast> for #name {
            #[inline(always)]
            fn walk<V: crate::walk::Visitor<'ast> + ?Sized>(
                &self,
                a: &'ast crate::ast::AstArena,
                v: &mut V
            ) {
                #walk_body
            }
        }
    };

    expanded.into()
}

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("walk")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

fn walk_body(data: &Data) -> syn::Result<proc_macro2::TokenStream> {
    match data {
        Data::Struct(data_struct) => struct_body(&data_struct.fields),
        Data::Enum(data_enum) => {
            let arms = data_enum
                .variants
                .iter()
                .map(|variant| variant_arm(&variant.ident, &variant.fields))
                .collect::<syn::Result<Vec<_>>>()?;

            if arms.is_empty() {
                return Ok(quote! { let _ = (a, v); });
            }

            Ok(quote! {
                match self {
                    #(#arms)*
                }
            })
        }
        Data::Union(u) => Err(syn::Error::new_spanned(
            u.union_token,
            "WalkAst cannot be derived for unions",
        )),
    }
}

fn struct_body(fields: &Fields) -> syn::Result<proc_macro2::TokenStream> {
    let mut calls = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        if is_skipped(field)? {
            continue;
        }
        let access = match &field.ident {
            Some(ident) => quote! { &self.#ident },
            None => {
                let index = Index::from(i);
                quote! { &self.#index }
            }
        };
        calls.push(quote! { crate::walk::Walk::walk(#access, a, v); });
    }

    if calls.is_empty() {
        return Ok(quote! { let _ = (a, v); });
    }
    Ok(quote! { #(#calls)* })
}

fn variant_arm(
    variant_name: &syn::Ident,
    fields: &Fields,
) -> syn::Result<proc_macro2::TokenStream> {
    match fields {
        Fields::Unit => Ok(quote! { Self::#variant_name => { let _ = (a, v); } }),
        Fields::Named(named) => {
            let mut bindings = Vec::new();
            let mut calls = Vec::new();
            for field in &named.named {
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                // Bind under a prefixed name so a field called `a` or `v`
                // cannot shadow the walk parameters.
                let local = format_ident!("__{}", ident);
                if is_skipped(field)? {
                    bindings.push(quote! { #ident: _ });
                } else {
                    bindings.push(quote! { #ident: #local });
                    calls.push(quote! { crate::walk::Walk::walk(#local, a, v); });
                }
            }

            Ok(quote! {
                Self::#variant_name { #(#bindings),* } => {
                    let _ = (&a, &v);
                    #(#calls)*
                }
            })
        }
        Fields::Unnamed(unnamed) => {
            let mut bindings = Vec::new();
            let mut calls = Vec::new();
            for (i, field) in unnamed.unnamed.iter().enumerate() {
                if is_skipped(field)? {
                    bindings.push(quote! { _ });
                } else {
                    let var = format_ident!("__f{}", i);
                    calls.push(quote! { crate::walk::Walk::walk(#var, a, v); });
                    bindings.push(quote! { #var });
                }
            }

            Ok(quote! {
                Self::#variant_name(#(#bindings),*) => {
                    let _ = (&a, &v);
                    #(#calls)*
                }
            })
        }
    }
}
