//! # Pulsar Event Macros
//!
//! Procedural macros that make component types visible to the custom event
//! system.
//!
//! ## Macros
//!
//! - `#[event_methods]` - Record the methods of an inherent impl block so they can be
//!   bound and invoked by name
//! - `#[derive(EventEnum)]` - Let a unit-only enum be passed as an event argument
//! - `#[derive(OpaqueArgument)]` - Accept a type as a parameter the editor cannot edit
//! - `#[derive(ObjectHandle)]` - Turn a newtype over `ObjectRef` into a typed object parameter

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, FnArg, Ident, ImplItem, ImplItemFn,
    ItemImpl, Lit, Meta, Pat, ReturnType, Type,
};

/// Record the methods of an inherent impl block in the event method table.
///
/// Every `&self` / `&mut self` method becomes resolvable by name, whatever its
/// visibility. Methods are left out of the table when they:
///
/// - have no receiver, or take `self` by value
/// - are generic, `async` or `unsafe`
/// - take a reference-typed or `impl Trait` parameter
/// - carry `#[event(skip)]`
///
/// Parameter types must implement `pulsar_events::Argument`. The impl block
/// itself must not be generic, and each type may carry a single
/// `#[event_methods]` block.
///
/// # Example
///
/// ```ignore
/// #[event_methods]
/// impl Door {
///     pub fn open(&mut self, speed: f32, silent: bool) {
///         self.opening = true;
///     }
///
///     #[event(skip)]
///     pub fn debug_dump(&self) {}
/// }
/// ```
#[proc_macro_attribute]
pub fn event_methods(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(Span::call_site(), "#[event_methods] takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut item = parse_macro_input!(input as ItemImpl);
    match expand_event_methods(&mut item) {
        Ok(generated) => TokenStream::from(quote! {
            #item
            #generated
        }),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `pulsar_events::Argument` and `pulsar_events::EventEnum` for a
/// unit-only enum. Members are stored by variant name.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, EventEnum)]
/// enum FireMode {
///     Single,
///     Burst,
/// }
/// ```
#[proc_macro_derive(EventEnum)]
pub fn derive_event_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_event_enum(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Derive `pulsar_events::Argument` for a type the editor has no field for.
///
/// The parameter is reported as unsupported and always receives
/// `Default::default()`.
#[proc_macro_derive(OpaqueArgument)]
pub fn derive_opaque_argument(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_opaque_argument(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Derive `pulsar_events::ObjectHandle` for a single-field tuple struct over
/// `ObjectRef`, so `Option<Self>` becomes an object parameter declared with
/// the struct's name.
#[proc_macro_derive(ObjectHandle)]
pub fn derive_object_handle(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_object_handle(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand_event_methods(item: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[event_methods] must be placed on an inherent impl block",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[event_methods] does not support generic impl blocks",
        ));
    }

    let self_ty = item.self_ty.clone();
    let type_name = match self_ty.as_ref() {
        Type::Path(path) => match path.path.segments.last() {
            Some(segment) => segment.ident.to_string(),
            None => return Err(syn::Error::new_spanned(&self_ty, "expected a type name")),
        },
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "#[event_methods] expects a plain type path",
            ))
        }
    };

    let mut entries = Vec::new();
    let mut invokers = Vec::new();

    for impl_item in item.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        if take_event_attrs(&mut method.attrs)? {
            continue;
        }
        if let Some((entry, invoker)) = method_entry(&self_ty, &type_name, method) {
            entries.push(entry);
            invokers.push(invoker);
        }
    }

    let register = format_ident!("__PULSAR_EVENTS_REGISTER_{}", type_name.to_uppercase());

    Ok(quote! {
        impl ::pulsar_events::Introspect for #self_ty {
            fn type_info() -> &'static ::pulsar_events::TypeInfo {
                #(#invokers)*

                static TYPE_INFO: ::pulsar_events::TypeInfo = ::pulsar_events::TypeInfo {
                    name: #type_name,
                    methods: &[#(#entries),*],
                };
                &TYPE_INFO
            }
        }

        #[::pulsar_events::__private::linkme::distributed_slice(::pulsar_events::registry::EVENT_TYPES)]
        #[linkme(crate = ::pulsar_events::__private::linkme)]
        #[allow(non_upper_case_globals)]
        static #register: fn() -> &'static ::pulsar_events::TypeInfo =
            <#self_ty as ::pulsar_events::Introspect>::type_info;
    })
}

/// Strips `#[event(...)]` helper attributes, returning whether the method
/// asked to be skipped.
fn take_event_attrs(attrs: &mut Vec<Attribute>) -> syn::Result<bool> {
    let mut skip = false;
    let mut result = Ok(());

    attrs.retain(|attr| {
        if !attr.path().is_ident("event") {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported event attribute, expected `skip`"))
            }
        });
        if let Err(err) = parsed {
            result = Err(err);
        }
        false
    });

    result.map(|_| skip)
}

fn method_entry(
    self_ty: &Type,
    type_name: &str,
    method: &ImplItemFn,
) -> Option<(TokenStream2, TokenStream2)> {
    let sig = &method.sig;

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => {}
        _ => return None,
    }
    if !sig.generics.params.is_empty()
        || sig.asyncness.is_some()
        || sig.unsafety.is_some()
        || sig.variadic.is_some()
    {
        return None;
    }

    let mut param_names = Vec::new();
    let mut param_types = Vec::new();
    for (index, input) in sig.inputs.iter().skip(1).enumerate() {
        let FnArg::Typed(pat_type) = input else {
            return None;
        };
        if matches!(
            pat_type.ty.as_ref(),
            Type::Reference(_) | Type::ImplTrait(_)
        ) {
            return None;
        }
        let name = match pat_type.pat.as_ref() {
            Pat::Ident(ident) => ident.ident.to_string(),
            _ => format!("arg{index}"),
        };
        param_names.push(name);
        param_types.push(pat_type.ty.as_ref().clone());
    }

    let method_ident = &sig.ident;
    let method_name = method_ident.to_string();
    let invoker = format_ident!("__pulsar_events_invoke_{}", method_ident);
    let arg_idents: Vec<Ident> = (0..param_types.len())
        .map(|index| format_ident!("__arg{}", index))
        .collect();
    let type_labels: Vec<String> = param_types.iter().map(type_label).collect();

    let call = quote! { __target.#method_ident(#(#arg_idents),*) };
    let (finish, return_type) = match &sig.output {
        ReturnType::Default => (
            quote! {
                #call;
                ::core::result::Result::Ok(())
            },
            quote! { ::core::option::Option::None },
        ),
        ReturnType::Type(_, ty) => {
            let label = type_label(ty);
            let finish = if returns_result(ty) {
                quote! {
                    #call
                        .map(|_| ())
                        .map_err(|err| ::pulsar_events::InvocationError::method(#method_name, err))
                }
            } else {
                quote! {
                    let _ = #call;
                    ::core::result::Result::Ok(())
                }
            };
            (finish, quote! { ::core::option::Option::Some(#label) })
        }
    };

    let visibility = if matches!(method.vis, syn::Visibility::Public(_)) {
        quote! { ::pulsar_events::Visibility::Public }
    } else {
        quote! { ::pulsar_events::Visibility::Private }
    };
    let docs = doc_lines(&method.attrs);

    let invoker_fn = quote! {
        #[allow(unused_mut, unused_variables, non_snake_case)]
        fn #invoker(
            __target: &mut dyn ::core::any::Any,
            __args: ::std::vec::Vec<::pulsar_events::Value>,
        ) -> ::core::result::Result<(), ::pulsar_events::InvocationError> {
            let __target = match __target.downcast_mut::<#self_ty>() {
                ::core::option::Option::Some(target) => target,
                ::core::option::Option::None => {
                    return ::core::result::Result::Err(
                        ::pulsar_events::InvocationError::TargetMismatch {
                            expected: #type_name,
                            method: #method_name,
                        },
                    )
                }
            };
            let mut __args = __args.into_iter();
            #(
                let #arg_idents = <#param_types as ::pulsar_events::Argument>::from_value(
                    __args.next().unwrap_or(::pulsar_events::Value::Absent),
                )?;
            )*
            #finish
        }
    };

    let entry = quote! {
        ::pulsar_events::MethodInfo {
            name: #method_name,
            visibility: #visibility,
            params: &[#(
                ::pulsar_events::ParamInfo {
                    name: #param_names,
                    type_name: #type_labels,
                    ty: <#param_types as ::pulsar_events::Argument>::DECLARED,
                }
            ),*],
            return_type: #return_type,
            docs: &[#(#docs),*],
            invoke: #invoker,
        }
    };

    Some((entry, invoker_fn))
}

fn expand_event_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "EventEnum can only be derived for enums",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "EventEnum does not support generic enums",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "EventEnum needs at least one variant",
        ));
    }

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, syn::Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "EventEnum variants must be unit variants",
            ));
        }
        variants.push(&variant.ident);
    }

    let ident = &input.ident;
    let name = ident.to_string();
    let members: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
    let indices: Vec<usize> = (0..variants.len()).collect();

    Ok(quote! {
        impl ::pulsar_events::EventEnum for #ident {
            const INFO: &'static ::pulsar_events::EnumInfo = &::pulsar_events::EnumInfo {
                name: #name,
                members: &[#(#members),*],
            };

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn index(&self) -> usize {
                match self {
                    #(Self::#variants => #indices,)*
                }
            }
        }

        impl ::pulsar_events::Argument for #ident {
            const DECLARED: ::pulsar_events::DeclaredType = ::pulsar_events::DeclaredType::Enum(
                <Self as ::pulsar_events::EventEnum>::INFO,
            );

            fn from_value(
                value: ::pulsar_events::Value,
            ) -> ::core::result::Result<Self, ::pulsar_events::ArgumentMismatch> {
                ::pulsar_events::argument::enum_from_value::<Self>(value)
            }

            fn into_slot(self) -> ::pulsar_events::SlotValue {
                ::pulsar_events::argument::enum_into_slot(&self)
            }
        }
    })
}

fn expand_opaque_argument(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "OpaqueArgument does not support generic types",
        ));
    }

    let ident = &input.ident;
    let name = ident.to_string();

    Ok(quote! {
        impl ::pulsar_events::Argument for #ident {
            const DECLARED: ::pulsar_events::DeclaredType =
                ::pulsar_events::DeclaredType::Unsupported { type_name: #name };

            fn from_value(
                _value: ::pulsar_events::Value,
            ) -> ::core::result::Result<Self, ::pulsar_events::ArgumentMismatch> {
                ::core::result::Result::Ok(<Self as ::core::default::Default>::default())
            }

            fn into_slot(self) -> ::pulsar_events::SlotValue {
                ::pulsar_events::SlotValue::Empty
            }
        }
    })
}

fn expand_object_handle(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ObjectHandle does not support generic types",
        ));
    }
    let single_field = match &input.data {
        Data::Struct(data) => {
            matches!(&data.fields, syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1)
        }
        _ => false,
    };
    if !single_field {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ObjectHandle expects a tuple struct with a single ObjectRef field",
        ));
    }

    let ident = &input.ident;
    let name = ident.to_string();

    Ok(quote! {
        impl ::pulsar_events::ObjectHandle for #ident {
            const TYPE_NAME: &'static str = #name;

            fn from_ref(object: ::pulsar_events::ObjectRef) -> Self {
                Self(object)
            }

            fn object_ref(&self) -> ::pulsar_events::ObjectRef {
                self.0
            }
        }
    })
}

fn returns_result(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        _ => false,
    }
}

fn type_label(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect()
}
