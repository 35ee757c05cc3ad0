//! Procedural macros for agora

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Infer categories from variant name prefixes
    #[darling(default)]
    infer_categories: bool,

    /// Generate a `{Name}Dispatcher` trait routing by category
    #[darling(default)]
    generate_dispatcher: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Exclude from category inference
    #[darling(default)]
    skip_category: bool,
}

// Words that END the subject part of a variant name. "PostLike" -> subject
// "post", verb "Like". Nouns ("Group", "Event") must not appear here.
const ACTION_VERBS: &[&str] = &[
    // Membership and reactions
    "Like", "Unlike", "Join", "Leave", "Follow", "Unfollow", "Vote", "Rsvp", "Toggle",
    // CRUD
    "Add", "Remove", "Clear", "Update", "Set", "Load", "Save", "Delete", "Create", "Reset",
    // Navigation
    "Next", "Prev", "Open", "Close", "Select", "Cycle", "Submit", "Cancel", "Quit",
    // Visibility
    "Show", "Hide",
];

/// Split a PascalCase string into parts
fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    split_pascal_case(s)
        .iter()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert snake_case to PascalCase
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Infer a category from a variant name
///
/// - `Did*` variants are async results: `async_result`
/// - Otherwise the parts before the first verb form the category:
///   `FeedPostLike` -> `feed_post`, `ChapterNext` -> `chapter`
/// - Names that start with a verb or contain none stay uncategorized
fn infer_category(name: &str) -> Option<String> {
    let parts = split_pascal_case(name);
    let first = parts.first()?;

    if first == "Did" {
        return Some("async_result".to_string());
    }
    if parts.len() < 2 || ACTION_VERBS.contains(&first.as_str()) {
        return None;
    }

    let verb_at = parts
        .iter()
        .skip(1)
        .position(|p| ACTION_VERBS.contains(&p.as_str()))?
        + 1;

    Some(to_snake_case(&parts[..verb_at].concat()))
}

fn variant_pattern(enum_name: &Ident, variant: &ActionVariant) -> TokenStream2 {
    let ident = &variant.ident;
    // `{ .. }` matches unit, tuple and struct variants alike
    quote! { #enum_name::#ident { .. } }
}

fn name_impl(enum_name: &Ident, variants: &[&ActionVariant]) -> TokenStream2 {
    let arms = variants.iter().map(|v| {
        let pattern = variant_pattern(enum_name, v);
        let label = v.ident.to_string();
        quote! { #pattern => #label }
    });

    quote! {
        impl agora::Action for #enum_name {
            fn name(&self) -> &'static str {
                match self {
                    #(#arms,)*
                }
            }
        }
    }
}

fn category_impl(
    enum_name: &Ident,
    assigned: &[(&ActionVariant, Option<String>)],
    categories: &BTreeMap<String, Vec<&ActionVariant>>,
) -> TokenStream2 {
    let category_enum = format_ident!("{}Category", enum_name);
    let category_idents: Vec<_> = categories
        .keys()
        .map(|c| format_ident!("{}", to_pascal_case(c)))
        .collect();
    let category_names: Vec<_> = categories.keys().cloned().collect();

    let name_arms = assigned.iter().map(|(v, cat)| {
        let pattern = variant_pattern(enum_name, v);
        match cat {
            Some(c) => quote! { #pattern => ::core::option::Option::Some(#c) },
            None => quote! { #pattern => ::core::option::Option::None },
        }
    });

    let enum_arms = assigned.iter().map(|(v, cat)| {
        let pattern = variant_pattern(enum_name, v);
        let target = match cat {
            Some(c) => format_ident!("{}", to_pascal_case(c)),
            None => format_ident!("Uncategorized"),
        };
        quote! { #pattern => #category_enum::#target }
    });

    let predicates = categories.iter().map(|(cat, members)| {
        let predicate = format_ident!("is_{}", cat);
        let patterns = members.iter().map(|v| variant_pattern(enum_name, v));
        let doc = format!("Whether this action is in the `{}` category.", cat);
        quote! {
            #[doc = #doc]
            pub fn #predicate(&self) -> bool {
                matches!(self, #(#patterns)|*)
            }
        }
    });

    let enum_doc = format!("Categories of [`{}`] actions.", enum_name);

    quote! {
        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #category_enum {
            #(#category_idents,)*
            /// Actions without a category.
            Uncategorized,
        }

        impl #category_enum {
            /// Every category, `Uncategorized` last
            pub fn all() -> &'static [Self] {
                &[#(Self::#category_idents,)* Self::Uncategorized]
            }

            /// Category name in snake_case
            pub fn name(&self) -> &'static str {
                match self {
                    #(Self::#category_idents => #category_names,)*
                    Self::Uncategorized => "uncategorized",
                }
            }
        }

        impl #enum_name {
            /// The action's category, if it has one
            pub fn category(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#name_arms,)*
                }
            }

            /// The action's category as an enum value
            pub fn category_enum(&self) -> #category_enum {
                match self {
                    #(#enum_arms,)*
                }
            }

            #(#predicates)*
        }

        impl agora::ActionCategory for #enum_name {
            type Category = #category_enum;

            fn category(&self) -> ::core::option::Option<&'static str> {
                #enum_name::category(self)
            }

            fn category_enum(&self) -> Self::Category {
                #enum_name::category_enum(self)
            }
        }
    }
}

fn dispatcher_impl(
    enum_name: &Ident,
    categories: &BTreeMap<String, Vec<&ActionVariant>>,
) -> TokenStream2 {
    let trait_name = format_ident!("{}Dispatcher", enum_name);
    let category_enum = format_ident!("{}Category", enum_name);

    let methods = categories.keys().map(|cat| {
        let method = format_ident!("dispatch_{}", cat);
        let doc = format!("Handle `{}` actions. Returns whether state changed.", cat);
        quote! {
            #[doc = #doc]
            fn #method(&mut self, action: &#enum_name) -> bool {
                let _ = action;
                false
            }
        }
    });

    let routes = categories.keys().map(|cat| {
        let method = format_ident!("dispatch_{}", cat);
        let variant = format_ident!("{}", to_pascal_case(cat));
        quote! { #category_enum::#variant => self.#method(action) }
    });

    let doc = format!(
        "Routes [`{}`] actions to one handler per category.\n\n\
         Override the `dispatch_*` methods you need; the rest return `false`.",
        enum_name
    );

    quote! {
        #[doc = #doc]
        pub trait #trait_name {
            #(#methods)*

            /// Handle actions without a category.
            fn dispatch_uncategorized(&mut self, action: &#enum_name) -> bool {
                let _ = action;
                false
            }

            /// Route an action to its category handler.
            fn dispatch(&mut self, action: &#enum_name) -> bool {
                match action.category_enum() {
                    #(#routes,)*
                    #category_enum::Uncategorized => self.dispatch_uncategorized(action),
                }
            }
        }
    }
}

/// Derive macro for the `Action` trait
///
/// Generates `name()`, returning the variant name.
///
/// With `#[action(infer_categories)]`, also generates:
/// - `category() -> Option<&'static str>`
/// - `category_enum() -> {Name}Category`
/// - `is_{category}()` predicates
/// - a `{Name}Category` enum and an `ActionCategory` impl
///
/// With `#[action(generate_dispatcher)]` (requires `infer_categories`), also
/// generates a `{Name}Dispatcher` trait.
///
/// Variants can opt out with `#[action(skip_category)]` or pick a category
/// with `#[action(category = "...")]`.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(infer_categories, generate_dispatcher)]
/// enum FeedAction {
///     FeedPostLike(String),
///     FeedNext,
///     ChapterSelect(String),
///     DidLoadFeed,
///     Quit,
/// }
///
/// let action = FeedAction::FeedPostLike("p1".into());
/// assert_eq!(action.name(), "FeedPostLike");
/// assert_eq!(action.category(), Some("feed_post"));
/// assert!(action.is_feed_post());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let enum_name = &opts.ident;
    let variants: Vec<&ActionVariant> = match &opts.data {
        darling::ast::Data::Enum(variants) => variants.iter().collect(),
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if opts.generate_dispatcher && !opts.infer_categories {
        return syn::Error::new_spanned(&input, "generate_dispatcher requires infer_categories")
            .to_compile_error()
            .into();
    }

    let mut expanded = name_impl(enum_name, &variants);

    if opts.infer_categories {
        let assigned: Vec<(&ActionVariant, Option<String>)> = variants
            .iter()
            .map(|v| {
                let cat = if v.skip_category {
                    None
                } else {
                    v.category
                        .clone()
                        .or_else(|| infer_category(&v.ident.to_string()))
                };
                (*v, cat)
            })
            .collect();

        // BTreeMap keeps generated items in a stable order
        let mut categories: BTreeMap<String, Vec<&ActionVariant>> = BTreeMap::new();
        for (v, cat) in &assigned {
            if let Some(cat) = cat {
                categories.entry(cat.clone()).or_default().push(*v);
            }
        }

        expanded.extend(category_impl(enum_name, &assigned, &categories));

        if opts.generate_dispatcher {
            expanded.extend(dispatcher_impl(enum_name, &categories));
        }
    }

    TokenStream::from(expanded)
}
