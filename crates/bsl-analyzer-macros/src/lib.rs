//! # bsl-analyzer-macros
//!
//! `#[derive(DiagnosticMetadata)]` declares the static metadata of a
//! diagnostic rule next to its type:
//!
//! ```ignore
//! use bsl_analyzer_macros::DiagnosticMetadata;
//!
//! #[derive(Debug, Default, DiagnosticMetadata)]
//! #[diagnostic(
//!     code = "UsingModalWindows",
//!     scope = "bsl",
//!     compatibility_mode = "8.3.3",
//!     tags = ["standard"],
//!     severity = "major",
//!     kind = "code_smell",
//!     minutes_to_fix = 15
//! )]
//! pub struct UsingModalWindows;
//! ```
//!
//! Invalid metadata is a compile error: unknown keys or values, an empty
//! code, or a tag list outside one to three distinct tags.

#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Expr, ExprArray, ExprLit, Lit, LitBool, LitInt, LitStr};

const MAX_TAGS: usize = 3;

/// Implements `bsl_analyzer_core::DiagnosticMetadata`.
///
/// Keys of the `#[diagnostic(...)]` attribute, all optional:
///
/// | key | default |
/// |-----|---------|
/// | `code` | type name without a trailing `Diagnostic` |
/// | `activated_by_default` | `true` |
/// | `scope` | `"all"` (`"bsl"`, `"os"`) |
/// | `compatibility_mode` | none (`"8.3.3"`, `"DontUse"`) |
/// | `tags` | `["standard"]` |
/// | `severity` | `"minor"` (`"info"`, `"major"`, `"critical"`, `"blocker"`) |
/// | `kind` | `"code_smell"` (`"error"`, `"vulnerability"`, `"security_hotspot"`) |
/// | `minutes_to_fix` | `1` |
#[proc_macro_derive(DiagnosticMetadata, attributes(diagnostic))]
pub fn derive_diagnostic_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct Attributes {
    code: String,
    activated_by_default: bool,
    scope: Ident,
    compatibility_mode: Option<Version>,
    tags: Vec<Ident>,
    severity: Ident,
    kind: Ident,
    minutes_to_fix: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Version {
    Latest,
    Exact(u32, u32, u32),
}

impl Attributes {
    fn defaults(name: &Ident) -> Self {
        let type_name = name.to_string();
        let code = type_name
            .strip_suffix("Diagnostic")
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&type_name)
            .to_string();

        Self {
            code,
            activated_by_default: true,
            scope: ident("All"),
            compatibility_mode: None,
            tags: vec![ident("Standard")],
            severity: ident("Minor"),
            kind: ident("CodeSmell"),
            minutes_to_fix: 1,
        }
    }

    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = Self::defaults(&input.ident);

        for attr in input.attrs.iter().filter(|a| a.path().is_ident("diagnostic")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("code") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "rule code must not be empty"));
                    }
                    attrs.code = lit.value();
                } else if meta.path.is_ident("activated_by_default") {
                    let lit: LitBool = meta.value()?.parse()?;
                    attrs.activated_by_default = lit.value;
                } else if meta.path.is_ident("scope") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.scope = variant(&lit, scope_variant(&lit.value()), "all, bsl, os")?;
                } else if meta.path.is_ident("compatibility_mode") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let version = parse_version(&lit.value()).ok_or_else(|| {
                        syn::Error::new(
                            lit.span(),
                            "expected a version like \"8.3.10\" or \"DontUse\"",
                        )
                    })?;
                    attrs.compatibility_mode = Some(version);
                } else if meta.path.is_ident("tags") {
                    let array: ExprArray = meta.value()?.parse()?;
                    attrs.tags = parse_tags(&array)?;
                } else if meta.path.is_ident("severity") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.severity = variant(
                        &lit,
                        severity_variant(&lit.value()),
                        "info, minor, major, critical, blocker",
                    )?;
                } else if meta.path.is_ident("kind") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.kind = variant(
                        &lit,
                        kind_variant(&lit.value()),
                        "error, code_smell, vulnerability, security_hotspot",
                    )?;
                } else if meta.path.is_ident("minutes_to_fix") {
                    let lit: LitInt = meta.value()?.parse()?;
                    attrs.minutes_to_fix = lit.base10_parse()?;
                } else {
                    return Err(meta.error("unknown diagnostic attribute"));
                }
                Ok(())
            })?;
        }

        Ok(attrs)
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let attrs = Attributes::parse(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Attributes {
        code,
        activated_by_default,
        scope,
        compatibility_mode,
        tags,
        severity,
        kind,
        minutes_to_fix,
    } = attrs;

    let compatibility_mode = match compatibility_mode {
        None => quote!(::core::option::Option::None),
        Some(Version::Latest) => {
            quote!(::core::option::Option::Some(::bsl_analyzer_core::CompatibilityMode::LATEST))
        }
        Some(Version::Exact(major, minor, version)) => quote! {
            ::core::option::Option::Some(
                ::bsl_analyzer_core::CompatibilityMode::new(#major, #minor, #version)
            )
        },
    };

    Ok(quote! {
        impl #impl_generics ::bsl_analyzer_core::DiagnosticMetadata for #name #ty_generics #where_clause {
            const METADATA: ::bsl_analyzer_core::RuleMetadata = ::bsl_analyzer_core::RuleMetadata {
                code: #code,
                activated_by_default: #activated_by_default,
                scope: ::bsl_analyzer_core::DiagnosticScope::#scope,
                compatibility_mode: #compatibility_mode,
                tags: &[#(::bsl_analyzer_core::DiagnosticTag::#tags),*],
                severity: ::bsl_analyzer_core::Severity::#severity,
                kind: ::bsl_analyzer_core::DiagnosticType::#kind,
                minutes_to_fix: #minutes_to_fix,
            };
        }
    })
}

fn parse_tags(array: &ExprArray) -> syn::Result<Vec<Ident>> {
    let mut tags: Vec<Ident> = Vec::with_capacity(array.elems.len());

    for elem in &array.elems {
        let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = elem
        else {
            return Err(syn::Error::new_spanned(elem, "tags must be string literals"));
        };
        let tag = variant(
            lit,
            tag_variant(&lit.value()),
            "standard, lockinos, design, unpredictable, performance, brainoverload, \
             suspicious, badpractice, deprecated, clumsy, localize, sql, error",
        )?;
        if tags.contains(&tag) {
            return Err(syn::Error::new(lit.span(), "duplicate tag"));
        }
        tags.push(tag);
    }

    if tags.is_empty() || tags.len() > MAX_TAGS {
        return Err(syn::Error::new_spanned(
            array,
            format!("a rule needs 1 to {MAX_TAGS} tags, found {}", tags.len()),
        ));
    }
    Ok(tags)
}

fn variant(lit: &LitStr, name: Option<&str>, expected: &str) -> syn::Result<Ident> {
    name.map(ident).ok_or_else(|| {
        syn::Error::new(
            lit.span(),
            format!("unknown value `{}`, expected one of: {expected}", lit.value()),
        )
    })
}

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

/// Lowercases and drops `_` so `code_smell`, `CodeSmell` and `codesmell` agree.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn scope_variant(value: &str) -> Option<&'static str> {
    match normalize(value).as_str() {
        "all" => Some("All"),
        "bsl" => Some("Bsl"),
        "os" => Some("Os"),
        _ => None,
    }
}

fn severity_variant(value: &str) -> Option<&'static str> {
    match normalize(value).as_str() {
        "info" => Some("Info"),
        "minor" => Some("Minor"),
        "major" => Some("Major"),
        "critical" => Some("Critical"),
        "blocker" => Some("Blocker"),
        _ => None,
    }
}

fn kind_variant(value: &str) -> Option<&'static str> {
    match normalize(value).as_str() {
        "error" => Some("Error"),
        "codesmell" => Some("CodeSmell"),
        "vulnerability" => Some("Vulnerability"),
        "securityhotspot" => Some("SecurityHotspot"),
        _ => None,
    }
}

fn tag_variant(value: &str) -> Option<&'static str> {
    let variant = match normalize(value).as_str() {
        "standard" => "Standard",
        "lockinos" => "LockInOs",
        "design" => "Design",
        "unpredictable" => "Unpredictable",
        "performance" => "Performance",
        "brainoverload" => "BrainOverload",
        "suspicious" => "Suspicious",
        "badpractice" => "BadPractice",
        "deprecated" => "Deprecated",
        "clumsy" => "Clumsy",
        "localize" => "Localize",
        "sql" => "Sql",
        "error" => "Error",
        _ => return None,
    };
    Some(variant)
}

/// Accepts `8.3.10`, `8.3`, `Version8_3_10` and `DontUse`.
fn parse_version(value: &str) -> Option<Version> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("dontuse") {
        return Some(Version::Latest);
    }
    let (body, separator) = match value.strip_prefix("Version") {
        Some(rest) => (rest, '_'),
        None => (value, '.'),
    };
    let parts = body
        .split(separator)
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [major, minor] => Some(Version::Exact(*major, *minor, 0)),
        [major, minor, version] => Some(Version::Exact(*major, *minor, *version)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(source: &str) -> syn::Result<String> {
        let input: DeriveInput = syn::parse_str(source)?;
        expand(&input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn code_defaults_to_type_name() {
        let out = derive("struct LineLengthDiagnostic;").unwrap();
        assert!(out.contains("code : \"LineLength\""), "{out}");

        let out = derive("struct Diagnostic;").unwrap();
        assert!(out.contains("code : \"Diagnostic\""), "{out}");
    }

    #[test]
    fn expands_all_keys() {
        let out = derive(
            r#"
            #[diagnostic(
                code = "UsingModalWindows",
                activated_by_default = false,
                scope = "bsl",
                compatibility_mode = "8.3.3",
                tags = ["standard", "lockinos"],
                severity = "major",
                kind = "code_smell",
                minutes_to_fix = 15
            )]
            struct Modal;
            "#,
        )
        .unwrap();

        assert!(out.contains("activated_by_default : false"), "{out}");
        assert!(out.contains("DiagnosticScope :: Bsl"), "{out}");
        assert!(out.contains("CompatibilityMode :: new (8u32 , 3u32 , 3u32)"), "{out}");
        assert!(out.contains("DiagnosticTag :: LockInOs"), "{out}");
        assert!(out.contains("Severity :: Major"), "{out}");
        assert!(out.contains("DiagnosticType :: CodeSmell"), "{out}");
        assert!(out.contains("minutes_to_fix : 15u32"), "{out}");
    }

    #[test]
    fn rejects_bad_tag_lists() {
        assert!(derive(r#"#[diagnostic(tags = [])] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(tags = ["sql", "sql"])] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(tags = ["sql", "design", "clumsy", "error"])] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(tags = ["nonsense"])] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(tags = [standard])] struct A;"#).is_err());
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        assert!(derive(r#"#[diagnostic(colour = "red")] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(scope = "everywhere")] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(code = "")] struct A;"#).is_err());
        assert!(derive(r#"#[diagnostic(compatibility_mode = "8")] struct A;"#).is_err());
    }

    #[test]
    fn version_forms() {
        assert_eq!(parse_version("8.3.10"), Some(Version::Exact(8, 3, 10)));
        assert_eq!(parse_version("Version8_3_10"), Some(Version::Exact(8, 3, 10)));
        assert_eq!(parse_version("8.2"), Some(Version::Exact(8, 2, 0)));
        assert_eq!(parse_version("DontUse"), Some(Version::Latest));
        assert_eq!(parse_version("8.x"), None);
    }

    #[test]
    fn normalization_accepts_variants() {
        assert_eq!(kind_variant("code_smell"), Some("CodeSmell"));
        assert_eq!(kind_variant("CodeSmell"), Some("CodeSmell"));
        assert_eq!(tag_variant("BadPractice"), Some("BadPractice"));
        assert_eq!(tag_variant("bad_practice"), Some("BadPractice"));
    }
}
