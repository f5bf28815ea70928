//! cmdmock Derive Macros: Client and Command Markers
//!
//! Implementing `cmdmock::Client` and `cmdmock::Command` by hand is mostly
//! naming boilerplate. These derives generate it, and bind every command to
//! exactly one client type so that sending it through another client fails
//! to compile.
//!
//! # Available Macros
//!
//! - [`Client`] - Derive for client type markers
//! - [`Command`] - Derive for typed commands
//!
//! # Example
//!
//! ```ignore
//! use cmdmock::{Client, Command};
//!
//! #[derive(Client)]
//! #[client(name = "DynamoDB")]
//! struct Dynamo;
//!
//! #[derive(Command)]
//! #[command(client = Dynamo)]
//! struct GetItem {
//!     #[command(input)]
//!     input: GetItemInput,
//! }
//!
//! // Without an input field the whole command is the payload
//! #[derive(Command, Serialize)]
//! #[command(client = Dynamo, name = "ListTables")]
//! struct ListTablesCommand {
//!     limit: Option<u32>,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Member, Path, Type};

/// Derive macro for client type markers.
///
/// Generates `impl cmdmock::Client`.
///
/// # Attributes
///
/// - `#[client(name = "Custom")]` - Override the display name (defaults to the type name)
#[proc_macro_derive(Client, attributes(client))]
pub fn derive_client(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_client(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro for typed commands.
///
/// Generates `impl cmdmock::Command`.
///
/// # Attributes
///
/// - `#[command(client = Path)]` - The client the command belongs to (required)
/// - `#[command(name = "Custom")]` - Override the display name (defaults to the type name)
/// - `#[command(input)]` on one field - Use that field as the payload; without
///   it the command itself is the payload and must implement `Serialize`
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_command(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

// ============================================================================
// Expansion
// ============================================================================

fn expand_client(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let args = parse_type_args(&input.attrs, "client")?;
    if let Some(client) = &args.client {
        return Err(syn::Error::new_spanned(
            client,
            "`client = ...` belongs on #[command], not #[client]",
        ));
    }
    let display = args.name.unwrap_or_else(|| name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::cmdmock::Client for #name #ty_generics #where_clause {
            const NAME: &'static str = #display;
        }
    })
}

fn expand_command(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let args = parse_type_args(&input.attrs, "command")?;
    let client = args.client.ok_or_else(|| {
        syn::Error::new_spanned(
            name,
            "missing #[command(client = ...)] naming the client this command is sent through",
        )
    })?;
    let display = args.name.unwrap_or_else(|| name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (input_ty, input_body) = match find_input_field(&input.data)? {
        Some((member, ty)) => (quote!(#ty), quote!(&self.#member)),
        None => (quote!(Self), quote!(self)),
    };

    Ok(quote! {
        impl #impl_generics ::cmdmock::Command for #name #ty_generics #where_clause {
            type Client = #client;
            type Input = #input_ty;
            const NAME: &'static str = #display;

            fn input(&self) -> &Self::Input {
                #input_body
            }
        }
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Arguments accepted on the type itself
#[derive(Default)]
struct TypeArgs {
    client: Option<Path>,
    name: Option<String>,
}

/// Parse `#[<ident>(client = Path, name = "...")]` attributes
fn parse_type_args(attrs: &[Attribute], ident: &str) -> syn::Result<TypeArgs> {
    let mut args = TypeArgs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(ident)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("name must not be empty"));
                }
                args.name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("client") {
                args.client = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported #[{ident}] argument")))
            }
        })?;
    }
    Ok(args)
}

/// Find the single field marked `#[command(input)]`
fn find_input_field(data: &Data) -> syn::Result<Option<(Member, Type)>> {
    let Data::Struct(data_struct) = data else {
        return Ok(None);
    };
    let fields = match &data_struct.fields {
        Fields::Named(fields) => &fields.named,
        Fields::Unnamed(fields) => &fields.unnamed,
        Fields::Unit => return Ok(None),
    };

    let mut found: Option<(Member, Type)> = None;
    for (index, field) in fields.iter().enumerate() {
        if !is_input_field(&field.attrs)? {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "only one field can be marked #[command(input)]",
            ));
        }
        let member = field
            .ident
            .clone()
            .map_or_else(|| Member::from(index), Member::Named);
        found = Some((member, field.ty.clone()));
    }
    Ok(found)
}

fn is_input_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut marked = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("command")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("input") {
                marked = true;
                Ok(())
            } else {
                Err(meta.error("only #[command(input)] is allowed on fields"))
            }
        })?;
    }
    Ok(marked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn compact(tokens: &TokenStream2) -> String {
        tokens.to_string().replace(' ', "")
    }

    #[test]
    fn test_client_default_name() {
        let input: DeriveInput = parse_quote! {
            struct Dynamo;
        };
        let out = compact(&expand_client(&input).unwrap());
        assert!(out.contains("impl::cmdmock::ClientforDynamo"));
        assert!(out.contains("constNAME:&'staticstr=\"Dynamo\""));
    }

    #[test]
    fn test_client_custom_name() {
        let input: DeriveInput = parse_quote! {
            #[client(name = "DynamoDB")]
            struct Dynamo;
        };
        let out = compact(&expand_client(&input).unwrap());
        assert!(out.contains("\"DynamoDB\""));
    }

    #[test]
    fn test_client_rejects_client_argument() {
        let input: DeriveInput = parse_quote! {
            #[client(client = Other)]
            struct Dynamo;
        };
        assert!(expand_client(&input).is_err());
    }

    #[test]
    fn test_command_requires_client() {
        let input: DeriveInput = parse_quote! {
            struct GetItem;
        };
        let err = expand_command(&input).unwrap_err();
        assert!(err.to_string().contains("missing #[command(client = ...)]"));
    }

    #[test]
    fn test_command_named_input_field() {
        let input: DeriveInput = parse_quote! {
            #[command(client = crate::Dynamo, name = "GetItem")]
            struct GetItemCommand {
                #[command(input)]
                input: GetItemInput,
                retries: u32,
            }
        };
        let out = compact(&expand_command(&input).unwrap());
        assert!(out.contains("typeClient=crate::Dynamo;"));
        assert!(out.contains("typeInput=GetItemInput;"));
        assert!(out.contains("\"GetItem\""));
        assert!(out.contains("&self.input"));
    }

    #[test]
    fn test_command_tuple_input_field() {
        let input: DeriveInput = parse_quote! {
            #[command(client = Queue)]
            struct Purge(u8, #[command(input)] PurgeInput);
        };
        let out = compact(&expand_command(&input).unwrap());
        assert!(out.contains("typeInput=PurgeInput;"));
        assert!(out.contains("&self.1"));
    }

    #[test]
    fn test_command_without_input_field_uses_self() {
        let input: DeriveInput = parse_quote! {
            #[command(client = Queue)]
            struct ListQueues {
                prefix: String,
            }
        };
        let out = compact(&expand_command(&input).unwrap());
        assert!(out.contains("typeInput=Self;"));
        assert!(out.contains("\"ListQueues\""));
    }

    #[test]
    fn test_command_generics_preserved() {
        let input: DeriveInput = parse_quote! {
            #[command(client = Queue)]
            struct Send<T: Serialize + Send + 'static> {
                #[command(input)]
                body: T,
            }
        };
        let out = compact(&expand_command(&input).unwrap());
        assert!(out.contains("impl<T:Serialize+Send+'static>::cmdmock::CommandforSend<T>"));
        assert!(out.contains("typeInput=T;"));
    }

    #[test]
    fn test_duplicate_input_fields_rejected() {
        let input: DeriveInput = parse_quote! {
            #[command(client = Queue)]
            struct Twice {
                #[command(input)]
                a: u8,
                #[command(input)]
                b: u8,
            }
        };
        assert!(expand_command(&input).is_err());
    }

    #[test]
    fn test_unknown_arguments_rejected() {
        let input: DeriveInput = parse_quote! {
            #[command(client = Queue, timeout = 5)]
            struct Odd;
        };
        assert!(expand_command(&input).is_err());

        let input: DeriveInput = parse_quote! {
            #[command(client = Queue)]
            struct Odd {
                #[command(skip)]
                a: u8,
            }
        };
        assert!(expand_command(&input).is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let input: DeriveInput = parse_quote! {
            #[client(name = "")]
            struct Blank;
        };
        assert!(expand_client(&input).is_err());
    }
}
