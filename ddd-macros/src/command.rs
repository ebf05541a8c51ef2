use crate::utils::{ensure_message_item, message_name, parse_message_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

/// #[derive(Command)] 宏实现
/// - 生成 `::ddd_application::command::Command` 实现
/// - `NAME` 缺省为类型名，可用 `#[command(name = "...")]` 覆写
/// - `Output` 缺省为 `()`，可用 `#[command(output = Type)]` 指定
pub(crate) fn expand(input: &DeriveInput) -> Result<TokenStream> {
    ensure_message_item(input, "Command")?;

    let cfg = parse_message_attrs(&input.attrs, "command", true)?;
    let name = message_name(input, &cfg);
    let output = cfg.output.unwrap_or_else(|| syn::parse_quote! { () });

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::ddd_application::command::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            type Output = #output;
        }
    })
}
