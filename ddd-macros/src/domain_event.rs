use crate::utils::{ensure_message_item, message_name, parse_message_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

/// #[derive(DomainEvent)] 宏实现
/// - 生成 `::ddd_domain::domain_event::DomainEvent` 实现
/// - `NAME` 缺省为类型名，可用 `#[domain_event(name = "...")]` 覆写
pub(crate) fn expand(input: &DeriveInput) -> Result<TokenStream> {
    ensure_message_item(input, "DomainEvent")?;

    let cfg = parse_message_attrs(&input.attrs, "domain_event", false)?;
    let name = message_name(input, &cfg);

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::ddd_domain::domain_event::DomainEvent for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    })
}
