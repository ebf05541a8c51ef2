use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod command;
mod domain_event;
mod utils;

/// 命令派生宏
/// 为结构体/枚举实现 `::ddd_application::command::Command`。
/// 支持键值形式：
/// - #[command(name = "...")] 指定稳定名称（默认类型名）
/// - #[command(output = Type)] 指定处理结果类型（默认 `()`）
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    command::expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// 领域事件派生宏
/// 为结构体/枚举实现 `::ddd_domain::domain_event::DomainEvent`。
/// - #[domain_event(name = "...")] 指定稳定名称（默认类型名）
#[proc_macro_derive(DomainEvent, attributes(domain_event))]
pub fn derive_domain_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    domain_event::expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
