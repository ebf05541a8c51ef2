use syn::spanned::Spanned;
use syn::{Attribute, DeriveInput, LitStr, Result, Type};

/// 消息派生宏的属性配置
/// - `name = "..."`：稳定名称，缺省为类型名
/// - `output = Type`：命令结果类型（仅命令支持），缺省为 `()`
#[derive(Default)]
pub(crate) struct MessageAttrConfig {
    pub(crate) name: Option<LitStr>,
    pub(crate) output: Option<Type>,
}

/// 解析 `#[<attr_name>(...)]`，可出现多次，但同一键不可重复
pub(crate) fn parse_message_attrs(
    attrs: &[Attribute],
    attr_name: &str,
    allow_output: bool,
) -> Result<MessageAttrConfig> {
    let mut cfg = MessageAttrConfig::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident(attr_name)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                if cfg.name.is_some() {
                    return Err(meta.error("duplicate key 'name' in attribute"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(syn::Error::new(lit.span(), "'name' must not be empty"));
                }
                cfg.name = Some(lit);
                Ok(())
            } else if allow_output && meta.path.is_ident("output") {
                if cfg.output.is_some() {
                    return Err(meta.error("duplicate key 'output' in attribute"));
                }
                cfg.output = Some(meta.value()?.parse()?);
                Ok(())
            } else if allow_output {
                Err(meta.error("unknown key in attribute; expected 'name' or 'output'"))
            } else {
                Err(meta.error("unknown key in attribute; expected 'name'"))
            }
        })?;
    }

    Ok(cfg)
}

/// 未显式指定名称时以类型名作为稳定名称
pub(crate) fn message_name(input: &DeriveInput, cfg: &MessageAttrConfig) -> LitStr {
    cfg.name
        .clone()
        .unwrap_or_else(|| LitStr::new(&input.ident.to_string(), input.ident.span()))
}

/// 仅支持结构体与枚举（消息需要可构造的值类型）
pub(crate) fn ensure_message_item(input: &DeriveInput, derive_name: &str) -> Result<()> {
    match &input.data {
        syn::Data::Struct(_) | syn::Data::Enum(_) => Ok(()),
        syn::Data::Union(u) => Err(syn::Error::new(
            u.union_token.span(),
            format!("#[derive({derive_name})] only supports struct or enum"),
        )),
    }
}
