//! HTML 文档元数据处理模块
//!
//! 读取文档声明的字符编码和语言，以便按原编码解析、序列化，
//! 以及在翻译后更新根元素的 `lang` 属性。

use encoding_rs::Encoding;
use markup5ever_rcdom::Handle;

use super::dom::{find_nodes, get_node_attr, set_node_attr};

/// 获取文档声明的字符编码
///
/// 支持 `<meta charset="...">` 和
/// `<meta http-equiv="content-type" content="text/html; charset=...">` 两种写法，
/// 返回第一个找到的声明。
///
/// # 参数
///
/// * `node` - HTML 文档的根节点句柄
///
/// # 返回值
///
/// * `Some(String)` - 声明的编码标签（未经校验）
/// * `None` - 文档没有声明编码
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, &["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            // 处理 <meta charset="..." /> 格式
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                // 处理 <meta http-equiv="content-type" content="text/html; charset=..." /> 格式
                return Some(parse_charset(&content));
            }
        }
    }

    None
}

/// 声明的编码若是 encoding_rs 认识的标签，返回其规范名称
pub fn get_valid_charset(node: &Handle) -> Option<&'static str> {
    let charset = get_charset(node)?;
    Encoding::for_label_no_replacement(charset.trim().as_bytes()).map(Encoding::name)
}

/// 从 Content-Type 值中提取 charset 参数
fn parse_charset(content_type: &str) -> String {
    content_type
        .split(';')
        .skip(1)
        .map(str::trim)
        .find_map(|part| {
            part.get(..8)
                .filter(|prefix| prefix.eq_ignore_ascii_case("charset="))
                .map(|_| part[8..].trim_matches('"').to_string())
        })
        .unwrap_or_default()
}

/// 获取 `<html lang="...">`
pub fn get_document_lang(node: &Handle) -> Option<String> {
    find_nodes(node, &["html"])
        .first()
        .and_then(|html| get_node_attr(html, "lang"))
}

/// 设置 `<html lang="...">`；文档没有 html 元素时什么也不做
pub fn set_document_lang(node: &Handle, lang: &str) {
    if let Some(html) = find_nodes(node, &["html"]).first() {
        set_node_attr(html, "lang", Some(lang.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    #[test]
    fn test_meta_charset() {
        let dom = html_to_dom(b"<html><head><meta charset=\"windows-1252\"></head></html>", "utf-8").unwrap();
        assert_eq!(get_charset(&dom.document).as_deref(), Some("windows-1252"));
        assert_eq!(get_valid_charset(&dom.document), Some("windows-1252"));
    }

    #[test]
    fn test_http_equiv_charset() {
        let dom = html_to_dom(
            b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; Charset=ISO-8859-2\"></head></html>",
            "utf-8",
        )
        .unwrap();
        assert_eq!(get_charset(&dom.document).as_deref(), Some("ISO-8859-2"));
        assert_eq!(get_valid_charset(&dom.document), Some("ISO-8859-2"));

        assert_eq!(parse_charset("text/html; charset=\"koi8-r\""), "koi8-r");
        assert_eq!(parse_charset("text/html"), "");
    }

    #[test]
    fn test_unknown_charset_is_not_valid() {
        let dom = html_to_dom(b"<html><head><meta charset=\"klingon\"></head></html>", "utf-8").unwrap();
        assert_eq!(get_valid_charset(&dom.document), None);
    }

    #[test]
    fn test_document_lang() {
        let dom = html_to_dom(b"<html lang=\"en\"><body></body></html>", "utf-8").unwrap();
        assert_eq!(get_document_lang(&dom.document).as_deref(), Some("en"));

        set_document_lang(&dom.document, "fr");
        assert_eq!(get_document_lang(&dom.document).as_deref(), Some("fr"));
    }
}
