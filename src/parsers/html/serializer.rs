use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, SerializableHandle};

use crate::translation::error::{LocaliserError, LocaliserResult};

/// 序列化文档
///
/// `document_encoding` 为空或无法识别时输出 UTF-8。
pub fn serialize_document(document: &Handle, document_encoding: &str) -> LocaliserResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| LocaliserError::Serialization(format!("无法序列化DOM: {}", e)))?;

    Ok(encode_output(buf, document_encoding))
}

/// 只序列化节点的子节点（相当于 innerHTML）
pub fn serialize_children(node: &Handle) -> LocaliserResult<String> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    serialize(&mut buf, &serializable, opts)
        .map_err(|e| LocaliserError::Serialization(format!("无法序列化节点: {}", e)))?;

    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn encode_output(buf: Vec<u8>, document_encoding: &str) -> Vec<u8> {
    if document_encoding.is_empty() {
        return buf;
    }

    match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            data.to_vec()
        }
        None => buf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_by_id, html_to_dom};

    #[test]
    fn test_serialize_children_only() {
        let dom = html_to_dom(b"<div id=\"a\">Hi <b>there</b></div>", "utf-8").unwrap();
        let div = find_by_id(&dom.document, "a").unwrap();

        assert_eq!(serialize_children(&div).unwrap(), "Hi <b>there</b>");
    }

    #[test]
    fn test_serialize_document_in_legacy_encoding() {
        let dom = html_to_dom("<p>café</p>".as_bytes(), "utf-8").unwrap();

        let bytes = serialize_document(&dom.document, "iso-8859-1").unwrap();
        // é 在 windows-1252 中是单字节 0xE9
        assert!(bytes.contains(&0xE9));
        assert!(!String::from_utf8_lossy(&bytes).contains("café"));
    }
}
