//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作和查询
//! - `metadata`: 字符编码与语言声明
//! - `serializer`: 序列化功能

pub mod dom;
pub mod metadata;
pub mod serializer;

pub use dom::{
    find_by_id, find_nodes, get_child_node_by_name, get_node_attr, get_node_name,
    get_parent_node, has_class, html_to_dom, is_inclusive_ancestor, set_node_attr, text_content,
    text_of,
};
pub use metadata::{get_charset, get_document_lang, get_valid_charset, set_document_lang};
pub use serializer::{serialize_children, serialize_document};
