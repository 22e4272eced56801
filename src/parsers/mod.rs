//! # 解析器模块
//!
//! HTML 文档的解析、查询与序列化。
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM查询、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{
    find_by_id, find_nodes, get_node_attr, has_class, html_to_dom, serialize_children,
    serialize_document, text_content,
};
