use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::translation::error::{LocaliserError, LocaliserResult};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> LocaliserResult<RcDom> {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| LocaliserError::Parse(format!("无法解析HTML: {}", e)))
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();

    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    let matches = get_node_name(node).is_some_and(|name| name == *node_name);

    if matches && rest.is_empty() {
        found_nodes.push(node.clone());
    }

    let next_names = if matches && !rest.is_empty() {
        rest
    } else {
        node_names
    };

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_nodes(child_node, next_names));
    }

    found_nodes
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 按 id 属性查找元素（先序遍历，返回第一个匹配）
pub fn find_by_id(node: &Handle, id: &str) -> Option<Handle> {
    if get_node_attr(node, "id").as_deref() == Some(id) {
        return Some(node.clone());
    }

    node.children
        .borrow()
        .iter()
        .find_map(|child| find_by_id(child, id))
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// rcdom 把父指针存放在 `Cell` 中，读取时必须取出再放回，
/// 否则会把节点从父节点上"摘掉"。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// `ancestor` 是否为 `node` 本身或其祖先
pub fn is_inclusive_ancestor(ancestor: &Handle, node: &Handle) -> bool {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        if std::rc::Rc::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = get_parent_node(&candidate);
    }

    false
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::{namespace_url, ns, LocalName};

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 元素的 class 属性是否包含指定的类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
}

/// 文本节点的当前内容；非文本节点返回 `None`
pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 节点及其后代中所有文本节点内容的拼接（与 DOM 的 textContent 一致，不含注释）
pub fn text_content(node: &Handle) -> String {
    let mut buf = String::new();
    collect_text(node, &mut buf);
    buf
}

fn collect_text(node: &Handle, buf: &mut String) {
    match &node.data {
        NodeData::Text { contents } => buf.push_str(&contents.borrow()),
        NodeData::Comment { .. } => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, buf);
            }
        }
    }
}
