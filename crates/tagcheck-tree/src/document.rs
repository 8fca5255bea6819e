use indexmap::IndexMap;

use crate::error::{MarkupError, Result};
use crate::node::DataNode;
use crate::options::{AttributeMode, ParseOptions};
use crate::scan::{scan, Attribute, Markup, OpenTag};

/// A parsed data document.
///
/// The tree is a mapping with exactly one key, the root tag name, so it can be
/// compared against a rule tree with the same sibling logic used everywhere
/// else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: String,
    tree: DataNode,
}

impl Document {
    /// Parse well-formed markup into a data tree.
    ///
    /// Repeated sibling tags collapse into a [`DataNode::Sequence`], elements
    /// with children or attributes into a [`DataNode::Mapping`], and everything
    /// else into a [`DataNode::Scalar`] holding its trimmed text. An attribute
    /// written without a value is kept with an empty value.
    pub fn parse(text: &str, options: &ParseOptions) -> Result<Self> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut finished: Option<(String, DataNode)> = None;

        scan(text, AttributeMode::Boolean, options, |markup| {
            match markup {
                Markup::Open(tag) => stack.push(Frame::new(tag)),
                Markup::Text(content) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.push_text(&content);
                    }
                }
                Markup::Close => {
                    if let Some(frame) = stack.pop() {
                        let (name, node) = frame.finish(options);
                        match stack.last_mut() {
                            Some(parent) => parent.children.entry(name).or_default().push(node),
                            None => finished = Some((name, node)),
                        }
                    }
                }
            }
            Ok::<(), MarkupError>(())
        })?;

        let (root, node) = finished.ok_or(MarkupError::NoRoot)?;
        tracing::debug!(root = %root, "parsed data document");

        let mut tree = IndexMap::with_capacity(1);
        tree.insert(root.clone(), node);
        Ok(Self {
            root,
            tree: DataNode::Mapping(tree),
        })
    }

    /// Parse raw bytes, rejecting input that is not UTF-8 text.
    pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Self::parse(text, options)
    }

    /// Tag name of the root element.
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// The root element's node.
    pub fn root(&self) -> Option<&DataNode> {
        self.tree.get(&self.root)
    }

    /// The whole tree: a mapping of the root tag name to the root node.
    pub fn tree(&self) -> &DataNode {
        &self.tree
    }

    pub fn into_tree(self) -> DataNode {
        self.tree
    }
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    attributes: Vec<Attribute>,
    text: String,
    children: IndexMap<String, Vec<DataNode>>,
}

impl Frame {
    fn new(tag: OpenTag) -> Self {
        Self {
            name: tag.name,
            attributes: tag.attributes,
            text: String::new(),
            children: IndexMap::new(),
        }
    }

    fn push_text(&mut self, content: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(content);
    }

    fn finish(self, options: &ParseOptions) -> (String, DataNode) {
        let attribute_key = options
            .attribute_key
            .as_ref()
            .filter(|_| !self.attributes.is_empty());

        if self.children.is_empty() && attribute_key.is_none() {
            return (self.name, DataNode::Scalar(self.text));
        }

        let mut map = IndexMap::with_capacity(self.children.len() + 2);
        if let Some(key) = attribute_key {
            let attributes = self
                .attributes
                .into_iter()
                .map(|attr| (attr.name, DataNode::Scalar(attr.value)))
                .collect();
            map.insert(key.clone(), DataNode::Mapping(attributes));
        }
        for (name, mut nodes) in self.children {
            let node = if nodes.len() == 1 {
                nodes.pop().unwrap_or(DataNode::Scalar(String::new()))
            } else {
                DataNode::Sequence(nodes)
            };
            map.insert(name, node);
        }
        if !self.text.is_empty() {
            map.insert(options.text_key.clone(), DataNode::Scalar(self.text));
        }

        (self.name, DataNode::Mapping(map))
    }
}
