use crate::token::{Operator, Token};

/// Structural state of a node under construction. Each variant carries only
/// the fields its kind needs, so a half-built node can never be ambiguous.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Empty,
    Literal(Token),
    /// A literal followed by `.`, waiting for the member name.
    ClassRef(Token),
    AttributeAccess {
        class: String,
        attribute: String,
    },
    MethodCall {
        class: String,
        method: String,
        arguments: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Literal,
    ClassReference,
    AttributeAccess,
    MethodCall,
}

impl Node {
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Empty => NodeKind::Empty,
            Self::Literal(_) => NodeKind::Literal,
            Self::ClassRef(_) => NodeKind::ClassReference,
            Self::AttributeAccess { .. } => NodeKind::AttributeAccess,
            Self::MethodCall { .. } => NodeKind::MethodCall,
        }
    }

    /// `Literal` + `.`
    pub fn into_class_ref(self) -> Self {
        match self {
            Self::Literal(token) => Self::ClassRef(token),
            other => other,
        }
    }

    /// `ClassRef` + member word
    pub fn into_attribute(self, attribute: String) -> Self {
        match self {
            Self::ClassRef(token) => Self::AttributeAccess {
                class: token.repr(),
                attribute,
            },
            other => other,
        }
    }

    /// `AttributeAccess` + argument list
    pub fn into_method_call(self, arguments: Vec<Expr>) -> Self {
        match self {
            Self::AttributeAccess { class, attribute } => Self::MethodCall {
                class,
                method: attribute,
                arguments,
            },
            other => other,
        }
    }
}

/// A node plus the two pieces of state that survive a reset: the keyword
/// it binds when used as `name = value`, and the operator that joins it to
/// the next sibling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expr {
    pub node: Node,
    pub keyword: Option<String>,
    pub pending: Option<Operator>,
}

impl Expr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(token: Token) -> Self {
        Self {
            node: Node::Literal(token),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.node, Node::Empty)
    }
}
