use std::fmt;

use indexmap::IndexMap;

use crate::{
    console::Console,
    diagnostics::{Diagnostic, ErrorKind, ErrorPolicy, Result, fatal},
    environment::Variables,
    token::{Token, TokenKind},
};

/// Everything a built-in method may touch while it runs.
pub struct CallContext<'a> {
    pub variables: &'a mut Variables,
    pub console: &'a mut Console,
    pub policy: &'a ErrorPolicy,
    pub line: usize,
}

impl CallContext<'_> {
    /// Reports a configurable diagnostic; `Err` when the policy makes it
    /// fatal.
    pub fn raise(&self, kind: ErrorKind, message: impl Into<String>) -> Result<()> {
        self.policy
            .raise(Diagnostic::new(kind, message).with_line(self.line))
    }
}

pub type Keywords = IndexMap<String, Token>;
pub type MethodFn = fn(&mut CallContext<'_>, &[Token], &Keywords) -> Result<Token>;
pub type AttributeFn = fn() -> Token;

#[derive(Clone)]
pub struct Class {
    pub name: String,
    attributes: IndexMap<String, AttributeFn>,
    methods: IndexMap<String, MethodFn>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, getter: AttributeFn) -> Self {
        self.attributes.insert(name.to_string(), getter);
        self
    }

    pub fn with_method(mut self, name: &str, method: MethodFn) -> Self {
        self.methods.insert(name.to_string(), method);
        self
    }

    pub fn attribute(&self, name: &str) -> Result<AttributeFn> {
        self.attributes.get(name).copied().ok_or_else(|| {
            fatal(
                ErrorKind::InvalidAttribute,
                format!("class '{}' has no attribute '{name}'", self.name),
            )
        })
    }

    pub fn method(&self, name: &str) -> Result<MethodFn> {
        self.methods.get(name).copied().ok_or_else(|| {
            fatal(
                ErrorKind::InvalidMethod,
                format!("class '{}' has no method '{name}'", self.name),
            )
        })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Name to class mapping. Entries are only ever added.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Class>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering an existing name replaces its class.
    pub fn register(&mut self, class: Class) {
        log::trace!("registered class {}", class.name);
        self.classes.insert(class.name.clone(), class);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&Class> {
        self.classes.get(name).ok_or_else(|| {
            fatal(
                ErrorKind::ModuleNotFound,
                format!("the class '{name}' does not exist in this context"),
            )
        })
    }
}

/// An expected parameter; `kind: None` accepts any token.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: Option<TokenKind>,
}

impl Param {
    pub const fn new(name: &'static str, kind: TokenKind) -> Self {
        Self {
            name,
            kind: Some(kind),
        }
    }

    pub const fn any(name: &'static str) -> Self {
        Self { name, kind: None }
    }
}

/// Binds call arguments against `params`, in parameter order.
///
/// A keyword beats a positional for the same parameter (reported as
/// argument surplus). Kind mismatches are reported but the value is still
/// bound. With `extras`, unconsumed positionals appear as
/// `extra_positional_{index}` and unconsumed keywords under their own name.
pub fn bind_arguments(
    ctx: &CallContext<'_>,
    positionals: &[Token],
    keywords: &Keywords,
    params: &[Param],
    extras: bool,
) -> Result<IndexMap<String, Token>> {
    let mut bound = IndexMap::new();
    for (index, param) in params.iter().enumerate() {
        let positional = positionals.get(index);
        let keyword = keywords.get(param.name);
        if positional.is_some() && keyword.is_some() {
            ctx.raise(
                ErrorKind::ArgumentSurplus,
                format!("ignoring positional value for '{}' (using keyword instead)", param.name),
            )?;
        }
        let Some(value) = keyword.or(positional) else {
            continue;
        };
        if let Some(expected) = param.kind
            && value.kind() != expected
        {
            ctx.raise(
                ErrorKind::TypeMismatch,
                format!(
                    "parameter '{}' expected a value of type {expected}, found {}",
                    param.name,
                    value.kind()
                ),
            )?;
        }
        bound.insert(param.name.to_string(), value.clone());
    }

    if extras {
        for (index, value) in positionals.iter().enumerate().skip(params.len()) {
            bound.insert(format!("extra_positional_{index}"), value.clone());
        }
        for (name, value) in keywords {
            if !params.iter().any(|param| param.name == name) {
                bound.insert(name.clone(), value.clone());
            }
        }
    }
    Ok(bound)
}
