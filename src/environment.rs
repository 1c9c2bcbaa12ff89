use std::env;

use indexmap::IndexMap;

use crate::{
    diagnostics::{ErrorKind, Result, fatal},
    token::Token,
};

pub const LINE_NUMBER: &str = "__LINE_NUMBER__";
pub const SCRIPT: &str = "__SCRIPT__";

/// Variable store split into read-only system entries and user entries.
/// Neither partition ever shrinks during a run.
#[derive(Debug, Clone)]
pub struct Variables {
    system: IndexMap<String, Token>,
    user: IndexMap<String, Token>,
}

impl Variables {
    pub fn new() -> Self {
        let mut variables = Self::empty();
        variables.define_system("__PLATFORM__", Token::string(platform()));
        variables.define_system("__CWD__", Token::string(current_dir()));
        variables.define_system(LINE_NUMBER, Token::int(0));
        let user = env_or_empty(&["USER", "USERNAME"]);
        variables.define_system("__USER__", Token::string(user));
        variables.define_system("__SYSTEM_HOME__", Token::string(system_home()));
        let home = env_or_empty(&["HOME", "USERPROFILE"]);
        variables.define_system("__USER_HOME__", Token::string(home));
        let lang = env_or_empty(&["LANG", "LC_ALL"]);
        variables.define_system("__LANG__", Token::string(lang));
        variables
    }

    /// A store with no system entries at all.
    pub fn empty() -> Self {
        Self {
            system: IndexMap::new(),
            user: IndexMap::new(),
        }
    }

    /// Host-side write to a system entry. Scripts cannot reach this.
    pub fn define_system(&mut self, name: &str, value: Token) {
        self.system.insert(name.to_string(), value);
    }

    pub fn exists(&self, name: &str) -> bool {
        self.system.contains_key(name) || self.user.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Token> {
        self.system.get(name).or_else(|| self.user.get(name))
    }

    pub fn get(&self, name: &str) -> Result<Token> {
        self.lookup(name).cloned().ok_or_else(|| {
            fatal(
                ErrorKind::VarNotDefined,
                format!("the variable '{name}' is not defined"),
            )
        })
    }

    /// Creates or overwrites a user variable.
    pub fn set(&mut self, name: &str, value: Token) -> Result<()> {
        if self.system.contains_key(name) {
            return Err(fatal(
                ErrorKind::ImmutableVarModification,
                format!("'{name}' is a system variable and cannot be modified"),
            ));
        }
        log::trace!("set {name} = {}", value.repr());
        self.user.insert(name.to_string(), value);
        Ok(())
    }
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

fn platform() -> String {
    format!("{} {}", env::consts::OS, env::consts::ARCH)
}

fn current_dir() -> String {
    env::current_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

fn system_home() -> String {
    if cfg!(windows) {
        env_or_empty(&["SystemRoot"])
    } else {
        "/".to_string()
    }
}

fn env_or_empty(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| env::var(key).ok())
        .unwrap_or_default()
}
