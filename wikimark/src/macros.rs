//! Macro registry.
//!
//! A macro call is written `[[Name]]` or `[[Name(arg, 'quoted arg')]]`. The
//! registry maps names to plain functions registered up front; a name that is
//! not registered is a lookup miss, never an evaluation error.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::MacroError;

/// A parsed macro call. Arguments are still escaped page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub name: String,
    pub args: Vec<String>,
}

impl MacroCall {
    /// Parse the text between `[[` and `]]`.
    pub fn parse(inner: &str) -> Result<Self, MacroError> {
        let text = inner.trim();
        let malformed = || MacroError::Malformed(text.to_string());

        let name_len = text
            .char_indices()
            .take_while(|&(i, c)| {
                c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())
            })
            .count();
        if name_len == 0 {
            return Err(malformed());
        }
        let (name, rest) = text.split_at(name_len);
        let rest = rest.trim_start();

        let args = if rest.is_empty() {
            Vec::new()
        } else {
            let inside = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(malformed)?;
            if inside.trim().is_empty() {
                Vec::new()
            } else {
                inside.split(',').map(unquote).collect()
            }
        };

        Ok(Self {
            name: name.to_string(),
            args,
        })
    }
}

/// Trim an argument and drop one pair of surrounding quotes.
fn unquote(arg: &str) -> String {
    let arg = arg.trim();
    for quote in ["'", "&quot;"] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|a| a.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    arg.to_string()
}

type MacroFn = Box<dyn Fn(&MacroCall) -> Result<String, MacroError> + Send + Sync>;

/// Named macro functions.
#[derive(Default)]
pub struct MacroRegistry {
    macros: BTreeMap<String, MacroFn>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&MacroCall) -> Result<String, MacroError> + Send + Sync + 'static,
    {
        self.macros.insert(name.to_string(), Box::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(String::as_str)
    }

    /// Expand the text between `[[` and `]]`.
    pub fn expand(&self, inner: &str) -> Result<String, MacroError> {
        let call = MacroCall::parse(inner)?;
        let f = self
            .macros
            .get(&call.name)
            .ok_or_else(|| MacroError::Unknown(call.name.clone()))?;
        f(&call)
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("macros", &self.macros.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_bare_name() {
        let call = MacroCall::parse(" PageCount ").unwrap();
        assert_eq!(call.name, "PageCount");
        assert!(call.args.is_empty());
    }

    #[test]
    fn parse_arguments_and_quotes() {
        let call = MacroCall::parse("greet('Ann', &quot;Bob&quot;, 3, )").unwrap();
        assert_eq!(call.name, "greet");
        assert_eq!(call.args, vec!["Ann", "Bob", "3", ""]);
        assert!(MacroCall::parse("now()").unwrap().args.is_empty());
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in ["", "1abc", "a b", "f(x", "a]] text [[b"] {
            assert!(
                matches!(MacroCall::parse(text), Err(MacroError::Malformed(_))),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn expand_registered_and_unknown() {
        let mut registry = MacroRegistry::new();
        registry
            .register("shout", |call| Ok(call.args.join(" ").to_uppercase()))
            .register("broken", |call| {
                Err(MacroError::Failed {
                    name: call.name.clone(),
                    message: "no backend".into(),
                })
            });

        assert_eq!(registry.expand("shout(hi, there)").unwrap(), "HI THERE");
        assert_eq!(
            registry.expand("missing"),
            Err(MacroError::Unknown("missing".into()))
        );
        assert!(matches!(registry.expand("broken"), Err(MacroError::Failed { .. })));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["broken", "shout"]);
    }
}
