use std::fmt;

use serde::Serialize;

use super::{Structural, TypeDescriptor};
use crate::error::{Error, Result};
use crate::syntax::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodPrefix {
    Instance, // -
    Type,     // +
}

impl MethodPrefix {
    pub fn as_char(self) -> char {
        match self {
            Self::Instance => '-',
            Self::Type => '+',
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Argument {
    pub ty: TypeDescriptor,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MethodFlags {
    pub designated_initializer: bool,
    pub unavailable: bool,
    pub required: bool,
}

impl MethodFlags {
    pub fn merge(&mut self, other: &Self) {
        self.designated_initializer |= other.designated_initializer;
        self.unavailable |= other.unavailable;
        self.required |= other.required;
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MethodDescriptor {
    pub prefix: MethodPrefix,
    /// Colon-joined selector (`initWithFrame:style:`) or a bare word.
    pub key: String,
    pub return_type: TypeDescriptor,
    pub arguments: Vec<Argument>,
    pub flags: MethodFlags,
}

impl MethodDescriptor {
    /// Parse `-(ret)word:(ty)name word:(ty)name ...;`. Anything after the last
    /// argument group (availability macros, the terminator) is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut c = Cursor::new(text.trim());
        let prefix = match c.bump()? {
            '-' => MethodPrefix::Instance,
            '+' => MethodPrefix::Type,
            _ => return None,
        };
        c.skip_ws();
        let return_type = parse_optional_type(&mut c)?;
        c.skip_ws();
        let first = c.ident()?;

        let mut components = Vec::new();
        let mut arguments = Vec::new();
        let mut word = first;
        loop {
            c.skip_ws();
            if !c.eat(':') {
                break;
            }
            c.skip_ws();
            let ty = parse_optional_type(&mut c)?;
            c.skip_ws();
            let name = c.ident()?;
            components.push(word);
            arguments.push(Argument { ty, name: name.to_string() });
            c.skip_ws();
            match c.ident() {
                Some(next) => word = next,
                None => break,
            }
        }

        let key = if components.is_empty() {
            first.to_string()
        } else {
            format!("{}:", components.join(":"))
        };

        let flags = MethodFlags {
            designated_initializer: text.contains("NS_DESIGNATED_INITIALIZER"),
            unavailable: text.contains("NS_UNAVAILABLE")
                || text.contains("UNAVAILABLE_ATTRIBUTE")
                || text.contains("__attribute__((unavailable"),
            required: false,
        };

        Some(Self { prefix, key, return_type, arguments, flags })
    }

    pub fn takes_arguments(&self) -> bool { self.key.ends_with(':') }

    fn returns_owner(&self, owner: &str) -> bool {
        self.return_type.name == "instancetype"
            || (self.return_type.pointer && self.return_type.name == owner)
    }

    pub fn is_initializer(&self, owner: &str) -> bool {
        self.prefix == MethodPrefix::Instance && self.key.starts_with("init") && self.returns_owner(owner)
    }

    pub fn is_convenience_constructor(&self, owner: &str) -> bool {
        self.prefix == MethodPrefix::Type && self.returns_owner(owner)
    }

    /// Call-site text following the receiver: ` setValue:v` or ` value`.
    pub fn invocation(&self) -> Result<String> {
        let components: Vec<&str> = self.key.split(':').filter(|s| !s.is_empty()).collect();
        if !self.takes_arguments() {
            return Ok(components.iter().map(|c| format!(" {c}")).collect());
        }
        if components.len() != self.arguments.len() {
            return Err(Error::SelectorArity {
                selector: self.key.clone(),
                components: components.len(),
                arguments: self.arguments.len(),
            });
        }
        Ok(components
            .iter()
            .zip(&self.arguments)
            .map(|(component, arg)| format!(" {component}:{}", arg.name))
            .collect())
    }
}

// missing parenthesised type defaults to `id`
fn parse_optional_type(c: &mut Cursor<'_>) -> Option<TypeDescriptor> {
    if c.peek() == Some('(') {
        c.balanced('(', ')').map(TypeDescriptor::parse)
    } else {
        Some(TypeDescriptor::named("id"))
    }
}

impl Structural for MethodDescriptor {
    fn equivalent(&self, other: &Self) -> bool {
        self.prefix == other.prefix
            && self.key == other.key
            && self.return_type == other.return_type
            && self.arguments.len() == other.arguments.len()
            && self.arguments.iter().zip(&other.arguments).all(|(a, b)| a.ty == b.ty)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.prefix.as_char(), self.return_type)?;
        if !self.takes_arguments() {
            return f.write_str(&self.key);
        }
        let components = self.key.split(':').filter(|s| !s.is_empty());
        for (i, (component, arg)) in components.zip(&self.arguments).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{component}:({}){}", arg.ty, arg.name)?;
        }
        Ok(())
    }
}
