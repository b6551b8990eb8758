//! Human-readable rendering of values.
//!
//! Pointers are followed only at the top level; nested pointers print
//! their address. Slices and maps already being printed render as `[...]`
//! when reached again, so rendering a cyclic graph always terminates.

use std::fmt;

use crate::value::Value;

struct Printer {
    /// Cell addresses of the slices and maps currently being printed.
    active: Vec<usize>,
}

impl Printer {
    fn write(&mut self, f: &mut fmt::Formatter<'_>, v: &Value, depth: usize) -> fmt::Result {
        match v {
            Value::Nil => f.write_str("<nil>"),
            Value::Invalid => f.write_str("<invalid>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(_, i) => write!(f, "{i}"),
            Value::Uint(_, u) => write!(f, "{u}"),
            Value::Float(_, x) => write!(f, "{x}"),
            Value::Complex(_, c) => write!(f, "{c}"),
            Value::String(s) => f.write_str(s),
            Value::UnsafePointer(addr) => write!(f, "{addr:#x}"),
            Value::Chan(c) => match c.addr() {
                Some(addr) => write!(f, "{addr:#x}"),
                None => f.write_str("<nil>"),
            },
            Value::Func(func) => match func.addr() {
                Some(addr) => write!(f, "fn@{addr:#x}"),
                None => f.write_str("<nil>"),
            },
            Value::Interface(None) => f.write_str("<nil>"),
            Value::Interface(Some(inner)) => self.write(f, inner, depth),
            Value::Ptr(p) => match (p.get(), p.addr()) {
                (Some(target), _) if depth == 0 => {
                    f.write_str("&")?;
                    self.write(f, &target, depth + 1)
                }
                (_, Some(addr)) => write!(f, "{addr:#x}"),
                _ => f.write_str("<nil>"),
            },
            Value::Array(a) => self.write_seq(f, a.items(), depth),
            Value::Slice(s) => {
                let (Some(items), Some(addr)) = (s.items(), s.addr()) else {
                    return f.write_str("[]");
                };
                if self.active.contains(&addr) {
                    return f.write_str("[...]");
                }
                self.active.push(addr);
                let result = self.write_seq(f, &items, depth);
                self.active.pop();
                result
            }
            Value::Map(m) => {
                let (Some(entries), Some(addr)) = (m.entries(), m.addr()) else {
                    return f.write_str("map[]");
                };
                if self.active.contains(&addr) {
                    return f.write_str("map[...]");
                }
                self.active.push(addr);
                f.write_str("map[")?;
                let mut result = Ok(());
                for (i, (k, val)) in entries.iter().enumerate() {
                    if i > 0 {
                        result = f.write_str(" ");
                    }
                    result = result
                        .and_then(|()| self.write(f, k, depth + 1))
                        .and_then(|()| f.write_str(":"))
                        .and_then(|()| self.write(f, val, depth + 1));
                    if result.is_err() {
                        break;
                    }
                }
                self.active.pop();
                result.and_then(|()| f.write_str("]"))
            }
            Value::Struct(s) => {
                write!(f, "{}{{", s.name())?;
                for (i, (name, val)) in s.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}:")?;
                    self.write(f, val, depth + 1)?;
                }
                f.write_str("}")
            }
        }
    }

    fn write_seq(
        &mut self,
        f: &mut fmt::Formatter<'_>,
        items: &[Value],
        depth: usize,
    ) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            self.write(f, item, depth + 1)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { active: Vec::new() }.write(f, self, 0)
    }
}
