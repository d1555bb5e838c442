//! Just enough of a Lua AST to print the spritesheet description as a Lua
//! module that returns a table.

use std::fmt::{self, Write};

trait FmtLua {
    fn fmt_lua(&self, output: &mut LuaStream<'_>) -> fmt::Result;

    fn fmt_table_key(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        write!(output, "[")?;
        self.fmt_lua(output)?;
        write!(output, "]")
    }
}

macro_rules! proxy_display {
    ( $target: ty ) => {
        impl fmt::Display for $target {
            fn fmt(&self, output: &mut fmt::Formatter) -> fmt::Result {
                let mut stream = LuaStream::new(output);
                FmtLua::fmt_lua(self, &mut stream)
            }
        }
    };
}

pub struct Block {
    pub statements: Vec<Statement>,
}

impl FmtLua for Block {
    fn fmt_lua(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        for statement in &self.statements {
            statement.fmt_lua(output)?;
            writeln!(output)?;
        }

        Ok(())
    }
}

proxy_display!(Block);

pub enum Statement {
    Comment(String),
    Return(Literal),
}

impl FmtLua for Statement {
    fn fmt_lua(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => write!(output, "-- {}", text),
            Self::Return(literal) => {
                write!(output, "return ")?;
                literal.fmt_lua(output)
            }
        }
    }
}

pub enum Literal {
    String(String),
    Integer(u64),
    Table(TableLiteral),
}

impl FmtLua for Literal {
    fn fmt_lua(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        match self {
            Self::String(inner) => inner.fmt_lua(output),
            Self::Integer(inner) => write!(output, "{}", inner),
            Self::Table(inner) => inner.fmt_lua(output),
        }
    }

    fn fmt_table_key(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        match self {
            Self::String(inner) => inner.fmt_table_key(output),
            Self::Integer(inner) => write!(output, "[{}]", inner),
            Self::Table(inner) => inner.fmt_table_key(output),
        }
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&'_ str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Self::Integer(u64::from(value))
    }
}

impl From<TableLiteral> for Literal {
    fn from(value: TableLiteral) -> Self {
        Self::Table(value)
    }
}

impl FmtLua for String {
    fn fmt_lua(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        write!(output, "\"")?;

        for c in self.chars() {
            match c {
                '"' => write!(output, "\\\"")?,
                '\\' => write!(output, "\\\\")?,
                '\n' => write!(output, "\\n")?,
                other => output.write_char(other)?,
            }
        }

        write!(output, "\"")
    }

    fn fmt_table_key(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        if is_valid_ident(self) {
            write!(output, "{}", self)
        } else {
            write!(output, "[")?;
            self.fmt_lua(output)?;
            write!(output, "]")
        }
    }
}

#[derive(Default)]
pub struct TableLiteral {
    pub entries: Vec<(Literal, Literal)>,
}

impl TableLiteral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<Literal>, V: Into<Literal>>(mut self, key: K, value: V) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }
}

impl FmtLua for TableLiteral {
    fn fmt_lua(&self, output: &mut LuaStream<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(output, "{{}}");
        }

        writeln!(output, "{{")?;
        output.indent();

        for (key, value) in &self.entries {
            key.fmt_table_key(output)?;
            write!(output, " = ")?;
            value.fmt_lua(output)?;
            writeln!(output, ",")?;
        }

        output.unindent();
        write!(output, "}}")
    }
}

/// Tells whether the given string can be used as a bare Lua table key.
fn is_valid_ident(value: &str) -> bool {
    let mut chars = value.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_keyword(value)
}

fn is_keyword(value: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
        "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
    ];

    KEYWORDS.contains(&value)
}

struct LuaStream<'a> {
    indent_level: usize,
    is_start_of_line: bool,
    inner: &'a mut (dyn fmt::Write + 'a),
}

impl fmt::Write for LuaStream<'_> {
    fn write_str(&mut self, value: &str) -> fmt::Result {
        let mut is_first_line = true;

        for line in value.split('\n') {
            if is_first_line {
                is_first_line = false;
            } else {
                self.line()?;
            }

            if !line.is_empty() {
                if self.is_start_of_line {
                    self.is_start_of_line = false;
                    let indentation = "\t".repeat(self.indent_level);
                    self.inner.write_str(&indentation)?;
                }

                self.inner.write_str(line)?;
            }
        }

        Ok(())
    }
}

impl<'a> LuaStream<'a> {
    fn new(inner: &'a mut (dyn fmt::Write + 'a)) -> Self {
        LuaStream {
            indent_level: 0,
            is_start_of_line: true,
            inner,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn unindent(&mut self) {
        assert!(self.indent_level > 0);
        self.indent_level -= 1;
    }

    fn line(&mut self) -> fmt::Result {
        self.is_start_of_line = true;
        self.inner.write_str("\n")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_tables() {
        let block = Block {
            statements: vec![
                Statement::Comment("generated".to_owned()),
                Statement::Return(
                    TableLiteral::new()
                        .with("Width", 64u32)
                        .with("icon-small", TableLiteral::new().with("X", 3u32))
                        .with("empty", TableLiteral::new())
                        .into(),
                ),
            ],
        };

        assert_eq!(
            block.to_string(),
            "-- generated\n\
             return {\n\
             \tWidth = 64,\n\
             \t[\"icon-small\"] = {\n\
             \t\tX = 3,\n\
             \t},\n\
             \tempty = {},\n\
             }\n"
        );
    }

    #[test]
    fn strings_are_escaped() {
        let block = Block {
            statements: vec![Statement::Return(Literal::from("say \"hi\"\\"))],
        };

        assert_eq!(block.to_string(), "return \"say \\\"hi\\\"\\\\\"\n");
    }

    #[test]
    fn keywords_are_not_bare_keys() {
        assert!(is_valid_ident("hero_idle_01"));
        assert!(!is_valid_ident("end"));
        assert!(!is_valid_ident("1up"));
        assert!(!is_valid_ident("ui/button"));
    }
}
