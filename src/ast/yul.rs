//! Yul trees held by `assembly { ... }` statements.
//!
//! Yul nodes carry no compiler ids, so they live inside their
//! [`InlineAssembly`] node instead of the unit arena.

/// Body of an inline assembly statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAssembly {
    /// Flags such as `"memory-safe"`.
    pub flags: Vec<String>,
    pub body: AssemblyBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyBody {
    Yul(Vec<YulStatement>),
    /// Pre-0.6 compilers only report the block as text.
    Legacy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YulStatement {
    Block(Vec<YulStatement>),
    VariableDeclaration {
        variables: Vec<String>,
        value: Option<YulExpression>,
    },
    Assignment {
        variables: Vec<String>,
        value: YulExpression,
    },
    Expression(YulExpression),
    If {
        condition: YulExpression,
        body: Vec<YulStatement>,
    },
    Switch {
        expression: YulExpression,
        cases: Vec<YulCase>,
    },
    ForLoop {
        pre: Vec<YulStatement>,
        condition: YulExpression,
        post: Vec<YulStatement>,
        body: Vec<YulStatement>,
    },
    FunctionDefinition {
        name: String,
        parameters: Vec<String>,
        returns: Vec<String>,
        body: Vec<YulStatement>,
    },
    Break,
    Continue,
    Leave,
}

/// `case <value> { ... }`, or `default { ... }` when `value` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YulCase {
    pub value: Option<YulLiteral>,
    pub body: Vec<YulStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YulExpression {
    Identifier(String),
    Literal(YulLiteral),
    Call {
        function: String,
        arguments: Vec<YulExpression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YulLiteralKind {
    Number,
    String,
    Bool,
}

impl YulLiteralKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YulLiteral {
    pub kind: YulLiteralKind,
    /// Absent for string literals that are not valid UTF-8.
    pub value: Option<String>,
    pub hex_value: Option<String>,
}
