// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Fun language.
// Defines the structure of parsed Fun programs.
//
// The tree is position-free and immutable once built: every node owns its
// children, nothing is shared and there are no back-references. Expressions
// (Expr) produce integers, statements (Stmt) perform actions; an expression
// may appear wherever a statement is expected.
//
// All node types derive serde traits so a tree produced by an external front
// end can be handed to the interpreter as JSON.

use serde::{Deserialize, Serialize};

/// A name as written in the source: a variable, function or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// Binary operators, in the order the grammar lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl BinaryOp {
    /// Maps an operator token to its operator
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            ">" => BinaryOp::Gt,
            "<" => BinaryOp::Lt,
            ">=" => BinaryOp::Ge,
            "<=" => BinaryOp::Le,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Program root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub body: Block,
}

impl File {
    pub fn new(body: Block) -> Self {
        File { body }
    }

    /// Every name the program declares anywhere: functions, parameters and variables.
    ///
    /// Used for "did you mean" suggestions; scoping is deliberately ignored.
    pub fn declared_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_declared(&self.body, &mut names);
        names.sort();
        names.dedup();
        names
    }
}

fn collect_declared(block: &Block, names: &mut Vec<String>) {
    for stmt in &block.statements {
        match stmt {
            Stmt::Function(function) => {
                names.push(function.name.name.clone());
                names.extend(function.parameters.iter().map(|p| p.name.clone()));
                collect_declared(&function.body, names);
            }
            Stmt::Variable { name, .. } => names.push(name.name.clone()),
            Stmt::While { body, .. } => collect_declared(body, names),
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                collect_declared(then_body, names);
                if let Some(else_body) = else_body {
                    collect_declared(else_body, names);
                }
            }
            Stmt::Assignment { .. } | Stmt::Return { .. } | Stmt::Expr { .. } => {}
        }
    }
}

/// A sequence of statements; evaluating it opens a new lexical scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block { statements }
    }
}

/// A function definition. Evaluating it only registers it; the body runs on call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Block,
}

impl Function {
    pub fn new(name: impl Into<String>, parameters: &[&str], body: Block) -> Self {
        Function {
            name: Identifier::new(name),
            parameters: parameters.iter().map(|p| Identifier::new(*p)).collect(),
            body,
        }
    }
}

/// Represents a statement in Fun - an action or declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Function(Function),
    Variable {
        name: Identifier,
        initializer: Option<Expr>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    If {
        condition: Expr,
        then_body: Block,
        else_body: Option<Block>,
    },
    Assignment {
        target: Identifier,
        value: Expr,
    },
    Return {
        value: Expr,
    },
    /// Expression evaluated for its side effects
    #[allow(clippy::enum_variant_names)]
    Expr {
        expr: Expr,
    },
}

impl Stmt {
    pub fn variable(name: &str, initializer: Option<Expr>) -> Self {
        Stmt::Variable {
            name: Identifier::new(name),
            initializer,
        }
    }

    pub fn assign(target: &str, value: Expr) -> Self {
        Stmt::Assignment {
            target: Identifier::new(target),
            value,
        }
    }

    pub fn ret(value: Expr) -> Self {
        Stmt::Return { value }
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr { expr }
    }
}

/// Represents an expression in Fun - something that evaluates to an integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Call {
        callee: Identifier,
        arguments: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Identifier {
        name: Identifier,
    },
    /// Decimal text as written; range checking happens at evaluation time
    Literal {
        text: String,
    },
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Identifier {
            name: Identifier::new(name),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Expr::Literal { text: text.into() }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(callee: &str, arguments: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Identifier::new(callee),
            arguments,
        }
    }
}
