//! Syntax tree shapes filled in by a grammar on top of [`crate::Parser`].
//!
//! These types carry data only; nothing in this crate builds them.

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BinOpKind {
    Plus,
    Minus,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BinOp {
    pub kind: BinOpKind,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FnCall {
    pub head: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Literal {
    Int(u64),
    Bool(bool),
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Expr {
    BinOp(BinOp),
    FnCall(FnCall),
    /// The address of a named variable.
    Ptr(String),
    /// The value behind a pointer.
    Val(Box<Expr>),
    AsType(Box<Expr>, TypeExpr),
    Ident(String),
    Lit(Literal),
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Stmt {
    Decl(VarDecl),
    Assign { lvalue: Expr, rvalue: Expr },
    If { cond: Expr, stmt: Box<Stmt> },
    Return(Option<Expr>),
    Expr(Expr),
    Break,
    Label { name: String, stmt: Box<Stmt> },
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TypeExpr {
    Int,
    Bool,
    Ptr(Box<TypeExpr>),
    Const(Box<TypeExpr>),
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub is_const: bool,
    pub ty: Option<TypeExpr>,
    pub init: Option<Expr>,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<VarDecl>,
    pub body: Vec<Stmt>,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum DeclKind {
    Var(VarDecl),
    Fn(FnDecl),
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Decl {
    pub is_exported: bool,
    pub kind: DeclKind,
}

/// A source file: its top-level declarations in order.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Module {
    pub decls: Vec<Decl>,
}

#[cfg(test)]
mod test {
    use crate::ast::*;
    use assert_matches::assert_matches;

    #[test]
    pub fn nested_shapes() {
        // export fn inc(x: ptr int) { *x = *x + 1; }
        let deref = || Expr::Val(Box::new(Expr::Ident("x".into())));
        let module = Module {
            decls: vec![Decl {
                is_exported: true,
                kind: DeclKind::Fn(FnDecl {
                    name: "inc".into(),
                    params: vec![VarDecl {
                        name: "x".into(),
                        is_const: false,
                        ty: Some(TypeExpr::Ptr(Box::new(TypeExpr::Int))),
                        init: None,
                    }],
                    body: vec![Stmt::Assign {
                        lvalue: deref(),
                        rvalue: Expr::BinOp(BinOp {
                            kind: BinOpKind::Plus,
                            left: Box::new(deref()),
                            right: Box::new(Expr::Lit(Literal::Int(1))),
                        }),
                    }],
                }),
            }],
        };
        assert_matches!(
            &module.decls[0].kind,
            DeclKind::Fn(FnDecl { body, .. }) if body.len() == 1
        );
        assert_eq!(module.clone(), module);
    }
}
