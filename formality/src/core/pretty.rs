//! A pretty printer for the core language.
//!
//! The output is surface syntax: parsing a rendered term in the scope it was
//! rendered in gives back an equal term.
//!
//! Example:
//!
//! ```
//! use formality::core::pretty::Context;
//! use formality::env::Scope;
//! use formality::surface::parse_term;
//!
//! let term = parse_term("(A) => A -> A", &Scope::new()).unwrap();
//! let doc = Context::new().term(&Scope::new(), &term);
//! assert_eq!(doc.pretty(80).to_string(), "(A) => A -> A");
//! ```

use itertools::Itertools;
use pretty::RcDoc;

use crate::core::{Definition, Definitions, Erasure, Term};
use crate::env::{Index, Scope};
use crate::surface::definitions::{LOOP_MARKER, PRIM_MARKER};

/// Term precedences
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    /// Binding forms, arrows and annotations, which extend as far to the
    /// right as they can.
    Top = 0,
    /// Terms that an application, arrow or annotation can follow.
    Postfix,
}

const INDENT: isize = 2;

pub struct Context {}

impl Context {
    pub fn new() -> Context {
        Context {}
    }

    /// Render every definition, ordered by name.
    pub fn definitions(&self, definitions: &Definitions) -> RcDoc<'static> {
        RcDoc::intersperse(
            definitions
                .iter()
                .sorted_by(|(name0, _), (name1, _)| Ord::cmp(name0, name1))
                .map(|(name, definition)| self.definition(name, definition)),
            RcDoc::concat([RcDoc::hardline(), RcDoc::hardline()]),
        )
    }

    pub fn definition(&self, name: &str, definition: &Definition) -> RcDoc<'static> {
        let scope = Scope::new();
        let markers = [
            (definition.meta.r#loop, LOOP_MARKER),
            (definition.meta.prim, PRIM_MARKER),
        ];
        let lines = markers
            .into_iter()
            .filter_map(|(present, marker)| present.then(|| RcDoc::text(marker)))
            .chain([self.term(&scope, &definition.body)]);

        RcDoc::concat([
            RcDoc::text(name.to_owned()),
            RcDoc::space(),
            RcDoc::text(":"),
            RcDoc::space(),
            self.term(&scope, &definition.r#type),
            RcDoc::concat(lines.map(|line| RcDoc::hardline().append(line))).nest(INDENT),
        ])
    }

    pub fn term(&self, scope: &Scope, term: &Term) -> RcDoc<'static> {
        self.term_prec(scope, Prec::Top, term)
    }

    fn term_prec(&self, scope: &Scope, prec: Prec, term: &Term) -> RcDoc<'static> {
        match term {
            Term::Var(_, index) => self.var(scope, *index),
            Term::Ref(_, name) => RcDoc::text(name.clone()),
            Term::Typ(_) => RcDoc::text("Type"),
            Term::All(_, Erasure::Kept, self_name, param_name, domain, codomain)
                if self_name.is_empty()
                    && param_name.is_empty()
                    && !domain.occurs(Index::last()) =>
            {
                let domain = domain.shift(-1, Index::last());
                self.paren(
                    prec > Prec::Top,
                    RcDoc::concat([
                        RcDoc::concat([
                            self.term_prec(scope, Prec::Postfix, &domain),
                            RcDoc::space(),
                            RcDoc::text("->"),
                        ])
                        .group(),
                        RcDoc::softline(),
                        self.term(&scope.push("").push(""), codomain),
                    ]),
                )
            }
            Term::All(_, erasure, self_name, param_name, domain, codomain) => {
                let (open, close) = brackets(*erasure);
                let self_scope = scope.push(self_name.as_str());
                self.paren(
                    prec > Prec::Top,
                    RcDoc::concat([
                        RcDoc::concat([
                            RcDoc::text(self_name.clone()),
                            RcDoc::text(open),
                            RcDoc::text(param_name.clone()),
                            RcDoc::space(),
                            RcDoc::text(":"),
                            RcDoc::space(),
                            self.term(&self_scope, domain),
                            RcDoc::text(close),
                            RcDoc::space(),
                            RcDoc::text("->"),
                        ])
                        .group(),
                        RcDoc::softline(),
                        self.term(&self_scope.push(param_name.as_str()), codomain),
                    ]),
                )
            }
            Term::Lam(_, erasure, param_name, body) => {
                let (open, close) = brackets(*erasure);
                self.paren(
                    prec > Prec::Top,
                    RcDoc::concat([
                        RcDoc::concat([
                            RcDoc::text(open),
                            RcDoc::text(param_name.clone()),
                            RcDoc::text(close),
                            RcDoc::space(),
                            RcDoc::text("=>"),
                        ])
                        .group(),
                        RcDoc::softline(),
                        self.term(&scope.push(param_name.as_str()), body),
                    ]),
                )
            }
            Term::App(_, _, _, _) => self.app(scope, term),
            Term::Let(_, name, value, body) => self.paren(
                prec > Prec::Top,
                RcDoc::concat([
                    RcDoc::concat([
                        RcDoc::text("let"),
                        RcDoc::space(),
                        RcDoc::text(name.clone()),
                        RcDoc::space(),
                        RcDoc::text("="),
                        RcDoc::softline(),
                        self.term(scope, value),
                        RcDoc::text(";"),
                    ])
                    .group(),
                    RcDoc::line(),
                    self.term(&scope.push(name.as_str()), body),
                ])
                .group(),
            ),
            Term::Ann(_, _, term, r#type) => self.paren(
                prec > Prec::Top,
                RcDoc::concat([
                    RcDoc::concat([
                        self.term_prec(scope, Prec::Postfix, term),
                        RcDoc::space(),
                        RcDoc::text("::"),
                    ])
                    .group(),
                    RcDoc::softline(),
                    self.term(scope, r#type),
                ]),
            ),
        }
    }

    /// Render an application spine without recursing along it: heads of
    /// heads become `f(a)(b)`, and a final argument that is itself an
    /// application is continued in the same loop, as in numerals.
    fn app(&self, scope: &Scope, mut term: &Term) -> RcDoc<'static> {
        let mut parts = Vec::new();
        let mut closes = Vec::new();

        loop {
            let mut args = Vec::new();
            let mut head = term;
            while let Term::App(_, erasure, next_head, arg) = head {
                args.push((*erasure, &**arg));
                head = &**next_head;
            }
            parts.push(self.term_prec(scope, Prec::Postfix, head));

            // `args` runs from the outermost application inwards
            let (last_erasure, last_arg) = match args.first() {
                Some(last) => *last,
                None => break,
            };
            for (erasure, arg) in args[1..].iter().rev() {
                let (open, close) = brackets(*erasure);
                parts.extend([RcDoc::text(open), self.term(scope, arg), RcDoc::text(close)]);
            }

            let (open, close) = brackets(last_erasure);
            parts.push(RcDoc::text(open));
            closes.push(close);
            match last_arg {
                Term::App(_, _, _, _) => term = last_arg,
                _ => {
                    parts.push(self.term(scope, last_arg));
                    break;
                }
            }
        }

        parts.extend(closes.into_iter().rev().map(RcDoc::text));
        balanced_concat(parts)
    }

    /// Variables are shown by name when the name resolves back to the same
    /// binder, and as raw indices otherwise.
    fn var(&self, scope: &Scope, index: Index) -> RcDoc<'static> {
        match scope.name(index) {
            Some(name) if is_var_name(name) && scope.lookup(name) == Some(index) => {
                RcDoc::text(name.to_owned())
            }
            _ => RcDoc::text(index.to_string()),
        }
    }

    /// Wrap a document in parens.
    fn paren(&self, wrap: bool, doc: RcDoc<'static>) -> RcDoc<'static> {
        if wrap {
            RcDoc::concat([RcDoc::text("("), doc, RcDoc::text(")")])
        } else {
            doc
        }
    }
}

/// Concatenate documents as a balanced tree. `RcDoc::concat` nests one level
/// per document, which long application spines would overflow on.
fn balanced_concat(mut docs: Vec<RcDoc<'static>>) -> RcDoc<'static> {
    match docs.len() {
        0 => RcDoc::nil(),
        1 => docs.remove(0),
        len => {
            let right = docs.split_off(len / 2);
            balanced_concat(docs).append(balanced_concat(right))
        }
    }
}

fn brackets(erasure: Erasure) -> (&'static str, &'static str) {
    match erasure {
        Erasure::Kept => ("(", ")"),
        Erasure::Erased => ("<", ">"),
    }
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty() && name != "Type"
}
