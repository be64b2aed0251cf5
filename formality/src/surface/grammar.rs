//! Term productions.
//!
//! ```text
//! term    ::= base postfix*
//! base    ::= name? ("(" | "<") name? ":" term (")" | ">") "->" term
//!           | ("(" | "<") name? (")" | ">") "=>" term
//!           | "let " name "=" term ";" term
//!           | "(" term ")"
//!           | "Type"
//!           | "#" digits
//!           | name
//! postfix ::= ("(" | "<") term (")" | ">")
//!           | "|" term ";"
//!           | "->" term
//!           | "::" term
//! ```
//!
//! Alternatives are tried in the order listed, and the first that succeeds is
//! taken. Whitespace and comments may appear between any two pieces, except
//! between a self name and its opening bracket, and before the bracket of an
//! application.

use std::str::FromStr;

use crate::core::{Erasure, Term};
use crate::env::{Index, Scope};
use crate::surface::{desugar, lexer, ParseError, Parser, Production};

/// A postfix operator, waiting to be combined with the term to its left.
enum Postfix {
    App(Erasure, Term),
    Pipe(Term),
    Arrow(Term),
    Ann(Term),
}

impl<'source> Parser<'source> {
    /// Parse a term, resolving names against `scope`.
    pub fn term(&mut self, scope: &Scope) -> Result<Term, ParseError> {
        let base: [Production<'source, Term>; 7] = [
            Parser::fun_type,
            Parser::fun_lit,
            Parser::let_expr,
            Parser::paren_expr,
            Parser::universe,
            Parser::numeral,
            Parser::name_expr,
        ];
        let postfix: [Production<'source, Postfix>; 4] = [
            Parser::app_suffix,
            Parser::pipe_suffix,
            Parser::arrow_suffix,
            Parser::ann_suffix,
        ];

        self.skip_trivia();
        let start = self.pos();
        let mut term = self.first_of(scope, &base)?;

        while let Ok(suffix) = self.first_of(scope, &postfix) {
            let range = self.range_from(start);
            term = match suffix {
                Postfix::App(erasure, arg) => {
                    Term::App(range, erasure, Box::new(term), Box::new(arg))
                }
                Postfix::Pipe(arg) => Term::App(range, Erasure::Kept, Box::new(term), Box::new(arg)),
                Postfix::Arrow(codomain) => desugar::arrow(range, term, codomain),
                Postfix::Ann(r#type) => {
                    Term::Ann(range, Erasure::Kept, Box::new(term), Box::new(r#type))
                }
            };
        }

        Ok(term)
    }

    fn open_bracket(&mut self) -> Result<Erasure, ParseError> {
        if self.accept("(") {
            Ok(Erasure::Kept)
        } else if self.accept("<") {
            Ok(Erasure::Erased)
        } else {
            Err(self.error("("))
        }
    }

    fn close_bracket(&mut self, erasure: Erasure) -> Result<(), ParseError> {
        match erasure {
            Erasure::Kept => self.expect(")"),
            Erasure::Erased => self.expect(">"),
        }
    }

    /// `self(x : A) -> B` or `self<x : A> -> B`
    fn fun_type(&mut self, scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        let start = self.pos();
        let self_name = self.name_or_empty();
        let erasure = self.open_bracket()?;
        self.skip_trivia();
        let param_name = self.name_or_empty();
        self.skip_trivia();
        self.expect(":")?;

        let self_scope = scope.push(self_name);
        let domain = self.term(&self_scope)?;
        self.skip_trivia();
        self.close_bracket(erasure)?;
        self.skip_trivia();
        self.expect("->")?;
        let codomain = self.term(&self_scope.push(param_name))?;

        Ok(Term::All(
            self.range_from(start),
            erasure,
            self_name.to_owned(),
            param_name.to_owned(),
            Box::new(domain),
            Box::new(codomain),
        ))
    }

    /// `(x) => b` or `<x> => b`
    fn fun_lit(&mut self, scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        let start = self.pos();
        let erasure = self.open_bracket()?;
        self.skip_trivia();
        let param_name = self.name_or_empty();
        self.skip_trivia();
        self.close_bracket(erasure)?;
        self.skip_trivia();
        self.expect("=>")?;
        let body = self.term(&scope.push(param_name))?;

        Ok(Term::Lam(
            self.range_from(start),
            erasure,
            param_name.to_owned(),
            Box::new(body),
        ))
    }

    /// `let x = v; b`
    fn let_expr(&mut self, scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        let start = self.pos();
        self.expect("let ")?;
        self.skip_trivia();
        let name = self.name()?;
        self.skip_trivia();
        self.expect("=")?;
        let value = self.term(scope)?;
        self.skip_trivia();
        self.expect(";")?;
        let body = self.term(&scope.push(name))?;

        Ok(Term::Let(
            self.range_from(start),
            name.to_owned(),
            Box::new(value),
            Box::new(body),
        ))
    }

    /// `(t)`, which leaves no trace in the result.
    fn paren_expr(&mut self, scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        self.expect("(")?;
        let term = self.term(scope)?;
        self.skip_trivia();
        self.expect(")")?;
        Ok(term)
    }

    fn universe(&mut self, _scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        let start = self.pos();
        match self.remainder().strip_prefix("Type") {
            Some(rest) if !rest.starts_with(lexer::is_name_char) => {
                self.advance("Type".len());
                Ok(Term::Typ(self.range_from(start)))
            }
            _ => Err(self.error("Type")),
        }
    }

    /// `#n`
    fn numeral(&mut self, _scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        let start = self.pos();
        self.expect("#")?;
        self.skip_trivia();
        let digits_pos = self.pos;
        let digits = self.name()?;
        match decimal::<u64>(digits) {
            Some(value) => Ok(desugar::numeral(self.range_from(start), value)),
            None => Err(self.error_at(digits_pos, "digits")),
        }
    }

    /// A name bound in the scope, a raw index, or a reference to a definition.
    fn name_expr(&mut self, scope: &Scope) -> Result<Term, ParseError> {
        self.skip_trivia();
        let start = self.pos();
        let name = self.name()?;
        let range = self.range_from(start);

        Ok(match (scope.lookup(name), decimal::<u32>(name)) {
            (Some(index), _) => Term::Var(range, index),
            (None, Some(raw)) => Term::Var(range, Index::new(raw)),
            (None, None) => Term::Ref(range, name.to_owned()),
        })
    }

    /// `f(a)` or `f<a>`, with the bracket directly after the head.
    fn app_suffix(&mut self, scope: &Scope) -> Result<Postfix, ParseError> {
        let erasure = self.open_bracket()?;
        let arg = self.term(scope)?;
        self.skip_trivia();
        self.close_bracket(erasure)?;
        Ok(Postfix::App(erasure, arg))
    }

    /// `f | a;`
    fn pipe_suffix(&mut self, scope: &Scope) -> Result<Postfix, ParseError> {
        self.skip_trivia();
        self.expect("|")?;
        let arg = self.term(scope)?;
        self.skip_trivia();
        self.expect(";")?;
        Ok(Postfix::Pipe(arg))
    }

    /// `A -> B`. The codomain sits under the two anonymous names of the
    /// function type it stands for.
    fn arrow_suffix(&mut self, scope: &Scope) -> Result<Postfix, ParseError> {
        self.skip_trivia();
        self.expect("->")?;
        let codomain = self.term(&scope.push("").push(""))?;
        Ok(Postfix::Arrow(codomain))
    }

    /// `t :: T`
    fn ann_suffix(&mut self, scope: &Scope) -> Result<Postfix, ParseError> {
        self.skip_trivia();
        self.expect("::")?;
        let r#type = self.term(scope)?;
        Ok(Postfix::Ann(r#type))
    }
}

/// Parse a string made up only of ASCII digits.
fn decimal<T: FromStr>(text: &str) -> Option<T> {
    match text.bytes().all(|byte| byte.is_ascii_digit()) {
        true => text.parse().ok(),
        false => None,
    }
}
