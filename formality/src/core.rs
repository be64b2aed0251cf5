//! Core language.
//!
//! This is the term representation handed to the type checker. Names survive
//! only on binders; variable occurrences are [de Bruijn indices][Index] and
//! top-level definitions are referred to by name.

use fxhash::FxHashMap;

use crate::env::Index;
use crate::source::ByteRange;

pub mod pretty;

/// Whether a binder or argument carries run-time content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erasure {
    Kept,
    Erased,
}

/// Core language terms.
///
/// Numerals expand to application chains as deep as the number they stand
/// for, so traversals over terms keep their own stacks instead of recursing.
#[derive(Debug, Clone)]
pub enum Term {
    /// Bound variable occurrences, counted from the innermost binder.
    Var(ByteRange, Index),
    /// References to top-level definitions.
    Ref(ByteRange, String),
    /// The type of types.
    Typ(ByteRange),
    /// Dependent function types.
    ///
    /// The self name is bound in the domain. Both the self name and the
    /// parameter name are bound in the codomain, the parameter innermost.
    All(ByteRange, Erasure, String, String, Box<Term>, Box<Term>),
    /// Function literals.
    Lam(ByteRange, Erasure, String, Box<Term>),
    /// Function applications.
    App(ByteRange, Erasure, Box<Term>, Box<Term>),
    /// Let expressions. The name is bound in the body only.
    Let(ByteRange, String, Box<Term>, Box<Term>),
    /// Annotated expressions.
    Ann(ByteRange, Erasure, Box<Term>, Box<Term>),
}

/// Pending work for [`Term::shift`].
enum Shift<'term> {
    /// Shift a subterm, with the cutoff in effect at that subterm.
    Visit(&'term Term, Index),
    /// Rebuild a node from the shifted children on top of the output stack.
    Rebuild(&'term Term),
}

impl Term {
    /// Get the source range of the term.
    pub fn range(&self) -> ByteRange {
        match self {
            Term::Var(range, _)
            | Term::Ref(range, _)
            | Term::Typ(range)
            | Term::All(range, _, _, _, _, _)
            | Term::Lam(range, _, _, _)
            | Term::App(range, _, _, _)
            | Term::Let(range, _, _, _)
            | Term::Ann(range, _, _, _) => *range,
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self, Term::Var(_, _) | Term::Ref(_, _) | Term::Typ(_))
    }

    /// Shift every free variable at or above `cutoff` by `delta`.
    ///
    /// The cutoff grows by one for every binder that is passed under, so that
    /// variables bound inside the term are left alone.
    pub fn shift(&self, delta: i32, cutoff: Index) -> Term {
        let mut pending = vec![Shift::Visit(self, cutoff)];
        let mut shifted = Vec::new();

        while let Some(work) = pending.pop() {
            match work {
                Shift::Visit(term, cutoff) => match term {
                    Term::Var(range, index) if *index >= cutoff => {
                        shifted.push(Term::Var(*range, index.shift(delta)));
                    }
                    Term::Var(_, _) | Term::Ref(_, _) | Term::Typ(_) => shifted.push(term.clone()),
                    // Children are visited in order, so they are rebuilt in reverse.
                    Term::All(_, _, _, _, domain, codomain) => pending.extend([
                        Shift::Rebuild(term),
                        Shift::Visit(codomain, cutoff.prev().prev()),
                        Shift::Visit(domain, cutoff.prev()),
                    ]),
                    Term::Lam(_, _, _, body) => {
                        pending.extend([Shift::Rebuild(term), Shift::Visit(body, cutoff.prev())]);
                    }
                    Term::App(_, _, head, arg) => pending.extend([
                        Shift::Rebuild(term),
                        Shift::Visit(arg, cutoff),
                        Shift::Visit(head, cutoff),
                    ]),
                    Term::Let(_, _, value, body) => pending.extend([
                        Shift::Rebuild(term),
                        Shift::Visit(body, cutoff.prev()),
                        Shift::Visit(value, cutoff),
                    ]),
                    Term::Ann(_, _, term0, r#type) => pending.extend([
                        Shift::Rebuild(term),
                        Shift::Visit(r#type, cutoff),
                        Shift::Visit(term0, cutoff),
                    ]),
                },
                Shift::Rebuild(term) => {
                    let mut child = || match shifted.pop() {
                        Some(child) => Box::new(child),
                        None => unreachable!("shifted child missing"),
                    };
                    let rebuilt = match term {
                        Term::All(range, erasure, self_name, param_name, _, _) => {
                            let codomain = child();
                            let domain = child();
                            let (self_name, param_name) = (self_name.clone(), param_name.clone());
                            Term::All(*range, *erasure, self_name, param_name, domain, codomain)
                        }
                        Term::Lam(range, erasure, param_name, _) => {
                            Term::Lam(*range, *erasure, param_name.clone(), child())
                        }
                        Term::App(range, erasure, _, _) => {
                            let arg = child();
                            let head = child();
                            Term::App(*range, *erasure, head, arg)
                        }
                        Term::Let(range, name, _, _) => {
                            let body = child();
                            let value = child();
                            Term::Let(*range, name.clone(), value, body)
                        }
                        Term::Ann(range, erasure, _, _) => {
                            let r#type = child();
                            let term = child();
                            Term::Ann(*range, *erasure, term, r#type)
                        }
                        Term::Var(_, _) | Term::Ref(_, _) | Term::Typ(_) => {
                            unreachable!("leaves are never rebuilt")
                        }
                    };
                    shifted.push(rebuilt);
                }
            }
        }

        match shifted.pop() {
            Some(term) => term,
            None => unreachable!("shift produced no term"),
        }
    }

    /// Returns true if the free variable `var` occurs in the term.
    pub fn occurs(&self, var: Index) -> bool {
        let mut pending = vec![(self, var)];

        while let Some((term, var)) = pending.pop() {
            match term {
                Term::Var(_, index) if *index == var => return true,
                Term::Var(_, _) | Term::Ref(_, _) | Term::Typ(_) => {}
                Term::All(_, _, _, _, domain, codomain) => {
                    pending.extend([(&**domain, var.prev()), (&**codomain, var.prev().prev())]);
                }
                Term::Lam(_, _, _, body) => pending.push((&**body, var.prev())),
                Term::App(_, _, head, arg) => pending.extend([(&**head, var), (&**arg, var)]),
                Term::Let(_, _, value, body) => {
                    pending.extend([(&**value, var), (&**body, var.prev())]);
                }
                Term::Ann(_, _, term, r#type) => pending.extend([(&**term, var), (&**r#type, var)]),
            }
        }

        false
    }

    /// Move the children that have children of their own onto `stack`,
    /// leaving this node shallow.
    fn take_children(&mut self, stack: &mut Vec<Term>) {
        let mut take = |child: &mut Box<Term>| {
            if !child.is_leaf() {
                let range = child.range();
                stack.push(std::mem::replace(&mut **child, Term::Typ(range)));
            }
        };

        match self {
            Term::Var(_, _) | Term::Ref(_, _) | Term::Typ(_) => {}
            Term::Lam(_, _, _, body) => take(body),
            Term::All(_, _, _, _, term0, term1)
            | Term::App(_, _, term0, term1)
            | Term::Let(_, _, term0, term1)
            | Term::Ann(_, _, term0, term1) => {
                take(term0);
                take(term1);
            }
        }
    }
}

impl Drop for Term {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(mut term) = stack.pop() {
            term.take_children(&mut stack);
        }
    }
}

impl PartialEq for Term {
    /// Ignores source location metadata.
    fn eq(&self, other: &Term) -> bool {
        let mut pending = vec![(self, other)];

        while let Some(pair) = pending.pop() {
            match pair {
                (Term::Var(_, index0), Term::Var(_, index1)) if index0 == index1 => {}
                (Term::Ref(_, name0), Term::Ref(_, name1)) if name0 == name1 => {}
                (Term::Typ(_), Term::Typ(_)) => {}
                (
                    Term::All(_, erasure0, self_name0, param_name0, domain0, codomain0),
                    Term::All(_, erasure1, self_name1, param_name1, domain1, codomain1),
                ) if erasure0 == erasure1
                    && self_name0 == self_name1
                    && param_name0 == param_name1 =>
                {
                    pending.extend([(&**domain0, &**domain1), (&**codomain0, &**codomain1)]);
                }
                (
                    Term::Lam(_, erasure0, param_name0, body0),
                    Term::Lam(_, erasure1, param_name1, body1),
                ) if erasure0 == erasure1 && param_name0 == param_name1 => {
                    pending.push((&**body0, &**body1));
                }
                (Term::App(_, erasure0, head0, arg0), Term::App(_, erasure1, head1, arg1))
                    if erasure0 == erasure1 =>
                {
                    pending.extend([(&**head0, &**head1), (&**arg0, &**arg1)]);
                }
                (Term::Let(_, name0, value0, body0), Term::Let(_, name1, value1, body1))
                    if name0 == name1 =>
                {
                    pending.extend([(&**value0, &**value1), (&**body0, &**body1)]);
                }
                (Term::Ann(_, erasure0, term0, type0), Term::Ann(_, erasure1, term1, type1))
                    if erasure0 == erasure1 =>
                {
                    pending.extend([(&**term0, &**term1), (&**type0, &**type1)]);
                }
                (_, _) => return false,
            }
        }

        true
    }
}

/// Annotations consumed by the type checker and normaliser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meta {
    /// The definition is allowed to be non-terminating.
    pub r#loop: bool,
    /// The definition is opaque to reduction.
    pub prim: bool,
}

/// Top-level definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// The declared type of the definition
    pub r#type: Term,
    /// The defined expression
    pub body: Term,
    pub meta: Meta,
}

/// Definitions keyed by name. Later definitions replace earlier ones.
pub type Definitions = FxHashMap<String, Definition>;

#[cfg(test)]
mod tests {
    use super::*;

    const NOWHERE: ByteRange = ByteRange::new(0, 0);

    fn var(index: u32) -> Term {
        Term::Var(NOWHERE, Index::new(index))
    }

    fn lam(name: &str, body: Term) -> Term {
        Term::Lam(NOWHERE, Erasure::Kept, name.to_owned(), Box::new(body))
    }

    fn app(head: Term, arg: Term) -> Term {
        Term::App(NOWHERE, Erasure::Kept, Box::new(head), Box::new(arg))
    }

    #[test]
    fn shift_skips_bound_variables() {
        // (x) => x(1)
        let term = lam("x", app(var(0), var(1)));

        assert_eq!(
            term.shift(1, Index::last()),
            lam("x", app(var(0), var(2))),
        );
    }

    #[test]
    fn shift_respects_cutoff() {
        let term = app(var(0), var(3));

        assert_eq!(term.shift(1, Index::new(1)), app(var(0), var(4)));
        assert_eq!(term.shift(-1, Index::new(1)), app(var(0), var(2)));
    }

    #[test]
    fn shift_passes_two_binders_in_codomain() {
        let term = Term::All(
            NOWHERE,
            Erasure::Kept,
            String::new(),
            String::new(),
            Box::new(var(1)),
            Box::new(var(2)),
        );

        let expected = Term::All(
            NOWHERE,
            Erasure::Kept,
            String::new(),
            String::new(),
            Box::new(var(2)),
            Box::new(var(3)),
        );
        assert_eq!(term.shift(1, Index::last()), expected);
    }

    #[test]
    fn shift_let_value_is_outside_binder() {
        let term = Term::Let(NOWHERE, "x".to_owned(), Box::new(var(0)), Box::new(var(0)));

        let expected = Term::Let(NOWHERE, "x".to_owned(), Box::new(var(1)), Box::new(var(0)));
        assert_eq!(term.shift(1, Index::last()), expected);
    }

    #[test]
    fn occurs_tracks_binders() {
        let term = lam("x", app(var(0), var(1)));

        assert!(term.occurs(Index::new(0)));
        assert!(!term.occurs(Index::new(1)));
    }

    #[test]
    fn equality_ignores_ranges() {
        let left = Term::Ref(ByteRange::new(0, 8), "Nat.zero".to_owned());
        let right = Term::Ref(ByteRange::new(12, 20), "Nat.zero".to_owned());

        assert_eq!(left, right);
        assert_ne!(left, Term::Typ(NOWHERE));
    }

    #[test]
    fn equality_distinguishes_erasure() {
        let kept = Term::App(NOWHERE, Erasure::Kept, Box::new(var(0)), Box::new(var(1)));
        let erased = Term::App(NOWHERE, Erasure::Erased, Box::new(var(0)), Box::new(var(1)));

        assert_ne!(kept, erased);
    }

    const DEEP: u32 = 200_000;

    /// `f(f(...f(x)...))`, nested through the argument.
    fn deep_arg_chain(x: Term) -> Term {
        (0..DEEP).fold(x, |term, _| app(Term::Ref(NOWHERE, "f".to_owned()), term))
    }

    /// `x(a)(a)...(a)`, nested through the head.
    fn deep_head_chain(x: Term) -> Term {
        (0..DEEP).fold(x, |term, _| app(term, Term::Ref(NOWHERE, "a".to_owned())))
    }

    #[test]
    fn deep_terms_are_dropped() {
        drop(deep_arg_chain(var(0)));
        drop(deep_head_chain(var(0)));
        drop(lam("x", deep_arg_chain(deep_head_chain(var(0)))));
    }

    #[test]
    fn deep_terms_are_shifted_and_compared() {
        // Compared with `assert!` so that a failure doesn't print the whole chain
        let shifted = deep_arg_chain(var(3)).shift(1, Index::last());
        assert!(shifted == deep_arg_chain(var(4)));
        assert!(shifted != deep_arg_chain(var(3)));

        let shifted = deep_head_chain(var(0)).shift(-1, Index::new(1));
        assert!(shifted == deep_head_chain(var(0)));
    }

    #[test]
    fn deep_terms_are_searched() {
        let term = deep_arg_chain(deep_head_chain(var(7)));

        assert!(term.occurs(Index::new(7)));
        assert!(!term.occurs(Index::new(6)));
    }
}
