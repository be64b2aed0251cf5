//! Expansion of syntactic sugar into core terms.

use crate::core::{Erasure, Term};
use crate::env::Index;
use crate::source::ByteRange;

/// The definition that numerals count up from.
pub const NAT_ZERO: &str = "Nat.zero";
/// The definition applied once per unit of a numeral.
pub const NAT_SUCC: &str = "Nat.succ";

/// Expand `#n` into `n` applications of `Nat.succ` to `Nat.zero`. Every node
/// of the expansion is given the range of the literal.
pub fn numeral(range: ByteRange, value: u64) -> Term {
    (0..value).fold(Term::Ref(range, NAT_ZERO.to_owned()), |term, _| {
        Term::App(
            range,
            Erasure::Kept,
            Box::new(Term::Ref(range, NAT_SUCC.to_owned())),
            Box::new(term),
        )
    })
}

/// Expand `A -> B` into a non-dependent function type.
///
/// The domain was parsed outside the self binder, so its free variables are
/// shifted past it. The codomain was already parsed under both binders.
pub fn arrow(range: ByteRange, domain: Term, codomain: Term) -> Term {
    Term::All(
        range,
        Erasure::Kept,
        String::new(),
        String::new(),
        Box::new(domain.shift(1, Index::last())),
        Box::new(codomain),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: ByteRange = ByteRange::new(3, 5);

    fn depth(term: &Term) -> usize {
        match term {
            Term::App(_, _, head, arg) => {
                assert_eq!(**head, Term::Ref(RANGE, NAT_SUCC.to_owned()));
                1 + depth(arg)
            }
            Term::Ref(_, name) => {
                assert_eq!(name, NAT_ZERO);
                0
            }
            term => panic!("unexpected term in numeral: {term:?}"),
        }
    }

    #[test]
    fn zero_is_a_reference() {
        assert_eq!(numeral(RANGE, 0), Term::Ref(RANGE, NAT_ZERO.to_owned()));
    }

    #[test]
    fn numeral_counts_successors() {
        assert_eq!(depth(&numeral(RANGE, 3)), 3);
        assert_eq!(depth(&numeral(RANGE, 12)), 12);
    }

    #[test]
    fn arrow_shifts_only_the_domain() {
        let domain = Term::Var(RANGE, Index::new(0));
        let codomain = Term::Var(RANGE, Index::new(0));

        match &arrow(RANGE, domain, codomain) {
            Term::All(range, Erasure::Kept, self_name, param_name, domain, codomain) => {
                assert_eq!(*range, RANGE);
                assert!(self_name.is_empty() && param_name.is_empty());
                assert_eq!(**domain, Term::Var(RANGE, Index::new(1)));
                assert_eq!(**codomain, Term::Var(RANGE, Index::new(0)));
            }
            term => panic!("expected function type, found {term:?}"),
        }
    }
}
