//! # List Rules
//!
//! A list rule applies a wrapped rule to every element of a value that may
//! arrive either as a sequence or as a single scalar, then orders the
//! result according to its [`Multiplicity`].
//!
//! ## Scalar vs sequence
//!
//! The decision is made on runtime shape alone:
//!
//! - an empty `List` is an empty result, no element is validated;
//! - a `List` of printable character codes is text spelled as integers and
//!   counts as *one* scalar;
//! - any other `List` is the sequence of elements;
//! - every other term is one scalar.
//!
//! The char-list case is a known surprise: `list(integer)` applied to
//! `[104, 105]` sees the text `"hi"`, not two integers, and fails.

use termcheck_core::{is_char_list, Term};

use crate::rule::Multiplicity;

/// Split a raw value into the elements a list rule validates.
pub fn elements(value: &Term) -> Vec<Term> {
    match value {
        Term::List(items) if items.is_empty() => Vec::new(),
        Term::List(items) if !is_char_list(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Order validated elements according to `discipline`.
pub fn apply_discipline(mut items: Vec<Term>, discipline: Multiplicity) -> Vec<Term> {
    match discipline {
        Multiplicity::Ordered => {}
        Multiplicity::Sorted => items.sort_by(Term::total_cmp),
        Multiplicity::Unique => {
            items.sort_by(Term::total_cmp);
            items.dedup_by(|a, b| a.total_cmp(b).is_eq());
        }
    }
    items
}

/// Validate every element of `value` with `validate_one`, stopping at the
/// first failure, and return the ordered result.
///
/// `validate_one` returns `Ok(None)` to drop an element.
///
/// # Errors
///
/// Propagates the first element error unchanged.
pub fn validate_list<E, F>(value: &Term, discipline: Multiplicity, mut validate_one: F) -> Result<Term, E>
where
    F: FnMut(&Term) -> Result<Option<Term>, E>,
{
    let mut out = Vec::new();
    for element in elements(value) {
        if let Some(coerced) = validate_one(&element)? {
            out.push(coerced);
        }
    }
    Ok(Term::List(apply_discipline(out, discipline)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{validate, Invalid};
    use crate::rule::TypeTag;

    fn ints(values: &[i64]) -> Term {
        Term::List(values.iter().copied().map(Term::Int).collect())
    }

    fn run(value: &Term, discipline: Multiplicity) -> Result<Term, Invalid> {
        validate_list(value, discipline, |e| validate(&TypeTag::Integer, e).map(Some))
    }

    #[test]
    fn test_ordered_preserves_input_order() {
        assert_eq!(run(&ints(&[3, 1, 2]), Multiplicity::Ordered).unwrap(), ints(&[3, 1, 2]));
    }

    #[test]
    fn test_sorted() {
        assert_eq!(run(&ints(&[3, 1, 2]), Multiplicity::Sorted).unwrap(), ints(&[1, 2, 3]));
    }

    #[test]
    fn test_unique() {
        assert_eq!(run(&ints(&[1, 1, 2]), Multiplicity::Unique).unwrap(), ints(&[1, 2]));
    }

    #[test]
    fn test_scalar_is_wrapped() {
        assert_eq!(
            run(&Term::Int(5), Multiplicity::Ordered).unwrap(),
            run(&ints(&[5]), Multiplicity::Ordered).unwrap()
        );
    }

    #[test]
    fn test_empty_list_skips_validation() {
        let result: Result<Term, Invalid> =
            validate_list(&Term::List(vec![]), Multiplicity::Ordered, |_| {
                panic!("no element should be validated")
            });
        assert_eq!(result.unwrap(), Term::List(vec![]));
    }

    #[test]
    fn test_char_list_is_one_scalar() {
        let text = Term::List("hi".chars().map(|c| Term::Int(c as i64)).collect());
        assert_eq!(elements(&text), vec![text.clone()]);
        assert!(run(&text, Multiplicity::Ordered).is_err());
    }

    #[test]
    fn test_first_failure_aborts() {
        let mut seen = 0;
        let value = Term::List(vec![Term::Int(1), Term::atom("x"), Term::Int(3)]);
        let result = validate_list(&value, Multiplicity::Ordered, |e| {
            seen += 1;
            validate(&TypeTag::Integer, e).map(Some)
        });
        assert!(result.is_err());
        assert_eq!(seen, 2);
    }
}
