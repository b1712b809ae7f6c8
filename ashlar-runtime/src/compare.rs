//! Per-mode value comparers.
//!
//! [`get`] hands out the singleton comparer for a mode. All modes satisfy
//! the invariant that `equals(x, y)` implies `compare(x, y) == Equal`; the
//! converse fails in numeric mode, where NaN ties in `compare` (sorting
//! last) but never equals anything.

use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::LazyLock;

use ordered_float::OrderedFloat;

use crate::error::Result;
use crate::runtime::Runtime;
use crate::value::Any;

/// How values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareMode {
    /// Type-appropriate: numeric across the numeric tags, ordinal for
    /// strings, reference identity for objects.
    Default,
    /// Both operands coerce to float.
    Numeric,
    /// Both operands coerce to string; ordinal comparison.
    String,
    /// Ordinal, ignoring case.
    StringIgnoreCase,
}

/// Comparison, equality, hashing and the derived sequence searches.
pub trait AnyCompare {
    /// Three-way comparison.
    fn compare(&self, a: &Any, b: &Any) -> Ordering;

    /// Equality; not necessarily `compare == Equal` (NaN).
    fn equals(&self, a: &Any, b: &Any) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// First index holding a value equal to `value`.
    fn index_of(&self, items: &[Any], value: &Any) -> Option<usize> {
        items.iter().position(|item| self.equals(item, value))
    }

    /// Last index holding a value equal to `value`.
    fn last_index_of(&self, items: &[Any], value: &Any) -> Option<usize> {
        items.iter().rposition(|item| self.equals(item, value))
    }

    /// Element-wise equality of two spans.
    fn sequence_equal(&self, a: &[Any], b: &[Any]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.equals(x, y))
    }
}

/// The singleton comparer for a mode.
pub fn get(mode: CompareMode) -> &'static Comparer {
    static DEFAULT: Comparer = Comparer {
        mode: CompareMode::Default,
    };
    static NUMERIC: Comparer = Comparer {
        mode: CompareMode::Numeric,
    };
    static STRING: Comparer = Comparer {
        mode: CompareMode::String,
    };
    static STRING_IGNORE_CASE: Comparer = Comparer {
        mode: CompareMode::StringIgnoreCase,
    };
    match mode {
        CompareMode::Default => &DEFAULT,
        CompareMode::Numeric => &NUMERIC,
        CompareMode::String => &STRING,
        CompareMode::StringIgnoreCase => &STRING_IGNORE_CASE,
    }
}

/// A mode-driven comparer.
#[derive(Debug)]
pub struct Comparer {
    mode: CompareMode,
}

static HASH_STATE: LazyLock<ahash::RandomState> = LazyLock::new(ahash::RandomState::new);

impl Comparer {
    /// A hash consistent with this comparer's equality.
    pub fn hash(&self, value: &Any) -> u64 {
        let mut hasher = HASH_STATE.build_hasher();
        match self.mode {
            CompareMode::Numeric => OrderedFloat(value.to_number()).hash(&mut hasher),
            CompareMode::String => value.to_string_value().hash(&mut hasher),
            CompareMode::StringIgnoreCase => {
                value.to_string_value().to_lowercase().hash(&mut hasher)
            }
            CompareMode::Default => match value {
                Any::Undefined => 0u8.hash(&mut hasher),
                Any::Null => 1u8.hash(&mut hasher),
                Any::Boolean(b) => b.hash(&mut hasher),
                // the numeric tags hash alike so 1, 1u and 1.0 agree
                Any::Int(_) | Any::Uint(_) | Any::Number(_) => {
                    OrderedFloat(value.to_number()).hash(&mut hasher)
                }
                Any::String(s) => s.hash(&mut hasher),
                Any::Object(o) => (Arc::as_ptr(o) as usize).hash(&mut hasher),
            },
        }
        hasher.finish()
    }
}

// numeric total order: NaN ties with NaN and sorts after everything else
fn numeric_compare(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap(),
    }
}

fn ignore_case_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn default_rank(value: &Any) -> u8 {
    match value {
        Any::Undefined => 0,
        Any::Null => 1,
        Any::Boolean(_) => 2,
        Any::Int(_) | Any::Uint(_) | Any::Number(_) => 3,
        Any::String(_) => 4,
        Any::Object(_) => 5,
    }
}

impl AnyCompare for Comparer {
    fn compare(&self, a: &Any, b: &Any) -> Ordering {
        match self.mode {
            CompareMode::Numeric => numeric_compare(a.to_number(), b.to_number()),
            CompareMode::String => a.to_string_value().cmp(&b.to_string_value()),
            CompareMode::StringIgnoreCase => {
                ignore_case_compare(&a.to_string_value(), &b.to_string_value())
            }
            CompareMode::Default => {
                let rank = default_rank(a).cmp(&default_rank(b));
                if rank != Ordering::Equal {
                    return rank;
                }
                match (a, b) {
                    (Any::Boolean(x), Any::Boolean(y)) => x.cmp(y),
                    (Any::String(x), Any::String(y)) => x.cmp(y),
                    (Any::Object(x), Any::Object(y)) => {
                        (Arc::as_ptr(x) as usize).cmp(&(Arc::as_ptr(y) as usize))
                    }
                    _ if a.is_numeric() => numeric_compare(a.to_number(), b.to_number()),
                    // undefined/undefined or null/null
                    _ => Ordering::Equal,
                }
            }
        }
    }

    fn equals(&self, a: &Any, b: &Any) -> bool {
        match self.mode {
            // NaN never equals, even though compare ties it
            CompareMode::Numeric => a.to_number() == b.to_number(),
            CompareMode::String => a.to_string_value() == b.to_string_value(),
            CompareMode::StringIgnoreCase => {
                ignore_case_compare(&a.to_string_value(), &b.to_string_value())
                    == Ordering::Equal
            }
            CompareMode::Default => {
                if a.is_numeric() && b.is_numeric() {
                    a.to_number() == b.to_number()
                } else {
                    a.strict_equals(b)
                }
            }
        }
    }
}

/// A comparer over a user-supplied three-way function.
pub struct DelegateComparer {
    func: Arc<dyn Fn(&Any, &Any) -> Ordering + Send + Sync>,
}

impl DelegateComparer {
    /// Wrap a three-way function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Any, &Any) -> Ordering + Send + Sync + 'static,
    {
        DelegateComparer {
            func: Arc::new(func),
        }
    }
}

impl AnyCompare for DelegateComparer {
    fn compare(&self, a: &Any, b: &Any) -> Ordering {
        (self.func)(a, b)
    }
}

/// A comparer over a dynamic function object: both operands are boxed,
/// the function invoked, and only the sign of the numeric return used.
pub struct FunctionComparer {
    function: Any,
}

impl FunctionComparer {
    /// Wrap a callable value.
    pub fn new(function: Any) -> Self {
        FunctionComparer { function }
    }

    /// Three-way comparison through the wrapped function.
    pub fn compare(&self, runtime: &Runtime, a: &Any, b: &Any) -> Result<Ordering> {
        let result =
            runtime.call_function(&self.function, &Any::Null, &[a.clone(), b.clone()])?;
        let sign = result.to_number();
        Ok(if sign > 0.0 {
            Ordering::Greater
        } else if sign < 0.0 {
            Ordering::Less
        } else {
            Ordering::Equal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nan_not_equal() {
        let c = get(CompareMode::Default);
        let nan = Any::Number(f64::NAN);
        assert!(!c.equals(&nan, &nan.clone()));
    }

    #[test]
    fn test_numeric_nan_ties_in_compare_only() {
        let c = get(CompareMode::Numeric);
        let nan = Any::Number(f64::NAN);
        assert_eq!(c.compare(&nan, &nan.clone()), Ordering::Equal);
        assert!(!c.equals(&nan, &nan.clone()));
        // NaN sorts last
        assert_eq!(c.compare(&nan, &Any::Number(1e300)), Ordering::Greater);
    }

    #[test]
    fn test_numeric_coerces_strings() {
        let c = get(CompareMode::Numeric);
        assert!(c.equals(&Any::from("10"), &Any::Number(10.0)));
        assert_eq!(
            c.compare(&Any::from("9"), &Any::from("10")),
            Ordering::Less
        );
    }

    #[test]
    fn test_string_mode_is_ordinal() {
        let c = get(CompareMode::String);
        assert_eq!(c.compare(&Any::from("9"), &Any::from("10")), Ordering::Greater);
        assert!(c.equals(&Any::Int(10), &Any::from("10")));
    }

    #[test]
    fn test_ignore_case() {
        let c = get(CompareMode::StringIgnoreCase);
        assert!(c.equals(&Any::from("ABC"), &Any::from("abc")));
        assert_eq!(c.compare(&Any::from("B"), &Any::from("a")), Ordering::Greater);
    }

    #[test]
    fn test_equals_implies_compare_equal() {
        for mode in [
            CompareMode::Default,
            CompareMode::Numeric,
            CompareMode::String,
            CompareMode::StringIgnoreCase,
        ] {
            let c = get(mode);
            let values = [
                Any::Int(1),
                Any::Number(1.0),
                Any::from("1"),
                Any::Boolean(true),
                Any::Undefined,
            ];
            for a in &values {
                for b in &values {
                    if c.equals(a, b) {
                        assert_eq!(c.compare(a, b), Ordering::Equal, "{:?} vs {:?}", a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_hash_consistent_with_equals() {
        let c = get(CompareMode::Default);
        assert_eq!(c.hash(&Any::Int(1)), c.hash(&Any::Number(1.0)));
        let s = get(CompareMode::StringIgnoreCase);
        assert_eq!(s.hash(&Any::from("AbC")), s.hash(&Any::from("abc")));
    }

    #[test]
    fn test_index_of() {
        let c = get(CompareMode::Numeric);
        let items = [Any::from("1"), Any::Int(2), Any::Number(2.0)];
        assert_eq!(c.index_of(&items, &Any::Int(2)), Some(1));
        assert_eq!(c.last_index_of(&items, &Any::Int(2)), Some(2));
        assert_eq!(c.index_of(&items, &Any::Int(3)), None);
    }

    #[test]
    fn test_sequence_equal() {
        let c = get(CompareMode::Numeric);
        let a = [Any::Int(1), Any::from("2")];
        let b = [Any::Number(1.0), Any::Int(2)];
        assert!(c.sequence_equal(&a, &b));
        assert!(!c.sequence_equal(&a, &b[..1]));
    }

    #[test]
    fn test_function_comparer_uses_sign_only() {
        let rt = Runtime::new();
        let function = rt.new_function(Arc::new(|_rt, _this, args: &[Any]| {
            Ok(Any::Number((args[1].to_number() - args[0].to_number()) * 42.0))
        }));
        let c = FunctionComparer::new(function);
        assert_eq!(
            c.compare(&rt, &Any::Int(1), &Any::Int(2)).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            c.compare(&rt, &Any::Int(2), &Any::Int(2)).unwrap(),
            Ordering::Equal
        );
        // a non-callable comparer raises
        assert!(FunctionComparer::new(Any::Int(1))
            .compare(&rt, &Any::Int(1), &Any::Int(2))
            .is_err());
    }

    #[test]
    fn test_delegate_comparer() {
        let c = DelegateComparer::new(|a: &Any, b: &Any| {
            b.to_number().partial_cmp(&a.to_number()).unwrap()
        });
        assert_eq!(c.compare(&Any::Int(1), &Any::Int(2)), Ordering::Greater);
        assert!(c.equals(&Any::Int(3), &Any::Int(3)));
    }
}
