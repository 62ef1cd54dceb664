//! Positional fan-out of several result sets onto a tuple of element types.

use crate::{MaterializeError, ResultSet, mapper::Materialize, mapper::map_one};

/// A tuple of element types, one per result set of a single execution.
///
/// Implemented for tuples of 2 to 9 [`Materialize`] types. Result set `i`
/// always feeds element type `i`.
pub trait MaterializeMany: Sized {
    type Output;

    const ARITY: usize;

    /// # Errors
    ///
    /// * If `sets.len()` differs from [`Self::ARITY`]
    /// * If any result set failed to map onto its element type
    fn materialize_many(sets: &[ResultSet]) -> Result<Self::Output, MaterializeError>;
}

const fn check_arity(expected: usize, actual: usize) -> Result<(), MaterializeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(MaterializeError::Arity { expected, actual })
    }
}

macro_rules! materialize_many {
    ($arity:literal => $($name:ident : $index:tt),+) => {
        impl<$($name: Materialize),+> MaterializeMany for ($($name,)+) {
            type Output = ($(Vec<$name>,)+);

            const ARITY: usize = $arity;

            fn materialize_many(sets: &[ResultSet]) -> Result<Self::Output, MaterializeError> {
                check_arity(Self::ARITY, sets.len())?;

                Ok(($(map_one::<$name>(&sets[$index])?,)+))
            }
        }
    };
}

materialize_many!(2 => A: 0, B: 1);
materialize_many!(3 => A: 0, B: 1, C: 2);
materialize_many!(4 => A: 0, B: 1, C: 2, D: 3);
materialize_many!(5 => A: 0, B: 1, C: 2, D: 3, E: 4);
materialize_many!(6 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
materialize_many!(7 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
materialize_many!(8 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
materialize_many!(9 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);

/// Maps `sets` positionally onto the element types of `M`.
///
/// ```rust
/// use switchy_materialize::{map_many, row};
///
/// let sets = vec![
///     vec![row!["n" => 1_i32], row!["n" => 2_i32]],
///     vec![row!["s" => "a"]],
/// ];
///
/// let (numbers, strings) = map_many::<(i32, String)>(&sets).unwrap();
/// assert_eq!(numbers, vec![1, 2]);
/// assert_eq!(strings, vec!["a".to_string()]);
/// ```
///
/// # Errors
///
/// * If the number of result sets differs from the tuple's arity
/// * If any result set failed to map onto its element type
pub fn map_many<M: MaterializeMany>(sets: &[ResultSet]) -> Result<M::Output, MaterializeError> {
    M::materialize_many(sets)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Value, row};

    #[test_log::test]
    fn test_arity_mismatch_is_reported_before_mapping() {
        let sets = vec![vec![row!["a" => "not a number"]]];

        assert!(matches!(
            map_many::<(i32, i32)>(&sets),
            Err(MaterializeError::Arity {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            map_many::<(i32, i32)>(&[vec![], vec![], vec![]]),
            Err(MaterializeError::Arity {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test_log::test]
    fn test_result_sets_feed_targets_positionally() {
        let sets = vec![
            vec![row!["same" => "text"]],
            vec![row!["same" => 4_i64], row!["same" => Value::Null]],
            vec![],
        ];

        let (strings, numbers, flags) = map_many::<(String, Option<i64>, bool)>(&sets).unwrap();

        assert_eq!(strings, vec!["text".to_string()]);
        assert_eq!(numbers, vec![Some(4), None]);
        assert_eq!(flags, Vec::<bool>::new());
    }

    #[test_log::test]
    fn test_failure_in_any_set_aborts_dispatch() {
        let sets = vec![vec![row!["a" => 1_i32]], vec![row!["b" => 1_i32]]];

        assert!(matches!(
            map_many::<(i32, String)>(&sets),
            Err(MaterializeError::Conversion { column, .. }) if column == "b"
        ));
    }
}
