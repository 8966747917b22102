//! Bounded retry-with-refinement combinator.

use std::future::Future;

/// Attempt an operation up to `max_attempts` times, transforming the
/// input between attempts via `refine`.
///
/// `op` returns `Ok(Some(value))` on success and `Ok(None)` when the
/// attempt produced nothing useful and the input should be refined.
/// Errors from either closure abort immediately. Returns `Ok(None)`
/// when every attempt came up empty.
pub async fn attempt<I, T, E, Op, OpFut, Rf, RfFut>(
    mut input: I,
    max_attempts: usize,
    mut op: Op,
    mut refine: Rf,
) -> std::result::Result<Option<T>, E>
where
    I: Clone,
    Op: FnMut(I) -> OpFut,
    OpFut: Future<Output = std::result::Result<Option<T>, E>>,
    Rf: FnMut(I) -> RfFut,
    RfFut: Future<Output = std::result::Result<I, E>>,
{
    for attempt_no in 1..=max_attempts {
        if let Some(value) = op(input.clone()).await? {
            return Ok(Some(value));
        }
        if attempt_no < max_attempts {
            input = refine(input).await?;
        }
    }
    Ok(None)
}
