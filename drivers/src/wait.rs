/*++

Licensed under the Apache-2.0 license.

File Name:

    wait.rs

Abstract:

    File contains common functions to implement wait routines.

--*/

/// Busy-wait until `predicate` holds, evaluating it at most `max_polls`
/// times.
///
/// # Returns
///
/// * `Some(polls)` - Number of evaluations it took
/// * `None` - `predicate` never held
pub fn until_bounded<F>(max_polls: u32, mut predicate: F) -> Option<u32>
where
    F: FnMut() -> bool,
{
    (1..=max_polls).find(|_| predicate())
}
