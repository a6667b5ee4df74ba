use core::fmt::Display;

/// Reports a broken internal invariant of the tree.
///
/// Those are reached only if the tree's own bookkeeping is wrong, at which point the storage may be half-updated, so the process is aborted instead of letting unwinders observe corrupted data.
#[cold]
#[inline(never)]
#[track_caller]
pub fn corrupted(msg: impl Display) -> ! {
    abort_on_panic(|| -> () { panic!("tree corruption: {}", msg) });
    // The closure always panics
    unreachable!()
}

/// Panics with the message of a contract violation by the caller.
///
/// Contract violations are detected before anything is mutated, so unwinding out of them is fine.
#[cold]
#[inline(never)]
#[track_caller]
pub fn contract_violation(msg: impl Display) -> ! {
    panic!("{}", msg)
}

#[inline]
pub fn abort_on_panic<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "unwind_safety")]
    {
        std::panic::catch_unwind(
            std::panic::AssertUnwindSafe(f)
        ).unwrap_or_else(|_| std::process::exit(101))
    }
    #[cfg(not(feature = "unwind_safety"))]
    {
        f()
    }
}
