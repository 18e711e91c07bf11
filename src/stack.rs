//! Stack growth for the recursive tree walkers.
//!
//! The parser, code generator, interpreter and AST printer all recurse once
//! per level of source nesting. Each of those recursion points goes through
//! [`ensure_sufficient_stack`] so deeply nested input grows the stack on the
//! heap instead of overflowing the thread's fixed stack.

/// Minimum stack space left before a new segment is allocated.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if less than [`RED_ZONE`] remains.
///
/// ```ignore
/// fn walk(&mut self, expr: &Expr) -> Result<()> {
///     ensure_sufficient_stack(|| match expr {
///         // recursive calls
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WebAssembly has no stack switching; run directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
