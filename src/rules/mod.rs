//! Built-in rules.

mod awaitable;

pub use awaitable::AwaitableAlternativeRule;
