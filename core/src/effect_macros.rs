//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for async work that feeds an action back into the store and for lane-scoped
//! (cancellable) work.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use composable_state_core::async_effect;
///
/// async_effect! {
///     let items = source.fetch_all().await.ok()?;
///     Some(TodoAction::LoadSucceeded { items })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use composable_state_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_millis(300),
///     action: ViewAction::QueryCommitted { text }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Cancellable` that runs `effect` in the lane `id`
///
/// # Example
///
/// ```rust,ignore
/// use composable_state_core::{async_effect, cancellable};
///
/// cancellable! {
///     id: LOAD_LANE,
///     effect: async_effect! { Some(TodoAction::LoadSucceeded { items: vec![] }) }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::cancellable($effect, $id)
    };
}
