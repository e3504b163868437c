//! Events and the fire capability
use crate::time::Time;
use std::rc::Rc;
use std::sync::Arc;

/// Something a scheduler can fire once its deadline has been reached.
///
/// `scheduled` is the deadline the entry was registered under, `now` is the
/// scheduler's checkpoint at the moment it fires. The same event may be
/// registered any number of times; it is fired once per registration.
///
/// Takes `&self` because one event is typically shared by several
/// registrations, use interior mutability for any state.
pub trait Event {
    fn fire(&self, scheduled: Time, now: Time);
}

/// An event that calls a closure when fired.
#[derive(Clone, Copy)]
pub struct FnEvent<F>(F);

/// Wrap a closure taking `(scheduled, now)` as an [`Event`].
pub fn from_fn<F>(func: F) -> FnEvent<F>
where
    F: Fn(Time, Time),
{
    FnEvent(func)
}

impl<F> Event for FnEvent<F>
where
    F: Fn(Time, Time),
{
    fn fire(&self, scheduled: Time, now: Time) {
        (self.0)(scheduled, now)
    }
}

macro_rules! forward_event {
    ($($ptr:ident),*) => {
        $(
            impl<E> Event for $ptr<E>
            where
                E: Event + ?Sized,
            {
                fn fire(&self, scheduled: Time, now: Time) {
                    (**self).fire(scheduled, now)
                }
            }
        )*
    };
}

forward_event!(Box, Rc, Arc);

impl<'a, E> Event for &'a E
where
    E: Event + ?Sized,
{
    fn fire(&self, scheduled: Time, now: Time) {
        (**self).fire(scheduled, now)
    }
}
