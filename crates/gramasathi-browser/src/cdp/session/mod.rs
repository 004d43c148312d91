//! A page target attached over a flattened CDP session.

mod core;
mod dom;
mod events;
mod input;
mod js;
mod navigation;
mod print;

pub use self::core::PageSession;
pub use self::events::EventSubscription;
