//! Typed views over the platform's entities.
//!
//! Each type wraps a [`Resource`](crate::rest::Resource) and adds the
//! accessors and related collections of its entity:
//!
//! | Type | Related |
//! |------|---------|
//! | [`Identity`] | `accounts()`, `profile()`, `send_notification()` |
//! | [`Profile`] | |
//! | [`ServiceAccount`] | `history()`, `notifications()`, `members()`, `send_notification()` |
//! | [`Account`] | read-only stub |
//! | [`AccountRef`] | either of the two account shapes |
//! | [`AccountMember`] | `roles()`, `identity()` |
//! | [`Notification`] | `destination_uuid()` |

mod account;
mod identity;
mod member;
mod notification;
mod profile;

pub use account::{Account, AccountLike, AccountRef, ServiceAccount};
pub use identity::Identity;
pub use member::AccountMember;
pub use notification::{Notification, NotificationOptions};
pub use profile::Profile;
