/*!
Backup-before-delete interception for two-tier content containers.

When the hosting platform raises a pending-delete notification for a site
collection or a nested site, the receiver captures a backup snapshot under an
elevated execution scope, records the attempt in an append-only audit log,
and either allows the deletion or vetoes it with a diagnostic. A separate
lifecycle manager installs and removes the interception hooks across the
container tree when the capability is toggled.
*/

pub mod core;
pub mod error;

pub use crate::core::audit::AuditSink;
pub use crate::core::config::Settings;
pub use crate::core::lifecycle::HookLifecycle;
pub use crate::core::receiver::DeleteEventReceiver;
pub use error::{Error, Result};
