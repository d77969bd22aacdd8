/// Result structs for command output. Commands return these instead of printing
/// directly; main.rs formats them as human-readable text or JSON based on --json.
mod check;
mod init;
mod prefs;
mod publish;
mod status;
mod sync;

pub use check::*;
pub use init::*;
pub use prefs::*;
pub use publish::*;
pub use status::*;
pub use sync::*;
