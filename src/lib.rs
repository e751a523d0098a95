//! smblinks: discover SMB shares, mount them through GVfs, and keep a
//! directory of stable symlinks pointing at the mounts.

pub mod config;
pub mod discovery;
pub mod endpoint;
pub mod links;
pub mod logging;
pub mod mounter;
pub mod output;
pub mod picker;
pub mod process;
pub mod registry;
pub mod session;
