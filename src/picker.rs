//! Interactive share picker.
//!
//! A prompt-driven front end over [`Session`]: tick shares, then choose what
//! to do with them. All logic stays in the session; this module only asks
//! questions and prints answers.

use std::fmt;

use inquire::{InquireError, MultiSelect, Select, Text};

use crate::output::{self, OutputFormatter};
use crate::session::{Session, SessionResult};

/// Actions offered after shares are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickAction {
    MountSelected,
    UnmountSelected,
    UnmountAll,
    Refresh,
    ChangeServer,
    Quit,
}

impl PickAction {
    pub const ALL: [PickAction; 6] = [
        PickAction::MountSelected,
        PickAction::UnmountSelected,
        PickAction::UnmountAll,
        PickAction::Refresh,
        PickAction::ChangeServer,
        PickAction::Quit,
    ];
}

impl fmt::Display for PickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PickAction::MountSelected => "Mount selected",
            PickAction::UnmountSelected => "Unmount selected",
            PickAction::UnmountAll => "Unmount all",
            PickAction::Refresh => "Refresh share list",
            PickAction::ChangeServer => "Change server",
            PickAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// A share as shown in the selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShareOption {
    name: String,
    mounted: bool,
}

impl fmt::Display for ShareOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mounted {
            write!(f, "{} (mounted)", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Indices of mounted shares, pre-ticked in the selection list.
fn default_selection(shares: &[(String, bool)]) -> Vec<usize> {
    shares
        .iter()
        .enumerate()
        .filter(|(_, (_, mounted))| *mounted)
        .map(|(i, _)| i)
        .collect()
}

/// Whether a prompt error means the user backed out.
fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Run the picker loop until the user quits.
///
/// Prompt I/O failures other than cancellation end the loop with the error.
pub fn run(session: &mut Session, out: &dyn OutputFormatter) -> anyhow::Result<()> {
    loop {
        let server = session.server().unwrap_or_default().to_string();
        let shares = session.list_shares();

        let options: Vec<ShareOption> = shares
            .iter()
            .map(|(name, mounted)| ShareOption {
                name: name.clone(),
                mounted: *mounted,
            })
            .collect();
        let defaults = default_selection(&shares);

        let selected = match MultiSelect::new(&format!("Shares on {}", server), options)
            .with_default(&defaults)
            .prompt()
        {
            Ok(selected) => selected,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let names: Vec<String> = selected.into_iter().map(|o| o.name).collect();

        let action = match Select::new("Action", PickAction::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match action {
            PickAction::MountSelected => {
                output::report_mounts(out, &session.mount_many(&names)?);
            }
            PickAction::UnmountSelected => {
                output::report_unmounts(out, &session.unmount_many(&names)?);
            }
            PickAction::UnmountAll => {
                output::report_unmounts(out, &session.unmount_all()?);
            }
            PickAction::Refresh => {
                refresh(session, out, &server)?;
            }
            PickAction::ChangeServer => {
                let new_server = match Text::new("Server:").with_default(&server).prompt() {
                    Ok(s) => s,
                    Err(e) if is_cancel(&e) => continue,
                    Err(e) => return Err(e.into()),
                };
                match session.set_server(&new_server) {
                    Ok(discovery) => output::report_discovery(out, new_server.trim(), &discovery),
                    Err(e) => out.error(&e.to_string()),
                }
            }
            PickAction::Quit => return Ok(()),
        }
    }
}

fn refresh(session: &mut Session, out: &dyn OutputFormatter, server: &str) -> SessionResult<()> {
    let discovery = session.refresh()?;
    output::report_discovery(out, server, &discovery);
    Ok(())
}
