//! Privilege gate run before any build or filesystem step.

use anyhow::{bail, Result};

use super::{RunContext, Work};

#[derive(Debug, Default)]
pub struct PrivilegeCheck;

impl Work for PrivilegeCheck {
    fn execute(&self, ctx: &RunContext) -> Result<()> {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        if euid != 0 {
            bail!("installer must be run with sudo or as root");
        }
        tracing::info!(prefix = %ctx.prefix.display(), "running with root privileges");
        Ok(())
    }
}
