//! CLI command handlers, grouped by what they touch.

mod replay;
mod rules;
mod settings;
mod staging;
mod status;
mod transfer;

pub use replay::run_replay;
pub use rules::{run_allow, run_blacklist, run_block, run_whitelist};
pub use settings::{run_mode, run_prefix, run_record, run_smart_filter};
pub use staging::{run_clear, run_download, run_download_all};
pub use status::{run_list, run_status};
pub use transfer::{run_export, run_import};

use anyhow::{bail, Result};
use jsoncap_core::control::ControlReply;

/// Turn a control reply into CLI output, or an error for the failure replies.
pub(super) fn report(reply: ControlReply) -> Result<()> {
    match reply {
        ControlReply::Ok => println!("ok"),
        ControlReply::RecordingStatus { is_recording } => {
            println!("recording: {}", if is_recording { "on" } else { "off" })
        }
        ControlReply::Downloaded { count, failed: 0 } => println!("downloaded {count}"),
        ControlReply::Downloaded { count, failed } => {
            bail!("downloaded {count}, {failed} failed and stayed in the list")
        }
        ControlReply::NotFound { index } => bail!("no staged capture at index {index}"),
        ControlReply::InvalidUrl { url } => bail!("not a url: {url}"),
        ControlReply::Failed { message } => bail!(message),
    }
    Ok(())
}
