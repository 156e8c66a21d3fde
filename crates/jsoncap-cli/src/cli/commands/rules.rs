//! `jsoncap block`, `allow`, `whitelist`, `blacklist`.

use anyhow::{bail, Result};
use jsoncap_core::control::ControlMessage;
use jsoncap_core::settings::rules::{
    add_blacklist, add_whitelist, edit_blacklist, edit_whitelist, remove_blacklist,
    remove_whitelist, RuleEdit,
};
use jsoncap_core::settings::{SettingsPatch, SettingsStore};

use super::report;
use crate::cli::{AppContext, BlacklistAction, WhitelistAction};

pub async fn run_block(ctx: &AppContext, url: String) -> Result<()> {
    let coordinator = ctx.coordinator(None).await?;
    report(coordinator.handle_control(ControlMessage::BlockUrl { url }).await)
}

pub async fn run_allow(ctx: &AppContext, url: String, memo: String) -> Result<()> {
    let coordinator = ctx.coordinator(None).await?;
    report(
        coordinator
            .handle_control(ControlMessage::AllowUrl { url, memo })
            .await,
    )
}

pub async fn run_whitelist(ctx: &AppContext, action: WhitelistAction) -> Result<()> {
    let mut whitelist = ctx.store.load().await?.whitelist;
    let (changed, keyword) = match &action {
        WhitelistAction::Add { keyword, memo } => {
            (add_whitelist(&mut whitelist, keyword, memo), keyword)
        }
        WhitelistAction::Remove { keyword } => (remove_whitelist(&mut whitelist, keyword), keyword),
        WhitelistAction::Edit {
            keyword,
            rename,
            memo,
        } => {
            let edit = edit_whitelist(&mut whitelist, keyword, rename.as_deref(), memo.as_deref());
            (edited("whitelist", keyword, edit)?, keyword)
        }
    };
    if !changed {
        println!("whitelist unchanged ({keyword})");
        return Ok(());
    }
    ctx.store
        .apply(SettingsPatch {
            whitelist: Some(whitelist),
            ..SettingsPatch::default()
        })
        .await?;
    println!("whitelist updated ({keyword})");
    Ok(())
}

pub async fn run_blacklist(ctx: &AppContext, action: BlacklistAction) -> Result<()> {
    let mut blacklist = ctx.store.load().await?.blacklist;
    let (changed, keyword) = match &action {
        BlacklistAction::Add { keyword } => (add_blacklist(&mut blacklist, keyword), keyword),
        BlacklistAction::Remove { keyword } => (remove_blacklist(&mut blacklist, keyword), keyword),
        BlacklistAction::Edit {
            keyword,
            new_keyword,
        } => {
            let edit = edit_blacklist(&mut blacklist, keyword, new_keyword);
            (edited("blacklist", keyword, edit)?, keyword)
        }
    };
    if !changed {
        println!("blacklist unchanged ({keyword})");
        return Ok(());
    }
    ctx.store
        .apply(SettingsPatch {
            blacklist: Some(blacklist),
            ..SettingsPatch::default()
        })
        .await?;
    println!("blacklist updated ({keyword})");
    Ok(())
}

/// Whether an edit changed the list; rejected edits become errors.
fn edited(list: &str, keyword: &str, edit: RuleEdit) -> Result<bool> {
    match edit {
        RuleEdit::Updated => Ok(true),
        RuleEdit::Unchanged => Ok(false),
        RuleEdit::NotFound => bail!("no {list} entry {keyword}"),
        RuleEdit::BlankKeyword => bail!("{list} keyword can't be blank"),
        RuleEdit::DuplicateKeyword => bail!("{list} already has that keyword"),
    }
}
