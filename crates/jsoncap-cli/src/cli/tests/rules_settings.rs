//! Tests for block, allow, whitelist, blacklist, mode, smart-filter, prefix, record, export, import.

use super::parse;
use crate::cli::{BlacklistAction, Cli, CliCommand, ModeArg, Toggle, WhitelistAction};
use clap::Parser;
use jsoncap_core::filter::Mode;

#[test]
fn cli_parse_block() {
    match parse(&["jsoncap", "block", "https://x.test/api/ping"]) {
        CliCommand::Block { url } => assert_eq!(url, "https://x.test/api/ping"),
        _ => panic!("expected Block"),
    }
}

#[test]
fn cli_parse_allow_memo() {
    match parse(&["jsoncap", "allow", "https://x.test/api/orders"]) {
        CliCommand::Allow { url, memo } => {
            assert_eq!(url, "https://x.test/api/orders");
            assert!(memo.is_empty());
        }
        _ => panic!("expected Allow"),
    }
    match parse(&["jsoncap", "allow", "https://x.test/a", "--memo", "orders"]) {
        CliCommand::Allow { memo, .. } => assert_eq!(memo, "orders"),
        _ => panic!("expected Allow with --memo"),
    }
}

#[test]
fn cli_parse_mode() {
    match parse(&["jsoncap", "mode", "manual"]) {
        CliCommand::Mode { mode } => {
            assert_eq!(mode, ModeArg::Manual);
            assert_eq!(Mode::from(mode), Mode::Manual);
        }
        _ => panic!("expected Mode"),
    }
    assert!(Cli::try_parse_from(["jsoncap", "mode", "sometimes"]).is_err());
}

#[test]
fn cli_parse_toggles() {
    match parse(&["jsoncap", "smart-filter", "off"]) {
        CliCommand::SmartFilter { state } => assert!(!state.is_on()),
        _ => panic!("expected SmartFilter"),
    }
    match parse(&["jsoncap", "record", "on"]) {
        CliCommand::Record { state } => assert_eq!(state, Toggle::On),
        _ => panic!("expected Record"),
    }
}

#[test]
fn cli_parse_prefix() {
    match parse(&["jsoncap", "prefix", "shop"]) {
        CliCommand::Prefix { value } => assert_eq!(value, "shop"),
        _ => panic!("expected Prefix"),
    }
}

#[test]
fn cli_parse_whitelist_add() {
    match parse(&["jsoncap", "whitelist", "add", "/api/orders", "--memo", "o"]) {
        CliCommand::Whitelist {
            action: WhitelistAction::Add { keyword, memo },
        } => {
            assert_eq!(keyword, "/api/orders");
            assert_eq!(memo, "o");
        }
        _ => panic!("expected Whitelist Add"),
    }
}

#[test]
fn cli_parse_whitelist_edit() {
    match parse(&["jsoncap", "whitelist", "edit", "/api/orders", "--memo", "shop"]) {
        CliCommand::Whitelist {
            action:
                WhitelistAction::Edit {
                    keyword,
                    rename,
                    memo,
                },
        } => {
            assert_eq!(keyword, "/api/orders");
            assert_eq!(rename, None);
            assert_eq!(memo.as_deref(), Some("shop"));
        }
        _ => panic!("expected Whitelist Edit"),
    }
    match parse(&["jsoncap", "whitelist", "edit", "/a", "--rename", "/b", "--memo", ""]) {
        CliCommand::Whitelist {
            action: WhitelistAction::Edit { rename, memo, .. },
        } => {
            assert_eq!(rename.as_deref(), Some("/b"));
            assert_eq!(memo.as_deref(), Some(""));
        }
        _ => panic!("expected Whitelist Edit"),
    }
}

#[test]
fn cli_parse_blacklist_edit() {
    match parse(&["jsoncap", "blacklist", "edit", "/api/ping", "/api/pong"]) {
        CliCommand::Blacklist {
            action:
                BlacklistAction::Edit {
                    keyword,
                    new_keyword,
                },
        } => {
            assert_eq!(keyword, "/api/ping");
            assert_eq!(new_keyword, "/api/pong");
        }
        _ => panic!("expected Blacklist Edit"),
    }
}

#[test]
fn cli_parse_blacklist_remove() {
    match parse(&["jsoncap", "blacklist", "remove", "/api/ping"]) {
        CliCommand::Blacklist {
            action: BlacklistAction::Remove { keyword },
        } => assert_eq!(keyword, "/api/ping"),
        _ => panic!("expected Blacklist Remove"),
    }
}

#[test]
fn cli_parse_export_import() {
    match parse(&["jsoncap", "export"]) {
        CliCommand::Export { path } => assert!(path.is_none()),
        _ => panic!("expected Export"),
    }
    match parse(&["jsoncap", "import", "rules.json"]) {
        CliCommand::Import { path } => assert_eq!(path, std::path::Path::new("rules.json")),
        _ => panic!("expected Import"),
    }
}
