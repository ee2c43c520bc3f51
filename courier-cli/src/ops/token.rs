//! Token store management (stands in for the login flow).

use super::output::print_json;
use super::ui::{print_empty, print_kv, print_success};
use super::OutputFormat;
use courier_core::TokenStore;
use serde_json::json;

pub fn set_token(store: &dyn TokenStore, token: &str, output: OutputFormat) -> anyhow::Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("token must not be empty");
    }
    store.set_token(token)?;
    match output {
        OutputFormat::Json => print_json(&json!({"stored": true}))?,
        OutputFormat::Table => print_success("Token 已保存"),
    }
    Ok(())
}

pub fn show_token(store: &dyn TokenStore, output: OutputFormat) -> anyhow::Result<()> {
    let token = store.token()?;
    match output {
        OutputFormat::Json => print_json(&json!({"token": token}))?,
        OutputFormat::Table => match token {
            Some(token) => print_kv("Token", &mask(&token)),
            None => print_empty("no token stored"),
        },
    }
    Ok(())
}

pub fn clear_token(store: &dyn TokenStore, output: OutputFormat) -> anyhow::Result<()> {
    store.clear_token()?;
    match output {
        OutputFormat::Json => print_json(&json!({"stored": false}))?,
        OutputFormat::Table => print_success("Token 已清除"),
    }
    Ok(())
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if visible.len() == token.len() {
        "*".repeat(token.chars().count())
    } else {
        format!("{}…", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::MemoryTokenStore;

    #[test]
    fn set_show_clear() {
        let store = MemoryTokenStore::new();
        set_token(&store, "  abcdefgh  ", OutputFormat::Json).unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("abcdefgh"));
        show_token(&store, OutputFormat::Table).unwrap();
        clear_token(&store, OutputFormat::Json).unwrap();
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn empty_token_rejected() {
        let store = MemoryTokenStore::new();
        assert!(set_token(&store, "   ", OutputFormat::Table).is_err());
    }

    #[test]
    fn masking() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("abcdefgh"), "abcdef…");
    }
}
