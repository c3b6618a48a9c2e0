//! Command handlers.

use console::style;
use gatekeep_bot::config::BotConfig;
use gatekeep_bot::{Message, Router, transport};
use gatekeep_core::PrincipalId;
use std::path::Path;
use tokio::io::BufReader;

fn print_messages(messages: &[Message]) {
    for (idx, message) in messages.iter().enumerate() {
        if messages.len() > 1 {
            println!("{}", style(format!("[{}/{}]", idx + 1, messages.len())).dim());
        }
        println!("{}\n", message.text);
    }
}

/// Interactive session over stdin and stdout.
pub async fn console(router: &Router, principal: PrincipalId) -> anyhow::Result<()> {
    eprintln!(
        "{} Console session as {} (send /quit to leave)",
        style("▶").cyan(),
        style(principal).bold()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let handled = transport::run_session(router, principal, stdin, &mut stdout).await?;

    eprintln!("{} {} command(s) handled", style("✓").green(), handled);
    Ok(())
}

/// Run one command and print the replies.
pub async fn exec(router: &Router, principal: PrincipalId, command: &[String]) -> anyhow::Result<()> {
    let line = command.join(" ");
    let messages = router.handle_text(principal, &line).await;
    print_messages(&messages);
    Ok(())
}

/// Upload a local file and print the replies.
pub async fn encode_file(
    router: &Router,
    principal: PrincipalId,
    path: &Path,
    mime_type: &str,
) -> anyhow::Result<()> {
    let messages = transport::upload_file(router, principal, path, mime_type).await?;
    print_messages(&messages);
    Ok(())
}

/// Show the effective configuration.
pub fn show_config(config: &BotConfig) {
    println!("Current configuration:");
    println!("  data_dir: {}", config.data_dir.display());
    println!("  admin_ids: {:?}", config.admin_ids);
    println!("  channels: {:?}", config.channels);
    println!(
        "  bot_token: {}",
        if config.bot_token.is_some() {
            "***"
        } else {
            "(not set)"
        }
    );
    println!("  api_url: {}", config.api_url);
    println!(
        "  owner: {}",
        config.owner.as_deref().unwrap_or("(not set)")
    );
    println!("  message_limit: {}", config.message_limit);
    println!("  max_payload_kb: {}", config.max_payload_kb);
    println!("  membership_timeout_secs: {}", config.membership_timeout_secs);
    println!(
        "  enforce_entitlement_expiry: {}",
        config.enforce_entitlement_expiry
    );
}
