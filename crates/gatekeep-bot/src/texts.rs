//! Fixed reply texts.

/// Reply to anything that is not a known command.
pub const FALLBACK: &str = "Sorry, something went wrong. Please try again.";

pub const HELP: &str = "\
Available commands:

/start - Start the bot and check channel membership
/verify - Check again after joining the channels
/rules - Bot rules
/redeem <key> - Redeem a license key
/payload1 <size> - Random payload of <size> KB, quoted \\xHH lines
/payload2 <size> - Random payload of <size> KB as a C byte array
/payload3 <text or hex> - Payload from pasted text or hex digits
/payload4 - Payload from an uploaded binary file
/status - Your key and membership status
/info - Bot information and uptime
/owner - Contact the bot owner
/genkey <duration> <days|months> - Issue a new key (admin only)";

pub const RULES: &str = "\
Bot rules:

1. Join all required channels to use the bot.
2. Do not share personal or confidential information.
3. Do not spam the bot with commands or messages.
4. Redeem a valid key to access the payload commands.
5. Use generated payloads responsibly.
6. Only administrators can issue new keys.
7. By using this bot you agree to these rules.";

pub const AWAITING_UPLOAD: &str =
    "Please send a binary file, and I will generate the payload for you.";

pub const JOINED: &str =
    "You have joined all the required channels. Use /help to see the commands.";

pub fn welcome() -> String {
    "Welcome! This bot issues access keys and generates byte payloads.\nType /help for assistance."
        .to_string()
}

/// Prompt listing the channels a principal still has to join.
pub fn join_prompt(channels: &[String]) -> String {
    let mut text = String::from("Please join all required channels, then send /verify:");
    for channel in channels {
        text.push_str("\n- ");
        if !channel.starts_with('@') && channel.parse::<i64>().is_err() {
            text.push('@');
        }
        text.push_str(channel);
    }
    text
}

pub fn owner(contact: Option<&str>) -> String {
    match contact {
        Some(contact) => format!(
            "The owner of this bot is {contact}.\nContact them for more information or support."
        ),
        None => "No owner contact is configured for this bot.".to_string(),
    }
}
