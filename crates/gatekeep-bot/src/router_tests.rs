//! Tests for the command router.

#[cfg(test)]
mod tests {
    use crate::app::build_router_with;
    use crate::config::BotConfig;
    use crate::outcome::{Message, PAYLOAD_FOOTER, PAYLOAD_HEADER, TextFormat};
    use crate::router::Router;
    use crate::{texts, transport};
    use gatekeep_auth::StaticMembership;
    use gatekeep_core::{Error, Expiry, PrincipalId, Snapshot};
    use gatekeep_licensing::MemoryStore;
    use gatekeep_payload::Upload;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const ADMIN: PrincipalId = PrincipalId::new(1);
    const MEMBER: PrincipalId = PrincipalId::new(2);
    /// Holds an entitlement but is not in the channels.
    const OUTSIDER: PrincipalId = PrincipalId::new(3);

    fn seeded_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot
            .users
            .insert(OUTSIDER, Expiry::parse("2999-01-01 00:00:00").unwrap());
        snapshot
    }

    fn router_with(store: Arc<MemoryStore>) -> Router {
        let config = BotConfig {
            admin_ids: vec![ADMIN.get()],
            ..BotConfig::default()
        };
        build_router_with(&config, store, Arc::new(StaticMembership::new([ADMIN, MEMBER])))
    }

    fn router() -> Router {
        router_with(Arc::new(MemoryStore::with_snapshot(seeded_snapshot())))
    }

    fn single_text(messages: Vec<Message>) -> String {
        assert_eq!(messages.len(), 1, "expected one message: {:?}", messages);
        messages.into_iter().next().unwrap().text
    }

    fn payload_body(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| {
                assert_eq!(m.format, TextFormat::Markdown);
                m.text
                    .strip_prefix(PAYLOAD_HEADER)
                    .and_then(|t| t.strip_suffix(PAYLOAD_FOOTER))
                    .unwrap()
            })
            .collect()
    }

    async fn issue_key(router: &Router, args: &str) -> String {
        let text = single_text(router.handle_text(ADMIN, &format!("/genkey {}", args)).await);
        text.lines()
            .next()
            .and_then(|line| line.strip_prefix("Generated new key: "))
            .unwrap()
            .to_string()
    }

    async fn entitle(router: &Router, principal: PrincipalId) {
        let key = issue_key(router, "30 days").await;
        let reply = single_text(router.handle_text(principal, &format!("/redeem {}", key)).await);
        assert!(reply.starts_with("Key redeemed successfully!"), "{}", reply);
    }

    #[tokio::test]
    async fn test_unentitled_payload_is_denied() {
        let router = router();
        for command in ["/payload1 1", "/payload2 1", "/payload3 4142", "/payload4"] {
            let messages = router.handle_text(MEMBER, command).await;
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].format, TextFormat::Plain);
            assert!(messages[0].text.contains("valid key"), "{}", messages[0].text);
        }
    }

    #[tokio::test]
    async fn test_issue_and_redeem_through_commands() {
        let router = router();
        let key = issue_key(&router, "1 month").await;
        assert_eq!(key.len(), 11);

        let reply = single_text(router.handle_text(MEMBER, &format!("/redeem {}", key)).await);
        assert!(reply.starts_with("Key redeemed successfully! Access granted until: "));

        let again = single_text(router.handle_text(MEMBER, &format!("/redeem {}", key)).await);
        assert_eq!(again, "Invalid or expired key");
    }

    #[tokio::test]
    async fn test_issue_key_requires_admin() {
        let router = router();
        let reply = single_text(router.handle_text(MEMBER, "/genkey 1 days").await);
        assert_eq!(reply, "You are not authorized to use this command.");
    }

    #[tokio::test]
    async fn test_issue_key_argument_errors() {
        let router = router();

        let reply = single_text(router.handle_text(ADMIN, "/genkey 3 weeks").await);
        assert_eq!(reply, "Invalid unit: weeks. Use 'day(s)' or 'month(s)'");

        let reply = single_text(router.handle_text(ADMIN, "/genkey 0 days").await);
        assert_eq!(reply, "Invalid duration: 0");

        let reply = single_text(router.handle_text(ADMIN, "/genkey soon days").await);
        assert!(reply.starts_with("Invalid argument"));

        let reply = single_text(router.handle_text(ADMIN, "/genkey 30").await);
        assert_eq!(reply, "Usage: /genkey <duration> <days|months>");
    }

    #[tokio::test]
    async fn test_quoted_escape_payload_spans_messages_in_order() {
        let router = router();
        entitle(&router, MEMBER).await;

        let messages = router.handle_text(MEMBER, "/generate-sized-payload-A 1").await;
        assert!(messages.len() > 1);
        for message in &messages {
            assert!(message.text.chars().count() <= 4096);
        }

        let body = payload_body(&messages);
        let lines: Vec<&str> = body.split('\n').collect();
        assert_eq!(lines.len(), 8);
        for line in &lines {
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
        let escapes = body.replace(['"', '\n'], "");
        assert_eq!(escapes.len(), 1024 * 4);
    }

    #[tokio::test]
    async fn test_c_array_payload() {
        let router = router();
        entitle(&router, MEMBER).await;

        let messages = router.handle_text(MEMBER, "/payload2 1").await;
        let body = payload_body(&messages);
        assert!(body.starts_with('{') && body.ends_with('}'));
        assert_eq!(body[1..body.len() - 1].split(", ").count(), 1024);
    }

    #[tokio::test]
    async fn test_sized_payload_bounds() {
        let router = router();
        entitle(&router, MEMBER).await;

        let reply = single_text(router.handle_text(MEMBER, "/payload1 0").await);
        assert!(reply.starts_with("Invalid argument"));

        let reply = single_text(router.handle_text(MEMBER, "/payload1 65").await);
        assert_eq!(reply, "Payload too large: 65 exceeds limit of 64");

        let reply = single_text(router.handle_text(MEMBER, "/payload1").await);
        assert_eq!(reply, "Usage: /payload1 <size in KB>");
    }

    #[tokio::test]
    async fn test_input_payload_from_hex() {
        let router = router();
        entitle(&router, MEMBER).await;

        let messages = router.handle_text(MEMBER, "/payload3 48656c6c6f").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(payload_body(&messages), "\\x48\\x65\\x6c\\x6c\\x6f");
    }

    #[tokio::test]
    async fn test_input_payload_errors() {
        let router = router();
        entitle(&router, MEMBER).await;

        let reply = single_text(router.handle_text(MEMBER, "/payload3 abc").await);
        assert_eq!(reply, "Hex input has an odd number of digits (3)");

        let long_text = format!("/payload3 {}", "z".repeat(2000));
        let reply = single_text(router.handle_text(MEMBER, &long_text).await);
        assert!(reply.starts_with("Payload too large"), "{}", reply);

        let reply = single_text(router.handle_text(MEMBER, "/payload3").await);
        assert_eq!(reply, "Usage: /payload3 <text or hex>");
    }

    #[tokio::test]
    async fn test_entitled_non_member_is_asked_to_join() {
        let router = router();
        let reply = single_text(router.handle_text(OUTSIDER, "/payload1 1").await);
        assert!(reply.starts_with("Please join all required channels"));

        let reply = single_text(router.handle_text(OUTSIDER, "/redeem abcdefghijk").await);
        assert!(reply.starts_with("Please join all required channels"));
    }

    #[tokio::test]
    async fn test_upload_flow() {
        let router = router();
        entitle(&router, MEMBER).await;

        let prompt = single_text(router.handle_text(MEMBER, "/payload4").await);
        assert_eq!(prompt, texts::AWAITING_UPLOAD);

        let messages = router
            .handle_upload(MEMBER, Upload::binary(vec![0x7f, 0x45, 0x4c, 0x46]))
            .await;
        assert_eq!(payload_body(&messages), "\\x7f\\x45\\x4c\\x46");

        let text_upload = Upload {
            file_name: Some("notes.txt".to_string()),
            mime_type: Some("text/plain".to_string()),
            bytes: b"hello".to_vec(),
        };
        let reply = single_text(router.handle_upload(MEMBER, text_upload).await);
        assert!(reply.starts_with("Unsupported upload"));
    }

    #[tokio::test]
    async fn test_upload_requires_entitlement() {
        let router = router();
        let reply = single_text(router.handle_upload(MEMBER, Upload::binary(vec![1, 2, 3])).await);
        assert!(reply.contains("valid key"));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_reported_generically() {
        let store = Arc::new(MemoryStore::with_snapshot(seeded_snapshot()));
        let router = router_with(store.clone());
        let key = issue_key(&router, "2 days").await;

        store.set_fail_saves(true);
        let reply = single_text(router.handle_text(MEMBER, &format!("/redeem {}", key)).await);
        assert_eq!(reply, texts::FALLBACK);

        store.set_fail_saves(false);
        let reply = single_text(router.handle_text(MEMBER, &format!("/redeem {}", key)).await);
        assert!(reply.starts_with("Key redeemed successfully!"));
    }

    #[tokio::test]
    async fn test_public_commands() {
        let router = router();

        assert_eq!(single_text(router.handle_text(OUTSIDER, "/help").await), texts::HELP);
        assert_eq!(single_text(router.handle_text(OUTSIDER, "/rules").await), texts::RULES);
        assert!(
            single_text(router.handle_text(OUTSIDER, "/owner").await).contains("No owner contact")
        );

        let info = single_text(router.handle_text(OUTSIDER, "/info").await);
        assert!(info.contains("Current uptime: 0h 0m"), "{}", info);
        assert!(!info.contains("Unredeemed keys"));

        issue_key(&router, "1 day").await;
        let info = single_text(router.handle_text(ADMIN, "/info").await);
        assert!(info.ends_with("Unredeemed keys: 1"), "{}", info);

        assert_eq!(
            single_text(router.handle_text(MEMBER, "/start").await),
            texts::welcome()
        );
        assert!(
            single_text(router.handle_text(OUTSIDER, "/start").await)
                .starts_with("Please join all required channels")
        );
        assert_eq!(
            single_text(router.handle_text(MEMBER, "/verify").await),
            texts::JOINED
        );
    }

    #[tokio::test]
    async fn test_status() {
        let router = router();

        let status = single_text(router.handle_text(MEMBER, "/status").await);
        assert_eq!(status, "Key: None\nChannel membership: Joined");

        let status = single_text(router.handle_text(OUTSIDER, "/status").await);
        assert_eq!(
            status,
            "Key: Active until 2999-01-01 00:00:00\nChannel membership: Not joined"
        );
    }

    #[tokio::test]
    async fn test_unknown_input_gets_fallback() {
        let router = router();
        for input in ["/launch", "hello there", "", "/"] {
            assert_eq!(single_text(router.handle_text(MEMBER, input).await), texts::FALLBACK);
        }
    }

    #[tokio::test]
    async fn test_console_session() {
        let router = router();
        let input: &[u8] = b"/help\n\n/launch\n/quit\n/help\n";
        let mut output = Vec::new();

        let handled = transport::run_session(&router, MEMBER, input, &mut output)
            .await
            .unwrap();

        assert_eq!(handled, 2);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, format!("{}\n\n{}\n\n", texts::HELP, texts::FALLBACK));
    }

    #[tokio::test]
    async fn test_upload_file_from_disk() {
        let router = router();
        entitle(&router, MEMBER).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("up.bin");
        std::fs::write(&path, [0xde, 0xad, 0xbe, 0xef]).unwrap();

        let messages = transport::upload_file(
            &router,
            MEMBER,
            &path,
            gatekeep_payload::file::BINARY_MIME_TYPE,
        )
        .await
        .unwrap();
        assert_eq!(payload_body(&messages), "\\xde\\xad\\xbe\\xef");
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_reading() {
        let router = router();
        entitle(&router, MEMBER).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.bin");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(gatekeep_payload::file::MAX_UPLOAD_BYTES as u64 + 1)
            .unwrap();

        let result = transport::upload_file(
            &router,
            MEMBER,
            &path,
            gatekeep_payload::file::BINARY_MIME_TYPE,
        )
        .await;
        assert!(matches!(result, Err(Error::UnsupportedUpload(_))));
    }
}
