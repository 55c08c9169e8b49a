//! Property-based tests for event parsing.
//!
//! Verifies that:
//! 1. Parsing never panics on arbitrary input
//! 2. Rendered events parse back to the same components
//! 3. The codec frames what `Display` renders

use bytes::BytesMut;
use proptest::prelude::*;
use slirc_proto::{Event, IrcCodec, Source};
use tokio_util::codec::{Decoder, Encoder};

// =============================================================================
// STRATEGIES
// =============================================================================

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

fn middle_param_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9#&+\\-_.*]{1,12}").expect("valid regex")
}

fn trailing_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 :,.!?#@]{0,40}").expect("valid regex")
}

fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("PRIVMSG".to_string()),
        Just("NOTICE".to_string()),
        Just("MODE".to_string()),
        Just("JOIN".to_string()),
        prop::string::string_regex("[0-9]{3}").expect("valid regex"),
    ]
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn parse_never_panics(line in "\\PC{0,200}") {
        let _ = line.parse::<Event>();
    }

    #[test]
    fn rendered_event_parses_back(
        nick in nickname_strategy(),
        user in username_strategy(),
        host in hostname_strategy(),
        command in command_strategy(),
        params in prop::collection::vec(middle_param_strategy(), 0..5),
        trailing in prop::option::of(trailing_strategy()),
    ) {
        let mut event = Event::new(&command, params.clone()).with_source(Source::User {
            nick: nick.clone(),
            ident: Some(user.clone()),
            host: Some(host.clone()),
        });
        if let Some(t) = &trailing {
            event = event.with_trailing(t.clone());
        }

        let parsed: Event = event.to_string().parse().unwrap();
        prop_assert_eq!(parsed.source_nick(), Some(nick.as_str()));
        prop_assert_eq!(&parsed.command, &command);
        prop_assert_eq!(&parsed.params, &params);
        prop_assert_eq!(&parsed.trailing, &trailing);
    }

    #[test]
    fn codec_frames_display_output(
        command in command_strategy(),
        params in prop::collection::vec(middle_param_strategy(), 1..4),
        trailing in trailing_strategy(),
    ) {
        let event = Event::new(&command, params).with_trailing(trailing);
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(event.clone(), &mut buf).unwrap();
        prop_assert!(buf.ends_with(b"\r\n"));

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        prop_assert_eq!(decoded, event);
        prop_assert!(buf.is_empty());
    }
}

#[test]
fn test_sensitive_flag_is_not_serialized() {
    let event = Event::new("PASS", ["secret"]).sensitive();
    let parsed: Event = event.to_string().parse().unwrap();
    assert!(!parsed.sensitive);
    assert_eq!(parsed.params, vec!["secret"]);
}
