//! End-to-end session behaviour over the mock transport.
//!
//! Each test drives a `ConversationSession` through whole turns and checks
//! the published messages, the accumulated answer and the final status.

mod common;

use bytes::Bytes;
use common::*;
use tutorchat::error::FailureKind;
use tutorchat::session::{
    SessionEvent, SessionStatus, EMPTY_ANSWER_FALLBACK, STOPPED_MARKER,
    TRANSIENT_FAILURE_FALLBACK,
};
use tutorchat::traits::HttpError;

#[tokio::test]
async fn test_answer_is_concatenation_for_any_chunking() {
    let fragments = ["Momentum ", "is ", "mass × velocity", " (p = mv). ", "Ünits: kg·m/s"];
    let mut body: String = fragments.iter().map(|f| message(f)).collect();
    body.push_str(&message_end("conv-1"));
    let expected: String = fragments.concat();

    for size in [1, 2, 3, 7, 16, 64, body.len()] {
        let mock = MockHttpClient::new();
        mock.set_response(CHAT_URL, MockResponse::Stream(chunked(&body, size)));

        let mut session = test_session(&mock);
        session.send("What is momentum?");
        assert_eq!(session.run_turn().await, SessionStatus::Settled, "chunk size {}", size);
        assert_eq!(session.response_text(), Some(expected.as_str()), "chunk size {}", size);
        assert_eq!(session.messages().last().unwrap().content, expected);
    }
}

#[tokio::test]
async fn test_first_conversation_id_wins() {
    let mock = MockHttpClient::new();
    mock.push_response(
        CHAT_URL,
        MockResponse::chunks([message("One"), message_end("conv-1"), message_end("conv-2")]),
    );
    mock.push_response(
        CHAT_URL,
        MockResponse::chunks([message("Two"), message_end("conv-3")]),
    );

    let mut session = test_session(&mock);
    session.send("first");
    session.run_turn().await;
    assert_eq!(session.conversation_id(), Some("conv-1"));

    session.send("second");
    session.run_turn().await;
    assert_eq!(session.conversation_id(), Some("conv-1"));

    let requests = mock.get_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].json().unwrap()["conversation_id"], "");
    assert_eq!(requests[1].json().unwrap()["conversation_id"], "conv-1");
    assert_eq!(
        requests[0].json().unwrap()["user"],
        requests[1].json().unwrap()["user"]
    );
}

#[tokio::test]
async fn test_empty_answer_uses_fallback() {
    let mock = MockHttpClient::new();
    mock.set_response(CHAT_URL, MockResponse::chunks([message_end("conv-1")]));

    let mut session = test_session(&mock);
    let turn = session.send("Hello?").unwrap();
    assert_eq!(
        session.next_update().await,
        Some(SessionEvent::Failed {
            turn,
            kind: FailureKind::EmptyAnswer
        })
    );

    assert_eq!(
        session.status(),
        SessionStatus::Errored(FailureKind::EmptyAnswer)
    );
    let last = session.messages().last().unwrap();
    assert_eq!(last.content, EMPTY_ANSWER_FALLBACK);
    assert!(last.is_error);
    assert!(!last.thinking);
    assert_eq!(session.conversation_id(), Some("conv-1"));
}

#[tokio::test]
async fn test_stop_drops_already_buffered_fragments() {
    let body: String = ["f1", "f2", "f3", "f4", "f5"]
        .iter()
        .map(|f| message(f))
        .collect();
    let mock = MockHttpClient::new();
    mock.push_response(CHAT_URL, MockResponse::Open(vec![Bytes::from(body)]));
    mock.push_response(
        CHAT_URL,
        MockResponse::chunks([message("fresh"), message_end("conv-1")]),
    );

    let mut session = test_session(&mock);
    session.send("count to five");
    for expected in ["f1", "f2"] {
        match session.next_update().await {
            Some(SessionEvent::Fragment { text, .. }) => assert_eq!(text, expected),
            other => panic!("expected fragment {}, got {:?}", expected, other),
        }
    }

    assert!(session.stop());
    assert_eq!(session.status(), SessionStatus::StoppedByUser);
    assert_eq!(session.next_update().await, None);
    assert_eq!(session.response_text(), Some("f1f2"));

    let stopped = session.messages().last().unwrap();
    assert_eq!(stopped.content, format!("f1f2{}", STOPPED_MARKER));
    assert!(stopped.is_stopped);
    assert!(!stopped.is_error);

    // Fragments 3-5 may already sit in the relay channel; none may reach the
    // next turn either.
    session.send("again");
    assert_eq!(session.run_turn().await, SessionStatus::Settled);
    assert_eq!(session.response_text(), Some("fresh"));
    for msg in session.messages() {
        for late in ["f3", "f4", "f5"] {
            assert!(!msg.content.contains(late), "{:?} leaked into {:?}", late, msg);
        }
    }
}

#[tokio::test]
async fn test_second_send_supersedes_streaming_turn() {
    let mock = MockHttpClient::new();
    mock.push_response(
        CHAT_URL,
        MockResponse::Open(vec![Bytes::from(message("old answer, part one"))]),
    );
    mock.push_response(
        CHAT_URL,
        MockResponse::chunks([message("new answer"), message_end("conv-1")]),
    );

    let mut session = test_session(&mock);
    let first = session.send("first question").unwrap();
    assert!(matches!(
        session.next_update().await,
        Some(SessionEvent::Fragment { turn, .. }) if turn == first
    ));
    assert_eq!(session.status(), SessionStatus::Streaming);

    let second = session.send("second question").unwrap();
    assert_ne!(first, second);
    assert_eq!(session.status(), SessionStatus::AwaitingFirstByte);
    assert_eq!(session.response_text(), Some(""));

    match session.next_update().await {
        Some(SessionEvent::Fragment { turn, text }) => {
            assert_eq!(turn, second);
            assert_eq!(text, "new answer");
        }
        other => panic!("expected fragment of second turn, got {:?}", other),
    }
    assert_eq!(session.run_turn().await, SessionStatus::Settled);
    assert_eq!(session.response_text(), Some("new answer"));

    let messages = session.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(
        messages[1].content,
        format!("old answer, part one{}", STOPPED_MARKER)
    );
    assert!(messages[1].is_stopped);
    assert_eq!(messages[3].content, "new answer");
}

#[tokio::test]
async fn test_backend_error_event_uses_fallback() {
    let mock = MockHttpClient::new();
    mock.set_response(
        CHAT_URL,
        MockResponse::chunks([message("Partial"), error_event("Model quota exceeded")]),
    );

    let mut session = test_session(&mock);
    session.send("Explain entropy");
    assert_eq!(
        session.run_turn().await,
        SessionStatus::Errored(FailureKind::Backend)
    );

    let last = session.messages().last().unwrap();
    assert_eq!(last.content, TRANSIENT_FAILURE_FALLBACK);
    assert!(last.is_error);
    assert!(!last.content.contains("quota"));
}

#[tokio::test]
async fn test_malformed_frame_ends_turn() {
    let mock = MockHttpClient::new();
    mock.set_response(
        CHAT_URL,
        MockResponse::chunks([message("Fine so far"), "data: {\"event\": \"mess\n".to_string()]),
    );

    let mut session = test_session(&mock);
    session.send("Explain entropy");
    assert_eq!(
        session.run_turn().await,
        SessionStatus::Errored(FailureKind::Protocol)
    );
}

#[tokio::test]
async fn test_invalid_utf8_is_shown_replaced() {
    let mut body = b"data: {\"event\":\"message\",\"answer\":\"caf\xe9 ok\"}\n\n".to_vec();
    body.extend_from_slice(message_end("conv-1").as_bytes());
    let mock = MockHttpClient::new();
    mock.set_response(CHAT_URL, MockResponse::Stream(vec![Bytes::from(body)]));

    let mut session = test_session(&mock);
    session.send("Say cafe");
    assert_eq!(session.run_turn().await, SessionStatus::Settled);
    assert_eq!(session.response_text(), Some("caf\u{FFFD} ok"));
    assert_eq!(session.conversation_id(), Some("conv-1"));
}

#[tokio::test]
async fn test_connection_failure_uses_fallback() {
    let mock = MockHttpClient::new();
    mock.set_response(
        CHAT_URL,
        MockResponse::Error(HttpError::ConnectionFailed("connection refused".to_string())),
    );

    let mut session = test_session(&mock);
    session.send("anyone there?");
    assert_eq!(
        session.run_turn().await,
        SessionStatus::Errored(FailureKind::Transport)
    );
    assert_eq!(
        session.messages().last().unwrap().content,
        TRANSIENT_FAILURE_FALLBACK
    );

    // The session recovers on the next send.
    mock.set_response(
        CHAT_URL,
        MockResponse::chunks([message("Yes!"), message_end("conv-1")]),
    );
    session.send("anyone there now?");
    assert_eq!(session.run_turn().await, SessionStatus::Settled);
}

#[tokio::test]
async fn test_body_read_failure_mid_stream() {
    let mock = MockHttpClient::new();
    mock.set_response(
        CHAT_URL,
        MockResponse::StreamThenError(
            vec![Bytes::from(message("Half"))],
            HttpError::Io("connection reset by peer".to_string()),
        ),
    );

    let mut session = test_session(&mock);
    session.send("question");
    assert_eq!(
        session.run_turn().await,
        SessionStatus::Errored(FailureKind::Transport)
    );
    assert_eq!(session.response_text(), Some("Half"));
}
