//! Unit tests for the IRC channel session
//!
//! The session talks to a scripted server over an in-memory duplex pipe.

#![allow(clippy::unwrap_used)]

use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};

use crate::{
    services::irc::{ChannelSession, MAX_NICK_RETRIES, SessionConfig, SessionState, normalize_channel},
    shutdown::{ShutdownReason, ShutdownSignal},
};

struct FakeServer {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl FakeServer {
    async fn say(&mut self, line: &str) {
        self.say_bytes(line.as_bytes()).await;
    }

    async fn say_bytes(&mut self, line: &[u8]) {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\r\n").await.unwrap();
    }

    async fn heard(&mut self) -> String {
        self.lines.next_line().await.unwrap().unwrap()
    }
}

fn connect(config: SessionConfig) -> (ChannelSession<DuplexStream>, FakeServer, ShutdownSignal) {
    let (client, server) = tokio::io::duplex(4096);
    let (read_half, writer) = tokio::io::split(server);
    let shutdown = ShutdownSignal::new();
    let session = ChannelSession::new(client, config, shutdown.clone());
    let server = FakeServer {
        lines: BufReader::new(read_half).lines(),
        writer,
    };
    (session, server, shutdown)
}

async fn pump(session: &mut ChannelSession<DuplexStream>) {
    let line = session.next_line().await.unwrap();
    session.handle_line(&line).await;
}

async fn joined_session() -> (ChannelSession<DuplexStream>, FakeServer, ShutdownSignal) {
    let (mut session, mut server, shutdown) = connect(SessionConfig::new("music", "songbot"));
    session.register().await;
    server.heard().await;
    server.heard().await;

    server.say(":irc.test 001 songbot :Welcome").await;
    pump(&mut session).await;
    assert_eq!(server.heard().await, "JOIN #music");

    server.say(":songbot!~bot@host JOIN #music").await;
    pump(&mut session).await;
    assert_eq!(session.state(), SessionState::Joined);

    (session, server, shutdown)
}

#[test]
fn channel_prefix_added_once() {
    assert_eq!(normalize_channel("music"), "#music");
    assert_eq!(normalize_channel("#music"), "#music");
    assert_eq!(normalize_channel("&local"), "&local");
}

#[tokio::test]
async fn session_normalizes_channel_at_construction() {
    let (session, _server, _shutdown) = connect(SessionConfig::new("music", "songbot"));

    assert_eq!(session.channel(), "#music");
    assert_eq!(session.state(), SessionState::Connecting);
}

#[tokio::test]
async fn registration_sends_pass_nick_and_user() {
    let mut config = SessionConfig::new("#music", "songbot");
    config.password = Some("secret".into());
    config.realname = Some("Song Bot".into());
    let (mut session, mut server, _shutdown) = connect(config);

    session.register().await;

    assert_eq!(server.heard().await, "PASS secret");
    assert_eq!(server.heard().await, "NICK songbot");
    assert_eq!(server.heard().await, "USER songbot 0 * :Song Bot");
}

#[tokio::test]
async fn joins_after_welcome_and_sends_actions() {
    let (mut session, mut server, shutdown) = joined_session().await;

    session.send("is now playing: Artist X - Song A").await;

    assert_eq!(
        server.heard().await,
        "PRIVMSG #music :\u{1}ACTION is now playing: Artist X - Song A\u{1}"
    );
    assert!(!shutdown.is_triggered());
}

#[tokio::test]
async fn send_before_join_is_a_silent_no_op() {
    let (mut session, mut server, shutdown) = connect(SessionConfig::new("music", "songbot"));

    session.send("too early").await;
    server.say(":irc.test 001 songbot :Welcome").await;
    pump(&mut session).await;
    session.send("still too early").await;

    assert_eq!(session.state(), SessionState::Joining);
    assert_eq!(server.heard().await, "JOIN #music");

    session.quit("bye").await;
    assert_eq!(server.heard().await, "QUIT bye");
    assert!(!shutdown.is_triggered());
}

#[tokio::test]
async fn answers_ping_with_pong() {
    let (mut session, mut server, _shutdown) = connect(SessionConfig::new("music", "songbot"));

    server.say("PING :irc.test").await;
    pump(&mut session).await;

    assert_eq!(server.heard().await, "PONG irc.test");
}

#[tokio::test]
async fn join_from_another_user_does_not_count() {
    let (mut session, mut server, _shutdown) = connect(SessionConfig::new("music", "songbot"));
    server.say(":irc.test 001 songbot :Welcome").await;
    pump(&mut session).await;

    server.say(":someone!~x@host JOIN #music").await;
    pump(&mut session).await;

    assert_eq!(session.state(), SessionState::Joining);
}

#[tokio::test]
async fn retries_with_underscore_on_nick_collision() {
    let (mut session, mut server, shutdown) = connect(SessionConfig::new("music", "songbot"));

    server.say(":irc.test 433 * songbot :Nickname is already in use").await;
    pump(&mut session).await;

    assert_eq!(server.heard().await, "NICK songbot_");
    assert_eq!(session.nickname(), "songbot_");
    assert!(session.is_open());
    assert!(!shutdown.is_triggered());
}

#[tokio::test]
async fn gives_up_after_repeated_nick_collisions() {
    let (mut session, mut server, shutdown) = connect(SessionConfig::new("music", "songbot"));

    for _ in 0..=MAX_NICK_RETRIES {
        server.say(":irc.test 433 * songbot :Nickname is already in use").await;
        pump(&mut session).await;
    }

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::ConnectFailed));
}

#[tokio::test]
async fn refused_join_is_a_connect_failure() {
    let (mut session, mut server, shutdown) = connect(SessionConfig::new("music", "songbot"));
    server.say(":irc.test 001 songbot :Welcome").await;
    pump(&mut session).await;

    server.say(":irc.test 474 songbot #music :Cannot join channel (+b)").await;
    pump(&mut session).await;

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::ConnectFailed));
}

#[tokio::test]
async fn eof_before_welcome_is_a_connect_failure() {
    let (mut session, server, shutdown) = connect(SessionConfig::new("music", "songbot"));
    drop(server);

    assert!(session.next_line().await.is_none());
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::ConnectFailed));
}

#[tokio::test]
async fn eof_after_join_is_connection_loss() {
    let (mut session, server, shutdown) = joined_session().await;
    drop(server);

    assert!(session.next_line().await.is_none());
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::ConnectionLost));

    session.send("after the end").await;
    assert!(session.next_line().await.is_none());
}

#[tokio::test]
async fn latin1_line_does_not_drop_the_connection() {
    let (mut session, mut server, shutdown) = joined_session().await;

    server.say_bytes(b":fan!~f@host PRIVMSG #music :caf\xe9").await;
    let line = session.next_line().await.unwrap();
    assert_eq!(line, ":fan!~f@host PRIVMSG #music :caf\u{FFFD}");
    session.handle_line(&line).await;

    server.say("PING :still-here").await;
    pump(&mut session).await;

    assert_eq!(server.heard().await, "PONG still-here");
    assert_eq!(session.state(), SessionState::Joined);
    assert!(!shutdown.is_triggered());
}

#[tokio::test]
async fn line_split_across_reads_is_reassembled() {
    let (mut session, mut server, _shutdown) = joined_session().await;

    server.writer.write_all(b"PING :in-").await.unwrap();
    tokio::select! {
        biased;
        _ = session.next_line() => panic!("line completed early"),
        () = tokio::task::yield_now() => {}
    }
    server.writer.write_all(b"pieces\r\n").await.unwrap();
    pump(&mut session).await;

    assert_eq!(server.heard().await, "PONG in-pieces");
}

#[tokio::test]
async fn server_error_closes_session() {
    let (mut session, mut server, shutdown) = joined_session().await;

    server.say("ERROR :Closing link (Ping timeout)").await;
    pump(&mut session).await;

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::ConnectionLost));
}

#[tokio::test]
async fn kick_is_connection_loss() {
    let (mut session, mut server, shutdown) = joined_session().await;

    server.say(":op!~o@host KICK #music songbot :no bots").await;
    pump(&mut session).await;

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(shutdown.reason(), Some(ShutdownReason::ConnectionLost));
}

#[tokio::test]
async fn quit_does_not_trigger_shutdown() {
    let (mut session, mut server, shutdown) = joined_session().await;

    session.quit("Shutting down").await;

    assert_eq!(server.heard().await, "QUIT :Shutting down");
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!shutdown.is_triggered());
}
