use std::fmt;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf},
    net::{TcpStream, lookup_host},
};
use tracing::{debug, error, info, instrument, trace, warn};

use super::{Message, SessionError};
use crate::{
    bridge::NotificationSink,
    shutdown::{ShutdownReason, ShutdownSignal},
};

/// Characters that start a channel name.
const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Nick collisions tolerated during registration before giving up.
pub const MAX_NICK_RETRIES: u8 = 3;

/// Numeric replies refusing a `JOIN`.
const JOIN_REFUSALS: [&str; 6] = ["403", "405", "471", "473", "474", "475"];

/// Lifecycle of the connection to the IRC server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, registration sent, waiting for the welcome
    Connecting,
    /// Registered, `JOIN` sent, waiting for its confirmation
    Joining,
    /// In the channel; messages are delivered
    Joined,
    /// Connection gone; terminal
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Joining => write!(f, "joining"),
            SessionState::Joined => write!(f, "joined"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Identity and destination of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Channel to announce in
    pub channel: String,
    /// Nickname to register with
    pub nickname: String,
    /// Username for `USER`, defaults to the nickname
    pub username: Option<String>,
    /// Real name for `USER`, defaults to the nickname
    pub realname: Option<String>,
    /// Server password for `PASS`
    pub password: Option<String>,
}

impl SessionConfig {
    /// Minimal configuration: a channel and a nickname.
    pub fn new(channel: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            nickname: nickname.into(),
            username: None,
            realname: None,
            password: None,
        }
    }
}

/// Prefix `#` to a channel name that lacks a channel prefix.
pub fn normalize_channel(channel: &str) -> String {
    if channel.starts_with(CHANNEL_PREFIXES) {
        channel.to_string()
    } else {
        format!("#{channel}")
    }
}

/// A single IRC connection joined to one channel.
///
/// Owns the socket for its whole life. Every fatal condition (failed
/// handshake, refused join, lost connection) moves it to
/// [`SessionState::Closed`] and triggers the shared [`ShutdownSignal`].
pub struct ChannelSession<S> {
    reader: BufReader<ReadHalf<S>>,
    line: Vec<u8>,
    writer: WriteHalf<S>,
    state: SessionState,
    config: SessionConfig,
    current_nick: String,
    nick_retries: u8,
    shutdown: ShutdownSignal,
}

impl ChannelSession<TcpStream> {
    /// Resolve `host` and open a TCP connection to it.
    ///
    /// A host that does not resolve is a startup error and leaves the
    /// shutdown signal untouched. A resolved host that refuses the
    /// connection is a connect failure: it is logged and shutdown is
    /// triggered before the error is returned.
    ///
    /// # Errors
    /// Returns `SessionError::Resolve` or `SessionError::Connect`
    #[instrument(skip(config, shutdown), fields(channel = %config.channel))]
    pub async fn connect(
        host: &str,
        port: u16,
        config: SessionConfig,
        shutdown: ShutdownSignal,
    ) -> Result<Self, SessionError> {
        let addrs: Vec<_> = lookup_host((host, port))
            .await
            .map_err(|e| SessionError::Resolve {
                host: host.to_string(),
                details: e.to_string(),
            })?
            .collect();

        match TcpStream::connect(addrs.as_slice()).await {
            Ok(stream) => {
                info!(host, port, "Connected");
                Ok(Self::new(stream, config, shutdown))
            }
            Err(source) => {
                let err = SessionError::Connect {
                    host: host.to_string(),
                    port,
                    source,
                };
                error!("Could not connect: {err}");
                shutdown.trigger(ShutdownReason::ConnectFailed);
                Err(err)
            }
        }
    }
}

impl<S> ChannelSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established connection. The channel name is normalized here.
    pub fn new(stream: S, mut config: SessionConfig, shutdown: ShutdownSignal) -> Self {
        let (read_half, writer) = tokio::io::split(stream);
        config.channel = normalize_channel(&config.channel);
        let current_nick = config.nickname.clone();

        Self {
            reader: BufReader::new(read_half),
            line: Vec::new(),
            writer,
            state: SessionState::Connecting,
            config,
            current_nick,
            nick_retries: 0,
            shutdown,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the connection is still usable.
    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    /// Channel messages are sent to, prefix included.
    pub fn channel(&self) -> &str {
        &self.config.channel
    }

    /// Nickname currently registered or being registered.
    pub fn nickname(&self) -> &str {
        &self.current_nick
    }

    /// Send the registration sequence.
    pub async fn register(&mut self) {
        if let Some(password) = self.config.password.clone() {
            self.write(&Message::new("PASS", [password])).await;
        }

        let nick = self.current_nick.clone();
        let username = self.config.username.clone().unwrap_or_else(|| nick.clone());
        let realname = self.config.realname.clone().unwrap_or_else(|| nick.clone());

        self.write(&Message::new("NICK", [&nick])).await;
        self.write(&Message::new("USER", [username.as_str(), "0", "*", realname.as_str()]))
            .await;
        debug!(nick, "Registration sent");
    }

    /// Read the next line from the server.
    ///
    /// Returns `None` once the connection is closed; end of stream and read
    /// errors close the session. Bytes that are not UTF-8 are replaced, not
    /// rejected: other users' text is relayed unchanged by the server.
    /// Cancel safe, a partial line stays buffered until the next call.
    pub async fn next_line(&mut self) -> Option<String> {
        if !self.is_open() {
            return None;
        }

        match self.reader.read_until(b'\n', &mut self.line).await {
            Ok(0) => {
                self.close("server closed the connection");
                None
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.line)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                self.line.clear();
                Some(line)
            }
            Err(e) => {
                self.close(format!("read failed: {e}"));
                None
            }
        }
    }

    /// React to one line received from the server.
    pub async fn handle_line(&mut self, line: &str) {
        let message = match Message::parse(line) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Ignoring line");
                return;
            }
        };
        trace!(%message, "Received");

        match message.command.as_str() {
            "PING" => self.write(&Message::new("PONG", &message.params)).await,
            "001" => self.on_welcome(&message).await,
            "433" => self.on_nick_in_use().await,
            "JOIN" => self.on_join(&message),
            "KICK" => self.on_kick(&message),
            "ERROR" => {
                let reason = message.param(0).unwrap_or("no reason given").to_string();
                self.close(format!("server error: {reason}"));
            }
            code if JOIN_REFUSALS.contains(&code) => self.on_join_refused(&message),
            _ => {}
        }
    }

    /// Send `text` to the channel as an action.
    ///
    /// Outside [`SessionState::Joined`] nothing is sent and nothing is
    /// queued.
    pub async fn send(&mut self, text: &str) {
        if self.state != SessionState::Joined {
            debug!(state = %self.state, "Not in channel, dropping message");
            return;
        }

        let message = Message::action(&self.config.channel, text);
        self.write(&message).await;
    }

    /// Leave the server politely and close the connection.
    ///
    /// Does not trigger shutdown; used once shutdown is already under way.
    pub async fn quit(&mut self, reason: &str) {
        if !self.is_open() {
            return;
        }

        self.write(&Message::new("QUIT", [reason])).await;
        if let Err(e) = self.writer.shutdown().await {
            debug!(error = %e, "Socket shutdown failed");
        }
        self.state = SessionState::Closed;
        info!("Disconnected");
    }

    async fn on_welcome(&mut self, message: &Message) {
        if self.state != SessionState::Connecting {
            return;
        }

        if let Some(nick) = message.param(0) {
            self.current_nick = nick.to_string();
        }
        info!(nick = %self.current_nick, "Signed on");

        self.state = SessionState::Joining;
        let join = Message::new("JOIN", [self.config.channel.as_str()]);
        self.write(&join).await;
    }

    async fn on_nick_in_use(&mut self) {
        if self.state != SessionState::Connecting {
            return;
        }

        if self.nick_retries >= MAX_NICK_RETRIES {
            self.close(format!("nickname {} is in use", self.current_nick));
            return;
        }

        self.nick_retries += 1;
        self.current_nick.push('_');
        warn!(nick = %self.current_nick, "Nickname in use, retrying");
        let nick = Message::new("NICK", [self.current_nick.as_str()]);
        self.write(&nick).await;
    }

    fn on_join(&mut self, message: &Message) {
        let ours = message
            .source_nick()
            .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.current_nick));
        let channel = message
            .param(0)
            .is_some_and(|channel| channel.eq_ignore_ascii_case(&self.config.channel));

        if ours && channel && self.state == SessionState::Joining {
            self.state = SessionState::Joined;
            info!(channel = %self.config.channel, "Joined channel");
        }
    }

    fn on_join_refused(&mut self, message: &Message) {
        let channel = message
            .param(1)
            .is_some_and(|channel| channel.eq_ignore_ascii_case(&self.config.channel));

        if channel && self.state == SessionState::Joining {
            let reason = message.params.last().cloned().unwrap_or_default();
            self.close(format!("cannot join {}: {reason}", self.config.channel));
        }
    }

    fn on_kick(&mut self, message: &Message) {
        let channel = message
            .param(0)
            .is_some_and(|channel| channel.eq_ignore_ascii_case(&self.config.channel));
        let us = message
            .param(1)
            .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.current_nick));

        if channel && us {
            self.close(format!("kicked from {}", self.config.channel));
        }
    }

    async fn write(&mut self, message: &Message) {
        if !self.is_open() {
            return;
        }

        let line = message.to_line();
        let result = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.flush().await
        }
        .await;

        match result {
            Ok(()) => trace!(%message, "Sent"),
            Err(e) => self.close(format!("write failed: {e}")),
        }
    }

    /// Move to `Closed` and trigger shutdown.
    ///
    /// Failing before the channel was joined counts as a connect failure.
    fn close(&mut self, detail: impl fmt::Display) {
        let reason = match self.state {
            SessionState::Closed => return,
            SessionState::Connecting | SessionState::Joining => ShutdownReason::ConnectFailed,
            SessionState::Joined => ShutdownReason::ConnectionLost,
        };

        error!(state = %self.state, "Connection closed: {detail}");
        self.state = SessionState::Closed;
        self.shutdown.trigger(reason);
    }
}

#[async_trait]
impl<S> NotificationSink for ChannelSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, text: &str) {
        ChannelSession::send(self, text).await;
    }
}
