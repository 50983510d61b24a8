use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::adapter::*;

const MAX_BACKOFF_SECS: u64 = 60;

/// Longest line accepted from the server: 8191 bytes of IRCv3 tags plus the
/// 512-byte message. Longer lines are dropped.
pub const MAX_LINE_LEN: usize = 8191 + 512;

/// Connection settings for [`IrcChannel`].
#[derive(Debug, Clone)]
pub struct IrcSettings {
    pub nick: String,
    pub user: String,
    pub password: Option<String>,
    /// `host:port`.
    pub address: String,
    /// Rooms to join once the server welcomes us, `#`-prefixed.
    pub rooms: Vec<String>,
}

/// IRC channel adapter over a plain TCP connection.
///
/// Registers with `PASS`/`NICK`/`USER`, joins every configured room on the
/// `001` welcome, answers `PING`, and turns `PRIVMSG` lines into
/// [`ChannelEvent::Message`]. Reconnects with exponential backoff until
/// stopped.
///
/// ```toml
/// [irc]
/// nick = "karmanator"
/// server = "irc.libera.chat"
/// port = 6667
/// rooms = ["general"]
/// ```
pub struct IrcChannel {
    id: String,
    settings: IrcSettings,
    connected: Arc<AtomicBool>,
    shutdown_tx: Option<watch::Sender<bool>>,
    outbound_tx: Option<mpsc::Sender<String>>,
}

impl IrcChannel {
    pub fn new(id: String, settings: IrcSettings) -> Self {
        Self {
            id,
            settings,
            connected: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
            outbound_tx: None,
        }
    }
}

#[async_trait]
impl Channel for IrcChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel_type(&self) -> &str {
        "irc"
    }

    async fn start(&mut self) -> karmanator_core::Result<mpsc::Receiver<ChannelEvent>> {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (outbound_tx, outbound_rx) = mpsc::channel(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);
        self.outbound_tx = Some(outbound_tx);

        let settings = self.settings.clone();
        let connected = self.connected.clone();
        let channel_id = self.id.clone();

        tokio::spawn(async move {
            irc_connection_loop(
                settings,
                channel_id,
                event_tx,
                outbound_rx,
                shutdown_rx,
                connected,
            )
            .await;
        });

        Ok(event_rx)
    }

    async fn send(&self, message: OutgoingMessage) -> karmanator_core::Result<()> {
        let tx = self
            .outbound_tx
            .as_ref()
            .ok_or_else(|| karmanator_core::KarmaError::ChannelNotConnected(self.id.clone()))?;
        tx.send(privmsg_line(&message.target, &message.text))
            .await
            .map_err(|e| karmanator_core::KarmaError::Channel {
                channel: "irc".into(),
                reason: e.to_string(),
            })
    }

    async fn stop(&mut self) -> karmanator_core::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        self.outbound_tx = None;
        self.connected.store(false, Ordering::SeqCst);
        info!("IRC channel stopped");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// How a single connection ended.
enum SessionEnd {
    Shutdown,
    Closed,
}

/// Connect, run one session, and reconnect with backoff until shut down.
async fn irc_connection_loop(
    settings: IrcSettings,
    channel_id: String,
    event_tx: mpsc::Sender<ChannelEvent>,
    mut outbound_rx: mpsc::Receiver<String>,
    mut shutdown_rx: watch::Receiver<bool>,
    connected: Arc<AtomicBool>,
) {
    let mut backoff = 1u64;

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let mut welcomed = false;
        let result = irc_session(
            &settings,
            &channel_id,
            &event_tx,
            &mut outbound_rx,
            &mut shutdown_rx,
            &connected,
            &mut welcomed,
        )
        .await;
        connected.store(false, Ordering::SeqCst);

        let reason = match result {
            Ok(SessionEnd::Shutdown) => break,
            Ok(SessionEnd::Closed) => "server closed the connection".to_string(),
            Err(e) => e.to_string(),
        };
        if welcomed {
            backoff = 1;
        }

        warn!(address = %settings.address, reason = %reason, backoff, "IRC connection lost");
        if event_tx
            .send(ChannelEvent::Disconnected(Some(reason)))
            .await
            .is_err()
        {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(backoff)) => {}
            res = shutdown_rx.changed() => {
                if res.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
        backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
    }

    connected.store(false, Ordering::SeqCst);
    info!("IRC connection loop exited");
}

async fn irc_session(
    settings: &IrcSettings,
    channel_id: &str,
    event_tx: &mpsc::Sender<ChannelEvent>,
    outbound_rx: &mut mpsc::Receiver<String>,
    shutdown_rx: &mut watch::Receiver<bool>,
    connected: &AtomicBool,
    welcomed: &mut bool,
) -> karmanator_core::Result<SessionEnd> {
    info!(address = %settings.address, nick = %settings.nick, "connecting to IRC");
    let stream = TcpStream::connect(&settings.address).await?;
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    for line in registration_lines(settings) {
        write_half.write_all(line.as_bytes()).await?;
    }

    let mut nick = settings.nick.clone();
    let mut buf = Vec::with_capacity(512);
    let mut discarding = false;

    loop {
        tokio::select! {
            res = shutdown_rx.changed() => {
                if res.is_err() || *shutdown_rx.borrow() {
                    let _ = write_half.write_all(b"QUIT :shutting down\r\n").await;
                    return Ok(SessionEnd::Shutdown);
                }
            }
            Some(line) = outbound_rx.recv() => {
                write_half.write_all(line.as_bytes()).await?;
            }
            read = read_capped_line(&mut reader, &mut buf, &mut discarding) => {
                if !read? {
                    return Ok(SessionEnd::Closed);
                }
                let raw = String::from_utf8_lossy(&buf).into_owned();
                buf.clear();

                let Some(line) = IrcLine::parse(&raw) else {
                    continue;
                };

                match line.command.as_str() {
                    "PING" => {
                        let token = line.params.last().map(String::as_str).unwrap_or("");
                        write_half.write_all(format!("PONG :{token}\r\n").as_bytes()).await?;
                    }
                    "001" => {
                        *welcomed = true;
                        connected.store(true, Ordering::SeqCst);
                        info!("got welcome message, joining rooms");
                        let _ = event_tx.send(ChannelEvent::Connected).await;
                        for room in &settings.rooms {
                            write_half.write_all(format!("JOIN {room}\r\n").as_bytes()).await?;
                        }
                    }
                    "433" => {
                        nick.push('_');
                        warn!(nick = %nick, "nick in use, retrying");
                        write_half.write_all(format!("NICK {nick}\r\n").as_bytes()).await?;
                    }
                    "JOIN" => {
                        if line.nick() == Some(nick.as_str()) {
                            let room = line.params.first().map(String::as_str).unwrap_or("");
                            info!(room = %room, "joined room");
                        }
                    }
                    "PRIVMSG" => {
                        if let Some(msg) = line.to_incoming(channel_id) {
                            debug!(sender = %msg.sender, group = ?msg.group, "IRC message");
                            if event_tx.send(ChannelEvent::Message(msg)).await.is_err() {
                                return Ok(SessionEnd::Shutdown);
                            }
                        }
                    }
                    "ERROR" => {
                        let reason = line.params.last().cloned().unwrap_or_default();
                        error!(reason = %reason, "IRC server error");
                        return Err(karmanator_core::KarmaError::Channel {
                            channel: "irc".into(),
                            reason,
                        });
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Read one `\n`-terminated line into `buf`, never holding more than
/// [`MAX_LINE_LEN`] bytes. Oversize lines are dropped whole. Returns `false`
/// at end of stream.
///
/// Cancel safe: partial input stays in `buf` and `discarding` between calls.
pub async fn read_capped_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    discarding: &mut bool,
) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let budget = (MAX_LINE_LEN - buf.len()) as u64;
        (&mut *reader).take(budget).read_until(b'\n', buf).await?;

        if buf.ends_with(b"\n") {
            if std::mem::take(discarding) {
                buf.clear();
                continue;
            }
            return Ok(true);
        }
        if buf.len() < MAX_LINE_LEN {
            return Ok(false);
        }
        if !*discarding {
            warn!(limit = MAX_LINE_LEN, "dropping oversize IRC line");
        }
        *discarding = true;
        buf.clear();
    }
}

/// Lines sent right after the TCP connection opens.
pub fn registration_lines(settings: &IrcSettings) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if let Some(pass) = settings.password.as_deref().filter(|p| !p.is_empty()) {
        lines.push(format!("PASS {pass}\r\n"));
    }
    lines.push(format!("NICK {}\r\n", settings.nick));
    lines.push(format!("USER {} 0 * :{}\r\n", settings.user, settings.user));
    lines
}

/// A `PRIVMSG` line for `target`. Line breaks in `text` become spaces so a
/// reply can never smuggle in a second command.
pub fn privmsg_line(target: &str, text: &str) -> String {
    let text: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    format!("PRIVMSG {target} :{text}\r\n")
}

fn is_room(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}

/// One parsed IRC protocol line. The trailing parameter, if any, is the
/// last entry of `params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcLine {
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        // IRCv3 message tags are not used.
        if rest.starts_with('@') {
            rest = rest.split_once(' ')?.1.trim_start();
        }

        let prefix = if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, tail) = stripped.split_once(' ')?;
            rest = tail.trim_start();
            Some(prefix.to_string())
        } else {
            None
        };

        let (command, mut tail) = match rest.split_once(' ') {
            Some((command, tail)) => (command, tail),
            None => (rest, ""),
        };
        if command.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        loop {
            tail = tail.trim_start_matches(' ');
            if tail.is_empty() {
                break;
            }
            if let Some(trailing) = tail.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match tail.split_once(' ') {
                Some((param, next)) => {
                    params.push(param.to_string());
                    tail = next;
                }
                None => {
                    params.push(tail.to_string());
                    break;
                }
            }
        }

        Some(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// The nick part of a `nick!user@host` prefix.
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        Some(prefix.split_once('!').map_or(prefix, |(nick, _)| nick))
    }

    /// Convert a `PRIVMSG` into an [`IncomingMessage`]. CTCP `ACTION`
    /// (`/me`) is unwrapped; other CTCP requests are dropped.
    pub fn to_incoming(&self, channel_id: &str) -> Option<IncomingMessage> {
        if self.command != "PRIVMSG" || self.params.len() < 2 {
            return None;
        }
        let sender = self.nick()?;
        let target = &self.params[0];
        let mut text = self.params[1].as_str();

        if let Some(ctcp) = text.strip_prefix('\u{1}') {
            let ctcp = ctcp.trim_end_matches('\u{1}');
            text = ctcp.strip_prefix("ACTION ")?;
        }

        let group = is_room(target).then(|| target.clone());
        Some(IncomingMessage::new(channel_id, sender, group, text))
    }
}
