//! A minimal SMTP sink for contract tests: listens on an OS-assigned
//! port, speaks just enough SMTP to accept deliveries, and hands the
//! recorded envelope + message data to the test over a channel.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReceivedMail {
    pub envelope_from: String,
    pub envelope_to: Vec<String>,
    pub data: String,
}

pub struct MailSink {
    pub port: u16,
    inbox: Receiver<ReceivedMail>,
}

impl MailSink {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mail sink");
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = channel();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let _ = serve(stream, &tx);
            }
        });
        MailSink { port, inbox: rx }
    }

    pub fn recv(&self) -> ReceivedMail {
        self.inbox
            .recv_timeout(Duration::from_secs(5))
            .expect("no mail received by sink")
    }

    pub fn try_recv(&self) -> Option<ReceivedMail> {
        self.inbox.try_recv().ok()
    }
}

fn serve(stream: TcpStream, tx: &Sender<ReceivedMail>) -> std::io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut stream = stream;
    stream.write_all(b"220 mailsink ESMTP ready\r\n")?;

    let mut from = String::new();
    let mut rcpts: Vec<String> = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let cmd = line.trim_end();
        let upper = cmd.to_ascii_uppercase();
        if upper.starts_with("EHLO") || upper.starts_with("HELO") {
            stream.write_all(b"250 mailsink\r\n")?;
        } else if upper.starts_with("MAIL FROM:") {
            from = strip_angles(&cmd["MAIL FROM:".len()..]);
            stream.write_all(b"250 OK\r\n")?;
        } else if upper.starts_with("RCPT TO:") {
            rcpts.push(strip_angles(&cmd["RCPT TO:".len()..]));
            stream.write_all(b"250 OK\r\n")?;
        } else if upper == "DATA" {
            stream.write_all(b"354 end data with <CRLF>.<CRLF>\r\n")?;
            let mut data = String::new();
            loop {
                let mut body_line = String::new();
                if reader.read_line(&mut body_line)? == 0 {
                    return Ok(());
                }
                if body_line == ".\r\n" || body_line == ".\n" {
                    break;
                }
                data.push_str(&body_line);
            }
            stream.write_all(b"250 OK\r\n")?;
            let _ = tx.send(ReceivedMail {
                envelope_from: from.clone(),
                envelope_to: rcpts.clone(),
                data,
            });
            rcpts.clear();
        } else if upper == "RSET" {
            from.clear();
            rcpts.clear();
            stream.write_all(b"250 OK\r\n")?;
        } else if upper == "QUIT" {
            stream.write_all(b"221 bye\r\n")?;
            return Ok(());
        } else if upper.starts_with("NOOP") {
            stream.write_all(b"250 OK\r\n")?;
        } else {
            stream.write_all(b"502 command not implemented\r\n")?;
        }
    }
}

fn strip_angles(s: &str) -> String {
    s.trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}
