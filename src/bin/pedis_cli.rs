// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A thin line-protocol client: joins its trailing arguments into one
//! inline command, prints the single reply frame, and exits. With no
//! trailing arguments it instead runs a simple stdin REPL, mirroring the
//! prototype's own `client.py`.

use std::{
    io::{self, BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpStream},
};

use anyhow::{Context, Result, bail};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 6379;

struct Args {
    host: String,
    port: u16,
    command: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut host = DEFAULT_HOST.to_string();
    let mut port = DEFAULT_PORT;
    let mut command = Vec::new();

    let mut raw = std::env::args().skip(1).peekable();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-h" => host = raw.next().context("-h requires a host argument")?,
            "-p" => {
                let value = raw.next().context("-p requires a port argument")?;
                port = value.parse().context("invalid port")?;
            },
            other => command.push(other.to_string()),
        }
    }

    Ok(Args { host, port, command })
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid host/port")?;

    let stream = TcpStream::connect(addr).with_context(|| format!("failed to connect to {addr}"))?;
    let mut reader = BufReader::new(stream.try_clone().context("failed to clone socket")?);
    let mut writer = stream;

    if args.command.is_empty() {
        run_repl(&mut writer, &mut reader)
    } else {
        let line = args.command.join(" ");
        send_command(&mut writer, &line)?;
        let reply = read_reply_frame(&mut reader)?;
        println!("{}", String::from_utf8_lossy(&reply));
        Ok(())
    }
}

fn run_repl(writer: &mut TcpStream, reader: &mut BufReader<TcpStream>) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("pedis> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        send_command(writer, line)?;
        let reply = read_reply_frame(reader)?;
        println!("{}", String::from_utf8_lossy(&reply));

        if line.eq_ignore_ascii_case("quit") {
            break;
        }
    }
    Ok(())
}

fn send_command(writer: &mut TcpStream, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads exactly one reply frame: either a single CRLF-terminated line, or a
/// bulk frame `$<len>\r\n<len bytes>\r\n`, as written by the servers's
/// protocol codec.
fn read_reply_frame(reader: &mut BufReader<TcpStream>) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    read_crlf_line(reader, &mut line)?;

    if line.first() != Some(&b'$') {
        return Ok(line);
    }

    let len: usize = std::str::from_utf8(&line[1..])
        .ok()
        .and_then(|s| s.parse().ok())
        .context("malformed bulk length in reply")?;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).context("truncated bulk reply body")?;
    let mut term = [0u8; 2];
    reader.read_exact(&mut term).context("truncated bulk reply terminator")?;
    if &term != b"\r\n" {
        bail!("malformed bulk reply terminator");
    }
    Ok(payload)
}

fn read_crlf_line(reader: &mut BufReader<TcpStream>, out: &mut Vec<u8>) -> Result<()> {
    reader.read_until(b'\n', out).context("connection closed before a full reply line")?;
    if out.last() == Some(&b'\n') {
        out.pop();
        if out.last() == Some(&b'\r') {
            out.pop();
        }
    }
    Ok(())
}
