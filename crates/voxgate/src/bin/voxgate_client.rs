use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::tungstenite::Message;

const SAMPLE_RATE: u32 = 16_000;

/// Test client: type commands, or stream an audio file, and print the gateway's replies.
#[derive(Debug, Parser)]
#[command(name = "voxgate-client", version)]
struct Cli {
    #[arg(long, default_value = "ws://127.0.0.1:12345/ws")]
    url: String,

    /// 16 kHz mono 16-bit WAV, or raw little-endian PCM in the same format.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Bytes per binary frame when streaming audio.
    #[arg(long, default_value_t = 8_000)]
    frame_bytes: usize,
}

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut socket, _) = tokio_tungstenite::connect_async(cli.url.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", cli.url))?;

    match cli.audio {
        Some(path) => send_audio(&mut socket, &path, cli.frame_bytes).await?,
        None => interactive(&mut socket).await?,
    }

    let _ = socket.close(None).await;
    Ok(())
}

async fn interactive(socket: &mut Socket) -> Result<()> {
    println!("Type a command and press Enter. Ctrl+D quits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        socket.send(Message::Text(line.to_string())).await?;
        println!("Received: {}", next_reply(socket).await?);
    }
    Ok(())
}

async fn send_audio(socket: &mut Socket, path: &Path, frame_bytes: usize) -> Result<()> {
    if frame_bytes == 0 || frame_bytes % 2 != 0 {
        bail!("frame size must be a positive even number of bytes");
    }
    let pcm = read_pcm(path)?;
    let mut last = String::new();
    for frame in pcm.chunks(frame_bytes) {
        socket.send(Message::Binary(frame.to_vec())).await?;
        last = next_reply(socket).await?;
        println!("Received: {last}");
    }
    if last.is_empty() {
        bail!("{} contains no audio", path.display());
    }
    Ok(())
}

async fn next_reply(socket: &mut Socket) -> Result<String> {
    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => return Ok(text),
            Message::Close(frame) => {
                let reason = frame.map(|frame| frame.reason.to_string()).unwrap_or_default();
                bail!("gateway closed the connection: {reason}");
            }
            _ => continue,
        }
    }
    bail!("gateway closed the connection")
}

fn read_pcm(path: &Path) -> Result<Vec<u8>> {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if is_wav {
        wav_pcm_bytes(path)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn wav_pcm_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1
        || spec.sample_rate != SAMPLE_RATE
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
    {
        bail!(
            "{} must be {SAMPLE_RATE} Hz mono 16-bit PCM, got {} Hz, {} channel(s), {} bits",
            path.display(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample
        );
    }
    let mut bytes = Vec::with_capacity(reader.len() as usize * 2);
    for sample in reader.samples::<i16>() {
        bytes.extend_from_slice(&sample?.to_le_bytes());
    }
    Ok(bytes)
}
