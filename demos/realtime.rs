use std::io::Cursor;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::Engine;
use gemini_live::types::audio::{Modality, Voice};
use gemini_live::types::setup::Setup;
use gemini_live::types::ResponseContent;
use gemini_live::GeminiLive;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Captures 16kHz mono PCM with `arecord`, streams it to the model and saves spoken answers as WAV files.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv_override().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    let api_key = std::env::var("GEMINI_API_KEY")?;
    let setup = Setup::builder()
        .with_response_modality(Modality::Audio)
        .with_voice(Voice::Kore)
        .build();
    let client = GeminiLive::new(&api_key, setup)?;
    client.on_close(|reason| println!("closed: {:?}", reason));
    client.connect().await?;

    let sink = client.writable_stream().await?;

    let turns = AtomicUsize::new(0);
    client.realtime(
        move |response| match response.into_content() {
            ResponseContent::Audio { audio, text } => {
                let turn = turns.fetch_add(1, Ordering::SeqCst);
                if let Err(e) = save_wav(turn, audio.data()) {
                    eprintln!("failed to save turn {}: {}", turn, e);
                }
                if let Some(text) = text {
                    println!("transcript: {}", text);
                }
            }
            ResponseContent::Text { text } => println!("text: {:?}", text),
            ResponseContent::Function { function_call, .. } => println!("function call: {:?}", function_call),
        },
        None,
    )?;

    let mut recorder = tokio::process::Command::new("arecord")
        .args(["-q", "-t", "raw", "-f", "S16_LE", "-c", "1", "-r", "16000"])
        .stdout(Stdio::piped())
        .spawn()?;
    let stdout = recorder
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("arecord has no stdout"))?;

    println!("listening, press ctrl-c to stop");
    tokio::select! {
        sent = sink.pipe_from(stdout) => println!("microphone closed after {} bytes", sent?),
        _ = tokio::signal::ctrl_c() => println!("stopping"),
    }

    recorder.kill().await.ok();
    client.close().await.ok();
    Ok(())
}

fn save_wav(turn: usize, data: &str) -> anyhow::Result<()> {
    let wav = base64::engine::general_purpose::STANDARD.decode(data)?;
    let reader = hound::WavReader::new(Cursor::new(&wav))?;
    let spec = reader.spec();
    let seconds = reader.duration() as f32 / spec.sample_rate as f32;

    let path = format!("turn-{}.wav", turn);
    std::fs::write(&path, &wav)?;
    println!("saved {} ({:.1}s at {}Hz)", path, seconds, spec.sample_rate);
    Ok(())
}
