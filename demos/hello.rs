use gemini_live::types::setup::Setup;
use gemini_live::types::{Prompt, Role};
use gemini_live::GeminiLive;

#[tokio::main]
async fn main() {
    dotenvy::dotenv_override().ok();
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
    let setup = Setup::builder()
        .with_system_instruction("You are a helpful assistant. Keep answers short.")
        .build();
    let client = GeminiLive::new(&api_key, setup).expect("failed to create client");

    client
        .on_open(|| println!("Socket open"))
        .on_handshake(|| println!("Connected to Gemini live API"))
        .on_close(|reason| println!("Closed: {:?}", reason));

    client.connect().await.expect("failed to connect");
    client.writable_stream().await.expect("handshake did not complete");

    let response = client.send("Hello!").await.expect("failed to send message");
    println!("{:?}", response.text());

    let response = client
        .send(vec![
            Prompt::new("My name is Ada."),
            Prompt::new("Nice to meet you, Ada.").with_role(Role::Gemini),
            Prompt::new("What is my name?"),
        ])
        .await
        .expect("failed to send message");
    println!("{}", serde_json::to_string_pretty(&response).expect("failed to serialize response"));

    client.close().await.expect("failed to close");
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
}
