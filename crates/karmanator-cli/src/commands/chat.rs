use karmanator_channels::terminal::{TERMINAL_ROOM, TerminalChannel};
use karmanator_runtime::{BotRuntime, Dispatcher};

pub(super) async fn cmd_chat(
    name: Option<String>,
    dispatcher: Dispatcher,
) -> karmanator_core::Result<()> {
    let sender = name
        .or_else(|| std::env::var("USER").ok())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "you".to_string());

    println!("⚖️  Karmanator Local Chat");
    println!("   Talking in {TERMINAL_ROOM} as {sender}");
    println!("   Try 'alice++', '!karma alice' or '!topkarma'");
    println!("   Type 'exit' or Ctrl+C to quit");
    println!(
        "   Store: {}",
        dispatcher.engine().store().path().display()
    );
    println!();

    let mut runtime = BotRuntime::new(dispatcher);
    runtime.add_channel(Box::new(TerminalChannel::new("terminal".into(), sender)));
    runtime.run().await
}
