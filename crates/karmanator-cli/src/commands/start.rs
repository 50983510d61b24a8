use karmanator_channels::irc::{IrcChannel, IrcSettings};
use karmanator_runtime::{BotRuntime, Dispatcher};

pub(super) async fn cmd_start(
    config: karmanator_config::KarmaConfig,
    dispatcher: Dispatcher,
) -> karmanator_core::Result<()> {
    let rooms = config.irc.join_targets();

    println!("⚖️  Karmanator v{}", env!("CARGO_PKG_VERSION"));
    println!("   Server: {}", config.irc.address());
    println!("   Nick: {}", config.irc.nick);
    if rooms.is_empty() {
        println!("   Rooms: (none, direct messages only)");
    } else {
        println!("   Rooms: {}", rooms.join(", "));
    }
    println!("   Store: {}", config.store.path.display());
    println!();

    let settings = IrcSettings {
        nick: config.irc.nick.clone(),
        user: config.irc.user.clone(),
        password: config.irc.password.clone(),
        address: config.irc.address(),
        rooms,
    };

    let mut runtime = BotRuntime::new(dispatcher);
    runtime.add_channel(Box::new(IrcChannel::new("irc".into(), settings)));

    println!("   Press Ctrl+C to stop");
    runtime.run().await
}
