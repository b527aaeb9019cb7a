//! Session events example
//!
//! Drives an `EditorSession` with key chords and prints the events a host would observe.

use foldline_core::{EditorConfig, EditorEvent, EditorSession};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut session = EditorSession::new("fn main():\n    run()\n", EditorConfig::default());
    session.subscribe(|event| match event {
        EditorEvent::DocumentChanged {
            version, origin, ..
        } => println!("  document v{version} ({origin:?})"),
        other => println!("  {other:?}"),
    });

    println!("select all + copy:");
    session.handle_key("ctrl+a");
    session.handle_key("ctrl+c");

    println!("cut, then undo:");
    session.handle_key("ctrl+x");
    session.handle_key("ctrl+z");

    println!("fold and set a breakpoint:");
    session.toggle_fold(1);
    session.toggle_breakpoint(3);

    println!("save:");
    session.handle_key("ctrl+s");

    println!("\nfinal text:\n{}", session.text());
}
