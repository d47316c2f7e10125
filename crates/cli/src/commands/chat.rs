use std::io::{self, BufRead, Write};
use std::sync::Arc;

use hembi_core::{ConversationStore, DialogueEngine, PartyId};

use crate::commands::CommandResult;

/// Offline REPL against an in-process engine; no WhatsApp credentials
/// needed. Exits on EOF or "salir".
pub fn run(party: &str) -> CommandResult {
    let engine = DialogueEngine::new(Arc::new(ConversationStore::default()));
    let party_id = PartyId::from(party);

    println!("hembi chat — simulando a {party} (escribe \"salir\" para terminar)\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let text = line.trim();
        if text.eq_ignore_ascii_case("salir") {
            break;
        }

        println!("\n{}\n", engine.handle_inbound_text(&party_id, text));
    }

    CommandResult { exit_code: 0, output: "¡Hasta pronto! 👋".to_string() }
}
