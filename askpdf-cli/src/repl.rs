//! Interactive question loop.

use anyhow::Result;
use askpdf_core::QueryEngine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::output;

/// Run the chat loop until the user exits.
///
/// `help` and `exit` are commands (matched case-insensitively), blank
/// input is ignored, and anything else is answered from the indexed
/// documents. Ctrl-C and Ctrl-D leave the loop the same way `exit`
/// does. A failed question is reported and the loop keeps going.
pub async fn run(engine: &QueryEngine) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline("\nYour question: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("\nExiting...");
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input.to_lowercase().as_str() {
            "exit" => {
                output::info("Thank you for using askpdf!");
                break;
            }
            "help" => {
                output::info("Available commands:");
                output::info("  help - Display this help message");
                output::info("  exit - Exit the application");
                output::info(
                    "  Any other input will be treated as a question about your documents",
                );
            }
            _ => {
                output::info("Processing your question...");
                match engine.answer(input).await {
                    Ok(answer) => {
                        output::success("\nAnswer:");
                        println!("{answer}");
                    }
                    Err(e) => {
                        output::error(&format!("Error processing your query: {e}"));
                    }
                }
            }
        }
    }

    Ok(())
}
