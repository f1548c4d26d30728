//! Styled terminal output.
//!
//! All user-facing text goes through these helpers so the colour scheme
//! stays consistent: green for success, yellow for warnings, red for
//! errors, cyan for commands the user should run.

use console::style;

/// Print the startup banner.
pub fn banner() {
    println!(
        r#"
╔════════════════════════════════════════════════════════╗
║                                                        ║
║   askpdf - ask your PDF documents with Gemini          ║
║                                                        ║
║   - Upload PDFs to the Document folder                 ║
║   - Ask questions about your documents                 ║
║   - Get AI-powered answers using Google Gemini         ║
║                                                        ║
╚════════════════════════════════════════════════════════╝"#
    );
}

/// Plain informational line.
pub fn info(message: &str) {
    println!("{message}");
}

/// Green success line.
pub fn success(message: &str) {
    println!("{}", style(message).green());
}

/// Yellow warning line.
pub fn warning(message: &str) {
    println!("{}", style(message).yellow());
}

/// Red error line, written to stderr.
pub fn error(message: &str) {
    eprintln!("{}", style(message).red());
}

/// Cyan line for commands the user can copy and run.
pub fn code(message: &str) {
    println!("{}", style(message).cyan());
}
