//! Welcome banner printed when a terminal chat starts.

use console::style;

use talentchat_types::config::Locale;

/// Print the welcome banner: endpoint, transcript backend, local session id.
pub fn print_welcome_banner(locale: Locale, endpoint: &str, store: &str, session_id: &str) {
    let title = match locale {
        Locale::Es => "Chat con el candidato",
        Locale::En => "Chat with the candidate",
    };
    let endpoint = if endpoint.is_empty() {
        "(not configured)"
    } else {
        endpoint
    };

    println!();
    println!("  {} {}", style("*").cyan(), style(title).cyan().bold());
    println!();
    println!("  {}  {}", style("Endpoint:").bold(), style(endpoint).dim());
    println!("  {}   {}", style("Storage:").bold(), style(store).dim());
    println!(
        "  {}   {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
